// ABOUTME: Declarative section table and builders mapping a case study to blocks
// ABOUTME: Emission order is the SECTIONS array itself, not control flow

use crate::blocks::Block;
use crate::embed::{diagram_key, probe_dimensions, ResolvedImages};
use crate::layout::{fit_dimensions, RenderMode};
use casebook_core::types::{CaseStudy, DiagramRef};
use chrono::{DateTime, Utc};

/// Placeholder body for mandatory sections that arrive empty on old records
const PLACEHOLDER: &str = "To be documented.";

/// Everything a section builder may read. Synthesis is a pure function of
/// this context; nothing here is mutated.
pub struct SynthesisContext<'a> {
    pub case: &'a CaseStudy,
    pub mode: RenderMode,
    pub images: &'a ResolvedImages,
    pub generated_on: DateTime<Utc>,
}

/// One document section: a stable name, an inclusion predicate over the
/// case study, and a block builder. A section is emitted iff its predicate
/// holds; absence is silent exclusion, never an empty heading.
pub struct SectionDescriptor {
    pub name: &'static str,
    pub applies: fn(&CaseStudy) -> bool,
    pub build: fn(&SynthesisContext<'_>, &mut Vec<Block>),
}

/// The fixed emission order. Reordering this array is the only way to
/// reorder a document, which is exactly what the ordering tests pin down.
pub const SECTIONS: [SectionDescriptor; 12] = [
    SectionDescriptor {
        name: "title",
        applies: |_| true,
        build: build_title,
    },
    SectionDescriptor {
        name: "background",
        applies: |_| true,
        build: build_background,
    },
    SectionDescriptor {
        name: "executive-summary",
        applies: |case| present(&case.questionnaire.content.executive_summary),
        build: build_executive_summary,
    },
    SectionDescriptor {
        name: "key-metrics",
        applies: |case| !case.questionnaire.metrics.is_empty() || !case.custom_metrics.is_empty(),
        build: build_metrics,
    },
    SectionDescriptor {
        name: "overview",
        applies: |case| present(&case.questionnaire.content.overview),
        build: build_overview,
    },
    SectionDescriptor {
        name: "challenges",
        applies: |_| true,
        build: build_challenges,
    },
    SectionDescriptor {
        name: "solution",
        applies: |_| true,
        build: build_solution,
    },
    SectionDescriptor {
        name: "architecture-diagrams",
        applies: |case| {
            case.questionnaire
                .content
                .architecture_diagrams
                .iter()
                .any(|section| !section.diagrams.is_empty())
        },
        build: build_architecture_diagrams,
    },
    SectionDescriptor {
        name: "workstreams",
        applies: |case| {
            let content = &case.questionnaire.content;
            content
                .implementation_workstreams
                .iter()
                .any(|ws| !ws.name.trim().is_empty() || !ws.description.trim().is_empty())
                || present(&content.implementation)
        },
        build: build_workstreams,
    },
    SectionDescriptor {
        name: "results",
        applies: |_| true,
        build: build_results,
    },
    SectionDescriptor {
        name: "lessons-learnt",
        applies: |case| present(&case.questionnaire.content.lessons_learned),
        build: build_lessons,
    },
    SectionDescriptor {
        name: "conclusion",
        applies: |case| present(&case.questionnaire.content.conclusion),
        build: build_conclusion,
    },
];

/// Assemble the ordered block list for one render mode
pub fn synthesize(ctx: &SynthesisContext<'_>) -> Vec<Block> {
    let mut blocks = Vec::new();
    for section in &SECTIONS {
        if (section.applies)(ctx.case) {
            (section.build)(ctx, &mut blocks);
        }
    }
    blocks
}

fn present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

fn body_or_placeholder(text: &str) -> String {
    if text.trim().is_empty() {
        PLACEHOLDER.to_string()
    } else {
        text.to_string()
    }
}

fn build_title(ctx: &SynthesisContext<'_>, out: &mut Vec<Block>) {
    let title = if ctx.case.original_title.trim().is_empty() {
        ctx.case.questionnaire.basic_info.title.clone()
    } else {
        ctx.case.original_title.clone()
    };
    out.push(Block::Title(title));
    out.push(Block::Subtitle(format!(
        "Generated on {}",
        ctx.generated_on.format("%B %d, %Y")
    )));
}

fn build_background(ctx: &SynthesisContext<'_>, out: &mut Vec<Block>) {
    let info = &ctx.case.questionnaire.basic_info;
    out.push(Block::Heading("Background".to_string()));

    for (label, value) in [
        ("Customer", &info.customer),
        ("Industry", &info.industry),
        ("Duration", &info.duration),
        ("Team size", &info.team_size),
        ("Point of contact", &info.point_of_contact),
    ] {
        if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            out.push(Block::Paragraph(format!("{}: {}", label, value)));
        }
    }

    if !ctx.case.labels.is_empty() {
        out.push(Block::SubHeading("Labels".to_string()));
        for (category, values) in ctx.case.labels.iter() {
            if !values.is_empty() {
                out.push(Block::Bullet(format!("{}: {}", category, values.join(", "))));
            }
        }
    }
}

fn build_executive_summary(ctx: &SynthesisContext<'_>, out: &mut Vec<Block>) {
    out.push(Block::Heading("Executive Summary".to_string()));
    if let Some(summary) = &ctx.case.questionnaire.content.executive_summary {
        out.push(Block::Paragraph(summary.clone()));
    }
}

fn build_metrics(ctx: &SynthesisContext<'_>, out: &mut Vec<Block>) {
    let metrics = &ctx.case.questionnaire.metrics;
    out.push(Block::Heading("Key Metrics".to_string()));

    let standard: [(&str, &Option<String>); 5] = [
        ("Performance improvement", &metrics.performance_improvement),
        ("Cost reduction", &metrics.cost_reduction),
        ("Cost savings", &metrics.cost_savings),
        ("Time savings", &metrics.time_savings),
        ("User satisfaction", &metrics.user_satisfaction),
    ];
    for (label, value) in standard {
        if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            out.push(Block::Bullet(format!("{}: {}", label, value)));
        }
    }

    // The one-pager keeps the metric list abbreviated
    if ctx.mode == RenderMode::Full {
        if let Some(other) = metrics.other_benefits.as_deref().filter(|v| !v.trim().is_empty()) {
            out.push(Block::Bullet(format!("Other benefits: {}", other)));
        }
    }

    for metric in ctx
        .case
        .custom_metrics
        .iter()
        .take(ctx.mode.custom_metric_limit())
    {
        out.push(Block::Bullet(format!("{}: {}", metric.name, metric.value)));
    }
}

fn build_overview(ctx: &SynthesisContext<'_>, out: &mut Vec<Block>) {
    out.push(Block::Heading("Overview".to_string()));
    if let Some(overview) = &ctx.case.questionnaire.content.overview {
        out.push(Block::Paragraph(overview.clone()));
    }
}

fn build_challenges(ctx: &SynthesisContext<'_>, out: &mut Vec<Block>) {
    out.push(Block::Heading("Challenges".to_string()));
    out.push(Block::Paragraph(body_or_placeholder(
        &ctx.case.questionnaire.content.challenge,
    )));
}

fn build_solution(ctx: &SynthesisContext<'_>, out: &mut Vec<Block>) {
    out.push(Block::Heading("Solution Approach".to_string()));
    out.push(Block::Paragraph(body_or_placeholder(
        &ctx.case.questionnaire.content.solution,
    )));
}

fn build_architecture_diagrams(ctx: &SynthesisContext<'_>, out: &mut Vec<Block>) {
    out.push(Block::Heading("Architecture Diagrams".to_string()));
    for section in &ctx.case.questionnaire.content.architecture_diagrams {
        if section.diagrams.is_empty() {
            continue;
        }
        if !section.name.trim().is_empty() {
            out.push(Block::SubHeading(section.name.clone()));
        }
        if !section.description.trim().is_empty() {
            out.push(Block::Paragraph(section.description.clone()));
        }
        for diagram in &section.diagrams {
            emit_diagram(ctx, diagram, out);
        }
    }
}

fn build_workstreams(ctx: &SynthesisContext<'_>, out: &mut Vec<Block>) {
    let content = &ctx.case.questionnaire.content;
    out.push(Block::Heading("Implementation Workstreams".to_string()));

    if let Some(implementation) = content.implementation.as_deref() {
        if !implementation.trim().is_empty() {
            out.push(Block::Paragraph(implementation.to_string()));
        }
    }

    for workstream in &content.implementation_workstreams {
        let has_text =
            !workstream.name.trim().is_empty() || !workstream.description.trim().is_empty();
        if !has_text {
            continue;
        }
        if !workstream.name.trim().is_empty() {
            out.push(Block::SubHeading(workstream.name.clone()));
        }
        if !workstream.description.trim().is_empty() {
            out.push(Block::Paragraph(workstream.description.clone()));
        }
        for diagram in &workstream.diagrams {
            emit_diagram(ctx, diagram, out);
        }
    }
}

fn build_results(ctx: &SynthesisContext<'_>, out: &mut Vec<Block>) {
    out.push(Block::Heading("Results".to_string()));
    out.push(Block::Paragraph(body_or_placeholder(
        &ctx.case.questionnaire.content.results,
    )));
}

fn build_lessons(ctx: &SynthesisContext<'_>, out: &mut Vec<Block>) {
    out.push(Block::Heading("Lessons Learnt".to_string()));
    if let Some(lessons) = &ctx.case.questionnaire.content.lessons_learned {
        out.push(Block::Paragraph(lessons.clone()));
    }
}

fn build_conclusion(ctx: &SynthesisContext<'_>, out: &mut Vec<Block>) {
    out.push(Block::Heading("Conclusion".to_string()));
    if let Some(conclusion) = &ctx.case.questionnaire.content.conclusion {
        out.push(Block::Paragraph(conclusion.clone()));
    }
}

/// Emit one diagram: an embedded image with fitted dimensions, an italic
/// reference for non-image types, or fallback text when bytes are missing.
fn emit_diagram(ctx: &SynthesisContext<'_>, diagram: &DiagramRef, out: &mut Vec<Block>) {
    let display_name = if diagram.name.trim().is_empty() {
        "diagram".to_string()
    } else {
        diagram.name.clone()
    };

    if !diagram.is_image() {
        let file_type = if diagram.file_type.is_empty() {
            "file".to_string()
        } else {
            diagram.file_type.clone()
        };
        out.push(Block::Italic(format!("{} ({})", display_name, file_type)));
        return;
    }

    match ctx.images.get(&diagram_key(diagram)) {
        Some(bytes) => match probe_dimensions(bytes) {
            Some((src_w, src_h)) => {
                let (width, height) = fit_dimensions(src_w, src_h, &ctx.mode.content_box());
                out.push(Block::Image {
                    name: display_name,
                    data: bytes.clone(),
                    width,
                    height,
                });
            }
            None => out.push(Block::ImageFallback(format!(
                "[Diagram could not be read: {}]",
                display_name
            ))),
        },
        None => out.push(Block::ImageFallback(format!(
            "[Diagram unavailable: {}]",
            display_name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::TINY_PNG;
    use casebook_core::types::{
        CaseStudy, CaseStudyStatus, CustomMetric, DiagramSection, LabelSet, Questionnaire,
        Workstream,
    };
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn base_case() -> CaseStudy {
        let mut questionnaire = Questionnaire::default();
        questionnaire.basic_info.title = "cst12".to_string();
        questionnaire.content.challenge = "c".to_string();
        questionnaire.content.solution = "s".to_string();
        questionnaire.content.results = "r".to_string();
        CaseStudy {
            id: "id1".to_string(),
            folder_name: "cst12".to_string(),
            original_title: "cst12".to_string(),
            status: CaseStudyStatus::UnderReview,
            version: "0.1".to_string(),
            previous_version: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            approved_at: None,
            rejected_at: None,
            original_draft_id: None,
            labels: LabelSet::new(),
            custom_metrics: vec![],
            questionnaire,
        }
    }

    fn full_case() -> CaseStudy {
        let mut case = base_case();
        let content = &mut case.questionnaire.content;
        content.overview = Some("overview".to_string());
        content.executive_summary = Some("summary".to_string());
        content.lessons_learned = Some("lessons".to_string());
        content.conclusion = Some("conclusion".to_string());
        content.implementation = Some("implementation intro".to_string());
        content.implementation_workstreams = vec![Workstream {
            name: "Data platform".to_string(),
            description: "ETL rebuild".to_string(),
            diagrams: vec![],
        }];
        content.architecture_diagrams = vec![DiagramSection {
            name: "Target state".to_string(),
            description: String::new(),
            diagrams: vec![DiagramRef {
                name: "arch.png".to_string(),
                s3_key: None,
                file_type: "image/png".to_string(),
                size: None,
            }],
        }];
        case.questionnaire.metrics.cost_reduction = Some("30%".to_string());
        case.custom_metrics = vec![CustomMetric {
            name: "Deployments".to_string(),
            value: "42".to_string(),
        }];
        case.labels.push("client", "Acme");
        case
    }

    fn synth(case: &CaseStudy, mode: RenderMode) -> Vec<Block> {
        synth_with_images(case, mode, &HashMap::new())
    }

    fn synth_with_images(
        case: &CaseStudy,
        mode: RenderMode,
        images: &ResolvedImages,
    ) -> Vec<Block> {
        synthesize(&SynthesisContext {
            case,
            mode,
            images,
            generated_on: Utc::now(),
        })
    }

    fn headings(blocks: &[Block]) -> Vec<&str> {
        blocks.iter().filter_map(|b| b.heading_text()).collect()
    }

    #[test]
    fn test_descriptor_table_order_is_fixed() {
        let names: Vec<&str> = SECTIONS.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "title",
                "background",
                "executive-summary",
                "key-metrics",
                "overview",
                "challenges",
                "solution",
                "architecture-diagrams",
                "workstreams",
                "results",
                "lessons-learnt",
                "conclusion",
            ]
        );
    }

    #[test]
    fn test_minimal_case_emits_only_mandatory_sections() {
        let blocks = synth(&base_case(), RenderMode::Full);
        assert_eq!(
            headings(&blocks),
            vec!["Background", "Challenges", "Solution Approach", "Results"]
        );
    }

    #[test]
    fn test_empty_mandatory_fields_get_placeholder_text() {
        let mut case = base_case();
        case.questionnaire.content.challenge = String::new();
        case.questionnaire.content.results = "   ".to_string();

        let blocks = synth(&case, RenderMode::Full);
        let placeholders = blocks
            .iter()
            .filter(|b| b.text() == Some(PLACEHOLDER))
            .count();
        assert_eq!(placeholders, 2);
        // The headings still appear; only the body is a placeholder
        assert!(headings(&blocks).contains(&"Challenges"));
        assert!(headings(&blocks).contains(&"Results"));
    }

    #[test]
    fn test_fully_populated_case_emits_all_sections_in_order() {
        let blocks = synth(&full_case(), RenderMode::Full);
        assert_eq!(
            headings(&blocks),
            vec![
                "Background",
                "Executive Summary",
                "Key Metrics",
                "Overview",
                "Challenges",
                "Solution Approach",
                "Architecture Diagrams",
                "Implementation Workstreams",
                "Results",
                "Lessons Learnt",
                "Conclusion",
            ]
        );
        // Title and date line precede the first heading
        assert!(matches!(blocks[0], Block::Title(_)));
        assert!(matches!(blocks[1], Block::Subtitle(_)));
    }

    #[test]
    fn test_labels_render_under_background() {
        let blocks = synth(&full_case(), RenderMode::Full);
        let label_line = blocks
            .iter()
            .find(|b| matches!(b, Block::Bullet(t) if t.starts_with("client:")))
            .expect("label bullet");
        assert_eq!(label_line.text(), Some("client: Acme"));
    }

    #[test]
    fn test_unresolved_image_emits_fallback_text() {
        let blocks = synth(&full_case(), RenderMode::Full);
        assert!(blocks
            .iter()
            .any(|b| matches!(b, Block::ImageFallback(t) if t.contains("arch.png"))));
        assert!(!blocks.iter().any(|b| matches!(b, Block::Image { .. })));
    }

    #[test]
    fn test_resolved_image_embeds_with_fitted_dimensions() {
        let mut images = ResolvedImages::new();
        images.insert("arch.png".to_string(), TINY_PNG.to_vec());

        let blocks = synth_with_images(&full_case(), RenderMode::Full, &images);
        let image = blocks
            .iter()
            .find(|b| matches!(b, Block::Image { .. }))
            .expect("embedded image");
        // 1x1 source scales up to the square minimum
        if let Block::Image { width, height, .. } = image {
            assert_eq!((*width, *height), (300, 300));
        }
    }

    #[test]
    fn test_non_image_diagram_referenced_as_italic_text() {
        let mut case = full_case();
        case.questionnaire.content.architecture_diagrams[0].diagrams = vec![DiagramRef {
            name: "spec.pdf".to_string(),
            s3_key: None,
            file_type: "application/pdf".to_string(),
            size: None,
        }];

        let blocks = synth(&case, RenderMode::Full);
        assert!(blocks
            .iter()
            .any(|b| matches!(b, Block::Italic(t) if t == "spec.pdf (application/pdf)")));
    }

    #[test]
    fn test_one_pager_abbreviates_metrics() {
        let mut case = full_case();
        case.questionnaire.metrics.other_benefits = Some("morale".to_string());
        case.custom_metrics = (0..5)
            .map(|i| CustomMetric {
                name: format!("m{}", i),
                value: i.to_string(),
            })
            .collect();

        let full_bullets = synth(&case, RenderMode::Full)
            .iter()
            .filter(|b| matches!(b, Block::Bullet(t) if !t.contains(':') || !t.starts_with("client")))
            .count();
        let one_pager_metric_bullets = synth(&case, RenderMode::OnePager)
            .iter()
            .filter(|b| matches!(b, Block::Bullet(t) if t.starts_with('m') || t.starts_with("Cost") || t.starts_with("Other")))
            .count();

        // Full: cost reduction + other benefits + 5 custom; one-pager drops
        // other benefits and caps custom metrics at 3
        assert!(full_bullets >= 7);
        assert_eq!(one_pager_metric_bullets, 4);
    }

    #[test]
    fn test_workstream_section_includes_implementation_intro() {
        let mut case = base_case();
        case.questionnaire.content.implementation = Some("phased rollout".to_string());

        let blocks = synth(&case, RenderMode::Full);
        assert!(headings(&blocks).contains(&"Implementation Workstreams"));
        assert!(blocks
            .iter()
            .any(|b| b.text() == Some("phased rollout")));
    }
}
