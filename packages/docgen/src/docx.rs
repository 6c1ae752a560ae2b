// ABOUTME: Packs synthesized blocks into an OOXML Word document buffer

use crate::blocks::Block;
use crate::layout::{RenderMode, TypeScale, EMU_PER_POINT};
use crate::{DocgenError, DocgenResult};
use docx_rs::{
    AbstractNumbering, AlignmentType, Docx, IndentLevel, Level, LevelJc, LevelText, NumberFormat,
    Numbering, NumberingId, PageMargin, Paragraph, Pic, Run, Start,
};
use std::io::Cursor;

const BULLET_NUMBERING_ID: usize = 1;

/// Render an ordered block list into `.docx` bytes for the given mode.
/// Mode drives page margins and the type scale; content is the blocks alone.
pub fn render(blocks: &[Block], mode: RenderMode) -> DocgenResult<Vec<u8>> {
    let scale = mode.type_scale();
    let margin = mode.page_margin();

    let mut docx = Docx::new()
        .page_margin(
            PageMargin::new()
                .top(margin)
                .bottom(margin)
                .left(margin)
                .right(margin),
        )
        .add_abstract_numbering(AbstractNumbering::new(BULLET_NUMBERING_ID).add_level(
            Level::new(
                0,
                Start::new(1),
                NumberFormat::new("bullet"),
                LevelText::new("•"),
                LevelJc::new("left"),
            ),
        ))
        .add_numbering(Numbering::new(BULLET_NUMBERING_ID, BULLET_NUMBERING_ID));

    for block in blocks {
        docx = docx.add_paragraph(paragraph_for(block, &scale));
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| DocgenError::Pack(e.to_string()))?;
    Ok(buffer.into_inner())
}

fn paragraph_for(block: &Block, scale: &TypeScale) -> Paragraph {
    match block {
        Block::Title(text) => Paragraph::new()
            .align(AlignmentType::Center)
            .add_run(Run::new().add_text(text.as_str()).size(scale.title).bold()),
        Block::Subtitle(text) => Paragraph::new()
            .align(AlignmentType::Center)
            .add_run(
                Run::new()
                    .add_text(text.as_str())
                    .size(scale.body)
                    .italic()
                    .color("666666"),
            ),
        Block::Heading(text) => Paragraph::new()
            .add_run(Run::new().add_text(text.as_str()).size(scale.heading).bold()),
        Block::SubHeading(text) => Paragraph::new().add_run(
            Run::new()
                .add_text(text.as_str())
                .size(scale.sub_heading)
                .bold(),
        ),
        Block::Paragraph(text) => {
            Paragraph::new().add_run(Run::new().add_text(text.as_str()).size(scale.body))
        }
        Block::Italic(text) => Paragraph::new()
            .add_run(Run::new().add_text(text.as_str()).size(scale.body).italic()),
        Block::Bullet(text) => Paragraph::new()
            .add_run(Run::new().add_text(text.as_str()).size(scale.body))
            .numbering(
                NumberingId::new(BULLET_NUMBERING_ID),
                IndentLevel::new(0),
            ),
        Block::Image {
            data,
            width,
            height,
            ..
        } => {
            let pic = Pic::new(data).size(width * EMU_PER_POINT, height * EMU_PER_POINT);
            Paragraph::new()
                .align(AlignmentType::Center)
                .add_run(Run::new().add_image(pic))
        }
        Block::ImageFallback(text) => Paragraph::new().add_run(
            Run::new()
                .add_text(text.as_str())
                .size(scale.body)
                .italic()
                .color("888888"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::TINY_PNG;

    #[test]
    fn test_render_produces_docx_package() {
        let blocks = vec![
            Block::Title("cst12".to_string()),
            Block::Heading("Background".to_string()),
            Block::Paragraph("Duration: 6 months".to_string()),
            Block::Bullet("client: Acme".to_string()),
        ];
        let bytes = render(&blocks, RenderMode::Full).unwrap();
        assert_eq!(&bytes[..2], b"PK");
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn test_render_with_embedded_image() {
        let blocks = vec![Block::Image {
            name: "arch.png".to_string(),
            data: TINY_PNG.to_vec(),
            width: 300,
            height: 300,
        }];
        let bytes = render(&blocks, RenderMode::OnePager).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
