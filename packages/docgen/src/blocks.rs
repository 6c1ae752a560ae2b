// ABOUTME: Intermediate document representation emitted by the synthesizer
// ABOUTME: Ordered, renderer-agnostic, and directly assertable in tests

/// One content block of a synthesized document, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Document title line
    Title(String),
    /// Secondary line under the title (generation date)
    Subtitle(String),
    /// Section heading
    Heading(String),
    /// Sub-heading (workstream names, diagram group names)
    SubHeading(String),
    /// Body paragraph
    Paragraph(String),
    /// Italic reference line (non-image diagrams, captions)
    Italic(String),
    /// Bulleted list item (metrics, labels)
    Bullet(String),
    /// Embedded raster image with computed display dimensions in layout points
    Image {
        name: String,
        data: Vec<u8>,
        width: u32,
        height: u32,
    },
    /// Textual stand-in for an image that could not be resolved
    ImageFallback(String),
}

impl Block {
    /// Heading text, if this block is a section heading
    pub fn heading_text(&self) -> Option<&str> {
        match self {
            Block::Heading(text) => Some(text),
            _ => None,
        }
    }

    /// Display text of the block, if it carries any
    pub fn text(&self) -> Option<&str> {
        match self {
            Block::Title(t)
            | Block::Subtitle(t)
            | Block::Heading(t)
            | Block::SubHeading(t)
            | Block::Paragraph(t)
            | Block::Italic(t)
            | Block::Bullet(t)
            | Block::ImageFallback(t) => Some(t),
            Block::Image { .. } => None,
        }
    }
}
