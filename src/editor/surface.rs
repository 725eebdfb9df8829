use std::ops::Range;

/// Named rich-text operations applied at the current selection or cursor line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Heading(u8),
    Paragraph,
    BulletList,
    NumberedList,
    InsertHtml(String),
    InsertText(String),
}

impl FormatCommand {
    /// Tag used for inline commands.
    pub fn inline_tag(&self) -> Option<&'static str> {
        match self {
            FormatCommand::Bold => Some("b"),
            FormatCommand::Italic => Some("i"),
            FormatCommand::Underline => Some("u"),
            FormatCommand::Strikethrough => Some("s"),
            _ => None,
        }
    }
}

/// The narrow interface between editing logic and whatever hosts the editable text.
///
/// Offsets are byte ranges into the string returned by [`RichTextSurface::get_html`].
pub trait RichTextSurface {
    fn get_html(&self) -> String;

    fn set_html(&mut self, html: &str);

    fn exec(&mut self, command: &FormatCommand);

    /// Byte range of the current non-empty selection within `get_html()`.
    fn selection(&self) -> Option<Range<usize>>;
}
