mod cursor;
mod paste;
mod session;
mod surface;

pub use cursor::{CursorMove, Position};
pub use paste::{paste_command, video_embed_html, video_id};
pub use session::{EditorSession, SaveState, SelectionSnapshot};
pub use surface::{FormatCommand, RichTextSurface};

use std::ops::Range;

use cursor::Cursor;
use ratatui::{
    buffer::Buffer as RatatuiBuffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Widget},
};
use unicode_width::UnicodeWidthChar;

use crate::html;

/// Block wrappers recognised (and replaced) by block-level format commands.
const BLOCK_WRAPPERS: &[(&str, &str)] = &[
    ("<ul><li>", "</li></ul>"),
    ("<ol><li>", "</li></ol>"),
    ("<p>", "</p>"),
    ("<h1>", "</h1>"),
    ("<h2>", "</h2>"),
    ("<h3>", "</h3>"),
    ("<h4>", "</h4>"),
    ("<h5>", "</h5>"),
    ("<h6>", "</h6>"),
    ("<li>", "</li>"),
];

/// Line-oriented editing surface over a note's HTML source.
pub struct TextSurface {
    lines: Vec<String>,
    cursor: Cursor,
    scroll_offset: usize,
    h_scroll_offset: usize,
    view_height: usize,
    view_width: usize,
    block: Option<Block<'static>>,
    cursor_line_style: Style,
    selection_style: Style,
    cursor_style: Style,
}

impl Default for TextSurface {
    fn default() -> Self {
        Self::new(vec![String::new()])
    }
}

impl TextSurface {
    pub fn new(lines: Vec<String>) -> Self {
        let lines = if lines.is_empty() { vec![String::new()] } else { lines };
        Self {
            lines,
            cursor: Cursor::new(),
            scroll_offset: 0,
            h_scroll_offset: 0,
            view_height: 0,
            view_width: 0,
            block: None,
            cursor_line_style: Style::default(),
            selection_style: Style::default().bg(ratatui::style::Color::DarkGray),
            cursor_style: Style::default().add_modifier(Modifier::REVERSED),
        }
    }

    pub fn from_html(html: &str) -> Self {
        let mut surface = Self::default();
        surface.set_html(html);
        surface
    }

    // Styling
    pub fn set_block(&mut self, block: Block<'static>) {
        self.block = Some(block);
    }

    pub fn set_cursor_line_style(&mut self, style: Style) {
        self.cursor_line_style = style;
    }

    pub fn set_selection_style(&mut self, style: Style) {
        self.selection_style = style;
    }

    pub fn set_cursor_style(&mut self, style: Style) {
        self.cursor_style = style;
    }

    pub fn set_view_size(&mut self, width: usize, height: usize) {
        self.view_width = width;
        self.view_height = height;
        self.ensure_cursor_visible();
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map(|l| l.chars().count()).unwrap_or(0)
    }

    // Cursor
    pub fn cursor(&self) -> (usize, usize) {
        let pos = self.cursor.pos();
        (pos.row, pos.col)
    }

    pub fn set_cursor(&mut self, row: usize, col: usize) {
        let safe_row = row.min(self.lines.len().saturating_sub(1));
        let safe_col = col.min(self.line_len(safe_row));
        self.cursor.move_to(safe_row, safe_col);
        self.ensure_cursor_visible();
    }

    /// Move the cursor; `extend` grows the selection instead of dropping it.
    pub fn move_cursor(&mut self, movement: CursorMove, extend: bool) {
        if extend && !self.cursor.is_selecting() {
            self.cursor.start_selection();
        } else if !extend {
            self.cursor.cancel_selection();
        }

        let pos = self.cursor.pos();
        let line_count = self.lines.len();

        match movement {
            CursorMove::Forward => {
                if pos.col < self.line_len(pos.row) {
                    self.cursor.move_to(pos.row, pos.col + 1);
                } else if pos.row + 1 < line_count {
                    self.cursor.move_to(pos.row + 1, 0);
                }
            }
            CursorMove::Back => {
                if pos.col > 0 {
                    self.cursor.move_to(pos.row, pos.col - 1);
                } else if pos.row > 0 {
                    let prev_len = self.line_len(pos.row - 1);
                    self.cursor.move_to(pos.row - 1, prev_len);
                }
            }
            CursorMove::Up => {
                if pos.row > 0 {
                    let goal = self.cursor.goal_col().unwrap_or(pos.col);
                    let prev_len = self.line_len(pos.row - 1);
                    self.cursor.move_keeping_goal(Position::new(pos.row - 1, goal.min(prev_len)));
                }
            }
            CursorMove::Down => {
                if pos.row + 1 < line_count {
                    let goal = self.cursor.goal_col().unwrap_or(pos.col);
                    let next_len = self.line_len(pos.row + 1);
                    self.cursor.move_keeping_goal(Position::new(pos.row + 1, goal.min(next_len)));
                }
            }
            CursorMove::WordForward => {
                let col = cursor::next_word_start(&self.lines[pos.row], pos.col);
                self.cursor.move_to(pos.row, col);
            }
            CursorMove::WordBack => {
                let col = cursor::prev_word_start(&self.lines[pos.row], pos.col);
                self.cursor.move_to(pos.row, col);
            }
            CursorMove::Head => self.cursor.move_to(pos.row, 0),
            CursorMove::End => self.cursor.move_to(pos.row, self.line_len(pos.row)),
            CursorMove::Top => self.cursor.move_to(0, 0),
            CursorMove::Bottom => {
                let last_row = line_count.saturating_sub(1);
                self.cursor.move_to(last_row, self.line_len(last_row));
            }
        }
        self.ensure_cursor_visible();
    }

    fn ensure_cursor_visible(&mut self) {
        let pos = self.cursor.pos();
        if pos.row < self.scroll_offset {
            self.scroll_offset = pos.row;
        } else if self.view_height > 0 && pos.row >= self.scroll_offset + self.view_height {
            self.scroll_offset = pos.row + 1 - self.view_height;
        }
        if pos.col < self.h_scroll_offset {
            self.h_scroll_offset = pos.col;
        } else if self.view_width > 0 && pos.col >= self.h_scroll_offset + self.view_width {
            self.h_scroll_offset = pos.col + 1 - self.view_width;
        }
    }

    // Selection
    pub fn select_all(&mut self) {
        self.cursor.move_to(0, 0);
        self.cursor.start_selection();
        let last_row = self.lines.len().saturating_sub(1);
        self.cursor.move_to(last_row, self.line_len(last_row));
        self.ensure_cursor_visible();
    }

    pub fn cancel_selection(&mut self) {
        self.cursor.cancel_selection();
    }

    pub fn has_selection(&self) -> bool {
        self.cursor.selection_range().is_some()
    }

    pub fn selected_text(&self) -> Option<String> {
        let (start, end) = self.cursor.selection_range()?;
        Some(self.text_range(start, end))
    }

    fn byte_offset(&self, pos: Position) -> usize {
        let before: usize = self.lines[..pos.row].iter().map(|l| l.len() + 1).sum();
        before + byte_index(&self.lines[pos.row], pos.col)
    }

    fn text_range(&self, start: Position, end: Position) -> String {
        let first = &self.lines[start.row];
        if start.row == end.row {
            return first[byte_index(first, start.col)..byte_index(first, end.col)].to_string();
        }
        let mut parts = vec![first[byte_index(first, start.col)..].to_string()];
        parts.extend(self.lines[start.row + 1..end.row].iter().cloned());
        let last = &self.lines[end.row];
        parts.push(last[..byte_index(last, end.col)].to_string());
        parts.join("\n")
    }

    fn delete_range(&mut self, start: Position, end: Position) -> String {
        let deleted = self.text_range(start, end);
        let head = self.lines[start.row][..byte_index(&self.lines[start.row], start.col)].to_string();
        let tail = self.lines[end.row][byte_index(&self.lines[end.row], end.col)..].to_string();
        self.lines.splice(start.row..=end.row, [format!("{head}{tail}")]);
        self.cursor.move_to(start.row, start.col);
        deleted
    }

    pub fn delete_selection(&mut self) -> Option<String> {
        let (start, end) = self.cursor.selection_range()?;
        self.cursor.cancel_selection();
        let deleted = self.delete_range(start, end);
        self.ensure_cursor_visible();
        Some(deleted)
    }

    // Text manipulation
    pub fn insert_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.insert_str(c.encode_utf8(&mut buf));
    }

    pub fn newline(&mut self) {
        self.insert_str("\n");
    }

    /// Insert at the cursor, replacing any selection. The cursor ends after the text.
    pub fn insert_str(&mut self, text: &str) {
        self.delete_selection();
        self.cursor.cancel_selection();

        let text = text.replace("\r\n", "\n");
        let pos = self.cursor.pos();
        let line = &self.lines[pos.row];
        let split = byte_index(line, pos.col);
        let head = line[..split].to_string();
        let tail = line[split..].to_string();

        let mut pieces: Vec<&str> = text.split('\n').collect();
        let last = pieces.pop().unwrap_or("");

        if pieces.is_empty() {
            self.lines[pos.row] = format!("{head}{last}{tail}");
            self.cursor.move_to(pos.row, pos.col + last.chars().count());
        } else {
            let mut new_lines = Vec::with_capacity(pieces.len() + 1);
            new_lines.push(format!("{head}{}", pieces[0]));
            new_lines.extend(pieces[1..].iter().map(|p| p.to_string()));
            new_lines.push(format!("{last}{tail}"));
            let end_row = pos.row + new_lines.len() - 1;
            self.lines.splice(pos.row..=pos.row, new_lines);
            self.cursor.move_to(end_row, last.chars().count());
        }
        self.ensure_cursor_visible();
    }

    pub fn backspace(&mut self) {
        if self.delete_selection().is_some() {
            return;
        }
        let pos = self.cursor.pos();
        if pos.col > 0 {
            self.delete_range(Position::new(pos.row, pos.col - 1), pos);
        } else if pos.row > 0 {
            let prev_len = self.line_len(pos.row - 1);
            self.delete_range(Position::new(pos.row - 1, prev_len), pos);
        }
        self.ensure_cursor_visible();
    }

    pub fn delete_forward(&mut self) {
        if self.delete_selection().is_some() {
            return;
        }
        let pos = self.cursor.pos();
        if pos.col < self.line_len(pos.row) {
            self.delete_range(pos, Position::new(pos.row, pos.col + 1));
        } else if pos.row + 1 < self.lines.len() {
            self.delete_range(pos, Position::new(pos.row + 1, 0));
        }
    }

    fn wrap_inline(&mut self, tag: &str) {
        match self.delete_selection() {
            Some(selected) => self.insert_str(&format!("<{tag}>{selected}</{tag}>")),
            None => {
                self.insert_str(&format!("<{tag}></{tag}>"));
                let (row, col) = self.cursor();
                self.set_cursor(row, col.saturating_sub(tag.chars().count() + 3));
            }
        }
    }

    fn wrap_line(&mut self, open: &str, close: &str) {
        self.cursor.cancel_selection();
        let row = self.cursor.pos().row;
        let inner = strip_block_wrapper(self.lines[row].trim()).to_string();
        self.lines[row] = format!("{open}{inner}{close}");
        let col = open.chars().count() + inner.chars().count();
        self.cursor.move_to(row, col);
        self.ensure_cursor_visible();
    }
}

fn strip_block_wrapper(line: &str) -> &str {
    BLOCK_WRAPPERS
        .iter()
        .find_map(|(open, close)| line.strip_prefix(open).and_then(|rest| rest.strip_suffix(close)))
        .unwrap_or(line)
}

fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices().nth(col).map(|(i, _)| i).unwrap_or(line.len())
}

impl RichTextSurface for TextSurface {
    fn get_html(&self) -> String {
        self.lines.join("\n")
    }

    fn set_html(&mut self, html: &str) {
        self.lines = html.split('\n').map(String::from).collect();
        self.cursor = Cursor::new();
        self.scroll_offset = 0;
        self.h_scroll_offset = 0;
    }

    fn exec(&mut self, command: &FormatCommand) {
        if let Some(tag) = command.inline_tag() {
            self.wrap_inline(tag);
            return;
        }
        match command {
            FormatCommand::Heading(level) => {
                let level = (*level).clamp(1, 6);
                self.wrap_line(&format!("<h{level}>"), &format!("</h{level}>"));
            }
            FormatCommand::Paragraph => self.wrap_line("<p>", "</p>"),
            FormatCommand::BulletList => self.wrap_line("<ul><li>", "</li></ul>"),
            FormatCommand::NumberedList => self.wrap_line("<ol><li>", "</li></ol>"),
            FormatCommand::InsertHtml(markup) => self.insert_str(markup),
            FormatCommand::InsertText(text) => {
                let escaped = html::escape(&text.replace("\r\n", "\n"));
                self.insert_str(&escaped.replace('\n', "<br>\n"));
            }
            FormatCommand::Bold
            | FormatCommand::Italic
            | FormatCommand::Underline
            | FormatCommand::Strikethrough => {}
        }
    }

    fn selection(&self) -> Option<Range<usize>> {
        let (start, end) = self.cursor.selection_range()?;
        Some(self.byte_offset(start)..self.byte_offset(end))
    }
}

impl Widget for &TextSurface {
    fn render(self, area: Rect, buf: &mut RatatuiBuffer) {
        let inner = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let selection = self.cursor.selection_range();
        let pos = self.cursor.pos();
        let max_x = inner.x + inner.width;

        for (i, row) in (self.scroll_offset..self.lines.len()).enumerate().take(inner.height as usize) {
            let y = inner.y + i as u16;
            if row == pos.row {
                buf.set_style(Rect::new(inner.x, y, inner.width, 1), self.cursor_line_style);
            }

            let mut x = inner.x;
            for (col, ch) in self.lines[row].chars().enumerate().skip(self.h_scroll_offset) {
                let ch = if ch == '\t' { ' ' } else { ch };
                let width = ch.width().unwrap_or(0) as u16;
                if width == 0 {
                    continue;
                }
                if x + width > max_x {
                    break;
                }
                let here = Position::new(row, col);
                let style = if here == pos {
                    self.cursor_style
                } else if selection.map_or(false, |(s, e)| here >= s && here < e) {
                    self.selection_style
                } else {
                    Style::default()
                };
                buf.set_string(x, y, ch.to_string(), style);
                x += width;
            }

            if row == pos.row && pos.col >= self.line_len(row) && x < max_x {
                buf.set_string(x, y, " ", self.cursor_style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_round_trip_is_exact() {
        let html = "<h2>Title</h2>\n<p>Body</p>";
        let surface = TextSurface::from_html(html);
        assert_eq!(surface.line_count(), 2);
        assert_eq!(surface.get_html(), html);
    }

    #[test]
    fn test_insert_and_newline() {
        let mut surface = TextSurface::from_html("<p>ac</p>");
        surface.set_cursor(0, 4);
        surface.insert_char('b');
        assert_eq!(surface.get_html(), "<p>abc</p>");

        surface.insert_str("x\ny");
        assert_eq!(surface.lines(), &["<p>abx".to_string(), "yc</p>".to_string()]);
        assert_eq!(surface.cursor(), (1, 1));
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut surface = TextSurface::from_html("ab\ncd");
        surface.set_cursor(1, 0);
        surface.backspace();
        assert_eq!(surface.get_html(), "abcd");
        assert_eq!(surface.cursor(), (0, 2));
    }

    #[test]
    fn test_delete_forward_at_line_end() {
        let mut surface = TextSurface::from_html("ab\ncd");
        surface.set_cursor(0, 2);
        surface.delete_forward();
        assert_eq!(surface.get_html(), "abcd");
    }

    #[test]
    fn test_multibyte_editing() {
        let mut surface = TextSurface::from_html("héllo");
        surface.set_cursor(0, 2);
        surface.backspace();
        assert_eq!(surface.get_html(), "hllo");
    }

    #[test]
    fn test_bold_wraps_selection() {
        let mut surface = TextSurface::from_html("<p>Hello world</p>");
        surface.set_cursor(0, 9);
        surface.move_cursor(CursorMove::End, true);
        for _ in 0..4 {
            surface.move_cursor(CursorMove::Back, true);
        }
        assert_eq!(surface.selected_text().as_deref(), Some("world"));

        surface.exec(&FormatCommand::Bold);
        assert_eq!(surface.get_html(), "<p>Hello <b>world</b></p>");
    }

    #[test]
    fn test_italic_without_selection_places_cursor_inside() {
        let mut surface = TextSurface::from_html("");
        surface.exec(&FormatCommand::Italic);
        assert_eq!(surface.get_html(), "<i></i>");
        assert_eq!(surface.cursor(), (0, 3));
        surface.insert_char('x');
        assert_eq!(surface.get_html(), "<i>x</i>");
    }

    #[test]
    fn test_block_commands_replace_wrapper() {
        let mut surface = TextSurface::from_html("<p>Plan</p>");
        surface.exec(&FormatCommand::Heading(2));
        assert_eq!(surface.get_html(), "<h2>Plan</h2>");
        surface.exec(&FormatCommand::BulletList);
        assert_eq!(surface.get_html(), "<ul><li>Plan</li></ul>");
        surface.exec(&FormatCommand::Paragraph);
        assert_eq!(surface.get_html(), "<p>Plan</p>");
    }

    #[test]
    fn test_insert_text_is_escaped() {
        let mut surface = TextSurface::from_html("");
        surface.exec(&FormatCommand::InsertText("<b>hi</b> & bye".to_string()));
        assert_eq!(surface.get_html(), "&lt;b&gt;hi&lt;/b&gt; &amp; bye");
    }

    #[test]
    fn test_selection_byte_range() {
        let mut surface = TextSurface::from_html("<p>é</p>\n<p>tail</p>");
        surface.set_cursor(1, 3);
        surface.move_cursor(CursorMove::End, true);
        let range = surface.selection().expect("selection");
        let html = surface.get_html();
        assert_eq!(&html[range], "tail</p>");
    }

    #[test]
    fn test_select_all_covers_document() {
        let mut surface = TextSurface::from_html("a\nb");
        surface.select_all();
        assert_eq!(surface.selected_text().as_deref(), Some("a\nb"));
    }
}
