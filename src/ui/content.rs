use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus, Mode};
use crate::html::{self, Token};
use crate::theme::Theme;

pub fn render_content(f: &mut Frame, app: &mut App, area: Rect) {
    let is_focused = app.focus == Focus::Content && app.mode == Mode::Normal;
    let theme = &app.theme;

    let border_style = if is_focused {
        Style::default().fg(theme.bright_blue)
    } else {
        Style::default().fg(theme.bright_black)
    };

    let Some(note) = app.store.active_note() else {
        let placeholder = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "Select a note or press n to create one",
                Style::default().fg(theme.bright_black).add_modifier(Modifier::ITALIC),
            )),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title(" Content ")
                .borders(Borders::ALL)
                .border_style(border_style),
        );
        f.render_widget(placeholder, area);
        return;
    };

    let block = Block::default()
        .title(format!(" {} ", note.title))
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let footer = ai_footer(app);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(footer.len() as u16),
        ])
        .split(inner_area);

    // The view shows the session's draft so unsaved edits are never hidden.
    let lines = html_to_lines(app.session.content(), theme);
    let max_scroll = lines.len().saturating_sub(1);
    if app.content_scroll > max_scroll {
        app.content_scroll = max_scroll;
    }

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.content_scroll as u16, 0));
    f.render_widget(body, chunks[0]);

    if !footer.is_empty() {
        f.render_widget(Paragraph::new(footer).wrap(Wrap { trim: true }), chunks[1]);
    }
}

/// Inline status under the note body: progress or the last transform failure.
pub fn ai_footer(app: &App) -> Vec<Line<'static>> {
    let theme = &app.theme;
    if app.is_thinking() {
        let label = app
            .transforms
            .pending_op()
            .map(|op| op.label())
            .unwrap_or("AI");
        return vec![Line::from(vec![
            Span::styled(" ✦ ", Style::default().fg(theme.magenta)),
            Span::styled(
                format!("{}: Thinking...", label),
                Style::default().fg(theme.magenta).add_modifier(Modifier::ITALIC),
            ),
        ])];
    }
    match &app.ai_error {
        Some(error) => vec![Line::from(vec![
            Span::styled(" ✖ ", Style::default().fg(theme.red)),
            Span::styled(error.clone(), Style::default().fg(theme.red)),
            Span::styled("  (Esc to dismiss)", Style::default().fg(theme.bright_black)),
        ])],
        None => Vec::new(),
    }
}

#[derive(Default, Clone, Copy)]
struct Inline {
    bold: usize,
    italic: usize,
    underline: usize,
    strike: usize,
}

enum ListKind {
    Bullet,
    Numbered(usize),
}

/// Render note HTML as styled terminal lines.
pub fn html_to_lines(content: &str, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut inline = Inline::default();
    let mut heading: Option<u8> = None;
    let mut lists: Vec<ListKind> = Vec::new();

    let flush = |current: &mut Vec<Span<'static>>, lines: &mut Vec<Line<'static>>| {
        if !current.is_empty() {
            lines.push(Line::from(std::mem::take(current)));
        }
    };

    for token in html::visible_tokens(content) {
        match token {
            Token::Text(text) => {
                let text = html::decode_entities(text).replace('\n', " ");
                if text.trim().is_empty() && current.is_empty() {
                    continue;
                }
                let mut style = Style::default().fg(theme.foreground);
                if let Some(level) = heading {
                    style = style.fg(heading_color(level, theme)).add_modifier(Modifier::BOLD);
                }
                if inline.bold > 0 {
                    style = style.add_modifier(Modifier::BOLD);
                }
                if inline.italic > 0 {
                    style = style.add_modifier(Modifier::ITALIC);
                }
                if inline.underline > 0 {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                if inline.strike > 0 {
                    style = style.add_modifier(Modifier::CROSSED_OUT);
                }
                current.push(Span::styled(text, style));
            }
            Token::Tag(tag) => {
                let delta = |count: &mut usize| {
                    if tag.closing {
                        *count = count.saturating_sub(1);
                    } else {
                        *count += 1;
                    }
                };
                match tag.name.as_str() {
                    "b" | "strong" => delta(&mut inline.bold),
                    "i" | "em" => delta(&mut inline.italic),
                    "u" => delta(&mut inline.underline),
                    "s" | "strike" | "del" => delta(&mut inline.strike),
                    "br" => {
                        flush(&mut current, &mut lines);
                    }
                    "ul" if !tag.closing => lists.push(ListKind::Bullet),
                    "ol" if !tag.closing => lists.push(ListKind::Numbered(0)),
                    "ul" | "ol" => {
                        lists.pop();
                        flush(&mut current, &mut lines);
                    }
                    "li" if !tag.closing => {
                        flush(&mut current, &mut lines);
                        let indent = "  ".repeat(lists.len().saturating_sub(1));
                        let marker = match lists.last_mut() {
                            Some(ListKind::Numbered(n)) => {
                                *n += 1;
                                format!("{}{}. ", indent, n)
                            }
                            _ => format!("{}• ", indent),
                        };
                        current.push(Span::styled(marker, Style::default().fg(theme.cyan)));
                    }
                    "iframe" if !tag.closing => {
                        flush(&mut current, &mut lines);
                        let src = tag.attr("src").unwrap_or_default();
                        lines.push(Line::from(vec![
                            Span::styled("▶ ", Style::default().fg(theme.red)),
                            Span::styled(
                                format!("Video: {}", src),
                                Style::default().fg(theme.cyan).add_modifier(Modifier::UNDERLINED),
                            ),
                        ]));
                    }
                    _ => {
                        if let Some(level) = tag.is_heading() {
                            flush(&mut current, &mut lines);
                            heading = if tag.closing { None } else { Some(level) };
                            if tag.closing {
                                lines.push(Line::default());
                            }
                        } else if tag.closing && matches!(tag.name.as_str(), "p" | "div" | "li") {
                            flush(&mut current, &mut lines);
                            if tag.name == "p" {
                                lines.push(Line::default());
                            }
                        }
                    }
                }
            }
        }
    }
    flush(&mut current, &mut lines);

    while lines.last().is_some_and(|l| l.spans.is_empty()) {
        lines.pop();
    }
    lines
}

fn heading_color(level: u8, theme: &Theme) -> ratatui::style::Color {
    match level {
        1 => theme.bright_blue,
        2 => theme.blue,
        3 => theme.cyan,
        _ => theme.green,
    }
}
