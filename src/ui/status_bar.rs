use std::time::Instant;

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, EditTarget, Focus, Mode};
use crate::editor::SaveState;

pub fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let now = Instant::now();

    let word_count = app.word_count();
    let reading_time = word_count.div_ceil(200);

    let mode_indicator = match app.mode {
        Mode::Normal if app.search_active => "SEARCH",
        Mode::Normal => match app.focus {
            Focus::Folders => "FOLDERS",
            Focus::Notes => "NOTES",
            Focus::Content => "CONTENT",
        },
        Mode::Edit => match app.edit_target {
            EditTarget::Title => "EDIT: TITLE",
            EditTarget::Body => "EDIT: BODY",
        },
    };

    let logo = Span::styled(
        " ◆ FocusX ",
        Style::default()
            .fg(theme.black)
            .bg(theme.accent())
            .add_modifier(Modifier::BOLD),
    );

    let mode = Span::styled(
        format!(" {} ", mode_indicator),
        Style::default().fg(theme.black).bg(theme.yellow),
    );

    let save_badge = if app.is_saved_visible(now) {
        Span::styled(" ✓ Saved ", Style::default().fg(theme.green).add_modifier(Modifier::BOLD))
    } else if app.session.state() == SaveState::Dirty {
        Span::styled(" ● Editing ", Style::default().fg(theme.yellow))
    } else {
        Span::raw("")
    };

    let message = match &app.status {
        Some(status) => Span::styled(format!(" {} ", status.text), Style::default().fg(theme.foreground)),
        None => Span::raw(""),
    };

    let separator = Span::styled(" │ ", Style::default().fg(theme.bright_black));

    let reading = Span::styled(
        format!("{} words ~{}min", word_count, reading_time),
        Style::default().fg(theme.green),
    );

    let theme_label = Span::styled(
        format!(" {} ", theme.mode),
        Style::default().fg(theme.black).bg(theme.magenta),
    );

    let help_key = Span::styled(
        " ? for help ",
        Style::default().fg(theme.white).bg(theme.bright_black),
    );

    // Calculate spacing for justify-between layout
    let left_content = vec![logo, Span::raw(" "), mode, save_badge, message];
    let right_content = vec![reading, separator, theme_label, Span::raw(" "), help_key];

    let left_width: usize = left_content.iter().map(|s| s.content.width()).sum();
    let right_width: usize = right_content.iter().map(|s| s.content.width()).sum();
    let padding = (area.width as usize).saturating_sub(left_width + right_width);

    let mut spans = left_content;
    spans.push(Span::raw(" ".repeat(padding)));
    spans.extend(right_content);

    let status_bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.background));
    f.render_widget(status_bar, area);
}
