use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::content::ai_footer;
use crate::app::{App, EditTarget};

pub fn render_editor(f: &mut Frame, app: &mut App, area: Rect) {
    let footer = ai_footer(app);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(footer.len() as u16),
        ])
        .split(area);

    render_title_input(f, app, chunks[0]);

    // Store editor area for view size bookkeeping
    app.editor_area = chunks[1];
    let inner_width = chunks[1].width.saturating_sub(2) as usize;
    let inner_height = chunks[1].height.saturating_sub(2) as usize;

    let theme = app.theme.clone();
    let body_active = app.edit_target == EditTarget::Body;
    let border_color = if body_active { theme.yellow } else { theme.bright_black };
    let block = Block::default()
        .title(" Body (Alt+b/i/u/s format, Alt+a AI) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    app.session.navigate(|surface| {
        surface.set_view_size(inner_width, inner_height);
        surface.set_block(block);
    });
    f.render_widget(app.session.surface(), chunks[1]);

    if !footer.is_empty() {
        f.render_widget(Paragraph::new(footer).wrap(Wrap { trim: true }), chunks[2]);
    }
}

fn render_title_input(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let active = app.edit_target == EditTarget::Title;

    let mut spans = vec![Span::styled(
        app.session.title().to_string(),
        Style::default().fg(theme.foreground).add_modifier(Modifier::BOLD),
    )];
    if active {
        spans.push(Span::styled("_", Style::default().fg(theme.yellow)));
    } else if app.session.title().is_empty() {
        spans.push(Span::styled(
            "Untitled",
            Style::default().fg(theme.bright_black).add_modifier(Modifier::ITALIC),
        ));
    }

    let border_color = if active { theme.yellow } else { theme.bright_black };
    let title = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(" Title ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color)),
    );
    f.render_widget(title, area);
}
