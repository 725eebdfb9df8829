use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, Focus, Mode};

pub fn render_sidebar(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(5)])
        .split(area);

    render_folders(f, app, chunks[0]);
    render_profile(f, app, chunks[1]);
}

fn render_folders(f: &mut Frame, app: &mut App, area: Rect) {
    let theme = &app.theme;

    let items: Vec<ListItem> = app
        .store
        .folders()
        .iter()
        .map(|folder| {
            let count = app.store.notes_in_folder(&folder.id).count();
            ListItem::new(Line::from(vec![
                Span::styled("▸ ", Style::default().fg(theme.cyan)),
                Span::styled(folder.name.clone(), Style::default().fg(theme.foreground)),
                Span::styled(format!(" ({})", count), Style::default().fg(theme.bright_black)),
            ]))
        })
        .collect();

    let border_style = if app.focus == Focus::Folders && app.mode == Mode::Normal {
        Style::default().fg(theme.bright_blue)
    } else {
        Style::default().fg(theme.bright_black)
    };

    let list = List::new(items)
        .block(
            Block::default()
                .title(" Folders ")
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .highlight_style(
            Style::default()
                .bg(theme.bright_black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("");

    f.render_stateful_widget(list, area, &mut app.folder_state);
}

fn render_profile(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let user = &app.user;

    let content = vec![
        Line::from(vec![
            Span::styled(
                format!(" {} ", user.initial()),
                Style::default()
                    .fg(theme.black)
                    .bg(theme.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(user.name.clone(), Style::default().fg(theme.foreground).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(Span::styled(user.email.clone(), Style::default().fg(theme.bright_black))),
        Line::from(vec![
            Span::styled(format!("{} plan", user.plan.name()), Style::default().fg(theme.magenta)),
            Span::styled("  p: settings", Style::default().fg(theme.bright_black)),
        ]),
    ];

    let profile = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.bright_black)),
    );
    f.render_widget(profile, area);
}

pub fn render_note_list(f: &mut Frame, app: &mut App, area: Rect) {
    let (search_area, list_area) = if app.search_active || !app.search_query.is_empty() {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);
        (Some(chunks[0]), chunks[1])
    } else {
        (None, area)
    };

    let now = Utc::now();
    let theme = app.theme.clone();
    let notes = app.visible_notes();
    let has_query = !app.search_query.trim().is_empty();

    if let Some(search_area) = search_area {
        let border_color = if has_query && notes.is_empty() {
            theme.red
        } else if has_query {
            theme.green
        } else {
            theme.yellow
        };

        let mut spans = vec![
            Span::styled("/", Style::default().fg(theme.white)),
            Span::styled(app.search_query.clone(), Style::default().fg(theme.foreground)),
        ];
        if app.search_active {
            spans.push(Span::styled("_", Style::default().fg(border_color)));
        }

        let search = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color))
                .title(" Search "),
        );
        f.render_widget(search, search_area);
    }

    let width = list_area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = notes
        .iter()
        .map(|item| {
            let when = relative_time(item.note.updated_at, now);
            let title_width = width.saturating_sub(when.chars().count() + 1);
            let title: String = item.note.title.chars().take(title_width).collect();
            let padding = width.saturating_sub(title.chars().count() + when.chars().count());
            let snippet: String = item.snippet.chars().take(width).collect();

            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(title, Style::default().fg(theme.foreground).add_modifier(Modifier::BOLD)),
                    Span::raw(" ".repeat(padding)),
                    Span::styled(when, Style::default().fg(theme.bright_black)),
                ]),
                Line::from(Span::styled(snippet, Style::default().fg(theme.bright_black))),
            ])
        })
        .collect();
    drop(notes);

    let title = if has_query {
        format!(" Found {}/{} ", items.len(), app.store.notes().len())
    } else {
        let folder = app.selected_folder().map(|f| f.name.as_str()).unwrap_or("Notes");
        format!(" {} ({}) ", folder, items.len())
    };

    let border_style = if app.focus == Focus::Notes && app.mode == Mode::Normal {
        Style::default().fg(theme.bright_blue)
    } else {
        Style::default().fg(theme.bright_black)
    };

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .highlight_style(Style::default().bg(theme.bright_black))
        .highlight_symbol("");

    f.render_stateful_widget(list, list_area, &mut app.note_state);
}

/// Short "time ago" label for the note list.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if elapsed.num_hours() < 24 {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed.num_days() < 7 {
        format!("{}d ago", elapsed.num_days())
    } else {
        then.format("%b %-d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_relative_time_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
        assert_eq!(relative_time(now, now), "just now");
        assert_eq!(relative_time(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(relative_time(now - Duration::hours(3), now), "3h ago");
        assert_eq!(relative_time(now - Duration::days(2), now), "2d ago");
        assert_eq!(relative_time(now - Duration::days(30), now), "Apr 20");
    }

    #[test]
    fn test_future_timestamps_read_as_now() {
        let now = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
        assert_eq!(relative_time(now + Duration::minutes(10), now), "just now");
    }
}
