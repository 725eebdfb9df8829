use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::ai::TransformOp;
use crate::app::{App, ExportAction};
use crate::settings::SettingsField;
use crate::store::Plan;
use crate::theme::Theme;

/// Centered dialog area, clamped to the frame, with the background cleared.
fn dialog_area(f: &mut Frame, width: u16, height: u16) -> Rect {
    let area = f.area();
    let dialog_width = width.min(area.width.saturating_sub(4));
    let dialog_height = height.min(area.height.saturating_sub(2));

    let dialog_area = Rect {
        x: (area.width.saturating_sub(dialog_width)) / 2,
        y: (area.height.saturating_sub(dialog_height)) / 2,
        width: dialog_width,
        height: dialog_height,
    };
    f.render_widget(Clear, dialog_area);
    dialog_area
}

fn dialog_block(title: &str, theme: &Theme, color: ratatui::style::Color) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(theme.background))
}

fn hint(text: &str, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(theme.white).add_modifier(Modifier::ITALIC),
    ))
}

pub fn render_delete_confirm_dialog(f: &mut Frame, app: &App) {
    let area = dialog_area(f, 50, 9);
    let theme = &app.theme;

    let note_name = app
        .store
        .active_note()
        .map(|n| n.title.clone())
        .unwrap_or_else(|| "this note".to_string());

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Delete note?",
            Style::default().fg(theme.red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(note_name, Style::default().fg(theme.foreground))),
        Line::from(""),
        hint("y: Yes  |  n: No", theme),
    ];

    let dialog = Paragraph::new(content)
        .block(dialog_block("Confirm Delete", theme, theme.red))
        .alignment(Alignment::Center);
    f.render_widget(dialog, area);
}

pub fn render_delete_folder_confirm_dialog(f: &mut Frame, app: &App) {
    let area = dialog_area(f, 54, 10);
    let theme = &app.theme;

    let (folder_name, count) = app
        .selected_folder()
        .map(|folder| {
            (
                folder.name.clone(),
                app.store.notes_in_folder(&folder.id).count(),
            )
        })
        .unwrap_or_else(|| ("this folder".to_string(), 0));

    let detail = if app.store.folders().len() <= 1 {
        "The last folder cannot be deleted.".to_string()
    } else if count > 0 {
        format!("Its {} note(s) move to the first remaining folder.", count)
    } else {
        "The folder is empty.".to_string()
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Delete folder?",
            Style::default().fg(theme.red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(folder_name, Style::default().fg(theme.foreground))),
        Line::from(Span::styled(detail, Style::default().fg(theme.bright_black))),
        Line::from(""),
        hint("y: Yes  |  n: No", theme),
    ];

    let dialog = Paragraph::new(content)
        .block(dialog_block("Confirm Delete", theme, theme.red))
        .alignment(Alignment::Center);
    f.render_widget(dialog, area);
}

pub fn render_rename_folder_dialog(f: &mut Frame, app: &App) {
    let area = dialog_area(f, 50, 9);
    let theme = &app.theme;

    let content = vec![
        Line::from(""),
        Line::from(Span::styled("Folder name:", Style::default().fg(theme.foreground))),
        Line::from(""),
        Line::from(vec![
            Span::styled("> ", Style::default().fg(theme.yellow)),
            Span::styled(app.input_buffer.clone(), Style::default().fg(theme.foreground)),
            Span::styled("█", Style::default().fg(theme.yellow)),
        ]),
        Line::from(""),
        hint("Enter: Rename  |  Esc: Cancel", theme),
    ];

    let dialog = Paragraph::new(content)
        .block(dialog_block("Rename Folder", theme, theme.green))
        .alignment(Alignment::Center);
    f.render_widget(dialog, area);
}

pub fn render_settings_dialog(f: &mut Frame, app: &App) {
    let area = dialog_area(f, 60, 20);
    let theme = &app.theme;
    let Some(form) = app.settings_form.as_ref() else {
        return;
    };

    let label_style = Style::default().fg(theme.bright_black);
    let header_style = Style::default().fg(theme.bright_blue).add_modifier(Modifier::BOLD);

    let field_line = |label: &str, value: &str, field: SettingsField| {
        let active = form.field == field;
        let mut spans = vec![
            Span::styled(format!("  {:<7}", label), label_style),
            Span::styled(
                value.to_string(),
                Style::default().fg(theme.foreground).add_modifier(if active {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                }),
            ),
        ];
        if active {
            spans.push(Span::styled("█", Style::default().fg(theme.yellow)));
        }
        Line::from(spans)
    };

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled("  Profile", header_style)),
        field_line("Name", &form.name, SettingsField::Name),
        field_line("Email", &form.email, SettingsField::Email),
        Line::from(""),
        Line::from(Span::styled("  Plan", header_style)),
    ];

    for plan in [Plan::Spark, Plan::Creator, Plan::Zenith] {
        let current = plan == app.user.plan;
        let marker = if current { "● " } else { "○ " };
        let name_style = if current {
            Style::default().fg(theme.magenta).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.foreground)
        };
        content.push(Line::from(vec![
            Span::styled(format!("  {}", marker), Style::default().fg(theme.magenta)),
            Span::styled(format!("{:<8}", plan.name()), name_style),
            Span::styled(
                format!("{} {}", plan.price(), plan.price_period()),
                Style::default().fg(theme.bright_black),
            ),
        ]));
    }

    content.extend([
        Line::from(""),
        Line::from(Span::styled("  Appearance", header_style)),
        Line::from(vec![
            Span::styled("  Theme  ", label_style),
            Span::styled(theme.mode.to_string(), Style::default().fg(theme.foreground)),
            Span::styled("  (Ctrl+t to switch)", label_style),
        ]),
        Line::from(""),
        hint("  Tab: Next field  |  Enter: Save  |  Esc: Cancel", theme),
    ]);

    let dialog = Paragraph::new(content)
        .block(dialog_block("Settings", theme, theme.bright_blue))
        .alignment(Alignment::Left);
    f.render_widget(dialog, area);
}

fn menu_lines<'a>(labels: impl Iterator<Item = &'a str>, selected: usize, theme: &Theme) -> Vec<Line<'static>> {
    labels
        .enumerate()
        .map(|(i, label)| {
            let style = if i == selected {
                Style::default()
                    .fg(theme.black)
                    .bg(theme.yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.foreground)
            };
            Line::from(vec![
                Span::styled(format!("  {} ", i + 1), Style::default().fg(theme.yellow)),
                Span::styled(format!(" {} ", label), style),
            ])
        })
        .collect()
}

pub fn render_ai_menu(f: &mut Frame, app: &App) {
    let ops = TransformOp::all();
    let area = dialog_area(f, 44, ops.len() as u16 + 6);
    let theme = &app.theme;

    let target = if app.session.surface().has_selection() {
        "Apply to the selected text"
    } else {
        "Apply to the whole note"
    };

    let mut content = vec![
        Line::from(Span::styled(target, Style::default().fg(theme.bright_black))),
        Line::from(""),
    ];
    content.extend(menu_lines(ops.iter().map(|op| op.label()), app.menu_index, theme));
    content.push(Line::from(""));
    content.push(hint("Enter/1-3: Run  |  Esc: Cancel", theme));

    let dialog = Paragraph::new(content).block(dialog_block("✦ AI Assist", theme, theme.magenta));
    f.render_widget(dialog, area);
}

pub fn render_export_menu(f: &mut Frame, app: &App) {
    let actions = ExportAction::all();
    let area = dialog_area(f, 50, actions.len() as u16 + 6);
    let theme = &app.theme;

    let mut content = vec![
        Line::from(Span::styled(
            format!("Folder: {}", app.config.export_path().display()),
            Style::default().fg(theme.bright_black),
        )),
        Line::from(""),
    ];
    content.extend(menu_lines(actions.iter().map(|a| a.label()), app.menu_index, theme));
    content.push(Line::from(""));
    content.push(hint("Enter: Run  |  Esc: Cancel", theme));

    let dialog = Paragraph::new(content).block(dialog_block("Export & Share", theme, theme.green));
    f.render_widget(dialog, area);
}

pub fn render_help_dialog(f: &mut Frame, app: &App) {
    let area = dialog_area(f, 60, 40);
    let theme = &app.theme;

    let key_style = Style::default().fg(theme.yellow);
    let desc_style = Style::default().fg(theme.white);
    let header_style = Style::default().fg(theme.bright_blue).add_modifier(Modifier::BOLD);

    let section = |title: &str, keys: &[(&str, &str)]| -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(Span::styled(format!("  {}", title), header_style))];
        lines.extend(keys.iter().map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!("  {:<10}", key), key_style),
                Span::styled(desc.to_string(), desc_style),
            ])
        }));
        lines.push(Line::from(""));
        lines
    };

    let mut content = vec![Line::from("")];
    content.extend(section(
        "Navigation",
        &[
            ("j/k", "Move up/down in the focused pane"),
            ("Tab", "Switch focus (Folders/Notes/Content)"),
            ("Enter", "Open / edit"),
            ("/", "Search all notes"),
        ],
    ));
    content.extend(section(
        "Notes & Folders",
        &[
            ("n", "New note"),
            ("N", "New folder"),
            ("r", "Rename folder"),
            ("m", "Move note to next folder"),
            ("d", "Delete note (or folder when focused)"),
            ("e / t", "Edit body / title"),
        ],
    ));
    content.extend(section(
        "Editing",
        &[
            ("Alt+b/i/u/s", "Bold / italic / underline / strike"),
            ("Alt+2/3/p", "Heading 2 / heading 3 / paragraph"),
            ("Alt+l/n", "Bullet / numbered list"),
            ("Shift+Arrows", "Select text"),
            ("Ctrl+s", "Save now"),
            ("Esc", "Exit edit mode"),
        ],
    ));
    content.extend(section(
        "Other",
        &[
            ("a", "AI assist (summarize, rewrite, fix)"),
            ("x / s", "Export / copy share link"),
            ("T", "Toggle light/dark theme"),
            ("p", "Profile settings"),
            ("q", "Quit"),
        ],
    ));
    content.push(hint("Press Esc or ? to close", theme));

    let dialog = Paragraph::new(content)
        .block(dialog_block("Help", theme, theme.bright_blue))
        .alignment(Alignment::Left);
    f.render_widget(dialog, area);
}
