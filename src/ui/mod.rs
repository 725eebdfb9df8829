mod content;
mod dialogs;
mod editor;
mod sidebar;
mod status_bar;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Block,
    Frame,
};

use crate::app::{App, DialogState, Mode};

pub use content::render_content;
pub use dialogs::{
    render_ai_menu, render_delete_confirm_dialog, render_delete_folder_confirm_dialog, render_export_menu,
    render_help_dialog, render_rename_folder_dialog, render_settings_dialog,
};
pub use editor::render_editor;
pub use sidebar::{render_note_list, render_sidebar};
pub use status_bar::render_status_bar;

pub fn render(f: &mut Frame, app: &mut App) {
    f.render_widget(
        Block::default().style(Style::default().bg(app.theme.background).fg(app.theme.foreground)),
        f.area(),
    );

    // Create vertical layout: main area + status bar
    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Main area
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    // Folders and profile, note list, note content
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(18),
            Constraint::Percentage(27),
            Constraint::Percentage(55),
        ])
        .split(vertical_chunks[0]);

    render_sidebar(f, app, chunks[0]);
    render_note_list(f, app, chunks[1]);

    match app.mode {
        Mode::Normal => render_content(f, app, chunks[2]),
        Mode::Edit => render_editor(f, app, chunks[2]),
    }

    render_status_bar(f, app, vertical_chunks[1]);

    // Render dialogs on top
    match app.dialog {
        DialogState::Help => render_help_dialog(f, app),
        DialogState::DeleteConfirm => render_delete_confirm_dialog(f, app),
        DialogState::DeleteFolderConfirm => render_delete_folder_confirm_dialog(f, app),
        DialogState::RenameFolder => render_rename_folder_dialog(f, app),
        DialogState::Settings => render_settings_dialog(f, app),
        DialogState::AiMenu => render_ai_menu(f, app),
        DialogState::Export => render_export_menu(f, app),
        DialogState::None => {}
    }
}
