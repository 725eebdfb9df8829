use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::ai::TransformOp;
use crate::app::{App, DialogState, EditTarget, ExportAction, Focus, Mode};
use crate::editor::{CursorMove, FormatCommand};
use crate::ui;

/// Upper bound on idle blocking, so a stalled timer can never freeze the UI.
const MAX_IDLE_WAIT: Duration = Duration::from_secs(1);

pub fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    let mut needs_render = true;

    loop {
        if app.tick(Instant::now()) {
            needs_render = true;
        }

        if needs_render {
            terminal.draw(|f| ui::render(f, app))?;
            needs_render = false;
        }

        let timeout = app
            .poll_timeout(Instant::now())
            .unwrap_or(MAX_IDLE_WAIT)
            .min(MAX_IDLE_WAIT);

        if event::poll(timeout)? && process_events(app, &mut needs_render)? {
            app.shutdown(Instant::now());
            return Ok(());
        }
    }
}

// Drain queued events in one batch so a fast typist does not wait on redraws.
fn process_events(app: &mut App, needs_render: &mut bool) -> io::Result<bool> {
    const MAX_EVENTS_PER_BATCH: u8 = 8;
    let mut count = 0u8;

    loop {
        let event = event::read()?;
        count += 1;
        *needs_render = true;

        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if handle_key_event(app, key) {
                    return Ok(true);
                }
            }
            Event::Paste(text) => handle_paste_event(app, &text),
            _ => {}
        }

        if count >= MAX_EVENTS_PER_BATCH || !event::poll(Duration::ZERO)? {
            break;
        }
    }

    Ok(false)
}

fn handle_paste_event(app: &mut App, text: &str) {
    let now = Instant::now();
    match app.dialog {
        DialogState::Settings => {
            if let Some(form) = app.settings_form.as_mut() {
                form.insert_str(text);
            }
            return;
        }
        DialogState::RenameFolder => {
            app.input_buffer.push_str(text.lines().next().unwrap_or_default());
            return;
        }
        DialogState::None => {}
        _ => return,
    }

    if app.search_active {
        app.search_query.push_str(text.lines().next().unwrap_or_default());
        app.update_search(now);
        return;
    }

    if app.mode != Mode::Edit {
        return;
    }
    match app.edit_target {
        EditTarget::Title => {
            let line = text.lines().next().unwrap_or_default().to_string();
            app.session.edit_title(now, |title| title.push_str(&line));
        }
        EditTarget::Body => app.session.paste(now, text),
    }
}

/// Returns true when the app should quit.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> bool {
    match app.dialog {
        DialogState::Help => {
            handle_help_dialog(app, key);
            return false;
        }
        DialogState::DeleteConfirm => {
            handle_delete_confirm_dialog(app, key);
            return false;
        }
        DialogState::DeleteFolderConfirm => {
            handle_delete_folder_confirm_dialog(app, key);
            return false;
        }
        DialogState::RenameFolder => {
            handle_rename_folder_dialog(app, key);
            return false;
        }
        DialogState::Settings => {
            handle_settings_dialog(app, key);
            return false;
        }
        DialogState::AiMenu => {
            handle_ai_menu(app, key);
            return false;
        }
        DialogState::Export => {
            handle_export_menu(app, key);
            return false;
        }
        DialogState::None => {}
    }

    if app.search_active {
        handle_search_input(app, key);
        return false;
    }

    match app.mode {
        Mode::Normal => handle_normal_mode(app, key),
        Mode::Edit => {
            handle_edit_mode(app, key);
            false
        }
    }
}

fn handle_help_dialog(app: &mut App, key: KeyEvent) {
    if matches!(
        key.code,
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('?')
    ) {
        app.dialog = DialogState::None;
    }
}

fn handle_delete_confirm_dialog(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.delete_active_note(Instant::now());
            app.dialog = DialogState::None;
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.dialog = DialogState::None;
        }
        _ => {}
    }
}

fn handle_delete_folder_confirm_dialog(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.delete_selected_folder(Instant::now());
            app.dialog = DialogState::None;
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.dialog = DialogState::None;
        }
        _ => {}
    }
}

fn handle_rename_folder_dialog(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            let new_name = app.input_buffer.clone();
            if app.rename_selected_folder(&new_name) {
                app.input_buffer.clear();
                app.dialog = DialogState::None;
            }
        }
        KeyCode::Esc => {
            app.input_buffer.clear();
            app.dialog = DialogState::None;
        }
        KeyCode::Char(c) => app.input_buffer.push(c),
        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        _ => {}
    }
}

fn handle_settings_dialog(app: &mut App, key: KeyEvent) {
    let now = Instant::now();
    if key.code == KeyCode::Char('t') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.toggle_theme(now);
        return;
    }
    match key.code {
        KeyCode::Esc => app.cancel_settings(),
        KeyCode::Enter => app.save_settings(now),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            if let Some(form) = app.settings_form.as_mut() {
                form.next_field();
            }
        }
        KeyCode::Backspace => {
            if let Some(form) = app.settings_form.as_mut() {
                form.backspace();
            }
        }
        KeyCode::Char(c) => {
            if let Some(form) = app.settings_form.as_mut() {
                form.insert_char(c);
            }
        }
        _ => {}
    }
}

fn handle_ai_menu(app: &mut App, key: KeyEvent) {
    let ops = TransformOp::all();
    let chosen = match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            app.dialog = DialogState::None;
            return;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.menu_index = (app.menu_index + 1) % ops.len();
            return;
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.menu_index = (app.menu_index + ops.len() - 1) % ops.len();
            return;
        }
        KeyCode::Char(c @ '1'..='3') => ops.get(c as usize - '1' as usize).copied(),
        KeyCode::Enter => ops.get(app.menu_index).copied(),
        _ => None,
    };

    if let Some(op) = chosen {
        app.dialog = DialogState::None;
        app.request_transform(op, Instant::now());
    }
}

fn handle_export_menu(app: &mut App, key: KeyEvent) {
    let actions = ExportAction::all();
    let chosen = match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            app.dialog = DialogState::None;
            return;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.menu_index = (app.menu_index + 1) % actions.len();
            return;
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.menu_index = (app.menu_index + actions.len() - 1) % actions.len();
            return;
        }
        KeyCode::Enter => actions.get(app.menu_index).copied(),
        _ => None,
    };

    if let Some(action) = chosen {
        app.dialog = DialogState::None;
        app.run_export_action(action, Instant::now());
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    let now = Instant::now();
    match key.code {
        KeyCode::Esc => app.clear_search(),
        KeyCode::Enter => {
            app.search_active = false;
            app.focus = Focus::Notes;
        }
        KeyCode::Down => app.next_note(now),
        KeyCode::Up => app.previous_note(now),
        KeyCode::Backspace => {
            app.search_query.pop();
            app.update_search(now);
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
            app.update_search(now);
        }
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) -> bool {
    let now = Instant::now();

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Char('?') => app.dialog = DialogState::Help,
        KeyCode::Tab => app.toggle_focus(false),
        KeyCode::BackTab => app.toggle_focus(true),
        KeyCode::Esc => {
            if app.ai_error.is_some() {
                app.dismiss_ai_error();
            } else if !app.search_query.is_empty() {
                app.clear_search();
            }
        }
        KeyCode::Down | KeyCode::Char('j') => match app.focus {
            Focus::Folders => app.next_folder(),
            Focus::Notes => app.next_note(now),
            Focus::Content => app.content_scroll = app.content_scroll.saturating_add(1),
        },
        KeyCode::Up | KeyCode::Char('k') => match app.focus {
            Focus::Folders => app.previous_folder(),
            Focus::Notes => app.previous_note(now),
            Focus::Content => app.content_scroll = app.content_scroll.saturating_sub(1),
        },
        KeyCode::Enter => match app.focus {
            Focus::Folders => app.focus = Focus::Notes,
            Focus::Notes => {
                if app.note_state.selected().is_none() {
                    app.next_note(now);
                }
                app.focus = Focus::Content;
            }
            Focus::Content => app.enter_edit_mode(EditTarget::Body),
        },
        KeyCode::Char('n') => app.new_note(now),
        KeyCode::Char('N') => app.create_folder(now),
        KeyCode::Char('r') => app.start_rename_folder(),
        KeyCode::Char('m') => app.move_active_note(now),
        KeyCode::Char('d') => {
            if app.focus == Focus::Folders {
                app.dialog = DialogState::DeleteFolderConfirm;
            } else if app.store.active_note().is_some() {
                app.dialog = DialogState::DeleteConfirm;
            }
        }
        KeyCode::Char('e') | KeyCode::Char('i') => app.enter_edit_mode(EditTarget::Body),
        KeyCode::Char('t') => app.enter_edit_mode(EditTarget::Title),
        KeyCode::Char('/') => app.start_search(),
        KeyCode::Char('a') => app.open_ai_menu(now),
        KeyCode::Char('x') => app.open_export_menu(now),
        KeyCode::Char('s') => app.share_active(now),
        KeyCode::Char('T') => app.toggle_theme(now),
        KeyCode::Char('p') | KeyCode::Char(',') => app.open_settings(),
        _ => {}
    }
    false
}

fn handle_edit_mode(app: &mut App, key: KeyEvent) {
    let now = Instant::now();
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Esc => {
            app.exit_edit_mode();
            return;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.edit_target = match app.edit_target {
                EditTarget::Title => EditTarget::Body,
                EditTarget::Body => EditTarget::Title,
            };
            return;
        }
        KeyCode::Char('s') if ctrl => {
            app.save_now(now);
            return;
        }
        KeyCode::Char('a') if alt => {
            app.open_ai_menu(now);
            return;
        }
        _ => {}
    }

    match app.edit_target {
        EditTarget::Title => handle_title_input(app, key, now),
        EditTarget::Body => handle_body_input(app, key, now, ctrl, alt),
    }
}

fn handle_title_input(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Enter | KeyCode::Down => app.edit_target = EditTarget::Body,
        KeyCode::Backspace => app.session.edit_title(now, |title| {
            title.pop();
        }),
        KeyCode::Char(c) => app.session.edit_title(now, |title| title.push(c)),
        _ => {}
    }
}

fn format_command_for(c: char) -> Option<FormatCommand> {
    match c {
        'b' => Some(FormatCommand::Bold),
        'i' => Some(FormatCommand::Italic),
        'u' => Some(FormatCommand::Underline),
        's' => Some(FormatCommand::Strikethrough),
        '2' => Some(FormatCommand::Heading(2)),
        '3' => Some(FormatCommand::Heading(3)),
        'p' => Some(FormatCommand::Paragraph),
        'l' => Some(FormatCommand::BulletList),
        'n' => Some(FormatCommand::NumberedList),
        _ => None,
    }
}

fn handle_body_input(app: &mut App, key: KeyEvent, now: Instant, ctrl: bool, alt: bool) {
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    let movement = match key.code {
        KeyCode::Left if ctrl => Some(CursorMove::WordBack),
        KeyCode::Right if ctrl => Some(CursorMove::WordForward),
        KeyCode::Home if ctrl => Some(CursorMove::Top),
        KeyCode::End if ctrl => Some(CursorMove::Bottom),
        KeyCode::Left => Some(CursorMove::Back),
        KeyCode::Right => Some(CursorMove::Forward),
        KeyCode::Up => Some(CursorMove::Up),
        KeyCode::Down => Some(CursorMove::Down),
        KeyCode::Home => Some(CursorMove::Head),
        KeyCode::End => Some(CursorMove::End),
        _ => None,
    };
    if let Some(movement) = movement {
        app.session.navigate(|s| s.move_cursor(movement, shift));
        return;
    }

    match key.code {
        KeyCode::Char(c) if alt => {
            if let Some(command) = format_command_for(c) {
                app.session.exec(now, &command);
            }
        }
        KeyCode::Char('a') if ctrl => app.session.navigate(|s| s.select_all()),
        KeyCode::Char('c') if ctrl => {
            if let Some(text) = app.session.surface().selected_text() {
                if let Err(e) = crate::export::copy_to_clipboard(&text) {
                    app.set_status(e.to_string(), now);
                }
            }
        }
        KeyCode::Char(c) if !ctrl => app.session.edit_content(now, |s| s.insert_char(c)),
        KeyCode::Enter => app.session.edit_content(now, |s| s.newline()),
        KeyCode::Backspace => app.session.edit_content(now, |s| s.backspace()),
        KeyCode::Delete => app.session.edit_content(now, |s| s.delete_forward()),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::TransformManager;
    use crate::config::Config;

    fn app() -> App {
        App::with_transforms(Config::default(), None, TransformManager::new(None))
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn press_with(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
        handle_key_event(app, KeyEvent::new(code, modifiers))
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_quit_from_normal_mode() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn test_new_note_title_then_body() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.mode, Mode::Edit);

        type_str(&mut app, "Plan");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.edit_target, EditTarget::Body);
        assert_eq!(app.session.title(), "Plan");

        press_with(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(app.store.active_note().map(|n| n.title.as_str()), Some("Plan"));

        // 'q' types in edit mode instead of quitting.
        assert!(!press(&mut app, KeyCode::Char('q')));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn test_alt_b_bolds_selection() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Tab);
        press_with(&mut app, KeyCode::Char('a'), KeyModifiers::CONTROL);
        press(&mut app, KeyCode::Backspace);
        type_str(&mut app, "word");
        press_with(&mut app, KeyCode::Left, KeyModifiers::SHIFT);
        press_with(&mut app, KeyCode::Left, KeyModifiers::SHIFT);
        press_with(&mut app, KeyCode::Char('b'), KeyModifiers::ALT);
        assert_eq!(app.session.content(), "wo<b>rd</b>");
    }

    #[test]
    fn test_paste_in_body_embeds_video() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Tab);
        handle_paste_event(&mut app, "https://youtu.be/dQw4w9WgXcQ");
        assert!(app.session.content().contains("data-video-id=\"dQw4w9WgXcQ\""));
    }

    #[test]
    fn test_paste_in_title_keeps_first_line() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        handle_paste_event(&mut app, "Line one\nLine two");
        assert_eq!(app.session.title(), "Line one");
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.dialog, DialogState::DeleteConfirm);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.store.notes().len(), 1);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.store.notes().is_empty());
        assert!(app.store.active_id().is_none());
    }

    #[test]
    fn test_ai_menu_without_key_shows_error() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.dialog, DialogState::AiMenu);
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.dialog, DialogState::None);
        assert_eq!(app.ai_error.as_deref(), Some("API key is not configured."));

        press(&mut app, KeyCode::Esc);
        assert!(app.ai_error.is_none());
    }

    #[test]
    fn test_settings_dialog_edits_draft() {
        let mut app = app();
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.dialog, DialogState::Settings);
        type_str(&mut app, "ia");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.user.name, "Alex");

        press(&mut app, KeyCode::Char('p'));
        type_str(&mut app, "ia");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.user.name, "Alexia");
    }

    #[test]
    fn test_search_filters_and_escape_clears() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "Recipes");
        press_with(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL);
        press(&mut app, KeyCode::Esc);

        press(&mut app, KeyCode::Char('/'));
        assert!(app.search_active);
        type_str(&mut app, "zzz");
        assert!(app.visible_notes().is_empty());
        press(&mut app, KeyCode::Esc);
        assert!(!app.search_active);
        assert_eq!(app.visible_notes().len(), 1);
    }
}
