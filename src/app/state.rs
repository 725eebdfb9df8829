use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::{layout::Rect, style::Style, widgets::ListState};

use crate::ai::{TransformManager, TransformOp};
use crate::config::Config;
use crate::editor::{EditorSession, RichTextSurface, TextSurface};
use crate::export::{self, ExportFormat};
use crate::settings::SettingsForm;
use crate::store::{Folder, FolderId, NoteId, NoteSnippet, NoteStore, User};
use crate::theme::Theme;

const STATUS_DURATION: Duration = Duration::from_secs(4);
const TRANSFORM_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    Normal,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditTarget {
    Title,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DialogState {
    None,
    Help,
    DeleteConfirm,
    DeleteFolderConfirm,
    RenameFolder,
    Settings,
    AiMenu,
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Focus {
    Folders,
    Notes,
    Content,
}

/// Entries of the export dialog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExportAction {
    File(ExportFormat),
    ShareLink,
}

impl ExportAction {
    pub fn all() -> [ExportAction; 3] {
        [
            ExportAction::File(ExportFormat::PlainText),
            ExportAction::File(ExportFormat::Markdown),
            ExportAction::ShareLink,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportAction::File(format) => format.label(),
            ExportAction::ShareLink => "Copy share link",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub until: Instant,
}

pub struct App {
    pub store: NoteStore,
    pub session: EditorSession<TextSurface>,
    pub transforms: TransformManager,
    pub config: Config,
    /// Where config changes (theme, profile) are written. `None` keeps them in memory.
    pub config_path: Option<PathBuf>,
    pub theme: Theme,
    pub user: User,
    pub focus: Focus,
    pub mode: Mode,
    pub edit_target: EditTarget,
    pub dialog: DialogState,
    pub folder_state: ListState,
    pub note_state: ListState,
    pub search_active: bool,
    pub search_query: String,
    pub input_buffer: String,
    pub settings_form: Option<SettingsForm>,
    pub menu_index: usize,
    pub ai_error: Option<String>,
    pub status: Option<StatusMessage>,
    pub content_scroll: usize,
    pub editor_area: Rect,
}

impl App {
    pub fn new(config: Config, config_path: Option<PathBuf>) -> Self {
        let transforms = TransformManager::from_config(&config.ai);
        Self::with_transforms(config, config_path, transforms)
    }

    pub fn with_transforms(
        config: Config,
        config_path: Option<PathBuf>,
        transforms: TransformManager,
    ) -> Self {
        let theme = Theme::for_mode(config.theme);
        let user = config.user.to_user();
        let session = EditorSession::new(
            TextSurface::default(),
            config.editor.debounce(),
            config.editor.saved_indicator(),
        );

        let mut folder_state = ListState::default();
        folder_state.select(Some(0));

        let mut app = Self {
            store: NoteStore::new(),
            session,
            transforms,
            config,
            config_path,
            theme,
            user,
            focus: Focus::Notes,
            mode: Mode::Normal,
            edit_target: EditTarget::Body,
            dialog: DialogState::None,
            folder_state,
            note_state: ListState::default(),
            search_active: false,
            search_query: String::new(),
            input_buffer: String::new(),
            settings_form: None,
            menu_index: 0,
            ai_error: None,
            status: None,
            content_scroll: 0,
            editor_area: Rect::default(),
        };
        app.apply_surface_styles();
        app
    }

    fn apply_surface_styles(&mut self) {
        let theme = self.theme.clone();
        self.session.navigate(|surface| {
            surface.set_cursor_line_style(Style::default());
            surface.set_selection_style(
                Style::default().fg(theme.selection_text).bg(theme.selection_bg),
            );
            surface.set_cursor_style(Style::default().fg(theme.cursor_text).bg(theme.cursor));
        });
    }

    pub fn set_status(&mut self, text: impl Into<String>, now: Instant) {
        self.status = Some(StatusMessage {
            text: text.into(),
            until: now + STATUS_DURATION,
        });
    }

    fn persist_config(&mut self, now: Instant) {
        let Some(path) = self.config_path.clone() else {
            return;
        };
        if let Err(e) = self.config.save_to(&path) {
            log::error!("Failed to save config {}: {}", path.display(), e);
            self.set_status(format!("Could not save settings: {}", e), now);
        }
    }

    // ==================== Folders ====================

    pub fn selected_folder(&self) -> Option<&Folder> {
        let folders = self.store.folders();
        let index = self.folder_state.selected().unwrap_or(0);
        folders.get(index).or_else(|| folders.first())
    }

    pub fn selected_folder_id(&self) -> Option<FolderId> {
        self.selected_folder().map(|f| f.id.clone())
    }

    pub fn next_folder(&mut self) {
        let len = self.store.folders().len();
        if len == 0 {
            return;
        }
        let i = self.folder_state.selected().map_or(0, |i| (i + 1) % len);
        self.folder_state.select(Some(i));
        self.note_state.select(None);
    }

    pub fn previous_folder(&mut self) {
        let len = self.store.folders().len();
        if len == 0 {
            return;
        }
        let i = self
            .folder_state
            .selected()
            .map_or(0, |i| if i == 0 { len - 1 } else { i - 1 });
        self.folder_state.select(Some(i));
        self.note_state.select(None);
    }

    pub fn create_folder(&mut self, now: Instant) {
        let name = self.store.create_folder().name.clone();
        let index = self.store.folders().len() - 1;
        self.folder_state.select(Some(index));
        self.note_state.select(None);
        self.focus = Focus::Folders;
        self.set_status(format!("Created folder \"{}\"", name), now);
    }

    pub fn start_rename_folder(&mut self) {
        if let Some(folder) = self.selected_folder() {
            self.input_buffer = folder.name.clone();
            self.dialog = DialogState::RenameFolder;
        }
    }

    pub fn rename_selected_folder(&mut self, name: &str) -> bool {
        match self.selected_folder_id() {
            Some(id) => self.store.rename_folder(&id, name),
            None => false,
        }
    }

    pub fn delete_selected_folder(&mut self, now: Instant) {
        let Some(folder) = self.selected_folder().cloned() else {
            return;
        };
        if self.store.delete_folder(&folder.id) {
            self.folder_state.select(Some(0));
            self.note_state.select(None);
            self.set_status(format!("Deleted folder \"{}\"", folder.name), now);
            self.sync_note_selection();
        } else {
            self.set_status("The last folder cannot be deleted", now);
        }
    }

    /// Move the active note into the next folder and follow it there.
    pub fn move_active_note(&mut self, now: Instant) {
        let folders = self.store.folders();
        let Some(note) = self.store.active_note() else {
            return;
        };
        if folders.is_empty() {
            return;
        }
        let current = folders.iter().position(|f| f.id == note.folder_id).unwrap_or(0);
        let index = (current + 1) % folders.len();
        let (id, target) = (note.id.clone(), folders[index].clone());

        if self.store.move_note(&id, &target.id) {
            self.folder_state.select(Some(index));
            self.sync_note_selection();
            self.set_status(format!("Moved to \"{}\"", target.name), now);
        }
    }

    // ==================== Notes ====================

    /// Notes shown in the list: the selected folder's, or every match while searching.
    pub fn visible_notes(&self) -> Vec<NoteSnippet<'_>> {
        let snippet_len = self.config.editor.snippet_len;
        if self.search_query.trim().is_empty() {
            let folder = self.selected_folder().map(|f| &f.id);
            self.store.list_view_in(folder, "", snippet_len)
        } else {
            self.store.list_view(&self.search_query, snippet_len)
        }
    }

    fn visible_note_ids(&self) -> Vec<NoteId> {
        self.visible_notes().into_iter().map(|s| s.note.id.clone()).collect()
    }

    /// Keep the list highlight on the active note after re-sorting or filtering.
    pub fn sync_note_selection(&mut self) {
        let ids = self.visible_note_ids();
        let index = self
            .store
            .active_id()
            .and_then(|active| ids.iter().position(|id| id == active));
        self.note_state.select(index);
    }

    pub fn open_note(&mut self, id: &NoteId, now: Instant) {
        if !self.store.select_note(id) {
            return;
        }
        self.session.open(&mut self.store, Some(id), now);
        self.ai_error = None;
        self.content_scroll = 0;
        self.sync_note_selection();
    }

    pub fn next_note(&mut self, now: Instant) {
        let ids = self.visible_note_ids();
        if ids.is_empty() {
            return;
        }
        let i = self.note_state.selected().map_or(0, |i| (i + 1) % ids.len());
        self.open_note(&ids[i], now);
    }

    pub fn previous_note(&mut self, now: Instant) {
        let ids = self.visible_note_ids();
        if ids.is_empty() {
            return;
        }
        let i = self
            .note_state
            .selected()
            .map_or(0, |i| if i == 0 { ids.len() - 1 } else { i - 1 });
        self.open_note(&ids[i], now);
    }

    /// Create a note in the selected folder and start editing its title.
    pub fn new_note(&mut self, now: Instant) {
        let folder = self
            .selected_folder_id()
            .unwrap_or_else(|| FolderId::from(""));
        let id = self.store.add_note(&folder).id.clone();

        let folder_id = self.store.note(&id).map(|n| n.folder_id.clone());
        if let Some(index) = folder_id
            .and_then(|fid| self.store.folders().iter().position(|f| f.id == fid))
        {
            self.folder_state.select(Some(index));
        }
        self.clear_search();
        self.open_note(&id, now);
        self.enter_edit_mode(EditTarget::Title);
        self.session.edit_title(now, |title| title.clear());
    }

    pub fn delete_active_note(&mut self, now: Instant) {
        let Some(id) = self.store.active_id().cloned() else {
            return;
        };
        self.session.flush(&mut self.store, now);
        self.store.delete_note(&id);

        let next = self.store.active_id().cloned();
        self.session.open(&mut self.store, next.as_ref(), now);
        self.mode = Mode::Normal;
        self.ai_error = None;
        self.sync_note_selection();
        self.set_status("Note deleted", now);
    }

    // ==================== Search ====================

    pub fn start_search(&mut self) {
        self.search_active = true;
        self.focus = Focus::Notes;
    }

    pub fn update_search(&mut self, now: Instant) {
        let ids = self.visible_note_ids();
        match ids.first() {
            Some(first) if !ids.iter().any(|id| Some(id) == self.store.active_id()) => {
                let first = first.clone();
                self.open_note(&first, now);
            }
            _ => self.sync_note_selection(),
        }
    }

    pub fn clear_search(&mut self) {
        self.search_active = false;
        self.search_query.clear();
        self.sync_note_selection();
    }

    // ==================== Editing ====================

    pub fn enter_edit_mode(&mut self, target: EditTarget) {
        if self.session.note_id().is_none() {
            return;
        }
        self.mode = Mode::Edit;
        self.edit_target = target;
        self.focus = Focus::Content;
    }

    pub fn exit_edit_mode(&mut self) {
        self.mode = Mode::Normal;
        self.session.navigate(|surface| surface.cancel_selection());
    }

    pub fn save_now(&mut self, now: Instant) {
        if self.session.flush(&mut self.store, now) {
            self.sync_note_selection();
        }
    }

    pub fn toggle_focus(&mut self, backwards: bool) {
        self.focus = match self.focus {
            Focus::Folders => if backwards { Focus::Content } else { Focus::Notes },
            Focus::Notes => if backwards { Focus::Folders } else { Focus::Content },
            Focus::Content => if backwards { Focus::Notes } else { Focus::Folders },
        };
    }

    // ==================== AI transforms ====================

    pub fn open_ai_menu(&mut self, now: Instant) {
        if self.session.note_id().is_none() {
            self.set_status("Open a note first", now);
            return;
        }
        self.menu_index = 0;
        self.dialog = DialogState::AiMenu;
    }

    pub fn request_transform(&mut self, op: TransformOp, now: Instant) {
        self.ai_error = None;
        let Some(note_id) = self.session.note_id().cloned() else {
            self.set_status("Open a note first", now);
            return;
        };
        let (input, selection) = self.session.transform_input();
        if let Err(e) = self.transforms.request(&note_id, op, &input, selection) {
            log::info!("transform {:?} rejected: {}", op, e);
            self.ai_error = Some(e.to_string());
        }
    }

    pub fn is_thinking(&self) -> bool {
        self.session
            .note_id()
            .is_some_and(|id| self.transforms.is_pending_for(id))
    }

    pub fn dismiss_ai_error(&mut self) {
        self.ai_error = None;
    }

    fn poll_transforms(&mut self, now: Instant) -> bool {
        let Some(outcome) = self.transforms.poll(self.session.note_id()) else {
            return false;
        };
        match outcome.result {
            Ok(text) => {
                if self.session.apply_transform(now, outcome.selection.as_ref(), &text) {
                    self.set_status(format!("{} applied", outcome.op.label()), now);
                } else {
                    self.ai_error =
                        Some("The selected text changed before the result arrived.".to_string());
                }
            }
            Err(e) => self.ai_error = Some(e.to_string()),
        }
        true
    }

    // ==================== Export and share ====================

    pub fn open_export_menu(&mut self, now: Instant) {
        if self.store.active_note().is_none() {
            self.set_status("Open a note first", now);
            return;
        }
        self.menu_index = 0;
        self.dialog = DialogState::Export;
    }

    pub fn run_export_action(&mut self, action: ExportAction, now: Instant) {
        match action {
            ExportAction::File(format) => self.export_active(format, now),
            ExportAction::ShareLink => self.share_active(now),
        }
    }

    pub fn export_active(&mut self, format: ExportFormat, now: Instant) {
        self.save_now(now);
        let Some(note) = self.store.active_note() else {
            return;
        };
        let message = match export::write(note, format, &self.config.export_path()) {
            Ok(path) => format!("Exported to {}", path.display()),
            Err(e) => {
                log::error!("{}", e);
                e.to_string()
            }
        };
        self.set_status(message, now);
    }

    pub fn share_active(&mut self, now: Instant) {
        let Some(id) = self.store.active_id() else {
            return;
        };
        let link = export::share_link(&self.config.share_base_url, id);
        let message = match export::copy_to_clipboard(&link) {
            Ok(()) => format!("Share link copied: {}", link),
            Err(e) => {
                log::warn!("{}", e);
                format!("Share link: {}", link)
            }
        };
        self.set_status(message, now);
    }

    // ==================== Theme and settings ====================

    pub fn toggle_theme(&mut self, now: Instant) {
        let mode = self.theme.mode.toggled();
        self.theme = Theme::for_mode(mode);
        self.config.theme = mode;
        self.apply_surface_styles();
        self.persist_config(now);
        log::info!("theme set to {}", mode);
    }

    pub fn open_settings(&mut self) {
        self.settings_form = Some(SettingsForm::open(&self.user));
        self.dialog = DialogState::Settings;
    }

    pub fn save_settings(&mut self, now: Instant) {
        if let Some(form) = self.settings_form.take() {
            if form.save(&mut self.user) {
                self.config.user.update_from(&self.user);
                self.persist_config(now);
                self.set_status("Profile saved", now);
            }
        }
        self.dialog = DialogState::None;
    }

    pub fn cancel_settings(&mut self) {
        self.settings_form = None;
        self.dialog = DialogState::None;
    }

    // ==================== Timers ====================

    /// Advance debounce, transform and status timers. Returns true if a redraw is needed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;

        if self.session.tick(&mut self.store, now) {
            self.sync_note_selection();
            changed = true;
        }
        if self.poll_transforms(now) {
            changed = true;
        }
        if self.status.as_ref().is_some_and(|s| now >= s.until) {
            self.status = None;
            changed = true;
        }
        changed
    }

    /// How long the event loop may wait before `tick` has work to do.
    pub fn poll_timeout(&self, now: Instant) -> Option<Duration> {
        let status = self
            .status
            .as_ref()
            .map(|s| s.until.saturating_duration_since(now));
        let transforms = self.transforms.is_pending().then_some(TRANSFORM_POLL_INTERVAL);

        [self.session.next_deadline(now), status, transforms]
            .into_iter()
            .flatten()
            .min()
    }

    pub fn is_saved_visible(&self, now: Instant) -> bool {
        self.session.is_saved_visible(now)
    }

    pub fn word_count(&self) -> usize {
        crate::html::visible_text(self.session.content())
            .split_whitespace()
            .count()
    }

    /// Commit pending edits before exit.
    pub fn shutdown(&mut self, now: Instant) {
        self.session.flush(&mut self.store, now);
        self.transforms.cancel();
        log::info!("shutdown with {} notes", self.store.notes().len());
    }

    pub fn surface_html(&self) -> String {
        self.session.surface().get_html()
    }
}
