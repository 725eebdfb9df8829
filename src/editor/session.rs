use std::ops::Range;
use std::time::{Duration, Instant};

use super::{paste_command, FormatCommand, RichTextSurface};
use crate::html;
use crate::store::{Note, NoteId, NoteStore, UNTITLED_NOTE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Clean,
    Dirty,
}

/// Selection captured when a transform was requested, so the result can be
/// written back over the same text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub range: Range<usize>,
    pub source: String,
}

/// Binds one note at a time to a rich-text surface.
///
/// Edits accumulate in a local draft and are committed to the store once no
/// further edit has arrived for the debounce window. Commits only happen when
/// the draft differs from the stored note, and a switch to another note flushes
/// the pending draft to the note it belongs to.
pub struct EditorSession<S> {
    surface: S,
    note_id: Option<NoteId>,
    title: String,
    content: String,
    state: SaveState,
    last_edit: Option<Instant>,
    debounce: Duration,
    saved_for: Duration,
    saved_until: Option<Instant>,
}

impl<S: RichTextSurface> EditorSession<S> {
    pub fn new(surface: S, debounce: Duration, saved_for: Duration) -> Self {
        Self {
            surface,
            note_id: None,
            title: String::new(),
            content: String::new(),
            state: SaveState::Clean,
            last_edit: None,
            debounce,
            saved_for,
            saved_until: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn note_id(&self) -> Option<&NoteId> {
        self.note_id.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn state(&self) -> SaveState {
        self.state
    }

    pub fn set_timing(&mut self, debounce: Duration, saved_for: Duration) {
        self.debounce = debounce;
        self.saved_for = saved_for;
    }

    /// Bind the session to `id`, committing any pending draft of the previous note first.
    ///
    /// Re-opening the already bound note leaves the draft untouched.
    pub fn open(&mut self, store: &mut NoteStore, id: Option<&NoteId>, now: Instant) {
        if self.note_id.is_some() && self.note_id.as_ref() == id {
            return;
        }
        self.flush(store, now);

        match id.and_then(|id| store.note(id)) {
            Some(note) => self.bind(note),
            None => self.unbind(),
        }
    }

    /// Reload the bound note from the store, dropping any uncommitted draft.
    pub fn reload(&mut self, store: &NoteStore) {
        match self.note_id.as_ref().and_then(|id| store.note(id)) {
            Some(note) => self.bind(note),
            None => self.unbind(),
        }
    }

    fn bind(&mut self, note: &Note) {
        self.note_id = Some(note.id.clone());
        self.title = note.title.clone();
        self.content = note.content.clone();
        if self.surface.get_html() != note.content {
            self.surface.set_html(&note.content);
        }
        self.state = SaveState::Clean;
        self.last_edit = None;
    }

    fn unbind(&mut self) {
        self.note_id = None;
        self.title.clear();
        self.content.clear();
        if !self.surface.get_html().is_empty() {
            self.surface.set_html("");
        }
        self.state = SaveState::Clean;
        self.last_edit = None;
    }

    fn mark_dirty(&mut self, now: Instant) {
        if self.note_id.is_some() {
            self.state = SaveState::Dirty;
            self.last_edit = Some(now);
        }
    }

    pub fn set_title(&mut self, now: Instant, title: impl Into<String>) {
        if self.note_id.is_none() {
            return;
        }
        self.title = title.into();
        self.mark_dirty(now);
    }

    pub fn edit_title(&mut self, now: Instant, f: impl FnOnce(&mut String)) {
        if self.note_id.is_none() {
            return;
        }
        f(&mut self.title);
        self.mark_dirty(now);
    }

    /// Apply a content mutation to the surface and restart the debounce window.
    pub fn edit_content(&mut self, now: Instant, f: impl FnOnce(&mut S)) {
        if self.note_id.is_none() {
            return;
        }
        f(&mut self.surface);
        self.content = self.surface.get_html();
        self.mark_dirty(now);
    }

    /// Surface access that does not change the content (cursor and selection).
    pub fn navigate(&mut self, f: impl FnOnce(&mut S)) {
        f(&mut self.surface);
    }

    pub fn exec(&mut self, now: Instant, command: &FormatCommand) {
        self.edit_content(now, |surface| surface.exec(command));
    }

    pub fn paste(&mut self, now: Instant, clipboard_text: &str) {
        if let Some(command) = paste_command(clipboard_text) {
            self.exec(now, &command);
        }
    }

    /// Commit the draft once the debounce window has elapsed. Returns true when the store changed.
    pub fn tick(&mut self, store: &mut NoteStore, now: Instant) -> bool {
        let due = match self.last_edit {
            Some(at) => now.saturating_duration_since(at) >= self.debounce,
            None => true,
        };
        if self.state == SaveState::Dirty && due {
            self.commit(store, now)
        } else {
            false
        }
    }

    /// Commit any pending draft immediately.
    pub fn flush(&mut self, store: &mut NoteStore, now: Instant) -> bool {
        if self.state == SaveState::Dirty {
            self.commit(store, now)
        } else {
            false
        }
    }

    fn commit(&mut self, store: &mut NoteStore, now: Instant) -> bool {
        self.state = SaveState::Clean;
        self.last_edit = None;

        let Some(id) = self.note_id.as_ref() else {
            return false;
        };
        let Some(stored) = store.note(id) else {
            log::warn!("dropping draft for missing note {}", id);
            return false;
        };

        let title = if self.title.trim().is_empty() {
            UNTITLED_NOTE.to_string()
        } else {
            self.title.clone()
        };
        if stored.title == title && stored.content == self.content {
            return false;
        }

        let mut updated = stored.clone();
        updated.title = title;
        updated.content = self.content.clone();
        let changed = store.update_note(updated);
        if changed {
            self.saved_until = Some(now + self.saved_for);
            log::debug!("saved note {}", id);
        }
        changed
    }

    pub fn is_saved_visible(&self, now: Instant) -> bool {
        self.saved_until.is_some_and(|until| now < until)
    }

    /// Time until the next debounce commit or badge expiry, if any is scheduled.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        let commit = match (self.state, self.last_edit) {
            (SaveState::Dirty, Some(at)) => Some((at + self.debounce).saturating_duration_since(now)),
            (SaveState::Dirty, None) => Some(Duration::ZERO),
            _ => None,
        };
        let badge = self
            .saved_until
            .filter(|until| now < *until)
            .map(|until| until - now);

        match (commit, badge) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Text a transform should work on: the selected text when there is one,
    /// otherwise the whole body as plain text.
    pub fn transform_input(&self) -> (String, Option<SelectionSnapshot>) {
        if let Some(selected) = self.surface.selection() {
            let markup = self.surface.get_html();
            let range = html::text_bounds(&markup, selected);
            let source = range.clone().and_then(|range| markup.get(range));
            if let (Some(range), Some(source)) = (range, source) {
                let text = html::strip_html(source);
                if !text.trim().is_empty() {
                    let snapshot = SelectionSnapshot {
                        range,
                        source: source.to_string(),
                    };
                    return (text, Some(snapshot));
                }
            }
        }
        (html::visible_text(&self.content), None)
    }

    /// Write transform output back into the bound note.
    ///
    /// With a selection the selected source is replaced, keeping any tags the
    /// selection only partly covered; if the text moved since the request it is
    /// located by content. Without a selection the body is
    /// replaced by paragraphs of the output. Returns false when the selected text
    /// can no longer be found.
    pub fn apply_transform(
        &mut self,
        now: Instant,
        selection: Option<&SelectionSnapshot>,
        output: &str,
    ) -> bool {
        if self.note_id.is_none() {
            return false;
        }

        let markup = self.surface.get_html();
        let replaced = match selection {
            Some(snapshot) => {
                let start = if markup.get(snapshot.range.clone()) == Some(snapshot.source.as_str()) {
                    snapshot.range.start
                } else {
                    match markup.find(&snapshot.source) {
                        Some(start) => start,
                        None => return false,
                    }
                };
                let end = start + snapshot.source.len();
                format!(
                    "{}{}{}{}",
                    &markup[..start],
                    html::escape(output.trim()),
                    html::dangling_tags(&snapshot.source),
                    &markup[end..]
                )
            }
            None => html::paragraphs(output),
        };

        self.surface.set_html(&replaced);
        self.content = self.surface.get_html();
        self.mark_dirty(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{CursorMove, TextSurface};

    const DEBOUNCE: Duration = Duration::from_millis(500);
    const BADGE: Duration = Duration::from_millis(2000);

    #[derive(Default)]
    struct FakeSurface {
        html: String,
        selection: Option<Range<usize>>,
        set_calls: usize,
    }

    impl RichTextSurface for FakeSurface {
        fn get_html(&self) -> String {
            self.html.clone()
        }

        fn set_html(&mut self, html: &str) {
            self.html = html.to_string();
            self.set_calls += 1;
        }

        fn exec(&mut self, command: &FormatCommand) {
            match command {
                FormatCommand::InsertText(text) => self.html.push_str(&html::escape(text)),
                FormatCommand::InsertHtml(markup) => self.html.push_str(markup),
                FormatCommand::Bold => self.html = format!("<b>{}</b>", self.html),
                _ => {}
            }
        }

        fn selection(&self) -> Option<Range<usize>> {
            self.selection.clone()
        }
    }

    fn setup() -> (NoteStore, NoteId, EditorSession<FakeSurface>, Instant) {
        let mut store = NoteStore::new();
        let folder = store.folders()[0].id.clone();
        let id = store.add_note(&folder).id.clone();
        let now = Instant::now();
        let mut session = EditorSession::new(FakeSurface::default(), DEBOUNCE, BADGE);
        session.open(&mut store, Some(&id), now);
        (store, id, session, now)
    }

    #[test]
    fn test_burst_of_edits_commits_once() {
        let (mut store, id, mut session, t0) = setup();
        let mut commits = 0;
        let mut last = t0;

        for i in 0..10u64 {
            last = t0 + Duration::from_millis(40 * i);
            session.edit_content(last, |s| s.html.push('x'));
            if session.tick(&mut store, last) {
                commits += 1;
            }
        }
        if session.tick(&mut store, last + Duration::from_millis(499)) {
            commits += 1;
        }
        assert_eq!(commits, 0);
        assert_eq!(store.note(&id).map(|n| n.content.as_str()), Some("<p>Start your masterpiece...</p>"));

        assert!(session.tick(&mut store, last + DEBOUNCE));
        assert!(!session.tick(&mut store, last + DEBOUNCE * 2));
        assert_eq!(
            store.note(&id).map(|n| n.content.as_str()),
            Some("<p>Start your masterpiece...</p>xxxxxxxxxx")
        );
    }

    #[test]
    fn test_no_commit_without_change() {
        let (mut store, id, mut session, t0) = setup();
        let before = store.note(&id).map(|n| n.updated_at);

        session.edit_content(t0, |_| {});
        assert_eq!(session.state(), SaveState::Dirty);
        assert!(!session.tick(&mut store, t0 + DEBOUNCE));
        assert_eq!(session.state(), SaveState::Clean);
        assert!(!session.is_saved_visible(t0 + DEBOUNCE));
        assert_eq!(store.note(&id).map(|n| n.updated_at), before);
    }

    #[test]
    fn test_open_skips_redundant_reinit() {
        let (mut store, id, mut session, t0) = setup();
        assert_eq!(session.surface().set_calls, 1);

        let folder = store.folders()[0].id.clone();
        let other = store.add_note(&folder).id.clone();
        session.open(&mut store, Some(&other), t0);
        // Same content as the first note, so the surface is left alone.
        assert_eq!(session.surface().set_calls, 1);
        assert_eq!(session.note_id(), Some(&other));

        session.open(&mut store, Some(&id), t0);
        assert_eq!(session.surface().set_calls, 1);
    }

    #[test]
    fn test_switch_flushes_to_previous_note() {
        let (mut store, first, mut session, t0) = setup();
        let folder = store.folders()[0].id.clone();
        let second = store.add_note(&folder).id.clone();

        session.edit_content(t0, |s| s.html = "<p>draft</p>".to_string());
        session.set_title(t0, "First");
        session.open(&mut store, Some(&second), t0 + Duration::from_millis(10));

        let first_note = store.note(&first).expect("first");
        assert_eq!(first_note.title, "First");
        assert_eq!(first_note.content, "<p>draft</p>");

        let second_note = store.note(&second).expect("second");
        assert_eq!(second_note.title, UNTITLED_NOTE);
        assert_eq!(second_note.content, "<p>Start your masterpiece...</p>");

        assert_eq!(session.title(), UNTITLED_NOTE);
        assert_eq!(session.state(), SaveState::Clean);
        assert!(!session.tick(&mut store, t0 + DEBOUNCE * 4));
    }

    #[test]
    fn test_saved_badge_window() {
        let (mut store, _, mut session, t0) = setup();
        session.set_title(t0, "Ideas");
        assert!(session.tick(&mut store, t0 + DEBOUNCE));

        let saved_at = t0 + DEBOUNCE;
        assert!(session.is_saved_visible(saved_at + Duration::from_millis(1999)));
        assert!(!session.is_saved_visible(saved_at + BADGE));
    }

    #[test]
    fn test_blank_title_stored_as_untitled() {
        let (mut store, id, mut session, t0) = setup();
        session.set_title(t0, "Draft");
        session.flush(&mut store, t0);
        session.set_title(t0, "   ");
        assert!(session.flush(&mut store, t0));
        assert_eq!(store.note(&id).map(|n| n.title.as_str()), Some(UNTITLED_NOTE));
    }

    #[test]
    fn test_next_deadline() {
        let (mut store, _, mut session, t0) = setup();
        assert_eq!(session.next_deadline(t0), None);

        session.set_title(t0, "x");
        assert_eq!(session.next_deadline(t0 + Duration::from_millis(100)), Some(Duration::from_millis(400)));

        session.tick(&mut store, t0 + DEBOUNCE);
        assert_eq!(session.next_deadline(t0 + DEBOUNCE), Some(BADGE));
    }

    #[test]
    fn test_edits_without_note_are_ignored() {
        let mut store = NoteStore::new();
        let mut session = EditorSession::new(FakeSurface::default(), DEBOUNCE, BADGE);
        let now = Instant::now();
        session.open(&mut store, None, now);
        session.edit_content(now, |s| s.html.push('x'));
        session.set_title(now, "t");
        assert_eq!(session.state(), SaveState::Clean);
        assert!(!session.flush(&mut store, now));
    }

    #[test]
    fn test_paste_video_link_embeds() {
        let (mut store, id, mut session, t0) = setup();
        session.paste(t0, "https://youtu.be/dQw4w9WgXcQ");
        session.flush(&mut store, t0);
        let content = store.note(&id).map(|n| n.content.clone()).unwrap_or_default();
        assert!(content.contains("data-video-id=\"dQw4w9WgXcQ\""));
    }

    #[test]
    fn test_paste_plain_text_is_escaped() {
        let (_, _, mut session, t0) = setup();
        session.paste(t0, "<script>alert(1)</script>");
        assert!(session.content().ends_with("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_transform_input_prefers_selection() {
        let (_, _, mut session, t0) = setup();
        session.edit_content(t0, |s| s.html = "<p>Hello <b>big</b> world</p>".to_string());
        assert_eq!(session.transform_input(), ("Hello big world".to_string(), None));

        session.navigate(|s| s.selection = Some(9..15));
        let (text, snapshot) = session.transform_input();
        assert_eq!(text, "big");
        assert_eq!(snapshot.map(|s| s.source), Some("big".to_string()));
    }

    #[test]
    fn test_selection_across_tags_keeps_markup_balanced() {
        let (_, _, mut session, t0) = setup();
        session.edit_content(t0, |s| s.html = "<p>Hello <b>big</b> world</p>".to_string());

        session.navigate(|s| s.selection = Some(9..15));
        let (text, snapshot) = session.transform_input();
        assert_eq!(text, "big");
        assert!(session.apply_transform(t0, snapshot.as_ref(), "BIG"));
        assert_eq!(session.content(), "<p>Hello <b>BIG</b> world</p>");

        session.navigate(|s| s.selection = Some(12..23));
        let (text, snapshot) = session.transform_input();
        assert_eq!(text, "BIG wor");
        assert!(session.apply_transform(t0, snapshot.as_ref(), "HUGE"));
        assert_eq!(session.content(), "<p>Hello <b>HUGE</b>ld</p>");
    }

    #[test]
    fn test_apply_transform_replaces_selection() {
        let (_, _, mut session, t0) = setup();
        session.edit_content(t0, |s| s.html = "<p>teh cat</p>".to_string());
        let snapshot = SelectionSnapshot {
            range: 3..6,
            source: "teh".to_string(),
        };
        assert!(session.apply_transform(t0, Some(&snapshot), "the\n"));
        assert_eq!(session.content(), "<p>the cat</p>");
        assert_eq!(session.state(), SaveState::Dirty);
    }

    #[test]
    fn test_apply_transform_relocates_moved_selection() {
        let (_, _, mut session, t0) = setup();
        session.edit_content(t0, |s| s.html = "<p>new <i>teh</i> cat</p>".to_string());
        let snapshot = SelectionSnapshot {
            range: 3..6,
            source: "teh".to_string(),
        };
        assert!(session.apply_transform(t0, Some(&snapshot), "the"));
        assert_eq!(session.content(), "<p>new <i>the</i> cat</p>");

        let gone = SelectionSnapshot {
            range: 0..3,
            source: "zzz".to_string(),
        };
        assert!(!session.apply_transform(t0, Some(&gone), "x"));
    }

    #[test]
    fn test_apply_transform_replaces_body() {
        let (_, _, mut session, t0) = setup();
        assert!(session.apply_transform(t0, None, "First point.\n\nSecond <point>."));
        assert_eq!(session.content(), "<p>First point.</p><p>Second &lt;point&gt;.</p>");
    }

    #[test]
    fn test_text_surface_selection_round_trip() {
        let mut store = NoteStore::new();
        let folder = store.folders()[0].id.clone();
        let id = store.add_note(&folder).id.clone();
        store.set_content(&id, "<p>fix teh typo</p>");

        let now = Instant::now();
        let mut session = EditorSession::new(TextSurface::default(), DEBOUNCE, BADGE);
        session.open(&mut store, Some(&id), now);
        session.navigate(|s| {
            s.set_cursor(0, 7);
            for _ in 0..3 {
                s.move_cursor(CursorMove::Forward, true);
            }
        });

        let (text, snapshot) = session.transform_input();
        assert_eq!(text, "teh");
        assert!(session.apply_transform(now, snapshot.as_ref(), "the"));
        assert!(session.flush(&mut store, now));
        assert_eq!(store.note(&id).map(|n| n.content.as_str()), Some("<p>fix the typo</p>"));
    }
}
