mod list;
mod model;

pub use model::{
    Folder, FolderId, Note, NoteId, NoteSnippet, Plan, User, DEFAULT_FOLDER_NAME, NEW_FOLDER_NAME,
    NEW_NOTE_CONTENT, UNTITLED_NOTE,
};

/// In-memory folders and notes, owned by the application root.
///
/// Every mutation goes through the methods below. Operations on ids that are not
/// present are no-ops.
#[derive(Debug, Clone)]
pub struct NoteStore {
    folders: Vec<Folder>,
    notes: Vec<Note>,
    active: Option<NoteId>,
}

impl Default for NoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteStore {
    pub fn new() -> Self {
        Self {
            folders: vec![Folder::new(DEFAULT_FOLDER_NAME)],
            notes: Vec::new(),
            active: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            folders: Vec::new(),
            notes: Vec::new(),
            active: None,
        }
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn folder(&self, id: &FolderId) -> Option<&Folder> {
        self.folders.iter().find(|f| &f.id == id)
    }

    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| &n.id == id)
    }

    pub fn notes_in_folder<'a>(&'a self, id: &'a FolderId) -> impl Iterator<Item = &'a Note> + 'a {
        self.notes.iter().filter(move |n| &n.folder_id == id)
    }

    pub fn active_id(&self) -> Option<&NoteId> {
        self.active.as_ref()
    }

    pub fn active_note(&self) -> Option<&Note> {
        self.active.as_ref().and_then(|id| self.note(id))
    }

    pub fn select_note(&mut self, id: &NoteId) -> bool {
        if self.note(id).is_some() {
            self.active = Some(id.clone());
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.active = None;
    }

    /// Create a note in `folder_id` and make it active.
    ///
    /// An unknown folder falls back to the first folder; with no folders at all the
    /// default folder is recreated first.
    pub fn add_note(&mut self, folder_id: &FolderId) -> &Note {
        if self.folders.is_empty() {
            self.folders.push(Folder::new(DEFAULT_FOLDER_NAME));
        }
        let folder_id = match self.folder(folder_id) {
            Some(folder) => folder.id.clone(),
            None => self.folders[0].id.clone(),
        };

        let note = Note::new(folder_id);
        log::debug!("add note {} in folder {}", note.id, note.folder_id);
        self.active = Some(note.id.clone());
        self.notes.insert(0, note);
        &self.notes[0]
    }

    /// Replace the stored note with the same id and stamp `updated_at`.
    pub fn update_note(&mut self, mut note: Note) -> bool {
        let Some(slot) = self.notes.iter_mut().find(|n| n.id == note.id) else {
            return false;
        };
        note.created_at = slot.created_at;
        note.touch();
        log::debug!("update note {}", note.id);
        *slot = note;
        true
    }

    pub fn set_title(&mut self, id: &NoteId, title: &str) -> bool {
        match self.note(id) {
            Some(note) if note.title != title => {
                let mut updated = note.clone();
                updated.title = title.to_string();
                self.update_note(updated)
            }
            _ => false,
        }
    }

    pub fn set_content(&mut self, id: &NoteId, content: &str) -> bool {
        match self.note(id) {
            Some(note) if note.content != content => {
                let mut updated = note.clone();
                updated.content = content.to_string();
                self.update_note(updated)
            }
            _ => false,
        }
    }

    /// Remove a note. If it was active, the first remaining note becomes active.
    pub fn delete_note(&mut self, id: &NoteId) -> bool {
        let before = self.notes.len();
        self.notes.retain(|n| &n.id != id);
        let removed = self.notes.len() != before;

        if self.active.as_ref() == Some(id) {
            self.active = self.notes.first().map(|n| n.id.clone());
        }
        if removed {
            log::debug!("delete note {}", id);
        }
        removed
    }

    pub fn move_note(&mut self, id: &NoteId, folder_id: &FolderId) -> bool {
        if self.folder(folder_id).is_none() {
            return false;
        }
        match self.note(id) {
            Some(note) if &note.folder_id != folder_id => {
                let mut updated = note.clone();
                updated.folder_id = folder_id.clone();
                self.update_note(updated)
            }
            _ => false,
        }
    }

    /// Append a folder named `New Folder`, `New Folder 2`, ... (first free name).
    pub fn create_folder(&mut self) -> &Folder {
        let name = self.next_folder_name();
        log::debug!("create folder {:?}", name);
        self.folders.push(Folder::new(name));
        &self.folders[self.folders.len() - 1]
    }

    fn next_folder_name(&self) -> String {
        let taken = |name: &str| self.folders.iter().any(|f| f.name == name);
        if !taken(NEW_FOLDER_NAME) {
            return NEW_FOLDER_NAME.to_string();
        }
        (2..)
            .map(|n| format!("{} {}", NEW_FOLDER_NAME, n))
            .find(|name| !taken(name))
            .unwrap_or_else(|| NEW_FOLDER_NAME.to_string())
    }

    pub fn rename_folder(&mut self, id: &FolderId, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        match self.folders.iter_mut().find(|f| &f.id == id) {
            Some(folder) => {
                folder.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Delete a folder, moving its notes into the first remaining folder.
    ///
    /// The last folder cannot be deleted, so every note always has a home.
    pub fn delete_folder(&mut self, id: &FolderId) -> bool {
        if self.folders.len() <= 1 || self.folder(id).is_none() {
            return false;
        }
        self.folders.retain(|f| &f.id != id);
        let target = self.folders[0].id.clone();

        // Moving is not an edit: `updated_at` stays.
        let mut moved = 0;
        for note in self.notes.iter_mut().filter(|n| &n.folder_id == id) {
            note.folder_id = target.clone();
            moved += 1;
        }
        log::debug!("delete folder {} ({} notes moved)", id, moved);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn first_folder(store: &NoteStore) -> FolderId {
        store.folders()[0].id.clone()
    }

    fn assert_invariants(store: &NoteStore) {
        let ids: HashSet<&NoteId> = store.notes().iter().map(|n| &n.id).collect();
        assert_eq!(ids.len(), store.notes().len(), "note ids must be unique");
        if let Some(active) = store.active_id() {
            assert!(ids.contains(active), "active note must exist");
        }
        for note in store.notes() {
            assert!(note.updated_at >= note.created_at);
        }
    }

    #[test]
    fn test_new_store_has_default_folder() {
        let store = NoteStore::new();
        assert_eq!(store.folders().len(), 1);
        assert_eq!(store.folders()[0].name, DEFAULT_FOLDER_NAME);
        assert!(store.notes().is_empty());
        assert!(store.active_note().is_none());
    }

    #[test]
    fn test_add_note_becomes_active() {
        let mut store = NoteStore::new();
        let folder = first_folder(&store);
        let id = store.add_note(&folder).id.clone();

        let note = store.active_note().expect("active note");
        assert_eq!(note.id, id);
        assert_eq!(note.title, UNTITLED_NOTE);
        assert_eq!(note.content, NEW_NOTE_CONTENT);
        assert_eq!(note.folder_id, folder);
    }

    #[test]
    fn test_add_note_without_folders_recreates_default() {
        let mut store = NoteStore::empty();
        let id = store.add_note(&FolderId::from("missing")).id.clone();
        assert_eq!(store.folders().len(), 1);
        assert_eq!(store.note(&id).map(|n| &n.folder_id), Some(&store.folders()[0].id));
    }

    #[test]
    fn test_add_and_delete_sequences_keep_invariants() {
        let mut store = NoteStore::new();
        let folder = first_folder(&store);
        let mut ids = Vec::new();

        for round in 0..20 {
            let id = store.add_note(&folder).id.clone();
            ids.push(id);
            assert_invariants(&store);

            if round % 3 == 2 {
                let victim = ids.remove(round % ids.len());
                store.delete_note(&victim);
                assert_invariants(&store);
            }
        }

        for id in ids {
            store.delete_note(&id);
            assert_invariants(&store);
        }
        assert!(store.active_id().is_none());
    }

    #[test]
    fn test_delete_active_selects_remaining() {
        let mut store = NoteStore::new();
        let folder = first_folder(&store);
        let a = store.add_note(&folder).id.clone();
        let b = store.add_note(&folder).id.clone();
        assert_eq!(store.active_id(), Some(&b));

        assert!(store.delete_note(&b));
        assert_eq!(store.active_id(), Some(&a));

        assert!(store.delete_note(&a));
        assert_eq!(store.active_id(), None);
    }

    #[test]
    fn test_delete_inactive_keeps_selection() {
        let mut store = NoteStore::new();
        let folder = first_folder(&store);
        let a = store.add_note(&folder).id.clone();
        let b = store.add_note(&folder).id.clone();

        store.delete_note(&a);
        assert_eq!(store.active_id(), Some(&b));
    }

    #[test]
    fn test_missing_ids_are_noops() {
        let mut store = NoteStore::new();
        let missing = NoteId::from("nope");
        assert!(!store.delete_note(&missing));
        assert!(!store.select_note(&missing));
        assert!(!store.set_title(&missing, "x"));

        let mut ghost = Note::new(first_folder(&store));
        ghost.title = "ghost".to_string();
        assert!(!store.update_note(ghost));
        assert!(store.notes().is_empty());
    }

    #[test]
    fn test_update_note_stamps_and_keeps_created() {
        let mut store = NoteStore::new();
        let folder = first_folder(&store);
        let original = store.add_note(&folder).clone();

        let mut edited = original.clone();
        edited.content = "<p>changed</p>".to_string();
        edited.created_at = original.created_at + chrono::Duration::days(1);
        assert!(store.update_note(edited));

        let stored = store.note(&original.id).expect("note");
        assert_eq!(stored.content, "<p>changed</p>");
        assert_eq!(stored.created_at, original.created_at);
        assert!(stored.updated_at >= original.updated_at);
    }

    #[test]
    fn test_create_folder_names() {
        let mut store = NoteStore::new();
        assert_eq!(store.create_folder().name, "New Folder");
        assert_eq!(store.create_folder().name, "New Folder 2");
        assert_eq!(store.create_folder().name, "New Folder 3");
        assert_eq!(store.folders().len(), 4);
    }

    #[test]
    fn test_rename_folder_ignores_blank() {
        let mut store = NoteStore::new();
        let id = first_folder(&store);
        assert!(!store.rename_folder(&id, "   "));
        assert!(store.rename_folder(&id, " Work "));
        assert_eq!(store.folders()[0].name, "Work");
    }

    #[test]
    fn test_delete_folder_reassigns_notes() {
        let mut store = NoteStore::new();
        let home = first_folder(&store);
        let extra = store.create_folder().id.clone();
        let note = store.add_note(&extra).id.clone();
        let stamped = store.note(&note).map(|n| n.updated_at);

        assert!(store.delete_folder(&extra));
        assert_eq!(store.folders().len(), 1);
        assert_eq!(store.note(&note).map(|n| n.folder_id.clone()), Some(home.clone()));
        assert_eq!(store.note(&note).map(|n| n.updated_at), stamped);
        assert!(!store.delete_folder(&home), "last folder must stay");
    }

    #[test]
    fn test_move_note_requires_existing_folder() {
        let mut store = NoteStore::new();
        let home = first_folder(&store);
        let note = store.add_note(&home).id.clone();
        assert!(!store.move_note(&note, &FolderId::from("missing")));

        let other = store.create_folder().id.clone();
        assert!(store.move_note(&note, &other));
        assert_eq!(store.notes_in_folder(&other).count(), 1);
        assert_eq!(store.notes_in_folder(&home).count(), 0);
    }
}
