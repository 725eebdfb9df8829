use super::{FolderId, NoteSnippet, NoteStore};
use crate::html;

impl NoteStore {
    /// Notes whose title or snippet contains `query` (case-insensitive), newest first.
    pub fn list_view(&self, query: &str, snippet_len: usize) -> Vec<NoteSnippet<'_>> {
        self.list_view_in(None, query, snippet_len)
    }

    /// Same as [`NoteStore::list_view`], optionally limited to one folder.
    pub fn list_view_in(
        &self,
        folder: Option<&FolderId>,
        query: &str,
        snippet_len: usize,
    ) -> Vec<NoteSnippet<'_>> {
        let query = query.trim().to_lowercase();

        let mut items: Vec<NoteSnippet<'_>> = self
            .notes
            .iter()
            .filter(|note| folder.map_or(true, |f| &note.folder_id == f))
            .map(|note| NoteSnippet {
                note,
                snippet: html::snippet(&note.content, snippet_len),
            })
            .filter(|item| {
                query.is_empty()
                    || item.note.title.to_lowercase().contains(&query)
                    || item.snippet.to_lowercase().contains(&query)
            })
            .collect();

        items.sort_by(|a, b| {
            b.note
                .updated_at
                .cmp(&a.note.updated_at)
                .then_with(|| a.note.id.cmp(&b.note.id))
        });
        items
    }
}

#[cfg(test)]
mod tests {
    use crate::store::{Note, NoteStore};
    use chrono::{Duration, Utc};

    fn store_with(notes: &[(&str, &str, i64)]) -> NoteStore {
        let mut store = NoteStore::new();
        let folder = store.folders()[0].id.clone();
        let base = Utc::now() - Duration::hours(1);
        for (title, content, offset) in notes {
            let id = store.add_note(&folder).id.clone();
            let mut note: Note = store.note(&id).cloned().expect("note");
            note.title = title.to_string();
            note.content = content.to_string();
            store.update_note(note);
            // Pin timestamps so ordering is deterministic.
            let slot = store.notes.iter_mut().find(|n| n.id == id).expect("slot");
            slot.created_at = base;
            slot.updated_at = base + Duration::seconds(*offset);
        }
        store
    }

    #[test]
    fn test_snippet_is_plain_text() {
        let store = store_with(&[("Greeting", "<p>Hello</p>", 0)]);
        let view = store.list_view("", 100);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].snippet, "Hello");
    }

    #[test]
    fn test_sorted_by_updated_desc() {
        let store = store_with(&[("old", "<p>a</p>", 1), ("new", "<p>b</p>", 50), ("mid", "<p>c</p>", 20)]);
        let titles: Vec<&str> = store.list_view("", 100).iter().map(|s| s.note.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_filter_matches_title_and_snippet_case_insensitive() {
        let store = store_with(&[
            ("Shopping", "<p>milk and eggs</p>", 1),
            ("Ideas", "<p>Buy a <b>MILK</b> frother</p>", 2),
            ("Travel", "<p>pack bags</p>", 3),
        ]);
        let titles: Vec<&str> = store.list_view("milk", 100).iter().map(|s| s.note.title.as_str()).collect();
        assert_eq!(titles, vec!["Ideas", "Shopping"]);

        let titles: Vec<&str> = store.list_view("TRAV", 100).iter().map(|s| s.note.title.as_str()).collect();
        assert_eq!(titles, vec!["Travel"]);
        assert!(store.list_view("zzz", 100).is_empty());
    }

    #[test]
    fn test_filter_by_folder() {
        let mut store = store_with(&[("a", "<p>a</p>", 1)]);
        let other = store.create_folder().id.clone();
        store.add_note(&other);
        assert_eq!(store.list_view("", 100).len(), 2);
        assert_eq!(store.list_view_in(Some(&other), "", 100).len(), 1);
    }
}
