/// Row and column (in chars) within the surface's lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    Forward,
    Back,
    Up,
    Down,
    WordForward,
    WordBack,
    Head,
    End,
    Top,
    Bottom,
}

/// Caret plus an optional selection anchor.
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    head: Position,
    anchor: Option<Position>,
    /// Column vertical moves aim for, so crossing a short line does not lose it.
    goal_col: Option<usize>,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pos(&self) -> Position {
        self.head
    }

    pub fn goal_col(&self) -> Option<usize> {
        self.goal_col
    }

    pub fn move_to(&mut self, row: usize, col: usize) {
        self.head = Position::new(row, col);
        self.goal_col = Some(col);
    }

    pub fn move_keeping_goal(&mut self, pos: Position) {
        self.head = pos;
    }

    pub fn start_selection(&mut self) {
        self.anchor = Some(self.head);
    }

    pub fn cancel_selection(&mut self) {
        self.anchor = None;
    }

    pub fn is_selecting(&self) -> bool {
        self.anchor.is_some()
    }

    /// Ordered `(start, end)` of a non-empty selection.
    pub fn selection_range(&self) -> Option<(Position, Position)> {
        let anchor = self.anchor.filter(|anchor| *anchor != self.head)?;
        Some((anchor.min(self.head), anchor.max(self.head)))
    }
}

pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn word_mask(line: &str) -> Vec<bool> {
    line.chars().map(is_word_char).collect()
}

/// Column of the next word start after `col`, or the line end.
pub fn next_word_start(line: &str, col: usize) -> usize {
    let mask = word_mask(line);
    let rest_of_word = mask.iter().skip(col).take_while(|w| **w).count();
    let gap = mask.iter().skip(col + rest_of_word).take_while(|w| !**w).count();
    (col + rest_of_word + gap).min(mask.len())
}

/// Column of the word start at or before `col`, or 0.
pub fn prev_word_start(line: &str, col: usize) -> usize {
    let mask = word_mask(line);
    let head = &mask[..col.min(mask.len())];
    let gap = head.iter().rev().take_while(|w| !**w).count();
    let word = head[..head.len() - gap].iter().rev().take_while(|w| **w).count();
    head.len() - gap - word
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_word_skips_markup() {
        assert_eq!(next_word_start("<p>one two</p>", 3), 7);
        assert_eq!(next_word_start("one, two", 0), 5);
        assert_eq!(next_word_start("one two", 4), 7);
        assert_eq!(next_word_start("one", 10), 3);
    }

    #[test]
    fn test_prev_word_start() {
        assert_eq!(prev_word_start("one two", 7), 4);
        assert_eq!(prev_word_start("one two", 4), 0);
        assert_eq!(prev_word_start("<i>slant</i>", 8), 3);
        assert_eq!(prev_word_start("", 3), 0);
    }

    #[test]
    fn test_selection_range_is_ordered() {
        let mut cursor = Cursor::new();
        cursor.move_to(2, 4);
        cursor.start_selection();
        cursor.move_to(1, 1);

        let (start, end) = cursor.selection_range().expect("range");
        assert_eq!(start, Position::new(1, 1));
        assert_eq!(end, Position::new(2, 4));
    }

    #[test]
    fn test_empty_selection_has_no_range() {
        let mut cursor = Cursor::new();
        cursor.move_to(0, 3);
        cursor.start_selection();
        assert!(cursor.is_selecting());
        assert!(cursor.selection_range().is_none());

        cursor.cancel_selection();
        assert!(!cursor.is_selecting());
    }

    #[test]
    fn test_goal_column_survives_vertical_moves() {
        let mut cursor = Cursor::new();
        cursor.move_to(0, 8);
        cursor.move_keeping_goal(Position::new(1, 2));
        assert_eq!(cursor.goal_col(), Some(8));
        assert_eq!(cursor.pos(), Position::new(1, 2));
    }
}
