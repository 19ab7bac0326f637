use serde::{Deserialize, Serialize};

use crate::error::{Result, SystemError};
use crate::ids::DbId;

/// Ord value of a cell that has not been placed in a column yet.
pub const UNSET_ORD: i32 = -1;

/// Row-level attributes shared by every cell kind.
///
/// The payload (matrix, onset, offset) lives in the owning crate's data cell;
/// this type only carries the bookkeeping a column needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    id: DbId,
    col_id: DbId,
    comment: Option<String>,
    ord: i32,
    selected: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            id: DbId::INVALID,
            col_id: DbId::INVALID,
            comment: None,
            ord: UNSET_ORD,
            selected: false,
        }
    }
}

impl Cell {
    pub fn new(col_id: DbId) -> Self {
        Self {
            col_id,
            ..Self::default()
        }
    }

    pub fn with_comment(col_id: DbId, comment: impl Into<String>) -> Self {
        Self {
            col_id,
            comment: Some(comment.into()),
            ..Self::default()
        }
    }

    pub fn id(&self) -> DbId {
        self.id
    }

    pub fn set_id(&mut self, id: DbId) {
        self.id = id;
    }

    pub fn clear_id(&mut self) {
        self.id = DbId::INVALID;
    }

    pub fn col_id(&self) -> DbId {
        self.col_id
    }

    pub fn set_col_id(&mut self, col_id: DbId) {
        self.col_id = col_id;
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn set_comment(&mut self, comment: Option<&str>) {
        self.comment = comment.map(str::to_owned);
    }

    pub fn ord(&self) -> i32 {
        self.ord
    }

    /// Sets the 1-based position of the cell within its column.
    pub fn set_ord(&mut self, ord: i32) -> Result<()> {
        if ord < 1 {
            return Err(SystemError::invariant(
                "Cell::set_ord()",
                format!("new ord {ord} < 1"),
            ));
        }
        self.ord = ord;
        Ok(())
    }

    pub fn selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cell = Cell::new(DbId::new(4));
        assert_eq!(cell.col_id(), DbId::new(4));
        assert_eq!(cell.ord(), UNSET_ORD);
        assert_eq!(cell.comment(), None);
        assert!(!cell.selected());
    }

    #[test]
    fn comment_is_copied() {
        let mut text = String::from("note");
        let mut cell = Cell::new(DbId::INVALID);
        cell.set_comment(Some(&text));
        text.push_str(" changed");
        assert_eq!(cell.comment(), Some("note"));
        cell.set_comment(None);
        assert_eq!(cell.comment(), None);
    }
}
