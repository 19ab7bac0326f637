//! Id allocation and the id → element-kind table.
//!
//! The index is the arena every back-reference resolves through. It records
//! what kind of element an id names and who owns it, while the elements
//! themselves live in their containers (vocab list, columns, cells).

use std::collections::BTreeMap;
use std::fmt;

use annodb_model::{DbId, Result, SystemError};

/// What an id in the index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    FormalArg { ve_id: DbId },
    MatrixVocabElement,
    PredicateVocabElement,
    DataColumn,
    DataCell { col_id: DbId },
    DataValue { cell_id: DbId },
    Predicate { cell_id: DbId },
    ColPred { cell_id: DbId },
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::FormalArg { .. } => "FormalArgument",
            ElementKind::MatrixVocabElement => "MatrixVocabElement",
            ElementKind::PredicateVocabElement => "PredicateVocabElement",
            ElementKind::DataColumn => "DataColumn",
            ElementKind::DataCell { .. } => "DataCell",
            ElementKind::DataValue { .. } => "DataValue",
            ElementKind::Predicate { .. } => "Predicate",
            ElementKind::ColPred { .. } => "ColPred",
        }
    }

    /// The id of the element that owns this one, if any.
    pub fn owner(&self) -> Option<DbId> {
        match *self {
            ElementKind::FormalArg { ve_id } => Some(ve_id),
            ElementKind::DataCell { col_id } => Some(col_id),
            ElementKind::DataValue { cell_id }
            | ElementKind::Predicate { cell_id }
            | ElementKind::ColPred { cell_id } => Some(cell_id),
            ElementKind::MatrixVocabElement
            | ElementKind::PredicateVocabElement
            | ElementKind::DataColumn => None,
        }
    }

    fn same_kind(&self, other: &ElementKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.owner() {
            Some(owner) => write!(f, "{} {}", self.name(), owner),
            None => f.write_str(self.name()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DbIndex {
    next_id: DbId,
    elements: BTreeMap<DbId, ElementKind>,
}

impl Default for DbIndex {
    fn default() -> Self {
        Self {
            next_id: DbId::new(1),
            elements: BTreeMap::new(),
        }
    }
}

impl DbIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> DbId {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Registers a new element and returns the id assigned to it.
    pub fn add_element(&mut self, kind: ElementKind) -> Result<DbId> {
        let id = self.next_id;
        if self.elements.contains_key(&id) {
            return Err(SystemError::invariant(
                "DbIndex::add_element()",
                format!("next id {id} already in use"),
            ));
        }
        self.elements.insert(id, kind);
        self.next_id = id.next();
        Ok(id)
    }

    pub fn get_element(&self, id: DbId) -> Option<&ElementKind> {
        self.elements.get(&id)
    }

    /// Like [`get_element`](Self::get_element) but reports a missing id.
    pub fn require(&self, id: DbId, context: &'static str) -> Result<ElementKind> {
        id.require_valid(context)?;
        self.elements
            .get(&id)
            .copied()
            .ok_or(SystemError::NotFound { context, id })
    }

    pub fn in_index(&self, id: DbId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn remove_element(&mut self, id: DbId) -> Result<ElementKind> {
        id.require_valid("DbIndex::remove_element()")?;
        self.elements.remove(&id).ok_or(SystemError::NotFound {
            context: "DbIndex::remove_element()",
            id,
        })
    }

    /// Updates the record for an existing id. The element kind may not change.
    pub fn replace_element(&mut self, id: DbId, kind: ElementKind) -> Result<()> {
        const CONTEXT: &str = "DbIndex::replace_element()";
        let slot = self
            .elements
            .get_mut(&id.require_valid(CONTEXT)?)
            .ok_or(SystemError::NotFound { context: CONTEXT, id })?;
        if !slot.same_kind(&kind) {
            return Err(SystemError::type_mismatch(CONTEXT, slot.name(), kind.name()));
        }
        *slot = kind;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (DbId, &ElementKind)> {
        self.elements.iter().map(|(id, kind)| (*id, kind))
    }

    pub fn to_db_string(&self) -> String {
        let contents: Vec<String> = self
            .elements
            .iter()
            .map(|(id, kind)| format!("({id} {kind})"))
            .collect();
        format!(
            "((DBIndex) (nextID: {}) (index_size: {}) (index_contents: ({})))",
            self.next_id,
            self.elements.len(),
            contents.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_one() {
        let mut idx = DbIndex::new();
        let a = idx.add_element(ElementKind::PredicateVocabElement).unwrap();
        let b = idx
            .add_element(ElementKind::FormalArg { ve_id: a })
            .unwrap();
        assert_eq!(a, DbId::new(1));
        assert_eq!(b, DbId::new(2));
        assert_eq!(idx.next_id(), DbId::new(3));
        assert!(idx.in_index(a));
    }

    #[test]
    fn replace_keeps_kind() {
        let mut idx = DbIndex::new();
        let cell = DbId::new(9);
        let id = idx
            .add_element(ElementKind::Predicate { cell_id: DbId::INVALID })
            .unwrap();
        idx.replace_element(id, ElementKind::Predicate { cell_id: cell })
            .unwrap();
        assert_eq!(idx.get_element(id), Some(&ElementKind::Predicate { cell_id: cell }));
        let err = idx
            .replace_element(id, ElementKind::DataColumn)
            .unwrap_err();
        assert!(matches!(err, SystemError::TypeMismatch { .. }));
    }

    #[test]
    fn remove_unknown_is_an_error() {
        let mut idx = DbIndex::new();
        assert!(idx.remove_element(DbId::new(5)).is_err());
        assert!(idx.remove_element(DbId::INVALID).is_err());
    }

    #[test]
    fn db_string() {
        let mut idx = DbIndex::new();
        let ve = idx.add_element(ElementKind::MatrixVocabElement).unwrap();
        idx.add_element(ElementKind::FormalArg { ve_id: ve }).unwrap();
        assert_eq!(
            idx.to_db_string(),
            "((DBIndex) (nextID: 3) (index_size: 2) (index_contents: \
             ((1 MatrixVocabElement), (2 FormalArgument 1))))"
        );
    }
}
