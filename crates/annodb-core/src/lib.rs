mod args;
mod cascade;
pub mod cell;
pub mod col_pred;
pub mod column;
pub mod database;
pub mod formal_arg;
pub mod index;
pub mod matrix;
pub mod predicate;
pub mod value;
pub mod vocab;
pub mod vocab_list;

pub use cell::DataCell;
pub use col_pred::ColPred;
pub use column::DataColumn;
pub use database::Database;
pub use formal_arg::{FargKind, FormalArgument};
pub use index::{DbIndex, ElementKind};
pub use matrix::Matrix;
pub use predicate::Predicate;
pub use value::{DataValue, Range, Value};
pub use vocab::{
    ArgListRemap, ExternalVocabElementListener, MatrixVocabElement, PredicateVocabElement,
    VeChange, VeKind, VocabElement, VocabElementListeners, VocabEntry,
};
pub use vocab_list::VocabList;

pub use annodb_model::{
    Cell, DatabaseOptions, DbId, FargType, MatrixType, Result, SystemError, TimeStamp,
};
