//! Primitive types for the annotation database.
//!
//! Everything here is free of cross-element references: ids, type tags,
//! validators, time stamps, the plain cell record and database options.

pub mod cell;
pub mod enums;
pub mod error;
pub mod format;
pub mod ids;
pub mod names;
pub mod options;
pub mod timestamp;

pub use cell::{Cell, UNSET_ORD};
pub use enums::{FargType, MatrixType};
pub use error::{Result, SystemError};
pub use ids::DbId;
pub use options::DatabaseOptions;
pub use timestamp::{DEFAULT_TPS, MAX_TPS, MIN_TPS, TimeStamp};
