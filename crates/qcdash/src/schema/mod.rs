//! Schema types for representing a loaded table's structure.

mod column;
mod table;
mod types;

pub use column::ColumnSchema;
pub use table::TableSchema;
pub use types::{ColumnKind, ColumnType};
