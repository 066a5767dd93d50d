//! API request handlers.

mod aggregate;
mod data;
mod filters;
mod health;
mod query;

pub use aggregate::*;
pub use data::*;
pub use filters::*;
pub use health::*;
pub use query::*;
