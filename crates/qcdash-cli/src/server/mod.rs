//! Local JSON API over a shared dashboard.

pub mod app;
pub mod error;
pub mod handlers;
pub mod state;
