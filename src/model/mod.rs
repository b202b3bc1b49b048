//! Database models module
//!
//! All database entity structs are consolidated in models.rs,
//! with table.rs kept separate as the typed handle the dao layer extends.

mod models;
mod table;

pub use models::*;

pub use table::Table;
