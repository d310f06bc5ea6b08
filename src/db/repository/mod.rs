//! Repository layer — entity-scoped database operations.
//!
//! Free functions over a borrowed [`rusqlite::Connection`], one module per
//! entity, re-exported here.

mod clinical_record;
mod patient;

pub use clinical_record::*;
pub use patient::*;
