//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - combined table and transition exports (`export`)
//! - JSON run summary read/write (`summary`)

pub mod export;
pub mod ingest;
pub mod summary;

pub use export::*;
pub use ingest::*;
pub use summary::*;
