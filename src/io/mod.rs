//! Input/output helpers.
//!
//! - hyetograph CSV exports (`export`)
//! - curve JSON/CSV read/write (`curve`)

pub mod curve;
pub mod export;

pub use curve::*;
pub use export::*;
