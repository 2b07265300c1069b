//! Pure, deterministic logic. No I/O; every function here is a plain
//! data-in/data-out transformation.

pub mod extract;
pub mod registry;
pub mod sanitize;
pub mod scan;
pub mod types;
