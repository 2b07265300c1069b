//! Side-effecting operations: spawning agent processes and probing for
//! installed agents. Kept apart from [`crate::core`] so the extraction
//! pipeline stays testable without a single subprocess.

pub mod detect;
pub mod process;
