//! Background Tasks Module
//!
//! # Tasks
//! - Cache sweep: drops stale entries at a configured interval (off by default)

mod cleanup;

pub use cleanup::spawn_cleanup_task;
