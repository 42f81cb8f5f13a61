//! Background Tasks Module
//!
//! Tasks that run periodically for the life of the server.
//!
//! # Tasks
//! - TTL Cleanup: removes expired cache entries at a fixed interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;
