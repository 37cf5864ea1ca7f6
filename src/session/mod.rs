//! Intake progress per client session.

pub mod model;
pub mod store;

pub use model::Session;
pub use store::{InMemorySessionStore, SessionHandle, SessionRepository, spawn_eviction_task};
