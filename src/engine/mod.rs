// Session orchestration: word-list store, selection loading, engine pool and match sessions.

pub mod loader;
pub mod pool;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod store;
