// Word-list ripper session engine: source cache, engine pool and time-sliced match sessions.

pub mod api;
pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod source;

pub use error::{Result, RipperError};
