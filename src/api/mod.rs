// Presentation-facing surface: client facade and tracing setup.

pub mod client;
pub mod telemetry;
