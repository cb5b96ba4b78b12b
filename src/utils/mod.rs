pub mod error;
pub mod latency;
pub mod logger;
pub mod validation;
