//! Progress display for streaming replies

pub mod reporter;

pub use reporter::StreamReporter;
