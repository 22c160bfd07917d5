//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod auth;
pub mod conversation_logger;
pub mod session_listener;
pub mod storage;
pub mod transport;
