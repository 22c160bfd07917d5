//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod chat_session;
pub mod persistence;
pub mod store;
pub mod streaming;

#[cfg(test)]
pub(crate) mod test_support;
