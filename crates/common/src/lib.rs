//! API types and errors shared between the codec service and its clients.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
