//! Spotform SDK
//!
//! Spotinst API objects with tri-state fields, their sparse JSON encoding
//! and the client used to send them

#[macro_use]
mod macros;

pub mod client;
pub mod jsonutil;
pub mod optional;
pub mod service;

pub use optional::Optional;
