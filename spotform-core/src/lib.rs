//! Spotform Core
//!
//! Attribute model, schemas and the field registry that maps declarative
//! configuration onto Spotinst API objects

pub mod field;
pub mod plan;
pub mod provider;
pub mod resource;
pub mod schema;
