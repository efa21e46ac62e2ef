//! API objects per service

pub mod elastigroup;
pub mod ocean;
