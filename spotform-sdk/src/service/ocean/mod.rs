//! Ocean service

pub mod aws;
