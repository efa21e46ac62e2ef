//! Elastigroup service

pub mod aws;
