//! HTTP route handlers

pub mod attributes;
pub mod control;
pub mod samples;
