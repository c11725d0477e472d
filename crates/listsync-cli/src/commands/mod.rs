//! Command handlers

pub mod config;
pub mod relay;
pub mod todo;
