//! Command handlers

pub mod backup;
pub mod config;
pub mod note;
pub mod render;
pub mod tag;
