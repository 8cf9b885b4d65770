//! Command handlers

pub mod extract;
pub mod info;
pub mod list;
