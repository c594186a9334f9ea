//! Command implementations

pub mod check;
pub mod completions;
pub mod config;
pub mod info;
pub mod list;
pub mod tree;
pub mod validate;
