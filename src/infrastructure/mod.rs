//! Infrastructure: configuration and composition root.

pub mod bootstrap;
pub mod config;
