//! CLI commands

pub mod cache;
pub mod catalog;
pub mod health;
pub mod identity;
pub mod logs;
pub mod recover;
pub mod rules;
pub mod simulate;
