//! CLI Commands

pub mod benefits;
pub mod config;
pub mod members;
pub mod plans;
