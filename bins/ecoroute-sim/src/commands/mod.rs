//! CLI command implementations

pub mod account;
pub mod distance;
pub mod operators;
pub mod run;
pub mod schedule;
