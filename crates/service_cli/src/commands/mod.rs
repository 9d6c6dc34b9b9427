//! CLI command implementations
//!
//! Each submodule implements a specific CLI command; [`report`] holds the
//! output they share.

pub mod demo;
pub mod report;
pub mod run;
