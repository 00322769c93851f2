//! nestree: adjacency-list and nested-set tree representations.
//!
//! The [`domain`] layer holds both representations and the algorithms
//! between them. [`application`] loads and saves tree documents,
//! [`cli`] exposes everything as the `nestree` binary.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
