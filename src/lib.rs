//! Strata - hierarchical agent pipeline server
//!
//! HTTP surface and server wiring around `strata-core`. The binary in
//! `main.rs` adds the command line.

#![forbid(unsafe_code)]

pub mod api;
pub mod server;
