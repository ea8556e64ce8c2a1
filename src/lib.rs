//! EasyInstaller Library
//!
//! This library provides the acquisition pipeline behind the `ezinstall` CLI:
//! manifest retrieval, archive-format probing, streaming download and
//! progress-instrumented extraction.

pub mod commands;
pub mod core;
pub mod error;
pub mod utils;
