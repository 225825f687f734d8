//! Shared test harness
//!
//! Each integration test binary compiles this module separately, so not
//! every helper is used everywhere.
#![allow(dead_code)]

pub mod config;
pub mod mock_directory;
pub mod mock_llm;
pub mod server;
