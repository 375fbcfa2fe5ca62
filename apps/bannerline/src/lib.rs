//! # bannerline
//!
//! The host side of the bannerline pipeline: configuration, the concurrent
//! build runner, and the CLI. The transforms themselves live in
//! `bannerline-core`.

pub mod cli;
pub mod config;
pub mod host;
