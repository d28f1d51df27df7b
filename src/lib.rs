//! Local article store for an RSS reader.
//!
//! - [`storage`]: SQLite-backed article persistence scoped by feed
//! - [`card`]: view models for the article cards
//! - [`config`]: optional TOML configuration
//! - [`util`]: text fitting helpers used by the cards

pub mod card;
pub mod config;
pub mod storage;
pub mod util;
