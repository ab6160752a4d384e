//! Shared utilities and common types for the court reservation backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Identity-provider token verification
//! - Date and time-of-day parsing and validation
//! - Serde helpers for wall-clock formats

pub mod identity;
pub mod time_format;
pub mod validation;
