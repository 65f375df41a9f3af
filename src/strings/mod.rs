//! # Strings Module
//!
//! Centralizes user-facing strings and message templates.
//! Ensures consistency in messaging and easier updates.

pub mod messages;
