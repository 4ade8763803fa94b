//! Constants used throughout the strata library.
//!
//! This module provides central definitions for tunables of the reload policy
//! and the text dialect.

use std::time::Duration;

/// Minimum interval between on-disk signature checks under the
/// [`Intelligent`](crate::ReloadMode::Intelligent) reload mode.
pub const RELOAD_CHECK_INTERVAL: Duration = Duration::from_millis(1000);

/// Spaces per nesting level in the text dialect.
pub const INDENT_WIDTH: usize = 2;

/// Character that opens a comment in the text dialect (and in TOML).
pub const COMMENT_CHAR: char = '#';

/// File extension of the native text dialect.
pub const TEXT_EXTENSION: &str = "strata";
