// ABOUTME: DOM traversal utilities for locating article regions in parsed HTML.
// ABOUTME: Exposes capability matchers and innerText-style visible text helpers.

//! DOM utilities for untrusted HTML documents.
//!
//! This module provides the matching rules used to find article-like,
//! generic-content-like and paragraph-like nodes, and the visible-text
//! extraction that word counts and text normalization are built on.

pub mod matcher;
pub mod text;

pub use matcher::{select_all, select_within, Capability};
pub use text::{visible_text, word_count};
