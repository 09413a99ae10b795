//! Filtered content search.
//!
//! # Responsibility
//! - Restrict content listings by category, tag and substring text.
//! - Keep counts and pages free of join-induced duplicates.

pub mod filter;
