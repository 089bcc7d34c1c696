//! Common types and utilities for the asyncify refactoring engine.
//!
//! This crate provides foundational values used across all asyncify crates:
//! - Tree-walk and hierarchy recursion limits

// Centralized limits and thresholds
pub mod limits;
