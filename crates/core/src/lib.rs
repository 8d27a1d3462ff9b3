//! Durian Core - Shared types library.
//!
//! This crate provides common types used across the Durian Pak Jayus
//! backend components:
//! - `api` - The administrative REST API binary
//! - `integration-tests` - End-to-end REST tests
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows
//! it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and slugs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
