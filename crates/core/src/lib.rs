//! ForgePilot Core - Shared types library.
//!
//! This crate provides common types used across all ForgePilot components:
//! - `site` - Public marketing site and admin dashboard
//! - `backend` - Client for the hosted data/auth platform
//! - `cli` - Command-line tools for admin credentials and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! Rows fetched from the hosted backend are decoded into the [`records`]
//! types and validated before anything else touches them.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, slugs, prices and statuses
//! - [`records`] - Typed table rows with boundary validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod records;
pub mod types;

pub use records::*;
pub use types::*;
