//! Mise Core - shared domain types and rules.
//!
//! This crate is used by every Mise component:
//! - `server` - JSON API for kitchen, setup-sheet and leadership workflows
//! - `cli` - Migrations, store bootstrap and checklist seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Everything the server decides on (checklist validation,
//! week snapping, dashboard aggregation, 360° summaries) lives here so it can
//! be tested without a database.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails and status enums
//! - [`checklist`] - Shift checklist item drafts and completion validation
//! - [`week`] - Sunday to Saturday week ranges for setup sheets
//! - [`setup`] - Setup template and sheet day layouts
//! - [`evaluation`] - 360° rating validation and aggregation
//! - [`dashboard`] - Kitchen dashboard statistics

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checklist;
pub mod dashboard;
pub mod evaluation;
pub mod setup;
pub mod types;
pub mod week;

pub use types::*;
