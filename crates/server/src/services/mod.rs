//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Password login, password hashing and bearer tokens

pub mod auth;
