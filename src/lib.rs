//! LAPRAS Score Badge Library
//!
//! Serves SVG badges for the public LAPRAS scores of a user. A badge request
//! fetches the user's profile JSON, picks one of the three scores and relays
//! a shields-style badge rendered for it.
//!
//! # Modules
//!
//! - `api`: Route table and middleware.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and shared state.
//! - `models`: Profile, query and badge models.
//! - `services`: Profile and badge upstream clients.

pub mod api;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
