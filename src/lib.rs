//! Admin list-page engine for the document marketplace back office.
//!
//! Loads a listing from a JSON file or an admin endpoint, applies the
//! filter, sort, pagination and selection state the page keeps in its URL,
//! and builds bulk-action forms and toasts the way the admin pages do.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
pub mod util;
