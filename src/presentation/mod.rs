//! Askama views for the fragments a list page re-renders, plus a plain-text
//! rendering for the terminal.

pub mod admin;
pub mod text;
pub mod views;
