//! List-page state, validation and notification services.

pub mod bulk;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod pagination;
pub mod query;
pub mod repos;
pub mod retry;
pub mod selection;
pub mod sort;
pub mod summary;
pub mod toast;
pub mod validation;
