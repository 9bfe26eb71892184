//! HTTP glue towards the admin server.

mod client;
mod source;

pub use client::{AdminClient, SubmitOutcome};
pub use source::HttpListingSource;
