pub mod format;
pub(crate) mod lock;
