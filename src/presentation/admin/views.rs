mod bulk;
mod listing;
mod toast;

pub use bulk::*;
pub use listing::*;
pub use toast::*;
