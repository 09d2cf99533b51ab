pub mod format;
pub mod table;

pub use format::{format_signed_usd, format_usd};
pub use table::Table;
