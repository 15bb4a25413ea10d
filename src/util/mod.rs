mod format;

pub use format::{format_count, format_size};
