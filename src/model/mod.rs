mod counter;
mod history;
mod sizes;

pub use counter::Count;
pub use history::HistorySize;
pub use sizes::{BlobSize, CommitSize, ObjectKind, ObjectSize, TagSize, TreeSize};
