mod base;

pub use base::{base, CurrentPage, PageConfig};
