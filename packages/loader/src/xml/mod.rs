//! XML utilities for navigating parsed definition documents.

mod utils;

pub use utils::*;
