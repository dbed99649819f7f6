pub mod process;
pub mod scrape;

// Re-export command functions for convenience
pub use process::{combine, split};
pub use scrape::scrape;
