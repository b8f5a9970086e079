//! Configuration for a crawl run
//!
//! Configuration is built from command-line arguments (there is no config
//! file) and validated once before any traversal starts. A validated
//! [`Config`] is immutable for the lifetime of the crawl.

mod types;
mod validation;

pub use types::{Config, CrawlLimits, UploadConfig};
pub use validation::validate;
