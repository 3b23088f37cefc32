//! Document lifecycle: registry, blob storage and the review workflow
//!
//! Uploads become `uploaded` records, assessment moves them to `assessed`,
//! and modification creates new `modified` records that point back at the
//! document they were derived from. Records live in memory for the life of
//! the process; their files live under the configured upload directory.

pub mod error;
pub mod registry;
pub mod sanitize;
pub mod service;
pub mod store;

pub use error::ReviewError;
pub use registry::Registry;
pub use sanitize::{derived_display_name, sanitize_filename};
pub use service::{Download, ReviewService, MAX_GUIDELINES_CHARS};
pub use store::BlobStore;
