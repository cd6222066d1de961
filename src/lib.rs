//! Manifest resolution and aggregation of skin stylesheets and scripts.
//!
//! A skin manifest declares the CSS and JavaScript files a page needs.
//! [`manifest::ManifestStore`] loads manifests with their imports expanded;
//! [`aggregate::Aggregator`] merges runs of compatible entries into minified
//! bundles named after their content digest and writes an aggregated
//! manifest pointing at them.
//!
//! ```no_run
//! use skinpack::aggregate::{AggregationRequest, Aggregator};
//!
//! let report = Aggregator::new()
//!     .aggregate(&AggregationRequest::new("skins/default/skin.xml", "target/skins/default"))?;
//! println!("{} bundles", report.bundles.len());
//! # Ok::<(), skinpack::error::AggregateError>(())
//! ```

pub mod aggregate;
pub mod asset;
pub mod batch;
pub mod config;
pub mod error;
pub mod logger;
pub mod manifest;
pub mod utils;

pub use aggregate::{AggregationReport, AggregationRequest, Aggregator};
pub use error::{AggregateError, LoadError, MinifyError};
pub use manifest::{Entry, Manifest, ManifestStore, Scope, aggregated_name};
