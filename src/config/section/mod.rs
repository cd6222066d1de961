//! Configuration section definitions.
//!
//! Each module corresponds to a section in `skinpack.toml`:
//!
//! | Module      | TOML Section    | Purpose                              |
//! |-------------|-----------------|--------------------------------------|
//! | `aggregate` | `[aggregate]`   | Encoding, digest, minification       |
//! | `batch`     | `[batch]`       | Manifest discovery and output layout |

mod aggregate;
mod batch;

pub use aggregate::{AggregateConfig, CssMinifyConfig, JsMinifyConfig};
pub use batch::BatchConfig;
