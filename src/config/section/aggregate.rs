//! `[aggregate]` section configuration.
//!
//! Controls how bundles are encoded, named and minified.
//!
//! # Example
//!
//! ```toml
//! [aggregate]
//! encoding = "UTF-8"          # Member and bundle encoding (WHATWG label)
//! digest = "md5"              # Bundle naming: md5 | sha256 | sha512 | blake3
//!
//! [aggregate.css]
//! minify = true
//!
//! [aggregate.js]
//! minify = true
//! mangle = true               # Rename local symbols
//! optimize = true             # Run compression passes
//! ```

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::asset::MinifyOptions;
use crate::config::{ConfigDiagnostics, ConfigError, FieldPath};
use crate::utils::digest::DigestAlgorithm;
use crate::utils::text::encoding_for_label;

/// Bundle production settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// Character encoding of member files and bundles.
    pub encoding: String,

    /// Hash used to name bundles.
    pub digest: DigestAlgorithm,

    pub css: CssMinifyConfig,

    pub js: JsMinifyConfig,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            encoding: "UTF-8".to_string(),
            digest: DigestAlgorithm::default(),
            css: CssMinifyConfig::default(),
            js: JsMinifyConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CssMinifyConfig {
    pub minify: bool,
}

impl Default for CssMinifyConfig {
    fn default() -> Self {
        Self { minify: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsMinifyConfig {
    pub minify: bool,
    /// Rename local symbols.
    pub mangle: bool,
    /// Run compression passes.
    pub optimize: bool,
}

impl Default for JsMinifyConfig {
    fn default() -> Self {
        Self {
            minify: true,
            mangle: true,
            optimize: true,
        }
    }
}

impl AggregateConfig {
    const ENCODING: FieldPath = FieldPath::new("aggregate.encoding");

    /// Resolve the configured encoding label.
    pub fn encoding(&self) -> Result<&'static Encoding, ConfigError> {
        encoding_for_label(&self.encoding).ok_or_else(|| {
            ConfigError::Validation(format!("unknown encoding `{}`", self.encoding))
        })
    }

    pub fn minify_options(&self) -> MinifyOptions {
        MinifyOptions {
            css: self.css.minify,
            js: self.js.minify,
            mangle: self.js.mangle,
            optimize: self.js.optimize,
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if encoding_for_label(&self.encoding).is_none() {
            diag.error_with_hint(
                Self::ENCODING,
                format!("unknown encoding `{}`", self.encoding),
                "use a WHATWG encoding label such as \"UTF-8\" or \"windows-1252\"",
            );
        }
    }
}
