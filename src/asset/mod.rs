//! Asset kinds, minification and minifier diagnostics.

mod diagnostic;
mod kind;
pub mod minify;

pub use diagnostic::{CollectingReporter, Diagnostic, DiagnosticReporter, LogReporter, Severity};
pub use kind::AssetKind;
pub use minify::{Minifier, MinifyOptions, NativeMinifier, PassthroughMinifier};
