//! Asset minification for stylesheets and scripts.
//!
//! Uses oxc for JavaScript and lightningcss for CSS.
//!
//! Members of a script bundle are classic scripts sharing one global
//! scope, so top-level declarations are neither dropped nor renamed even
//! when nothing in the same file refers to them.

use std::sync::{Arc, RwLock};

use lightningcss::error::Error as CssError;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier as OxcMinifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::AssetKind;
use super::diagnostic::{Diagnostic, DiagnosticReporter, Severity};
use crate::error::MinifyError;

/// Text compression for one asset kind.
///
/// Failures are reported to `reporter` and returned as `MinifyError`.
pub trait Minifier: Send + Sync {
    fn compress(
        &self,
        kind: AssetKind,
        source_name: &str,
        text: &str,
        reporter: &dyn DiagnosticReporter,
    ) -> Result<String, MinifyError>;
}

/// Returns every input unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughMinifier;

impl Minifier for PassthroughMinifier {
    fn compress(
        &self,
        _kind: AssetKind,
        _source_name: &str,
        text: &str,
        _reporter: &dyn DiagnosticReporter,
    ) -> Result<String, MinifyError> {
        Ok(text.to_string())
    }
}

/// Which transformations [`NativeMinifier`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinifyOptions {
    pub css: bool,
    pub js: bool,
    /// Rename local symbols in scripts.
    pub mangle: bool,
    /// Run compression passes over scripts.
    pub optimize: bool,
}

impl Default for MinifyOptions {
    fn default() -> Self {
        Self {
            css: true,
            js: true,
            mangle: true,
            optimize: true,
        }
    }
}

/// lightningcss for stylesheets, oxc for scripts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeMinifier {
    options: MinifyOptions,
}

impl NativeMinifier {
    pub fn new(options: MinifyOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> MinifyOptions {
        self.options
    }

    fn minify_css(
        &self,
        source_name: &str,
        source: &str,
        reporter: &dyn DiagnosticReporter,
    ) -> Result<String, Diagnostic> {
        let kind = AssetKind::Css;
        let warnings = Arc::new(RwLock::new(Vec::new()));
        let options = ParserOptions {
            filename: source_name.to_string(),
            warnings: Some(Arc::clone(&warnings)),
            ..ParserOptions::default()
        };

        let parsed = StyleSheet::parse(source, options);
        if let Ok(warnings) = warnings.read() {
            for warning in warnings.iter() {
                reporter.report(css_diagnostic(Severity::Warning, source_name, warning));
            }
        }
        let stylesheet = parsed.map_err(|e| css_diagnostic(Severity::Error, source_name, &e))?;

        let result = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..PrinterOptions::default()
            })
            .map_err(|e| Diagnostic::error(kind, source_name, e.kind.to_string()))?;
        Ok(result.code)
    }

    fn minify_js(&self, source_name: &str, source: &str) -> Result<String, Diagnostic> {
        let allocator = Allocator::default();
        let source_type = SourceType::script();
        let ret = Parser::new(&allocator, source, source_type).parse();
        if let Some(first) = ret.errors.first() {
            let message = if ret.errors.len() > 1 {
                format!("{first} (and {} more errors)", ret.errors.len() - 1)
            } else {
                first.to_string()
            };
            return Err(Diagnostic::error(AssetKind::Script, source_name, message));
        }

        let mut program = ret.program;
        let options = MinifierOptions {
            mangle: self.options.mangle.then(|| MangleOptions {
                top_level: Some(false),
                ..MangleOptions::default()
            }),
            // Unused-declaration removal skips the root scope of a script
            compress: self.options.optimize.then(CompressOptions::smallest),
        };
        let ret = OxcMinifier::new(options).minify(&allocator, &mut program);
        let code = Codegen::new()
            .with_options(CodegenOptions {
                minify: true,
                comments: CommentOptions::disabled(),
                ..CodegenOptions::default()
            })
            .with_scoping(ret.scoping)
            .build(&program)
            .code;
        Ok(code)
    }
}

impl Minifier for NativeMinifier {
    fn compress(
        &self,
        kind: AssetKind,
        source_name: &str,
        text: &str,
        reporter: &dyn DiagnosticReporter,
    ) -> Result<String, MinifyError> {
        let result = match kind {
            AssetKind::Css if self.options.css => self.minify_css(source_name, text, reporter),
            AssetKind::Script if self.options.js => self.minify_js(source_name, text),
            _ => return Ok(text.to_string()),
        };

        result.map_err(|diagnostic| {
            let err = diagnostic.to_error();
            reporter.report(diagnostic);
            err
        })
    }
}

/// Position a lightningcss error, converting its 0-based line.
fn css_diagnostic<T: std::fmt::Display>(
    severity: Severity,
    source_name: &str,
    error: &CssError<T>,
) -> Diagnostic {
    let (line, column) = error
        .loc
        .as_ref()
        .map_or((None, None), |loc| (Some(loc.line + 1), Some(loc.column)));
    Diagnostic {
        severity,
        ..Diagnostic::error(AssetKind::Css, source_name, error.kind.to_string()).at(line, column)
    }
}
