//! Manifest value strings.
//!
//! Entry values are `/`-separated paths relative to the manifest, or
//! absolute references (`/static/a.css`, `https://cdn/x.js`).

/// Whether a manifest value is an absolute reference.
///
/// # Examples
/// ```
/// use skinpack::utils::path::is_absolute_value;
/// assert!(is_absolute_value("/static/a.css"));
/// assert!(is_absolute_value("https://cdn.example.com/x.js"));
/// assert!(!is_absolute_value("css/a.css"));
/// assert!(!is_absolute_value(""));
/// ```
#[inline]
pub fn is_absolute_value(value: &str) -> bool {
    value.starts_with('/') || value.starts_with("http://") || value.starts_with("https://")
}

/// Directory portion of a value, including the trailing separator.
///
/// Empty when the value has no directory part.
///
/// # Examples
/// ```
/// use skinpack::utils::path::value_dir;
/// assert_eq!(value_dir("child/x.js"), "child/");
/// assert_eq!(value_dir("a/b/c.css"), "a/b/");
/// assert_eq!(value_dir("c.css"), "");
/// ```
#[inline]
pub fn value_dir(value: &str) -> &str {
    match value.rfind(['/', '\\']) {
        Some(pos) => &value[..=pos],
        None => "",
    }
}
