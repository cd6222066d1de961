//! Relative path between a base directory and a target file.

use std::io;
use std::path::{Component, Path};

/// Path of `target` relative to the directory `base`, `/`-separated.
///
/// Both paths are canonicalized first, so both must exist. The result is one
/// `..` for every base segment past the common prefix, followed by the rest
/// of the target.
///
/// # Example
/// ```ignore
/// // base:   /out/skin
/// // target: /out/js/abc.aggr.min.js
/// assert_eq!(relative_path(base, target)?, "../js/abc.aggr.min.js");
/// ```
pub fn relative_path(base: &Path, target: &Path) -> io::Result<String> {
    let base = base.canonicalize()?;
    let target = target.canonicalize()?;
    Ok(relative_between(&base, &target))
}

/// Segment arithmetic behind [`relative_path`], on already-normalized paths.
pub fn relative_between(base: &Path, target: &Path) -> String {
    let base: Vec<Component<'_>> = base.components().collect();
    let target: Vec<Component<'_>> = target.components().collect();

    let common = base
        .iter()
        .zip(&target)
        .take_while(|(a, b)| a == b)
        .count();

    let ups = std::iter::repeat_n("..".to_string(), base.len() - common);
    let downs = target[common..]
        .iter()
        .map(|c| c.as_os_str().to_string_lossy().into_owned());

    ups.chain(downs).collect::<Vec<_>>().join("/")
}
