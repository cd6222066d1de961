//! Loading, import resolution and saving of manifests.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use encoding_rs::Encoding;

use super::cache::{CacheKey, ManifestCache, NoCache, SHARED_CACHE, SharedCache};
use super::model::{Entry, Manifest, Scope};
use super::resolve::ResolveContext;
use super::xml;
use crate::asset::AssetKind;
use crate::error::LoadError;
use crate::utils::bom::BomStripReader;
use crate::utils::path::value_dir;
use crate::utils::text;
use crate::{debug, log};

/// Infix inserted before the extension of an aggregated manifest's name.
pub const AGGREGATED_INFIX: &str = ".aggr.";

/// Reads, import-expands, caches and writes manifests.
///
/// Cloning is cheap; clones share the same cache.
#[derive(Clone)]
pub struct ManifestStore {
    cache: Arc<dyn ManifestCache>,
    encoding: &'static Encoding,
}

impl Default for ManifestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestStore {
    /// Store with its own private cache.
    pub fn new() -> Self {
        Self::with_cache(Arc::new(SharedCache::new()))
    }

    /// Store backed by the process-wide cache.
    pub fn shared() -> Self {
        Self::with_cache(SHARED_CACHE.clone())
    }

    /// Store that reparses on every call.
    pub fn uncached() -> Self {
        Self::with_cache(Arc::new(NoCache))
    }

    pub fn with_cache(cache: Arc<dyn ManifestCache>) -> Self {
        Self {
            cache,
            encoding: encoding_rs::UTF_8,
        }
    }

    /// Character encoding used to read and write manifest files.
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn cache(&self) -> &Arc<dyn ManifestCache> {
        &self.cache
    }

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    /// Load `path` with every import directive expanded.
    pub fn load(&self, path: &Path) -> Result<Arc<Manifest>, LoadError> {
        let mut ctx = ResolveContext::new();
        self.load_in(path, &mut ctx)
    }

    /// Load `path` and keep only the entries visible in `scope`.
    pub fn load_filtered(&self, path: &Path, scope: Scope) -> Result<Arc<Manifest>, LoadError> {
        let canonical = canonical_manifest_path(path)?;
        let key = CacheKey::filtered(canonical.clone(), scope);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let filtered = Arc::new(self.load(&canonical)?.filtered(scope));
        self.cache.put(key, Arc::clone(&filtered));
        Ok(filtered)
    }

    /// Manifest to serve for `scope`.
    ///
    /// For `Aggregated`, the `<base>.aggr.<ext>` sibling written by a previous
    /// aggregation is preferred and returned whole, since it already holds
    /// only the aggregated view. Without one, the source manifest is used.
    pub fn load_for_delivery(&self, path: &Path, scope: Scope) -> Result<Arc<Manifest>, LoadError> {
        if scope == Scope::Aggregated {
            let sibling = aggregated_path(path);
            if sibling.is_file() {
                return self.load(&sibling);
            }
            log!(
                "warning";
                "could not find aggregated manifest {} for {}, falling back on unaggregated version",
                sibling.display(),
                path.display()
            );
        }
        self.load_filtered(path, scope)
    }

    fn load_in(&self, path: &Path, ctx: &mut ResolveContext) -> Result<Arc<Manifest>, LoadError> {
        let canonical = canonical_manifest_path(path)?;
        let key = CacheKey::resolved(canonical.clone());
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        ctx.enter(&canonical)?;
        let result = self.parse_and_resolve(&canonical, ctx);
        ctx.leave(&canonical);

        let manifest = Arc::new(result?);
        self.cache.put(key, Arc::clone(&manifest));
        Ok(manifest)
    }

    fn parse_and_resolve(&self, path: &Path, ctx: &mut ResolveContext) -> Result<Manifest, LoadError> {
        debug!("manifest"; "loading manifest {}", path.display());

        let content = self.read_text(path)?;
        let parsed = xml::parse(&content, path)?;
        let dir = path.parent().unwrap_or_else(|| Path::new(""));

        let mut resolved = Manifest {
            css: Vec::with_capacity(parsed.css.len()),
            js: Vec::with_capacity(parsed.js.len()),
            parameters: parsed.parameters.clone(),
        };

        for kind in AssetKind::ALL {
            for entry in parsed.entries(kind) {
                if !entry.import {
                    resolved.entries_mut(kind).push(entry.clone());
                    continue;
                }

                let imported = self.load_in(&dir.join(&entry.value), ctx)?;
                let prefix = value_dir(&entry.value);
                resolved
                    .entries_mut(kind)
                    .extend(imported.entries(kind).iter().map(|e| rebase(e, prefix)));
            }
        }

        Ok(resolved)
    }

    fn read_text(&self, path: &Path) -> Result<String, LoadError> {
        let io_err = |source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = fs::File::open(path).map_err(io_err)?;
        let mut reader = BomStripReader::new(io::BufReader::new(file));
        let mut bytes = Vec::new();
        io::Read::read_to_end(&mut reader, &mut bytes).map_err(io_err)?;
        Ok(text::decode(&bytes, self.encoding))
    }

    // ------------------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------------------

    /// Write `manifest` to `path` in the store's encoding.
    pub fn save(&self, manifest: &Manifest, path: &Path) -> io::Result<()> {
        let xml = xml::to_xml(manifest, self.encoding.name());
        let (bytes, _, _) = self.encoding.encode(&xml);
        fs::write(path, &bytes)
    }
}

/// Copy of an imported entry with its value made relative to the importer.
///
/// `prefix` is the directory part of the import directive's value.
/// Absolute entries pass through untouched.
fn rebase(entry: &Entry, prefix: &str) -> Entry {
    let mut copy = entry.clone();
    if !copy.is_absolute() {
        copy.value = format!("{prefix}{}", entry.value);
    }
    copy
}

fn canonical_manifest_path(path: &Path) -> Result<PathBuf, LoadError> {
    path.canonicalize().map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            LoadError::NotFound {
                path: std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
            }
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// File name of the aggregated form of a manifest.
///
/// # Examples
/// ```
/// use skinpack::manifest::aggregated_name;
/// assert_eq!(aggregated_name("skin.xml"), "skin.aggr.xml");
/// assert_eq!(aggregated_name("skins/default/skin.xml"), "skin.aggr.xml");
/// assert_eq!(aggregated_name("skin"), "skin.aggr");
/// ```
pub fn aggregated_name(manifest: impl AsRef<Path>) -> String {
    let manifest = manifest.as_ref();
    let name = manifest
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| manifest.to_string_lossy());

    match name.rsplit_once('.') {
        Some((base, ext)) => format!("{base}{AGGREGATED_INFIX}{ext}"),
        None => format!("{name}{}", AGGREGATED_INFIX.trim_end_matches('.')),
    }
}

/// Sibling path holding the aggregated form of `manifest`.
pub fn aggregated_path(manifest: &Path) -> PathBuf {
    manifest.with_file_name(aggregated_name(manifest))
}
