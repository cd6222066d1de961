//! Skin manifests: model, XML format and the caching, import-resolving store.
//!
//! # Module Structure
//!
//! ```text
//! manifest/
//! ├── model      # Manifest, Entry, Parameter, Scope
//! ├── xml        # parse / to_xml
//! ├── cache      # ManifestCache, SharedCache, NoCache
//! ├── resolve    # ResolveContext (import cycle detection)
//! └── store      # ManifestStore, aggregated_name
//! ```

pub mod cache;
mod model;
mod resolve;
mod store;
pub mod xml;

pub use cache::{CacheKey, ManifestCache, NoCache, SharedCache};
pub use model::{Entry, Manifest, Parameter, Scope, UnknownScope};
pub use resolve::ResolveContext;
pub use store::{AGGREGATED_INFIX, ManifestStore, aggregated_name, aggregated_path};
