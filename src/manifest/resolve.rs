//! Per-call-chain import cycle detection.

use std::path::{Path, PathBuf};

use crate::error::LoadError;

/// Manifests currently being loaded by one top-level `load`, in entry order.
///
/// A fresh context is created for every top-level call and threaded through
/// the recursive import loads, so concurrent loads never see each other.
#[derive(Debug, Default)]
pub struct ResolveContext {
    chain: Vec<PathBuf>,
}

impl ResolveContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path` as loading. Fails if it is already on the chain.
    pub fn enter(&mut self, path: &Path) -> Result<(), LoadError> {
        if self.chain.iter().any(|p| p == path) {
            let mut chain = self.chain.clone();
            chain.push(path.to_path_buf());
            return Err(LoadError::Cycle { chain });
        }
        self.chain.push(path.to_path_buf());
        Ok(())
    }

    /// Pop `path` off the chain.
    pub fn leave(&mut self, path: &Path) {
        if let Some(pos) = self.chain.iter().rposition(|p| p == path) {
            self.chain.truncate(pos);
        }
    }

    pub fn depth(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_leave() {
        let mut ctx = ResolveContext::new();
        ctx.enter(Path::new("/a.xml")).unwrap();
        ctx.enter(Path::new("/b.xml")).unwrap();
        assert_eq!(ctx.depth(), 2);

        ctx.leave(Path::new("/b.xml"));
        ctx.leave(Path::new("/a.xml"));
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_reentry_is_cycle() {
        let mut ctx = ResolveContext::new();
        ctx.enter(Path::new("/a.xml")).unwrap();
        ctx.enter(Path::new("/b.xml")).unwrap();

        match ctx.enter(Path::new("/a.xml")) {
            Err(LoadError::Cycle { chain }) => assert_eq!(
                chain,
                vec![
                    PathBuf::from("/a.xml"),
                    PathBuf::from("/b.xml"),
                    PathBuf::from("/a.xml")
                ]
            ),
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_sibling_reuse_is_not_cycle() {
        let mut ctx = ResolveContext::new();
        ctx.enter(Path::new("/root.xml")).unwrap();
        ctx.enter(Path::new("/shared.xml")).unwrap();
        ctx.leave(Path::new("/shared.xml"));
        assert!(ctx.enter(Path::new("/shared.xml")).is_ok());
    }
}
