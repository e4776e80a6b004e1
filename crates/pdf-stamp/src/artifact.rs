//! Composed artifacts and the lifetime of their memory-backed handles
//!
//! Every artifact gets an [`ArtifactHandle`] minted by a [`HandleRegistry`].
//! While the handle is live, its bytes can be resolved through the registry
//! by [`HandleId`], the way a viewer would open an object URL. A handle is
//! revoked exactly once: explicitly through [`ArtifactHandle::revoke`], or
//! when it is dropped.

use crate::types::ArtifactKind;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Opaque identifier of a minted handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "artifact:{}", self.0)
    }
}

/// Counters describing every handle a registry has seen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryStats {
    pub minted: u64,
    pub revoked: u64,
    pub live: usize,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    live: HashMap<HandleId, Arc<[u8]>>,
    minted: u64,
    revoked: u64,
}

/// Shared table of live artifact handles.
///
/// Clones share the same table.
#[derive(Clone, Default)]
pub struct HandleRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mint a new handle backed by `bytes`
    pub fn mint(&self, bytes: Arc<[u8]>) -> ArtifactHandle {
        let mut inner = self.lock();
        let id = HandleId(inner.next_id);
        inner.next_id += 1;
        inner.minted += 1;
        inner.live.insert(id, bytes);
        drop(inner);

        log::debug!("Minted {}", id);
        ArtifactHandle {
            id,
            registry: self.clone(),
            revoked: false,
        }
    }

    /// Bytes behind a live handle; `None` once it has been revoked
    pub fn resolve(&self, id: HandleId) -> Option<Arc<[u8]>> {
        self.lock().live.get(&id).cloned()
    }

    pub fn is_live(&self, id: HandleId) -> bool {
        self.lock().live.contains_key(&id)
    }

    pub fn live_count(&self) -> usize {
        self.lock().live.len()
    }

    pub fn stats(&self) -> RegistryStats {
        let inner = self.lock();
        RegistryStats {
            minted: inner.minted,
            revoked: inner.revoked,
            live: inner.live.len(),
        }
    }

    fn revoke(&self, id: HandleId) -> bool {
        let mut inner = self.lock();
        if inner.live.remove(&id).is_some() {
            inner.revoked += 1;
            true
        } else {
            false
        }
    }
}

impl fmt::Debug for HandleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleRegistry")
            .field("stats", &self.stats())
            .finish()
    }
}

/// Scoped reference to an artifact's bytes.
///
/// Not `Clone`: each handle has a single owner and is revoked once.
#[derive(Debug)]
pub struct ArtifactHandle {
    id: HandleId,
    registry: HandleRegistry,
    revoked: bool,
}

impl ArtifactHandle {
    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    /// Revoke the handle. Calling this again is a no-op.
    pub fn revoke(&mut self) {
        if self.revoked {
            return;
        }
        self.revoked = true;
        if self.registry.revoke(self.id) {
            log::debug!("Revoked {}", self.id);
        }
    }
}

impl Drop for ArtifactHandle {
    fn drop(&mut self) {
        self.revoke();
    }
}

/// One stamped output document
#[derive(Debug)]
pub struct ComposedArtifact {
    kind: ArtifactKind,
    source_index: usize,
    name: String,
    bytes: Arc<[u8]>,
    handle: ArtifactHandle,
}

impl ComposedArtifact {
    /// Wrap composed bytes, minting a handle for them in `registry`
    pub fn new(
        registry: &HandleRegistry,
        kind: ArtifactKind,
        source_index: usize,
        name: String,
        bytes: Vec<u8>,
    ) -> Self {
        let bytes: Arc<[u8]> = bytes.into();
        let handle = registry.mint(Arc::clone(&bytes));
        Self {
            kind,
            source_index,
            name,
            bytes,
            handle,
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Position of the originating document in the selection
    pub fn source_index(&self) -> usize {
        self.source_index
    }

    /// Derived output name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn handle(&self) -> &ArtifactHandle {
        &self.handle
    }

    pub fn revoke(&mut self) {
        self.handle.revoke();
    }
}

/// Revoke every handle in `artifacts`, then drop them
pub fn revoke_all(artifacts: &mut Vec<ComposedArtifact>) {
    for artifact in artifacts.iter_mut() {
        artifact.revoke();
    }
    artifacts.clear();
}
