//! Identifier-addressed shared caches

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::Cache;

/// A shared store addressed by a stable namespace.
///
/// Identity is the namespace alone: two handles with the same id refer to the
/// same logical cache no matter which store instance they wrap.
#[derive(Clone)]
pub struct NamedCache {
    id: Arc<str>,
    store: Arc<dyn Cache>,
}

impl NamedCache {
    pub fn new(id: impl Into<Arc<str>>, store: Arc<dyn Cache>) -> Self {
        Self {
            id: id.into(),
            store,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn store(&self) -> &Arc<dyn Cache> {
        &self.store
    }
}

impl PartialEq for NamedCache {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for NamedCache {}

impl Hash for NamedCache {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for NamedCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedCache")
            .field("id", &self.id)
            .field("store", &self.store)
            .finish()
    }
}
