//! Composite cache keys for statement results

use std::fmt;
use std::hash::{Hash, Hasher};

use sha2::{Digest, Sha256};

use crate::domain::statement::{ParamValue, ParameterObject, RowBounds, Statement};
use crate::domain::DomainError;

const DEFAULT_MULTIPLIER: u64 = 37;
const DEFAULT_HASHCODE: u64 = 17;

/// Order-sensitive composite key.
///
/// Every component folds into a running hash and checksum; two keys are equal
/// when they were built from the same components in the same order.
#[derive(Debug, Clone)]
pub struct CacheKey {
    multiplier: u64,
    hashcode: u64,
    checksum: u64,
    count: usize,
    components: Vec<ParamValue>,
}

impl CacheKey {
    pub fn new() -> Self {
        Self {
            multiplier: DEFAULT_MULTIPLIER,
            hashcode: DEFAULT_HASHCODE,
            checksum: 0,
            count: 0,
            components: Vec::new(),
        }
    }

    /// Creates a key from an ordered list of components
    pub fn from_components<I, T>(components: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ParamValue>,
    {
        let mut key = Self::new();
        key.update_all(components);
        key
    }

    /// Builds the lookup key for one statement invocation: statement id,
    /// pagination, SQL text, every non-output parameter and the environment id.
    pub fn for_statement(
        statement: &Statement,
        parameters: &ParameterObject,
        bounds: RowBounds,
        environment_id: Option<&str>,
    ) -> Result<Self, DomainError> {
        let bound = statement.bind(parameters).map_err(|e| {
            DomainError::key_composition(format!(
                "Cannot build cache key for '{}': {}",
                statement.id, e
            ))
        })?;

        let mut key = Self::new();
        key.update(statement.id.as_str());
        key.update(bounds.offset);
        key.update(bounds.limit);
        key.update(bound.sql.as_str());
        key.update_all(bound.input_values().cloned());

        if let Some(environment_id) = environment_id {
            key.update(environment_id);
        }

        Ok(key)
    }

    /// Appends a component
    pub fn update(&mut self, component: impl Into<ParamValue>) {
        let component = component.into();
        let base = Self::component_hash(&component);

        self.count += 1;
        self.checksum = self.checksum.wrapping_add(base);
        let weighted = base.wrapping_mul(self.count as u64);
        self.hashcode = self
            .multiplier
            .wrapping_mul(self.hashcode)
            .wrapping_add(weighted);

        self.components.push(component);
    }

    /// Appends components in order
    pub fn update_all<I, T>(&mut self, components: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<ParamValue>,
    {
        for component in components {
            self.update(component);
        }
    }

    pub fn update_count(&self) -> usize {
        self.count
    }

    pub fn components(&self) -> &[ParamValue] {
        &self.components
    }

    /// Key under which the shared store keeps the entry
    pub fn storage_key(&self) -> String {
        let digest = Sha256::digest(self.to_string().as_bytes());
        hex::encode(digest)
    }

    fn component_hash(component: &ParamValue) -> u64 {
        if component.is_null() {
            return 1;
        }

        let mut digest = Sha256::new();
        feed_canonical(&mut digest, component);

        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.finalize()[..8]);
        u64::from_le_bytes(head)
    }
}

/// Writes a tagged, length-prefixed encoding of the component so the hash is
/// independent of the toolchain and of the process.
fn feed_canonical(digest: &mut Sha256, component: &ParamValue) {
    match component {
        ParamValue::Null => digest.update([0u8]),
        ParamValue::Bool(v) => {
            digest.update([1u8]);
            digest.update([u8::from(*v)]);
        }
        ParamValue::Int(v) => {
            digest.update([2u8]);
            digest.update(v.to_le_bytes());
        }
        ParamValue::Float(v) => {
            digest.update([3u8]);
            digest.update(v.to_bits().to_le_bytes());
        }
        ParamValue::Text(v) => {
            digest.update([4u8]);
            digest.update((v.len() as u64).to_le_bytes());
            digest.update(v.as_bytes());
        }
        ParamValue::Bytes(v) => {
            digest.update([5u8]);
            digest.update((v.len() as u64).to_le_bytes());
            digest.update(v);
        }
        ParamValue::Array(items) => {
            digest.update([6u8]);
            digest.update((items.len() as u64).to_le_bytes());
            for item in items {
                feed_canonical(digest, item);
            }
        }
    }
}

impl Default for CacheKey {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.hashcode == other.hashcode
            && self.checksum == other.checksum
            && self.count == other.count
            && self.components == other.components
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hashcode.hash(state);
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hashcode, self.checksum)?;
        for component in &self.components {
            write!(f, ":{}", component)?;
        }
        Ok(())
    }
}
