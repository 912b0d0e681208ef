//! identity bookkeeping
//!
//! The [Registry] maps identities to blocks across all kinds of one build. Each kind has a [Group] that builds blocks
//! of that kind, registers them and remembers them locally.
use crate::block::{Block, BlockBuilder, ShapeError};
use crate::kind::Kind;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct Registry {
    blocks: indexmap::IndexMap<String, Arc<Block>>,
}

impl Registry {
    /// Register a block under its identity
    ///
    /// With `allow_duplicates` an existing entry is replaced, otherwise a collision is an error.
    pub fn put(&mut self, block: Arc<Block>, allow_duplicates: bool) -> Result<(), ShapeError> {
        let identity = block.identity().to_string();
        if self.blocks.contains_key(&identity) {
            if !allow_duplicates {
                return Err(ShapeError::Duplicate(identity));
            }
            tracing::warn!(%identity, "replacing registered block");
        }

        tracing::debug!(%identity, "block registered");
        self.blocks.insert(identity, block);
        Ok(())
    }

    pub fn get(&self, identity: &str) -> Result<&Arc<Block>, ShapeError> {
        self.blocks
            .get(identity)
            .ok_or_else(|| ShapeError::NotRegistered(identity.to_string()))
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.blocks.contains_key(identity)
    }

    /// Blocks in registration order
    pub fn blocks(&self) -> impl Iterator<Item = &Arc<Block>> {
        self.blocks.values()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Factory and local namespace for one [Kind]
#[derive(derive_new::new, Debug)]
pub struct Group {
    kind: Kind,
    allow_duplicates: bool,
    #[new(default)]
    blocks: indexmap::IndexMap<String, Arc<Block>>,
}

impl Group {
    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn allows_duplicates(&self) -> bool {
        self.allow_duplicates
    }

    pub fn set_allow_duplicates(&mut self, allow: bool) {
        self.allow_duplicates = allow;
    }

    /// Build a block of this group's kind and register it
    ///
    /// Anonymous kinds (maps) are built but neither registered nor remembered.
    pub fn create(
        &mut self,
        registry: &mut Registry,
        builder: BlockBuilder,
    ) -> Result<Arc<Block>, ShapeError> {
        assert_eq!(
            builder.kind(),
            self.kind,
            "builder routed to the wrong group"
        );

        let block = Arc::new(builder.build()?);
        if !self.kind.is_registered() {
            return Ok(block);
        }

        registry.put(block.clone(), self.allow_duplicates)?;
        self.blocks
            .insert(block.identity().to_string(), block.clone());
        Ok(block)
    }

    /// Lookup within this group only
    pub fn get(&self, identity: &str) -> Result<&Arc<Block>, ShapeError> {
        self.blocks
            .get(identity)
            .ok_or_else(|| ShapeError::NotRegistered(identity.to_string()))
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Arc<Block>> {
        self.blocks.values()
    }
}
