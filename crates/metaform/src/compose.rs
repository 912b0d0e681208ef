//! build context
//!
//! A [Composer] owns the [Registry] and one [Group] per [Kind] of a single build. Blocks are created through it,
//! and once everything is described [Composer::write] resolves the dependency layers and renders the document.
use crate::block::{Block, BlockBuilder, ShapeError};
use crate::kind::Kind;
use crate::registry::{Group, Registry};
use crate::render;
use crate::resolve::{self, DependencyError, DependencyMap, Layer};
use crate::value::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Debug)]
pub struct Composer {
    registry: Registry,
    groups: indexmap::IndexMap<Kind, Group>,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

impl Composer {
    pub fn new() -> Self {
        Self::with_registry(Registry::default())
    }

    /// Continue a build on an existing registry
    pub fn with_registry(registry: Registry) -> Self {
        let groups = Kind::ALL
            .into_iter()
            .map(|kind| (kind, Group::new(kind, false)))
            .collect();
        Self { registry, groups }
    }

    /// Permit (or forbid) registering an identity of `kind` twice; the later block wins
    pub fn allow_duplicates(mut self, kind: Kind, allow: bool) -> Self {
        self.set_allow_duplicates(kind, allow);
        self
    }

    pub fn set_allow_duplicates(&mut self, kind: Kind, allow: bool) {
        self.group_mut(kind).set_allow_duplicates(allow);
    }

    /// Start over with an empty registry, keeping the duplicate policy
    pub fn clear(&mut self) {
        self.registry = Registry::default();
        for group in self.groups.values_mut() {
            *group = Group::new(group.kind(), group.allows_duplicates());
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn group(&self, kind: Kind) -> &Group {
        &self.groups[&kind]
    }

    fn group_mut(&mut self, kind: Kind) -> &mut Group {
        self.groups
            .entry(kind)
            .or_insert_with(|| Group::new(kind, false))
    }

    /// Build and register a block
    pub fn add(&mut self, builder: BlockBuilder) -> Result<Arc<Block>, ShapeError> {
        let kind = builder.kind();
        let group = self
            .groups
            .entry(kind)
            .or_insert_with(|| Group::new(kind, false));
        group.create(&mut self.registry, builder)
    }

    pub fn block<S, K, V>(
        &mut self,
        kind: Kind,
        ids: impl IntoIterator<Item = S>,
        properties: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Arc<Block>, ShapeError>
    where
        S: Into<String>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.add(Block::builder(kind).ids(ids).properties(properties))
    }

    pub fn variable<K: Into<String>, V: Into<Value>>(
        &mut self,
        name: &str,
        properties: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Arc<Block>, ShapeError> {
        self.block(Kind::Variable, [name], properties)
    }

    pub fn data<K: Into<String>, V: Into<Value>>(
        &mut self,
        data_type: &str,
        name: &str,
        properties: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Arc<Block>, ShapeError> {
        self.block(Kind::Data, [data_type, name], properties)
    }

    pub fn resource<K: Into<String>, V: Into<Value>>(
        &mut self,
        resource_type: &str,
        name: &str,
        properties: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Arc<Block>, ShapeError> {
        self.block(Kind::Resource, [resource_type, name], properties)
    }

    pub fn module<K: Into<String>, V: Into<Value>>(
        &mut self,
        name: &str,
        properties: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Arc<Block>, ShapeError> {
        self.block(Kind::Module, [name], properties)
    }

    pub fn output<K: Into<String>, V: Into<Value>>(
        &mut self,
        name: &str,
        properties: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Arc<Block>, ShapeError> {
        self.block(Kind::Output, [name], properties)
    }

    pub fn provider<K: Into<String>, V: Into<Value>>(
        &mut self,
        name: &str,
        properties: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Arc<Block>, ShapeError> {
        self.block(Kind::Provider, [name], properties)
    }

    pub fn property<K: Into<String>, V: Into<Value>>(
        &mut self,
        name: &str,
        properties: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Arc<Block>, ShapeError> {
        self.block(Kind::Property, [name], properties)
    }

    /// Anonymous map block, see [BlockBuilder::assignment] for the named form
    pub fn map<K: Into<String>, V: Into<Value>>(
        &mut self,
        properties: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Arc<Block>, ShapeError> {
        self.block(Kind::Map, Vec::<String>::new(), properties)
    }

    /// Registry lookup across all kinds
    pub fn get(&self, identity: &str) -> Result<&Arc<Block>, ShapeError> {
        self.registry.get(identity)
    }

    /// Dependencies of every scheduled block, by identity
    ///
    /// Dependencies on unscheduled blocks (properties, maps) are replaced by what those blocks depend on.
    pub fn dependency_map(&self) -> DependencyMap {
        self.registry
            .blocks()
            .filter(|block| block.kind().is_scheduled())
            .map(|block| {
                let mut identities = BTreeSet::new();
                project(block, &mut identities);
                (block.identity().to_string(), identities)
            })
            .collect()
    }

    pub fn layers(&self) -> Result<Vec<Layer>, DependencyError> {
        resolve::resolve_layers(&self.dependency_map(), BTreeSet::new())
    }

    /// Every scheduled block in emission order
    ///
    /// Layer by layer; inside a layer by kind priority, then identity.
    pub fn collect(&self) -> Result<Vec<Arc<Block>>, DependencyError> {
        let mut ordered = vec![];
        for layer in self.layers()? {
            // layers only hold identities taken from the registry
            let mut blocks: Vec<_> = layer
                .iter()
                .filter_map(|identity| self.registry.get(identity).ok().cloned())
                .collect();
            blocks.sort_by(|a, b| {
                (a.kind().priority(), a.identity()).cmp(&(b.kind().priority(), b.identity()))
            });
            ordered.extend(blocks);
        }
        Ok(ordered)
    }

    /// Resolve and render the whole document
    pub fn write(&self) -> Result<String, DependencyError> {
        let blocks = self.collect()?;
        tracing::debug!(blocks = blocks.len(), "rendering document");
        Ok(render::document(&blocks))
    }
}

fn project(block: &Block, identities: &mut BTreeSet<String>) {
    for dependency in block.dependencies() {
        if dependency.kind().is_scheduled() {
            identities.insert(dependency.identity().to_string());
        } else {
            project(dependency, identities);
        }
    }
}

/// Any failure of a build
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Dependency(#[from] DependencyError),
}
