//! configuration blocks
//!
//! A [Block] is built once through a [BlockBuilder] and never changes afterwards. Building checks the identifier
//! count against the kind's valence and then computes the block's dependencies by walking its own properties.
use crate::kind::Kind;
use crate::reference::Reference;
use crate::value::{Properties, Value};
use crate::visit::VisitBlocks;
use std::sync::Arc;

#[derive(Debug)]
pub struct Block {
    pub(crate) kind: Kind,
    /// Header keyword, the kind keyword unless the kind derives it from its first identifier
    pub(crate) keyword: String,
    /// Quoted header labels
    pub(crate) labels: Vec<String>,
    pub(crate) identity: String,
    pub(crate) properties: Properties,
    pub(crate) dependencies: Vec<Arc<Block>>,
    /// wrap map values in `tomap(..)`
    pub(crate) tomap: bool,
    /// render the header as `<name> = {`
    pub(crate) assignment: bool,
    pub(crate) comment: Option<String>,
}

impl Block {
    pub fn builder(kind: Kind) -> BlockBuilder {
        BlockBuilder::new(kind)
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Canonical key: kind abbreviation followed by the non-empty identifiers, joined by `.`
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Blocks this block has to be emitted after
    pub fn dependencies(&self) -> &[Arc<Block>] {
        &self.dependencies
    }

    /// Reference an attribute of this block
    pub fn attr(self: &Arc<Self>, attribute: impl Into<String>) -> Reference {
        Reference::new(self.clone(), attribute.into())
    }

    /// Whether this block, or anything it depends on, is addressable
    pub fn reaches_addressable(&self) -> bool {
        self.kind.is_addressable()
            || self
                .dependencies
                .iter()
                .any(|dependency| dependency.reaches_addressable())
    }
}

#[derive(Debug, Clone)]
pub struct BlockBuilder {
    kind: Kind,
    ids: Vec<String>,
    properties: Properties,
    tomap: bool,
    assignment: bool,
    comment: Option<String>,
}

impl BlockBuilder {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            ids: vec![],
            properties: Properties::new(),
            tomap: true,
            assignment: false,
            comment: None,
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.ids.push(id.into());
        self
    }

    pub fn ids<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn properties<K: Into<String>, V: Into<Value>>(
        mut self,
        properties: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        self.properties.extend(
            properties
                .into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        );
        self
    }

    /// Wrap map values in `tomap(..)` (default) or print them as bare objects
    pub fn tomap(mut self, tomap: bool) -> Self {
        self.tomap = tomap;
        self
    }

    /// Render a map block as an assignment (`<name> = {`)
    ///
    /// The map then takes exactly one identifier, its name.
    pub fn assignment(mut self) -> Self {
        self.assignment = true;
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    fn expected_valence(&self) -> usize {
        match self.kind {
            Kind::Map if self.assignment => 1,
            kind => kind.valence(),
        }
    }

    pub fn build(self) -> Result<Block, ShapeError> {
        let expected = self.expected_valence();
        if self.ids.len() != expected {
            return Err(ShapeError::Valence {
                kind: self.kind,
                expected,
                actual: self.ids.len(),
            });
        }

        if let Some(key) = self
            .properties
            .keys()
            .find(|key| hcl::Identifier::new(key.as_str()).is_err())
        {
            return Err(ShapeError::InvalidPropertyName(key.clone()));
        }

        let (keyword, labels) = match self.kind {
            Kind::Property => (self.ids[0].clone(), self.ids[1..].to_vec()),
            Kind::Map if self.assignment => (self.ids[0].clone(), vec![]),
            kind => (kind.keyword().to_string(), self.ids),
        };

        let abbreviation = match self.kind {
            Kind::Property => keyword.as_str(),
            kind => kind.abbreviation(),
        };
        let identity = std::iter::once(abbreviation)
            .chain(labels.iter().map(String::as_str))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(".");

        let dependencies = infer_dependencies(&self.properties);
        tracing::trace!(%identity, dependencies = dependencies.len(), "block built");

        Ok(Block {
            kind: self.kind,
            keyword,
            labels,
            identity,
            properties: self.properties,
            dependencies,
            tomap: self.tomap,
            assignment: self.assignment,
            comment: self.comment,
        })
    }
}

/// Collect the blocks a property map depends on
///
/// Every block reached through a nested value or a reference is a candidate. A candidate is kept when it is
/// addressable itself or transitively depends on an addressable block. The candidate is recorded, not the block
/// deeper down that made it relevant.
fn infer_dependencies(properties: &Properties) -> Vec<Arc<Block>> {
    let mut dependencies: Vec<Arc<Block>> = vec![];
    let mut collect = |candidate: &Arc<Block>| {
        if !candidate.reaches_addressable() {
            return;
        }

        if dependencies
            .iter()
            .any(|known| Arc::ptr_eq(known, candidate))
        {
            return;
        }

        tracing::trace!(dependency = candidate.identity(), "dependency found");
        dependencies.push(candidate.clone());
    };

    properties.visit_blocks(&mut collect);
    dependencies
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ShapeError {
    #[error("{kind} requires {expected} identifier(s), but got {actual}")]
    Valence {
        kind: Kind,
        expected: usize,
        actual: usize,
    },
    #[error("property name {0:?} is not a valid identifier")]
    InvalidPropertyName(String),
    #[error("block {0} is already registered")]
    Duplicate(String),
    #[error("block {0} is not registered")]
    NotRegistered(String),
}
