//! dependency layering
//!
//! Blocks are grouped into generations. A node joins the first layer in which all of its dependencies are already
//! satisfied by earlier layers. When an iteration finds no new node while some are still unsatisfied the input
//! either contains a cycle or points at a node that does not exist.
use std::collections::{BTreeMap, BTreeSet};

/// identity -> identities it depends on
pub type DependencyMap = BTreeMap<String, BTreeSet<String>>;

/// Identities whose dependencies are covered by earlier layers
pub type Layer = BTreeSet<String>;

/// Compute dependency layers
///
/// `satisfied` seeds the set of identities considered resolved before the first layer.
pub fn resolve_layers(
    dependencies: &DependencyMap,
    mut satisfied: BTreeSet<String>,
) -> Result<Vec<Layer>, DependencyError> {
    let mut layers = vec![];

    loop {
        let remaining: Vec<&String> = dependencies
            .keys()
            .filter(|node| !satisfied.contains(*node))
            .collect();
        if remaining.is_empty() {
            return Ok(layers);
        }

        let layer: Layer = remaining
            .iter()
            .filter(|node| dependencies[**node].is_subset(&satisfied))
            .map(|node| (*node).clone())
            .collect();

        if layer.is_empty() {
            let unresolved: Vec<String> = remaining.into_iter().cloned().collect();
            tracing::debug!(?unresolved, "no resolvable node left");
            return Err(DependencyError { unresolved });
        }

        tracing::debug!(index = layers.len(), nodes = ?layer, "layer resolved");
        satisfied.extend(layer.iter().cloned());
        layers.push(layer);
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error(
    "unable to resolve dependencies of {}, ensure they are consistent and non-circular",
    unresolved.join(", ")
)]
pub struct DependencyError {
    /// Identities that could not be placed in any layer, sorted
    pub unresolved: Vec<String>,
}
