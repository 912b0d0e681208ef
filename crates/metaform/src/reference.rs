//! attribute references between blocks
use crate::block::Block;
use std::sync::Arc;

/// Deferred pointer to an attribute of another block
///
/// Rendered unquoted as `<identity>.<attribute>`. The attribute is never checked against the referenced block.
#[derive(derive_new::new, Debug, Clone)]
pub struct Reference {
    base: Arc<Block>,
    attribute: String,
}

impl Reference {
    pub fn base(&self) -> &Arc<Block> {
        &self.base
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.base.identity(), self.attribute)
    }
}
