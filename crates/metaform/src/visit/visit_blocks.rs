use super::Visit;
use crate::block::Block;
use crate::value::Value;
use std::sync::Arc;

/// Visit every [Block] a value points at
///
/// References yield their base block, nested values yield the nested block itself. Lists and maps are walked
/// recursively. The visited blocks are not descended into.
pub trait VisitBlocks {
    fn visit_blocks(&self, visitor: &mut dyn Visit<Arc<Block>>);
}

impl VisitBlocks for Value {
    fn visit_blocks(&self, visitor: &mut dyn Visit<Arc<Block>>) {
        match self {
            Value::Literal(_) => {}
            Value::Reference(reference) => visitor.visit(reference.base()),
            Value::Nested(block) => visitor.visit(block),
            Value::List(items) => {
                for item in items {
                    item.visit_blocks(visitor);
                }
            }
            Value::Map(entries) => {
                for value in entries.values() {
                    value.visit_blocks(visitor);
                }
            }
        }
    }
}

impl VisitBlocks for crate::value::Properties {
    fn visit_blocks(&self, visitor: &mut dyn Visit<Arc<Block>>) {
        for value in self.values() {
            value.visit_blocks(visitor);
        }
    }
}
