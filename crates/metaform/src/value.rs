//! property value representation
//!
//! A property of a block holds one of
//! - a literal (string, integer, decimal, boolean)
//! - a [Reference] to an attribute of another block (rendered unquoted)
//! - a list of values
//! - a map (order-preserving, string keys) of values
//! - a nested [Block]
//!
//! There is no `null`. Expressions beyond these shapes (function calls, operators, templates) are not supported.
use crate::block::Block;
use crate::reference::Reference;
use std::sync::Arc;

/// Ordered property map of a block
pub type Properties = indexmap::IndexMap<String, Value>;

/// All possible property values
#[derive(Debug, Clone)]
pub enum Value {
    Literal(Literal),
    Reference(Reference),
    List(Vec<Value>),
    Map(indexmap::IndexMap<String, Value>),
    Nested(Arc<Block>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
}

impl Value {
    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn map<K: Into<String>, V: Into<Value>>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<Literal> for Value {
    fn from(value: Literal) -> Self {
        Value::Literal(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Literal::String(value).into()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string()).into()
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Literal::Boolean(value).into()
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Literal::Integer(value).into()
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Literal::Integer(value.into()).into()
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Literal::Integer(value.into()).into()
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Literal::Decimal(value).into()
    }
}

impl From<Reference> for Value {
    fn from(value: Reference) -> Self {
        Value::Reference(value)
    }
}

impl From<Arc<Block>> for Value {
    fn from(value: Arc<Block>) -> Self {
        Value::Nested(value)
    }
}

impl From<&Arc<Block>> for Value {
    fn from(value: &Arc<Block>) -> Self {
        Value::Nested(value.clone())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::list(value)
    }
}

impl<K: Into<String>, V: Into<Value>> From<indexmap::IndexMap<K, V>> for Value {
    fn from(value: indexmap::IndexMap<K, V>) -> Self {
        Value::map(value)
    }
}

/// Utility macro to create an ordered property map
///
/// ```
/// # use metaform::properties;
/// let props = properties! {
///     "ami" => "ami-123",
///     "count" => 2,
///     "monitoring" => true,
/// };
/// assert_eq!(props.len(), 3);
/// assert_eq!(props.get_index(0).unwrap().0, "ami");
/// ```
///
/// An empty map
/// ```
/// # use metaform::properties;
/// assert!(properties! {}.is_empty());
/// ```
#[macro_export]
macro_rules! properties {
    { $($key:expr => $value:expr),* $(,)? } => {{
        #[allow(unused_mut)]
        let mut props = $crate::value::Properties::new();
        $(
            props.insert(::std::string::String::from($key), $crate::value::Value::from($value));
        )*
        props
    }};
}
