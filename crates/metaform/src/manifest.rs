//! declarative block manifests
//!
//! A manifest describes blocks as data, in YAML or JSON:
//!
//! ```yaml
//! blocks:
//!   - kind: resource
//!     ids: [aws_instance, web]
//!     properties:
//!       ami: ami-123
//!       tags: { env: prod }
//!   - kind: output
//!     ids: [web_id]
//!     properties:
//!       value: ${resource.aws_instance.web.id}
//! ```
//!
//! Property values map onto [Value]s:
//! - strings, numbers and booleans become literals
//! - a string of the exact form `${<identity>.<attribute>}` becomes a [crate::reference::Reference] to an already
//!   declared block
//! - sequences become lists, mappings become maps
//! - a mapping with the single key `$block` holds a nested block declaration
//!
//! Blocks are created in declaration order, so a reference must point at an earlier block. Every identity may be
//! declared once, unless its kind is listed under `allow_duplicates` (the later declaration wins).
use crate::block::{Block, ShapeError};
use crate::compose::{self, Composer};
use crate::kind::Kind;
use crate::value::Value;
use std::path::Path;
use std::sync::Arc;

const NESTED_BLOCK_KEY: &str = "$block";

#[derive(serde::Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub allow_duplicates: Vec<Kind>,
    #[serde(default)]
    pub blocks: Vec<BlockSpec>,
}

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct BlockSpec {
    pub kind: Kind,
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
    #[serde(default = "default_tomap")]
    pub tomap: bool,
    #[serde(default)]
    pub assignment: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

fn default_tomap() -> bool {
    true
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// `.json` files are JSON, everything else is read as YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

impl Manifest {
    pub fn parse(source: &str, format: Format) -> Result<Self, ManifestError> {
        Ok(match format {
            Format::Yaml => serde_yaml::from_str(source)?,
            Format::Json => serde_json::from_str(source)?,
        })
    }

    pub fn load_file(path: &Path) -> Result<Self, ManifestError> {
        tracing::info!(path=%path.display(), "loading manifest");
        let source = std::fs::read_to_string(path)?;
        Self::parse(&source, Format::from_path(path))
    }

    /// Create every declared block, in order
    pub fn apply(&self, composer: &mut Composer) -> Result<Vec<Arc<Block>>, ManifestError> {
        for kind in &self.allow_duplicates {
            composer.set_allow_duplicates(*kind, true);
        }

        self.blocks
            .iter()
            .map(|spec| spec.apply(composer))
            .collect()
    }

    /// Convenience: apply to a fresh [Composer] and render the document
    pub fn render(&self) -> Result<String, ManifestError> {
        let mut composer = Composer::new();
        self.apply(&mut composer)?;
        composer
            .write()
            .map_err(|err| ManifestError::Compose(err.into()))
    }
}

impl BlockSpec {
    pub fn apply(&self, composer: &mut Composer) -> Result<Arc<Block>, ManifestError> {
        let mut builder = Block::builder(self.kind)
            .ids(self.ids.iter().cloned())
            .tomap(self.tomap);
        if self.assignment {
            builder = builder.assignment();
        }
        if let Some(comment) = &self.comment {
            builder = builder.comment(comment.clone());
        }

        for (key, value) in &self.properties {
            let value = convert(composer, key, value)?;
            builder = builder.property(key.clone(), value);
        }

        Ok(composer.add(builder)?)
    }
}

fn convert(
    composer: &mut Composer,
    property: &str,
    value: &serde_json::Value,
) -> Result<Value, ManifestError> {
    use serde_json::Value as Json;

    Ok(match value {
        Json::Null => {
            return Err(ManifestError::InvalidValue {
                property: property.to_string(),
                reason: "null is not supported".to_string(),
            })
        }
        Json::Bool(b) => (*b).into(),
        Json::Number(number) => match number.as_i64() {
            Some(int) => int.into(),
            None => number
                .as_f64()
                .ok_or_else(|| ManifestError::InvalidValue {
                    property: property.to_string(),
                    reason: format!("{number} is out of range"),
                })?
                .into(),
        },
        Json::String(s) => match parse_reference(s) {
            Some((identity, attribute)) => {
                let base = composer.get(identity)?;
                base.attr(attribute).into()
            }
            None => s.as_str().into(),
        },
        Json::Array(items) => Value::List(
            items
                .iter()
                .map(|item| convert(composer, property, item))
                .collect::<Result<_, _>>()?,
        ),
        Json::Object(object) => {
            if let (1, Some(spec)) = (object.len(), object.get(NESTED_BLOCK_KEY)) {
                let spec: BlockSpec = serde_json::from_value(spec.clone())?;
                return Ok(Value::Nested(spec.apply(composer)?));
            }

            Value::Map(
                object
                    .iter()
                    .map(|(key, value)| {
                        convert(composer, property, value).map(|value| (key.clone(), value))
                    })
                    .collect::<Result<_, _>>()?,
            )
        }
    })
}

/// Split `${<identity>.<attribute>}` at the last dot
fn parse_reference(s: &str) -> Option<(&str, &str)> {
    let inner = s.strip_prefix("${")?.strip_suffix('}')?;
    let (identity, attribute) = inner.rsplit_once('.')?;
    if identity.is_empty() || attribute.is_empty() {
        return None;
    }
    Some((identity, attribute))
}

#[derive(thiserror::Error, Debug)]
pub enum ManifestError {
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse yaml manifest")]
    YamlParseFailed(#[from] serde_yaml::Error),
    #[error("Unable to parse json manifest")]
    JsonParseFailed(#[from] serde_json::Error),
    #[error("Invalid value for property {property}: {reason}")]
    InvalidValue { property: String, reason: String },
    #[error(transparent)]
    Compose(#[from] compose::Error),
}

impl From<ShapeError> for ManifestError {
    fn from(value: ShapeError) -> Self {
        ManifestError::Compose(value.into())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::resolve::DependencyError;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn render_yaml(source: &str) -> Result<String, ManifestError> {
        Manifest::parse(source, Format::Yaml)?.render()
    }

    #[test]
    fn reference_syntax() {
        assert_eq!(parse_reference("${var.region.value}"), Some(("var.region", "value")));
        assert_eq!(
            parse_reference("${resource.aws_instance.web.id}"),
            Some(("resource.aws_instance.web", "id"))
        );
        assert_eq!(parse_reference("${nodot}"), None);
        assert_eq!(parse_reference("plain"), None);
        assert_eq!(parse_reference("prefix ${var.a.b}"), None);
    }

    #[test]
    fn yaml_manifest() {
        let document = render_yaml(
            r#"
blocks:
  - kind: output
    ids: [web_id]
    properties:
      value: placeholder
  - kind: resource
    ids: [aws_instance, web]
    properties:
      ami: ami-123
      count: 2
      ratio: 0.5
      public: false
      zones: [a, b]
      tags: { env: prod, team: x }
"#,
        )
        .unwrap();

        assert_eq!(
            document,
            r#"resource "aws_instance" "web" {
  ami    = "ami-123"
  count  = 2
  ratio  = 0.5
  public = false
  zones  = tolist(["a","b"])
  tags   = tomap({ env = "prod", team = "x" })
}

output "web_id" {
  value = "placeholder"
}"#
        );
    }

    #[test]
    fn json_manifest_with_references_and_nested_blocks() {
        let manifest = Manifest::parse(
            r#"{
  "blocks": [
    { "kind": "variable", "ids": ["cidr"], "properties": { "default": "10.0.0.0/16" } },
    { "kind": "resource", "ids": ["aws_security_group", "web"], "properties": {
        "name": "web",
        "ingress": { "$block": { "kind": "property", "ids": ["ingress"], "properties": {
            "cidr_blocks": ["${var.cidr.value}"]
        } } }
    } }
  ]
}"#,
            Format::Json,
        )
        .unwrap();

        let mut composer = Composer::new();
        let blocks = manifest.apply(&mut composer).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            composer.layers().unwrap(),
            vec![
                BTreeSet::from(["var.cidr".to_string()]),
                BTreeSet::from(["resource.aws_security_group.web".to_string()]),
            ]
        );
        assert_eq!(
            composer.write().unwrap(),
            r#"variable "cidr" {
  default = "10.0.0.0/16"
}

resource "aws_security_group" "web" {
  name    = "web"
  ingress {
    cidr_blocks = tolist([var.cidr.value])
  }
}"#
        );
    }

    #[test]
    fn unknown_reference_is_a_shape_error() {
        let err = render_yaml(
            r#"
blocks:
  - kind: output
    ids: [x]
    properties:
      value: ${resource.aws_instance.missing.id}
"#,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ManifestError::Compose(compose::Error::Shape(ShapeError::NotRegistered(identity)))
                if identity == "resource.aws_instance.missing"
        ));
    }

    #[test]
    fn valence_errors_surface() {
        let err = render_yaml("blocks:\n  - kind: data\n    ids: [aws_ami]\n").unwrap_err();
        assert!(matches!(
            err,
            ManifestError::Compose(compose::Error::Shape(ShapeError::Valence { .. }))
        ));
    }

    #[test]
    fn null_is_rejected() {
        let err = render_yaml(
            "blocks:\n  - kind: variable\n    ids: [a]\n    properties:\n      default: null\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ManifestError::InvalidValue { property, .. } if property == "default"
        ));
    }

    #[test]
    fn duplicates_need_to_be_allowed() {
        let blocks = r#"
blocks:
  - kind: resource
    ids: [aws_security_group, web]
    properties:
      ingress: { $block: { kind: property, ids: [ingress], properties: { from_port: 80 } } }
  - kind: resource
    ids: [aws_security_group, db]
    properties:
      ingress: { $block: { kind: property, ids: [ingress], properties: { from_port: 5432 } } }
"#;

        let err = render_yaml(blocks).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::Compose(compose::Error::Shape(ShapeError::Duplicate(identity)))
                if identity == "ingress"
        ));

        let document = render_yaml(&format!("allow_duplicates: [property]\n{blocks}")).unwrap();
        assert!(document.contains("from_port = 5432"));
    }

    #[test]
    fn unknown_kind_fails_to_parse() {
        let err = Manifest::parse("blocks:\n  - kind: locals\n", Format::Yaml).unwrap_err();
        assert!(matches!(err, ManifestError::YamlParseFailed(_)));
    }

    #[test]
    fn assignment_map_and_comment() {
        let document = render_yaml(
            r#"
blocks:
  - kind: module
    ids: [vpc]
    comment: network
    properties:
      source: ./vpc
      tags:
        $block:
          kind: map
          ids: [tags]
          assignment: true
          properties:
            env: prod
"#,
        )
        .unwrap();

        assert_eq!(
            document,
            r#"# network
module "vpc" {
  source = "./vpc"
  tags = {
    env = "prod"
  }
}"#
        );
    }

    #[test]
    fn load_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.json");
        std::fs::write(
            &path,
            r#"{ "blocks": [ { "kind": "provider", "ids": ["aws"], "properties": { "region": "eu-west-1" } } ] }"#,
        )
        .unwrap();

        let document = Manifest::load_file(&path).unwrap().render().unwrap();
        assert_eq!(document, "provider \"aws\" {\n  region = \"eu-west-1\"\n}");
    }

    #[test]
    fn dependency_errors_are_wrapped() {
        let err: ManifestError = compose::Error::from(DependencyError {
            unresolved: vec!["a".into()],
        })
        .into();
        assert!(err.to_string().starts_with("unable to resolve dependencies of a"));
    }
}
