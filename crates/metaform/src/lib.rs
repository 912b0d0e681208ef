//! # metaform - compose declarative infrastructure configuration
//!
//! Describe terraform-style configuration with typed blocks in Rust (or a YAML/JSON manifest) and render it as an
//! HCL document in which every block comes after the blocks it depends on.
//!
//! ## Introduction for developers
//!
//! Read this to understand how `metaform` works internally.
//!
//! ### Blocks
//!
//! A [block::Block] has
//! - a [kind::Kind] (`variable`, `data`, `module`, `resource`, `property`, `map`, `output`, `provider`)
//! - as many identifiers as the kind requires (its valence, e.g. `resource "aws_instance" "web"` has two)
//! - an ordered map of properties, each holding a [value::Value]
//!
//! The identity of a block is the kind's short name followed by its identifiers, joined with `.`:
//!
//! | **block**                         | **identity**                |
//! |-----------------------------------|-----------------------------|
//! | `variable "region"`               | `var.region`                |
//! | `data "aws_ami" "ubuntu"`         | `data.aws_ami.ubuntu`       |
//! | `resource "aws_instance" "web"`   | `resource.aws_instance.web` |
//! | `output "web_id"`                 | `output.web_id`             |
//! | `property "ingress"` (nested)     | `ingress`                   |
//!
//! [block::Block::attr] creates a [reference::Reference] to an attribute of a block, which renders unquoted as
//! `<identity>.<attribute>`.
//!
//! ### Dependencies
//!
//! Blocks are immutable. Their dependencies are computed once, while building, by walking the properties
//! (`VisitBlocks`): every referenced or nested block that is addressable (variable, data, module, resource,
//! output), or that itself depends on something, becomes a dependency. Since a block can only point at blocks that
//! already exist, construction can not create cycles.
//!
//! ### Registry
//!
//! A [compose::Composer] is the context of one build. It holds a [registry::Registry] (identity -> block) and a
//! [registry::Group] per kind which builds and registers blocks. Registering an identity twice is an error unless
//! the group permits duplicates ([compose::Composer::allow_duplicates]).
//!
//! ### Ordering
//!
//! [resolve::resolve_layers] groups the scheduled blocks (everything except properties and maps) into layers. Inside
//! a layer blocks are ordered by kind (variable, data, resource, module, output, the rest) and then by identity, so
//! the output is reproducible.
//!
//! ### Rendering
//!
//! [render] turns each block into lines and joins the blocks with blank lines:
//!
//! ```
//! use metaform::{compose::Composer, properties};
//!
//! let mut composer = Composer::new();
//! let web = composer.resource("aws_instance", "web", properties! { "ami" => "ami-123" })?;
//! composer.output("web_id", properties! { "value" => web.attr("id") })?;
//!
//! assert_eq!(
//!     composer.write()?,
//!     r#"resource "aws_instance" "web" {
//!   ami = "ami-123"
//! }
//!
//! output "web_id" {
//!   value = resource.aws_instance.web.id
//! }"#
//! );
//! # Ok::<(), metaform::compose::Error>(())
//! ```
pub mod block;
pub mod compose;
pub mod kind;
pub mod manifest;
pub mod reference;
pub mod registry;
pub mod render;
pub mod resolve;
pub mod value;
mod visit;

pub use block::{Block, BlockBuilder, ShapeError};
pub use compose::Composer;
pub use kind::Kind;
pub use reference::Reference;
pub use value::{Literal, Properties, Value};
