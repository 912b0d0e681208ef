//! End-to-end document tests
//!
//! Builds a small but complete configuration, checks the emission order and that the rendered text is valid HCL.
use metaform::compose::{Composer, Error};
use metaform::{properties, Block, Kind, Value};
use metaform::resolve::{resolve_layers, DependencyMap};
use std::collections::BTreeSet;
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("METAFORM_LOG"))
        .with_test_writer()
        .try_init();
}

fn web_stack() -> Result<Composer, Error> {
    let mut composer = Composer::new();

    let region = composer.variable("region", properties! { "default" => "eu-west-1" })?;
    let cidr = composer.variable("cidr", properties! { "default" => "10.0.0.0/16" })?;
    let ubuntu = composer.data(
        "aws_ami",
        "ubuntu",
        properties! { "most_recent" => true, "owners" => vec!["099720109477"] },
    )?;
    composer.provider("aws", properties! { "region" => region.attr("value") })?;

    let vpc = composer.resource(
        "aws_vpc",
        "main",
        properties! {
            "cidr_block" => cidr.attr("value"),
            "tags" => Value::map([("Name", "main"), ("env", "prod")]),
        },
    )?;

    let ingress = composer.property(
        "ingress",
        properties! {
            "from_port" => 80,
            "to_port" => 80,
            "protocol" => "tcp",
            "cidr_blocks" => vec![cidr.attr("value")],
        },
    )?;
    let sg = composer.resource(
        "aws_security_group",
        "web",
        properties! { "vpc_id" => vpc.attr("id"), "ingress" => &ingress },
    )?;

    let web = composer.resource(
        "aws_instance",
        "web",
        properties! {
            "ami" => ubuntu.attr("id"),
            "instance_type" => "t3.micro",
            "vpc_security_group_ids" => vec![sg.attr("id")],
            "tags" => Value::map([
                ("Name", "web"),
                ("env", "prod"),
                ("team", "platform"),
                ("cost_center", "42"),
            ]),
        },
    )?;

    // declared before the module on purpose, emission order is by kind
    composer.output("web_ip", properties! { "value" => web.attr("public_ip") })?;
    composer.module(
        "dns",
        properties! { "source" => "./dns", "target" => web.attr("public_ip") },
    )?;

    Ok(composer)
}

#[test]
fn emission_order() -> Result<(), Error> {
    init_tracing();
    let composer = web_stack()?;

    let order: Vec<_> = composer
        .collect()?
        .iter()
        .map(|block| block.identity().to_string())
        .collect();

    pretty_assertions::assert_eq!(
        order,
        vec![
            "var.cidr",
            "var.region",
            "data.aws_ami.ubuntu",
            "resource.aws_vpc.main",
            "provider.aws",
            "resource.aws_security_group.web",
            "resource.aws_instance.web",
            "module.dns",
            "output.web_ip",
        ]
    );
    Ok(())
}

#[test]
fn every_dependency_is_in_an_earlier_layer() -> Result<(), Error> {
    let composer = web_stack()?;
    let dependencies = composer.dependency_map();
    let layers = composer.layers()?;

    let layer_of = |identity: &str| {
        layers
            .iter()
            .position(|layer| layer.contains(identity))
            .expect("every node is layered")
    };

    let layered: usize = layers.iter().map(|layer| layer.len()).sum();
    assert_eq!(layered, dependencies.len());

    for (node, deps) in &dependencies {
        for dep in deps {
            assert!(layer_of(dep) < layer_of(node), "{dep} must precede {node}");
        }
    }
    Ok(())
}

#[test]
fn rendered_document() -> Result<(), Error> {
    init_tracing();
    let document = web_stack()?.write()?;

    insta::assert_snapshot!(document, @r#"
    variable "cidr" {
      default = "10.0.0.0/16"
    }

    variable "region" {
      default = "eu-west-1"
    }

    data "aws_ami" "ubuntu" {
      most_recent = true
      owners      = tolist(["099720109477"])
    }

    resource "aws_vpc" "main" {
      cidr_block = var.cidr.value
      tags       = tomap({ Name = "main", env = "prod" })
    }

    provider "aws" {
      region = var.region.value
    }

    resource "aws_security_group" "web" {
      vpc_id  = resource.aws_vpc.main.id
      ingress {
        from_port   = 80
        to_port     = 80
        protocol    = "tcp"
        cidr_blocks = tolist([var.cidr.value])
      }
    }

    resource "aws_instance" "web" {
      ami                    = data.aws_ami.ubuntu.id
      instance_type          = "t3.micro"
      vpc_security_group_ids = tolist([resource.aws_security_group.web.id])
      tags                   = tomap({
                                 Name        = "web"
                                 env         = "prod"
                                 team        = "platform"
                                 cost_center = "42"
                               })
    }

    module "dns" {
      source = "./dns"
      target = resource.aws_instance.web.public_ip
    }

    output "web_ip" {
      value = resource.aws_instance.web.public_ip
    }
    "#);
    Ok(())
}

#[test]
fn rendered_document_is_valid_hcl() -> Result<(), Error> {
    let document = web_stack()?.write()?;
    let body = hcl::parse(&document).expect("rendered document must parse");

    let blocks: Vec<_> = body
        .blocks()
        .map(|block| block.identifier.to_string())
        .collect();
    assert_eq!(
        blocks,
        vec![
            "variable", "variable", "data", "resource", "provider", "resource", "resource",
            "module", "output"
        ]
    );
    Ok(())
}

#[test]
fn output_references_resource_unquoted() -> Result<(), Error> {
    let mut composer = Composer::new();
    let web = composer.resource("aws_instance", "web", properties! { "ami" => "ami-123" })?;
    composer.output("web_id", properties! { "value" => web.attr("id") })?;

    let layers = composer.layers()?;
    let position = |identity: &str| layers.iter().position(|layer| layer.contains(identity));
    assert!(position("resource.aws_instance.web") < position("output.web_id"));

    let output = composer.get("output.web_id")?.render(0).join("\n");
    assert!(output.contains("aws_instance.web.id"));
    assert!(!output.contains("\"resource.aws_instance.web.id\""));

    let resource = web.render(0).join("\n");
    assert!(resource.contains("ami = \"ami-123\""));
    Ok(())
}

#[test]
fn small_and_large_maps() -> Result<(), Error> {
    let small = Arc::new(
        Block::builder(Kind::Module)
            .id("m")
            .property("tags", Value::map([("env", "prod"), ("team", "x")]))
            .build()?,
    );
    let small = small.render(0);
    assert_eq!(small.len(), 3);
    assert_eq!(small[1], r#"  tags = tomap({ env = "prod", team = "x" })"#);

    let large = Block::builder(Kind::Module)
        .id("m")
        .property(
            "tags",
            Value::map([("a", 1), ("b", 2), ("c", 3), ("d", 4)]),
        )
        .build()?
        .render(0);
    assert_eq!(large.len(), 8);
    assert_eq!(large[1], "  tags = tomap({");
    assert_eq!(large[2], "           a = 1");
    assert_eq!(large[6], "         })");
    Ok(())
}

#[test]
fn cycles_can_only_come_from_a_foreign_dependency_map() {
    let dependencies = DependencyMap::from([
        ("a".to_string(), BTreeSet::from(["b".to_string()])),
        ("b".to_string(), BTreeSet::from(["a".to_string()])),
    ]);

    let err = resolve_layers(&dependencies, Default::default())
        .expect_err("cycle must not resolve");
    assert_eq!(err.unresolved, vec!["a", "b"]);
}
