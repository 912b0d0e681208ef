mod cli;

use metaform::compose::Composer;
use metaform::manifest::Manifest;
use std::path::PathBuf;

const DEFAULT_NAME: &str = "main";

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("METAFORM_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Build(build_cli) => build(build_cli),
        cli::Command::Dev(dev_cli) => dev(dev_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn build(cli: cli::BuildCommand) -> anyhow::Result<()> {
    let composer = compose(&cli.input)?;
    let document = composer.write()?;

    if cli.output.stdout {
        println!("{document}");
        return Ok(());
    }

    let name = cli
        .output
        .name
        .clone()
        .or_else(|| {
            cli.input
                .manifest
                .as_ref()
                .and_then(|path| path.file_stem())
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| DEFAULT_NAME.to_string());

    let path = output_path(&name, cli.output.isolate)?;
    std::fs::write(&path, format!("{document}\n"))?;
    tracing::info!(path=%path.display(), "document written");

    Ok(())
}

/// `<name>.tf`, or `<name>/main.tf` when isolated
fn output_path(name: &str, isolate: bool) -> anyhow::Result<PathBuf> {
    if !isolate {
        return Ok(PathBuf::from(format!("{name}.tf")));
    }

    let directory = PathBuf::from(name);
    anyhow::ensure!(
        !directory.exists(),
        "Output directory {} already exists",
        directory.display()
    );
    std::fs::create_dir(&directory)?;
    Ok(directory.join("main.tf"))
}

fn compose(input: &cli::InputArgs) -> anyhow::Result<Composer> {
    let manifest = match &input.manifest {
        Some(path) => Manifest::load_file(path)?,
        None => {
            let stdin = std::io::read_to_string(std::io::stdin())?;
            Manifest::parse(&stdin, input.format.into())?
        }
    };

    let mut composer = Composer::new();
    manifest.apply(&mut composer)?;
    Ok(composer)
}

/// (metaform-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(cli: cli::DevCommand) -> anyhow::Result<()> {
    use cli::DevSubCommand::*;

    let composer = compose(&cli.input)?;

    match cli.command {
        Layers => {
            for (index, layer) in composer.layers()?.iter().enumerate() {
                println!("{index}: {}", layer.iter().cloned().collect::<Vec<_>>().join(", "));
            }
        }
        Blocks => {
            for block in composer.registry().blocks() {
                let dependencies: Vec<_> = block
                    .dependencies()
                    .iter()
                    .map(|dependency| dependency.identity())
                    .collect();
                println!("{} ({}) -> {dependencies:?}", block.identity(), block.kind());
            }
        }
    }

    Ok(())
}
