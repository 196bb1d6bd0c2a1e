//! lintrc CLI
//!
//! Command-line interface for inspecting resolved configurations: which
//! presets a root pulls in, and what configuration actually applies to a
//! given file once the extends chain and overrides are folded together.

use anyhow::Context;
use clap::{Parser, Subcommand};
use lintrc_core::{
    ConfigResolver, FsPresetRegistry, PermissiveCatalog, RuleCatalogProvider, StaticRuleCatalog,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

#[derive(Parser)]
#[command(name = "lintrc")]
#[command(about = "Resolve layered lint configurations: presets, extends chains, and overrides")]
#[command(version = lintrc_core::VERSION)]
#[command(
    long_about = "lintrc resolves named preset documents into the single effective\n\
configuration that applies to a target file.\n\
\n\
Examples:\n  \
lintrc resolve my-app src/index.ts    # Effective config for one file\n  \
lintrc chain my-app                   # Flattened extends chain\n  \
lintrc resolve my-app src/a.ts --catalog rules.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory containing preset documents (<ref>.json or <ref>.yaml)
    #[arg(short, long, global = true, default_value = ".")]
    presets_dir: PathBuf,

    /// Rule catalog file (JSON); without it, rule names are not checked
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Verbose output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration for a target path as JSON
    Resolve {
        /// Root preset ref to resolve
        root: String,

        /// Target file path the configuration applies to
        path: PathBuf,
    },

    /// Print the flattened extends chain for a root preset, lowest
    /// precedence first
    Chain {
        /// Root preset ref to flatten
        root: String,
    },
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default = match verbose {
        0 => "lintrc=warn",
        1 => "lintrc=info",
        2 => "lintrc=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_catalog(path: Option<&PathBuf>) -> anyhow::Result<Arc<dyn RuleCatalogProvider>> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read catalog file {}", path.display()))?;
            let catalog: StaticRuleCatalog = serde_json::from_str(&content)
                .with_context(|| format!("failed to parse catalog file {}", path.display()))?;
            Ok(Arc::new(catalog))
        }
        None => Ok(Arc::new(PermissiveCatalog)),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let registry = Arc::new(FsPresetRegistry::new(&cli.presets_dir));
    let catalog = load_catalog(cli.catalog.as_ref())?;
    let resolver = ConfigResolver::new(registry, catalog);

    match cli.command {
        Commands::Resolve { root, path } => {
            let effective = resolver.resolve(&root, &path).await?;
            println!("{}", serde_json::to_string_pretty(&*effective)?);
        }
        Commands::Chain { root } => {
            let chain = resolver.extends_chain(&root).await?;
            for doc in chain {
                println!("{}{}", "  ".repeat(doc.depth), doc.source);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{e:#}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[tokio::test]
    async fn test_run_resolve_against_preset_directory() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "base.json",
            r#"{"rules": {"no-console": "error"}}"#,
        );
        write(
            dir.path(),
            "app.json",
            r#"{"extends": ["base"], "env": ["browser"]}"#,
        );

        let cli = Cli::parse_from([
            "lintrc",
            "resolve",
            "app",
            "src/index.ts",
            "--presets-dir",
            dir.path().to_str().unwrap(),
        ]);
        assert!(run(cli).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_fails_on_unknown_preset() {
        let dir = TempDir::new().unwrap();
        let cli = Cli::parse_from([
            "lintrc",
            "chain",
            "ghost",
            "--presets-dir",
            dir.path().to_str().unwrap(),
        ]);
        assert!(run(cli).await.is_err());
    }

    #[tokio::test]
    async fn test_catalog_file_enforces_rule_names() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "app.json",
            r#"{"rules": {"made-up-rule": "warn"}}"#,
        );
        write(dir.path(), "catalog.json", r#"{"core": {"no-console": null}}"#);

        let cli = Cli::parse_from([
            "lintrc",
            "resolve",
            "app",
            "a.ts",
            "--presets-dir",
            dir.path().to_str().unwrap(),
            "--catalog",
            dir.path().join("catalog.json").to_str().unwrap(),
        ]);
        assert!(run(cli).await.is_err());
    }
}
