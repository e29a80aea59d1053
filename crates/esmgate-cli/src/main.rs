#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod commands;
mod logging;

use clap::Parser;
use esmgate_core::Config;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "esmgate")]
#[command(author, version, about = "Resolve installed npm packages to ES module entry points", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory (the one containing node_modules)
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    /// Load settings from a JSON config file
    #[arg(long, global = true, value_name = "FILE", env = "ESMGATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Args, Debug, Clone)]
struct StoreArgs {
    /// Metadata store directory
    #[arg(long, value_name = "PATH", env = "ESMGATE_DB_DIR")]
    db_dir: Option<PathBuf>,

    /// Artifact store root (the directory containing builds/)
    #[arg(long, value_name = "PATH", env = "ESMGATE_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Resolve packages (name@version[/submodule]) installed under node_modules
    Resolve {
        /// Package specifiers, e.g. react@18.2.0 or react-dom@18.2.0/client
        #[arg(required = true)]
        specs: Vec<String>,

        /// Resolve for a development build (NODE_ENV=development)
        #[arg(long)]
        dev: bool,

        /// Only resolve the manifest and submodule, skip ESM/CJS classification
        #[arg(long)]
        no_check_exports: bool,

        /// Build target folded into build ids
        #[arg(long, env = "ESMGATE_TARGET")]
        target: Option<String>,

        /// Node.js binary used for CommonJS export analysis
        #[arg(long, value_name = "PATH", env = "ESMGATE_NODE")]
        node: Option<PathBuf>,

        #[command(flatten)]
        stores: StoreArgs,
    },

    /// Look up a cached resolution by build id
    Lookup {
        /// Build id, e.g. v1/react@18.2.0/es2020/react.js
        build_id: String,

        #[command(flatten)]
        stores: StoreArgs,
    },

    /// Print the build id for a package specifier
    BuildId {
        /// Package specifier, e.g. react@18.2.0
        spec: String,

        /// Development build
        #[arg(long)]
        dev: bool,

        /// Build target
        #[arg(long, env = "ESMGATE_TARGET")]
        target: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path).into_diagnostic()?,
        None => Config::default(),
    };
    if let Some(cwd) = cli.cwd {
        config.cwd = cwd;
    }
    let verbosity = config.verbosity.max(cli.verbose);
    let json_logs = config.json_logs || cli.json;
    let config = config.with_verbosity(verbosity).with_json_logs(json_logs);

    logging::init(config.verbosity, config.json_logs);

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(cli.json),
        Some(Commands::Resolve {
            specs,
            dev,
            no_check_exports,
            target,
            node,
            stores,
        }) => {
            let config = apply_stores(config, stores);
            let config = match target {
                Some(target) => config.with_target(target),
                None => config,
            };
            let config = match node {
                Some(node) => config.with_node_bin(node),
                None => config,
            };
            let span = tracing::info_span!("resolve", cmd = "resolve", cwd = %config.cwd.display());
            let _guard = span.enter();
            commands::resolve::run(&config, &specs, dev, !no_check_exports, cli.json)
        }
        Some(Commands::Lookup { build_id, stores }) => {
            let config = apply_stores(config, stores);
            commands::lookup::run(&config, &build_id, cli.json)
        }
        Some(Commands::BuildId { spec, dev, target }) => {
            let target = target.unwrap_or_else(|| config.target.clone());
            commands::build_id::run(&spec, &target, dev, cli.json)
        }
    }
}

fn apply_stores(mut config: Config, stores: StoreArgs) -> Config {
    if stores.db_dir.is_some() {
        config.db_dir = stores.db_dir;
    }
    if stores.storage_dir.is_some() {
        config.storage_dir = stores.storage_dir;
    }
    config
}
