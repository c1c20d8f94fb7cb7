//! sprinter: per-user development environments described by a manifest.

mod cmd;
mod output;
mod prompts;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{cmd_activate, cmd_deactivate, cmd_install, cmd_list, cmd_reload, cmd_remove, cmd_update, cmd_validate};
use output::{OutputFormat, print_error};

#[derive(Parser)]
#[command(name = "sprinter")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Install an environment from a manifest path or URL
  Install {
    /// Manifest location
    manifest: String,

    /// Install under this namespace instead of the manifest's own
    #[arg(short, long)]
    namespace: Option<String>,
  },

  /// Update an environment to the latest version of its manifest
  Update {
    namespace: String,

    /// Update from this manifest instead of the recorded source
    #[arg(short, long)]
    manifest: Option<String>,
  },

  /// Remove an environment and everything installed in it
  Remove {
    namespace: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    force: bool,
  },

  /// Hook an environment into the shell startup files
  Activate { namespace: String },

  /// Unhook an environment from the shell startup files
  Deactivate { namespace: String },

  /// Re-run reload actions of an environment
  Reload { namespace: String },

  /// Check a manifest without installing it
  Validate {
    /// Manifest location
    manifest: String,
  },

  /// List installed environments
  List,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("sprinter_lib=debug,sprinter=debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let (output, verbose) = (cli.output, cli.verbose);
  let result = match cli.command {
    Commands::Install { manifest, namespace } => cmd_install(&manifest, namespace.as_deref(), output, verbose),
    Commands::Update { namespace, manifest } => cmd_update(&namespace, manifest.as_deref(), output, verbose),
    Commands::Remove { namespace, force } => cmd_remove(&namespace, force, output, verbose),
    Commands::Activate { namespace } => cmd_activate(&namespace, output, verbose),
    Commands::Deactivate { namespace } => cmd_deactivate(&namespace, output, verbose),
    Commands::Reload { namespace } => cmd_reload(&namespace, output, verbose),
    Commands::Validate { manifest } => cmd_validate(&manifest, output, verbose),
    Commands::List => cmd_list(output, verbose),
  };

  match result {
    Ok(code) => code,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}
