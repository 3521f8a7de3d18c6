//! See <https://github.com/matklad/cargo-xtask/>
//!
//! This binary defines the operational commands for the event integration
//! store: data maintenance routines and schema checks.
//!
//! The binary is integrated into the `cargo` command line by using an
//! alias in `.cargo/config`.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod maintenance;
mod prelude;
mod schema;

/// Operational tasks for the event integration store
#[derive(Debug, Parser)]
#[command(name = "xtask")]
#[command(about = "Operational tasks for the event integration store", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: Global,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Silence the command output
    #[clap(long, global = true)]
    pub silent: bool,

    /// Enable verbose output
    #[clap(long, global = true)]
    pub verbose: bool,
}

impl Global {
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    fn default_log_filter(&self) -> &'static str {
        if self.is_verbose() {
            "eip_core=debug,eip_store=debug,xtask=debug"
        } else if self.is_silent() {
            "warn"
        } else {
            "eip_core=info,eip_store=info,xtask=info"
        }
    }
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Run data maintenance routines against the store
    Maintenance(maintenance::MaintenanceCommand),

    /// Check event schema documents
    Schema(schema::SchemaCommand),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.global.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Maintenance(maintenance_cmd) => {
            maintenance::run(maintenance_cmd, cli.global).await?;
        }
        Commands::Schema(schema_cmd) => {
            schema::run(schema_cmd, cli.global).await?;
        }
    }

    Ok(())
}
