use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use folio::core::holdings::{GroupBy, HoldingsFilter, HoldingsView};
use folio::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Print cache statistics after the command
    #[arg(long, global = true)]
    cache_stats: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for folio::AppCommand {
    fn from(cmd: Commands) -> folio::AppCommand {
        match cmd {
            Commands::Summary => folio::AppCommand::Summary,
            Commands::Holdings {
                realized,
                asset_class,
                goal,
                group_by,
            } => folio::AppCommand::Holdings {
                view: if realized {
                    HoldingsView::Realized
                } else {
                    HoldingsView::Unrealized
                },
                group_by,
                filter: HoldingsFilter {
                    asset_class,
                    account: goal,
                },
            },
            Commands::Goals => folio::AppCommand::Goals,
            Commands::Transactions => folio::AppCommand::Transactions,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display portfolio totals, returns and allocation
    Summary,
    /// Display holdings grouped by security, asset class or account
    Holdings {
        /// Show exited positions and dividends instead of open positions
        #[arg(long)]
        realized: bool,
        /// Only include this asset class
        #[arg(long)]
        asset_class: Option<String>,
        /// Only include this account (goal)
        #[arg(long)]
        goal: Option<String>,
        /// security, asset-class or account
        #[arg(long, default_value = "security")]
        group_by: GroupBy,
    },
    /// Display goals and their progress
    Goals,
    /// List all transactions
    Transactions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => folio::core::config::AppConfig::default_data_path()
                .and_then(|data| folio::cli::setup::setup_at_path(path, &data)),
            None => folio::cli::setup::setup(),
        },
        Some(cmd) => {
            folio::run_command(cmd.into(), cli.config_path.as_deref(), cli.cache_stats).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
