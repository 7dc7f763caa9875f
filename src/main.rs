use anyhow::Result;
use clap::{Parser, Subcommand};
use langpop::clustering::Linkage;
use langpop::config::Config;
use langpop::db::Database;
use langpop::job::{plot_data, query_today_data, show_tiers};
use langpop::logging::configure_logging;
use langpop::report::format_tiers;
use std::path::PathBuf;
use tracing::info;

/// Tracks programming language popularity from the Ohloh catalog.
///
/// Usage:
///    cargo run -- run --notify
///    cargo run -- tiers --day 20131107 --linkage complete
#[derive(Parser)]
#[clap(name = "langpop", about = "Track programming language popularity")]
struct Cli {
    /// SQLite database file (overrides DATABASE_PATH)
    #[clap(long, global = true)]
    database: Option<String>,

    /// Directory receiving the chart and TSV (overrides WWW_STATIC)
    #[clap(long, global = true)]
    static_dir: Option<PathBuf>,

    #[clap(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Store today's data if missing, then plot
    Run {
        /// Email the tier report to NOTIFY_EMAILS
        #[clap(short, long)]
        notify: bool,
    },

    /// Store today's data if missing
    Fetch {
        /// Email the tier report to NOTIFY_EMAILS
        #[clap(short, long)]
        notify: bool,
    },

    /// Render the charts and TSV from stored snapshots
    Plot,

    /// Print the popularity tiers of a stored snapshot
    Tiers {
        /// Day id such as 20131107 (default: latest)
        #[clap(short, long)]
        day: Option<i64>,

        /// Linkage rule: average, complete or single
        #[clap(short, long, default_value = "average")]
        linkage: Linkage,

        /// Print the tiers as JSON
        #[clap(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    configure_logging();
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    if let Some(static_dir) = cli.static_dir {
        config.static_dir = static_dir;
    }

    let db = Database::new(&config.database_path).await?;

    match cli.command.unwrap_or(Commands::Run { notify: false }) {
        Commands::Run { notify } => {
            query_today_data(&config, &db, notify).await?;
            report_plot(&config, &db).await?;
        }
        Commands::Fetch { notify } => {
            query_today_data(&config, &db, notify).await?;
        }
        Commands::Plot => {
            report_plot(&config, &db).await?;
        }
        Commands::Tiers { day, linkage, json } => {
            let clustering = show_tiers(&db, day, linkage).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&clustering)?);
            } else {
                print!("{}", format_tiers(&clustering));
            }
        }
    }

    Ok(())
}

async fn report_plot(config: &Config, db: &Database) -> Result<()> {
    if let Some(files) = plot_data(config, db).await? {
        info!(
            "Wrote {}, {} and {}",
            files.chart.display(),
            files.svg.display(),
            files.tsv.display()
        );
    }
    Ok(())
}
