use anyhow::Context;
use clap::{Parser, Subcommand};
use gdp_etl::app::commands;
use gdp_etl::utils::error::ErrorSeverity;
use gdp_etl::utils::logger;
use gdp_etl::{CliConfig, EtlError};

#[derive(Debug, Parser)]
#[command(name = "gdp-etl", version)]
#[command(about = "Scrape nominal GDP by country, convert to USD billions, load to CSV and SQLite")]
struct Cli {
    #[arg(long, global = true, help = "Enable verbose output")]
    verbose: bool,

    #[arg(long, global = true, help = "Log CPU and memory usage after each phase")]
    monitor: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines on stderr")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the whole job: extract, transform, load CSV and database, query
    Run {
        #[command(flatten)]
        job: CliConfig,
    },
    /// Fetch and parse the source table only; nothing is written
    Extract {
        #[command(flatten)]
        job: CliConfig,

        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// Query the database left by a previous run
    Query {
        #[command(flatten)]
        job: CliConfig,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete the CSV, database and progress log
    Clean {
        #[command(flatten)]
        job: CliConfig,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting gdp-etl CLI");
    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
    }

    match execute(&cli).await {
        Ok(()) => Ok(()),
        Err(Failure::Etl(e)) => {
            tracing::error!(
                "❌ gdp-etl failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }
        Err(Failure::Output(e)) => Err(e),
    }
}

enum Failure {
    Etl(EtlError),
    Output(anyhow::Error),
}

impl From<EtlError> for Failure {
    fn from(e: EtlError) -> Self {
        Failure::Etl(e)
    }
}

impl From<anyhow::Error> for Failure {
    fn from(e: anyhow::Error) -> Self {
        Failure::Output(e)
    }
}

async fn execute(cli: &Cli) -> Result<(), Failure> {
    match &cli.command {
        Command::Run { job } => {
            let config = job.resolve()?;
            if cli.monitor {
                tracing::info!("🔍 System monitoring enabled");
            }

            let summary = commands::run_job(config, cli.monitor).await?;

            tracing::info!("✅ ETL process completed successfully!");
            println!("✅ ETL process completed successfully!");
            println!(
                "🌐 Extracted {} rows, loaded {} into table {}",
                summary.extracted, summary.loaded, summary.table_name
            );
            println!("📁 CSV saved to: {}", summary.csv_path);
            println!("🗄️  Database: {}", summary.db_path);
            println!();
            println!("{}", summary.query);
        }
        Command::Extract { job, json } => {
            let rows = commands::extract_rows(job.resolve()?).await?;
            if *json {
                let text =
                    serde_json::to_string_pretty(&rows).context("failed to render rows as JSON")?;
                println!("{}", text);
            } else {
                for row in &rows {
                    println!("{}\t{}", row.country, row.gdp_usd_millions);
                }
                println!("({} rows)", rows.len());
            }
        }
        Command::Query { job, json } => {
            let output = commands::query_database(job.resolve()?).await?;
            if *json {
                let text = serde_json::to_string_pretty(&output)
                    .context("failed to render query result as JSON")?;
                println!("{}", text);
            } else {
                println!("{}", output);
            }
        }
        Command::Clean { job } => {
            let removed = commands::clean_outputs(job.resolve()?).await?;
            if removed.is_empty() {
                println!("Nothing to clean");
            }
            for path in removed {
                println!("🧹 Removed {}", path);
            }
        }
    }
    Ok(())
}
