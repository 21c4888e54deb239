mod catalog_cmd;
mod config;
mod plan_cmds;

#[cfg(test)]
mod test_util;

use clap::{Args, Parser, Subcommand};

use cadence_core::plan::{DifficultyLevel, FocusArea};
use cadence_db::pool;

use config::CadenceConfig;

#[derive(Parser)]
#[command(name = "cadence", about = "Adaptive study plan scheduler")]
struct Cli {
    /// Database URL (overrides CADENCE_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Owner id the plan is keyed by (defaults to $USER)
    #[arg(long, global = true)]
    owner: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a cadence config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/cadence")]
        db_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the cadence database (requires config file or env vars)
    DbInit,
    /// Plan management
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Catalog inspection
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Generate and print a draft plan without persisting it
    Preview {
        #[command(flatten)]
        prefs: PrefArgs,
    },
    /// Generate a plan, confirm it, and persist it
    Create {
        #[command(flatten)]
        prefs: PrefArgs,
    },
    /// Show the active plan
    Show,
    /// Apply a free-text change request to the active plan
    Modify {
        /// The change request, e.g. "make it harder"
        request: String,
    },
    /// Delete the active plan and return to the pre-plan state
    Reset,
}

/// Preference flags shared by `plan preview` and `plan create`.
#[derive(Args)]
pub struct PrefArgs {
    /// Overall difficulty: beginner, intermediate, or advanced
    #[arg(long)]
    pub difficulty: DifficultyLevel,

    /// Focus area: a category name, or "all"
    #[arg(long, default_value = "all")]
    pub focus: FocusArea,

    /// Units to study per week (1-7; larger values are clamped)
    #[arg(long, default_value_t = 3)]
    pub units_per_week: u32,

    /// Requested plan size
    #[arg(long, default_value_t = 12)]
    pub total_units: u32,

    /// Per-unit minutes override
    #[arg(long)]
    pub minutes_per_unit: Option<u32>,

    /// Comma-separated preferred weekdays (informational), e.g. mon,wed,fri
    #[arg(long)]
    pub days: Option<String>,

    /// First scheduled date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub start_date: Option<chrono::NaiveDate>,

    /// Catalog TOML file (defaults to the embedded starter catalog)
    #[arg(long)]
    pub catalog: Option<String>,
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List catalog units
    List {
        /// Only show units in this category
        #[arg(long)]
        category: Option<cadence_core::catalog::Category>,
        /// Show unit descriptions
        #[arg(long)]
        verbose: bool,
        /// Catalog TOML file (defaults to the embedded starter catalog)
        #[arg(long)]
        catalog: Option<String>,
    },
}

/// Execute the `cadence init` command: write the config file.
fn cmd_init(db_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!();
    println!("Next: run `cadence db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `cadence db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = CadenceConfig::resolve(cli_db_url)?;

    println!("Initializing cadence database...");

    // 1. Create the database if it does not exist.
    pool::ensure_database_exists(&resolved.db_config).await?;

    // 2. Connect to the target database.
    let db_pool = pool::create_pool(&resolved.db_config).await?;

    // 3. Run migrations.
    pool::run_migrations(&db_pool).await?;

    // 4. Print success with table counts.
    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    // 5. Clean shutdown.
    db_pool.close().await;

    println!("cadence db-init complete.");
    Ok(())
}

/// The owner id the plan is keyed by: CLI flag, then `$USER`, then a
/// fixed fallback.
fn resolve_owner(cli_owner: Option<String>) -> String {
    cli_owner
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "default".to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { db_url, force } => {
            cmd_init(&db_url, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Plan { command } => {
            let resolved = CadenceConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let owner = resolve_owner(cli.owner);
            let result = plan_cmds::run_plan_command(command, &db_pool, &owner).await;
            db_pool.close().await;
            result?;
        }
        Commands::Catalog { command } => {
            catalog_cmd::run_catalog_command(command)?;
        }
    }

    Ok(())
}
