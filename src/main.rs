use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use methodology_assistant::catalog::{RULES, STAGES};
use methodology_assistant::config::Config;
use methodology_assistant::db::Database;
use methodology_assistant::gateway::ProviderClient;
use methodology_assistant::models::GenerateTaskInput;
use methodology_assistant::service::MethodologyService;
use methodology_assistant::api;

#[derive(Parser)]
#[command(name = "methodology")]
#[command(about = "Stage-aware task generation and rule explanations for the adaptive methodology")]
struct Cli {
    /// Path to a config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Generate one task for a goal and print it as JSON
    Task {
        /// Methodology stage (discover, plan, implement, verify, operate, improve)
        #[arg(short, long)]
        stage: String,

        /// What the task should achieve
        goal: String,
    },
    /// Explain a catalog rule by its exact title
    Explain {
        rule_title: String,
    },
    /// Print the stage catalog
    Stages,
    /// Print the adaptive rules
    Rules,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Initialize tracing. Logs go to stderr so command output on stdout stays
/// clean JSON.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "methodology_assistant=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_database(config: &Config) -> anyhow::Result<Database> {
    let db = match &config.database.path {
        Some(path) => Database::open(path.clone())?,
        None => Database::open_default()?,
    };
    db.migrate().context("Failed to migrate database")?;
    Ok(db)
}

fn build_service(config: &Config) -> anyhow::Result<MethodologyService> {
    let db = open_database(config)?;
    let client = ProviderClient::from_config(&config.provider);
    Ok(MethodologyService::with_generator(
        Arc::new(client),
        config.generation.clone(),
        db,
    ))
}

async fn serve(config: &Config, port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting methodology server on port {}", port);

    let service = Arc::new(build_service(config)?);
    let app = api::create_router(service);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Methodology server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    // Runs before loading so a broken file can be replaced.
    if let Some(Commands::Init { force }) = cli.command {
        let path = Config::init_file(cli.config.as_deref(), force)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Serve { port }) => {
            serve(&config, port.unwrap_or(config.server.port)).await?;
        }
        Some(Commands::Task { stage, goal }) => {
            let service = build_service(&config)?;
            let task = service
                .generate_task(GenerateTaskInput { goal, stage })
                .await?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        Some(Commands::Explain { rule_title }) => {
            let service = build_service(&config)?;
            let response = service.explain_catalog_rule(&rule_title).await?;
            if response.explanation.is_empty() {
                eprintln!("No explanation available for {:?}", rule_title);
            } else {
                println!("{}", response.explanation);
            }
        }
        Some(Commands::Stages) => {
            println!("{}", serde_json::to_string_pretty(&STAGES[..])?);
        }
        Some(Commands::Rules) => {
            println!("{}", serde_json::to_string_pretty(&RULES[..])?);
        }
        Some(Commands::Init { .. }) => unreachable!("handled before config load"),
        None => {
            serve(&config, config.server.port).await?;
        }
    }

    Ok(())
}
