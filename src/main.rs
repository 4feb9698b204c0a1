use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod api;
mod editor;
mod graph;
mod layout;
mod records;
mod shell;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "kafka-pipeline-editor")]
#[command(about = "Interactive editor for Kafka worker/topic pipelines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the interactive editing session.
    Edit {
        /// Base URL of the consumer-config service. Overrides
        /// PIPELINE_API_BASE_URL; defaults to http://localhost:5000/api.
        #[arg(long)]
        base_url: Option<String>,

        /// Edit against an empty in-memory store instead of the service.
        #[arg(long)]
        offline: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Edit { base_url, offline } => {
            if offline {
                let store = api::InMemoryConfigStore::new(Vec::new());
                let mut editor = editor::Editor::new(store, shell::StdioFrontend::new());
                editor.load().await;
                shell::run_session(&mut editor).await?;
            } else {
                let base_url = base_url.unwrap_or_else(api::base_url_from_env);
                let store = api::HttpConfigStore::new(base_url);
                let mut editor = editor::Editor::new(store, shell::StdioFrontend::new());

                // Initial fetch + layout; a failure leaves an empty session
                // the user can populate and save.
                editor.load().await;
                shell::run_session(&mut editor).await?;
            }
        }
    }

    Ok(())
}
