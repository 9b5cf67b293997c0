use anyhow::Context;
use clap::{Parser, Subcommand};

use bookshelf_app::Application;
use bookshelf_kernel::settings::Settings;

#[derive(Parser)]
#[command(name = "bookshelf")]
#[command(about = "Book catalogue GraphQL service", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Apply migrations and serve the GraphQL API (default)
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Print the effective configuration as JSON
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Config => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{rendered}");
        }
        Command::Migrate => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            let app = Application::build(settings)?;
            let applied = app.migrate().await?;
            tracing::info!(applied, "migrate finished");
            println!("applied {applied} migration(s)");
        }
        Command::Serve => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "bookshelf starting");
            Application::build(settings)?.run().await?;
        }
    }

    Ok(())
}
