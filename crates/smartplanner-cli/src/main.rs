use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "smartplanner", version, about = "Plan your day around your Google Calendar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to Google Calendar in the browser
    Login,
    /// Forget the stored Google token
    Logout,
    /// Show sign-in state and configuration warnings
    Status,
    /// List the calendar events of a day
    Events(commands::events::EventsArgs),
    /// Generate a schedule for a day, optionally adding it to the calendar
    Plan(commands::plan::PlanArgs),
}

#[tokio::main]
async fn main() {
    if let Err(e) = smartplanner_core::init() {
        eprintln!("warning: {e}");
    }

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Login => commands::auth::login().await,
        Commands::Logout => commands::auth::logout(),
        Commands::Status => commands::auth::status().await,
        Commands::Events(args) => commands::events::run(args).await,
        Commands::Plan(args) => commands::plan::run(args).await,
    };

    if let Err(e) = result {
        tracing::debug!("Command failed: {:?}", e);
        eprintln!("error: {}", commands::describe(&e));
        std::process::exit(1);
    }
}
