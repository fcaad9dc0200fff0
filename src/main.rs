use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use listenlens::{cli, config, error};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the dashboard server
    Serve(ServeOptions),

    /// Fetch and enrich the listening data of a user
    Sync(UserOptions),

    /// Render the charts from the stored datasets
    Plots(UserOptions),

    /// Print distributions of the stored datasets
    Stats(StatsOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Open the dashboard in the default browser
    #[clap(long)]
    pub open: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct UserOptions {
    /// Spotify user id (the name of the user's data directory)
    #[clap(long)]
    pub user: String,
}

#[derive(Parser, Debug, Clone)]
pub struct StatsOptions {
    /// Spotify user id (the name of the user's data directory)
    #[clap(long)]
    pub user: String,

    /// Number of lines per table
    #[clap(long, default_value_t = 10)]
    pub top: usize,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command_for_update();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    let settings = match config::Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!("Invalid configuration. Err: {}", e),
    };

    match cli.command {
        Command::Serve(opt) => cli::serve(settings, opt.open).await,
        Command::Sync(opt) => cli::sync(settings, &opt.user).await,
        Command::Plots(opt) => cli::plots(settings, &opt.user).await,
        Command::Stats(opt) => cli::stats(settings, &opt.user, opt.top).await,
        Command::Completions(_) => {}
    }
}
