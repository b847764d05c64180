//! CLI frontend for the rpgchar game table.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "rpgchar",
    about = "rpgchar: a tabletop RPG assistant for chat rooms",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the table, one message per line on stdin
    Chat {
        /// Table configuration (YAML)
        #[arg(short, long)]
        config: PathBuf,

        /// JSON file holding every room's state
        #[arg(short, long, default_value = "rpgchar.json")]
        state: PathBuf,

        /// Room to start in
        #[arg(short, long, default_value = "main")]
        room: String,

        /// User to speak as
        #[arg(short, long)]
        user: String,

        /// RNG seed, overriding the config
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Roll a dice spec such as 2d6
    Roll {
        /// Dice to roll, `[count]dN`
        spec: String,

        /// RNG seed for a reproducible roll
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Show a room's characters and initiative order
    Show {
        /// JSON file holding every room's state
        #[arg(short, long, default_value = "rpgchar.json")]
        state: PathBuf,

        /// Room to show
        #[arg(short, long, default_value = "main")]
        room: String,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Chat {
            config,
            state,
            room,
            user,
            seed,
        } => commands::chat::run(&config, &state, &room, &user, seed),
        Commands::Roll { spec, seed } => commands::roll::run(&spec, seed),
        Commands::Show { state, room } => commands::show::run(&state, &room),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
