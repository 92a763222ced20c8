//! `giftcard` command line
//!
//! Resolves a pasted storefront URL into the fields printed on a gift card.
//!
//! ```bash
//! giftcard resolve https://store.steampowered.com/app/1245620/ELDEN_RING/
//! giftcard fetch --store epic --id hades --json
//! giftcard locate https://www.xbox.com/en-US/games/store/halo-infinite/9PP5G1F0C2B6
//! ```

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;
use storefront::{
    ErrorKind, GameResolver, GameResponse, NormalizedGame, Store, StoreConfig, StoreError,
};

#[derive(Parser)]
#[command(name = "giftcard", version, about = "Turn a game store URL into gift card details")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a Steam, Epic Games or Xbox/Microsoft Store URL
    Resolve {
        url: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Fetch a game by store and id, skipping URL resolution
    Fetch {
        #[arg(long)]
        store: Store,
        #[arg(long)]
        id: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show which store and id a URL resolves to, without any network access
    Locate { url: String },
}

#[derive(Args)]
struct OutputArgs {
    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(command: Command) -> anyhow::Result<ExitCode> {
    match command {
        Command::Locate { url } => {
            let locator = storefront::resolve(&url);
            println!("{}", serde_json::to_string_pretty(&locator)?);
            Ok(if locator.is_recognized() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(exit_code(ErrorKind::ClientInput))
            })
        }
        Command::Resolve { url, output } => {
            let resolver = build_resolver()?;
            let result = resolver.resolve_game(&url).await;
            report(result, &output)
        }
        Command::Fetch { store, id, output } => {
            let resolver = build_resolver()?;
            let result = resolver.fetch_store(store, &id).await;
            report(result, &output)
        }
    }
}

fn build_resolver() -> anyhow::Result<GameResolver> {
    let config = StoreConfig::from_env().context("Failed to load configuration")?;
    GameResolver::new(config).context("Failed to set up store client")
}

fn report(
    result: Result<NormalizedGame, StoreError>,
    output: &OutputArgs,
) -> anyhow::Result<ExitCode> {
    let code = match &result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(exit_code(e.kind())),
    };

    if output.json {
        let response = GameResponse::from(result);
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(code);
    }

    match result {
        Ok(game) => print_card(&game),
        Err(e) => eprintln!("{}", e.user_message()),
    }
    Ok(code)
}

fn print_card(game: &NormalizedGame) {
    println!("{}", game.name);
    println!("{}", "=".repeat(game.name.chars().count().max(8)));
    println!("Store:       {}", game.store.display_name());
    println!("Store page:  {}", game.store_url);
    if !game.header_image.is_empty() {
        println!("Image:       {}", game.header_image);
    }
    if !game.short_description.is_empty() {
        println!();
        println!("{}", game.short_description);
    }
}

fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::ClientInput => 1,
        ErrorKind::NotFound => 2,
        ErrorKind::UpstreamUnavailable => 3,
        ErrorKind::Internal => 4,
    }
}
