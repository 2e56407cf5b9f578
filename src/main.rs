//! Tridice command line
//!
//! `play` runs an interactive game in the terminal, `simulate` plays many
//! rounds on virtual time, `serve` hosts the presentation bundle.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tridice::{
    api::ApiServer,
    cli::{self, PlayCommand},
    game::RandomRoller,
    logging,
    simulation::{self, SimulationConfig, Strategy},
    ConfigLoader, GameHandle, GameService, TridiceConfig, TridiceResult,
};

#[derive(Parser, Debug)]
#[command(name = "tridice")]
#[command(about = "Three-dice higher/lower betting game", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play in the terminal
    Play,

    /// Play many rounds with a fixed strategy and report the return
    Simulate {
        #[arg(long, default_value = "1000")]
        rounds: u32,

        #[arg(long, default_value = "10")]
        stake: u64,

        #[arg(long, value_enum, default_value = "higher-lower")]
        strategy: Strategy,

        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve the static bundle and the stub API
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> TridiceResult<()> {
    let args = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_path(path);
    }
    let config = loader.load()?;
    logging::init(&config.logging);

    match args.command {
        Command::Play => play(config).await,
        Command::Simulate {
            rounds,
            stake,
            strategy,
            seed,
            json,
        } => {
            let sim = SimulationConfig {
                rounds,
                stake,
                strategy,
                seed,
            };
            simulate(config, &sim, json)
        }
        Command::Serve {
            host,
            port,
            static_dir,
        } => {
            let mut server = config.server;
            if let Some(host) = host {
                server.host = host;
            }
            if let Some(port) = port {
                server.port = port;
            }
            if let Some(dir) = static_dir {
                server.static_dir = dir;
            }
            ApiServer::new(server).run().await
        }
    }
}

async fn play(config: TridiceConfig) -> TridiceResult<()> {
    let (game, task) = GameService::spawn(config.game, RandomRoller::from_entropy());

    let mut updates = game.subscribe();
    let renderer = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(update) => {
                    if let Some(line) = cli::render_update(&update) {
                        println!("{}", line);
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                    debug!(missed, "renderer lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    println!("{}", cli::render_snapshot(&game.snapshot().await?));
    println!("type 'roll' for the opening roll, 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match cli::parse_command(&line) {
            Ok(PlayCommand::Quit) => break,
            Ok(command) => {
                if let Err(err) = dispatch(&game, command).await {
                    println!("{}", err);
                }
            }
            Err(err) => println!("{}", err),
        }
    }

    drop(game);
    let _ = task.await;
    renderer.abort();
    info!("bye");
    Ok(())
}

async fn dispatch(game: &GameHandle, command: PlayCommand) -> TridiceResult<()> {
    match command {
        PlayCommand::Bet { kind, stake } => {
            game.place_bet(kind, stake).await?;
        }
        PlayCommand::Quote { kind, stake } => {
            let bet = game.quote(kind, stake).await?;
            println!(
                "{} for {} pays {}x, {} back on a win",
                bet.kind,
                bet.stake,
                bet.multiplier,
                bet.potential_payout()
            );
        }
        PlayCommand::Roll => game.roll_dice().await?,
        PlayCommand::Reset => game.reset_game().await?,
        PlayCommand::State => println!("{}", cli::render_snapshot(&game.snapshot().await?)),
        PlayCommand::Odds => println!("{}", cli::render_odds()),
        PlayCommand::Help => println!("{}", cli::HELP),
        PlayCommand::Quit => {}
    }
    Ok(())
}

fn simulate(config: TridiceConfig, sim: &SimulationConfig, json: bool) -> TridiceResult<()> {
    let report = simulation::run(config.game, sim)?;

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => println!("failed to encode report: {}", e),
        }
        return Ok(());
    }

    println!("strategy:        {:?}", report.strategy);
    println!("rounds played:   {}", report.rounds_played);
    println!("opening rolls:   {}", report.opening_rolls);
    println!(
        "record:          {} won, {} lost, {} pushed ({:.1}% win rate)",
        report.account.wins,
        report.account.losses,
        report.account.pushes,
        report.account.win_rate_percent()
    );
    println!("credits:         {}", report.account.credits);
    println!("staked:          {}", report.total_staked);
    println!("net:             {:+}", report.net);
    println!("realised return: {:+.4}", report.realised_return());
    println!("expected return: {:+.4}", report.expected_return());
    if report.busted {
        println!("stopped early: out of credits");
    }
    Ok(())
}
