use {
    clap::Parser as _,
    crate::{
        commands::State,
        decklist::DecklistStore,
        pairing::{
            Match,
            RoundPlan,
        },
        prelude::*,
        quotes::QuotePool,
        round::League,
        tally::Tally,
    },
};

mod commands;
mod config;
mod decklist;
mod discord_bot;
mod league;
mod pairing;
mod prelude;
mod quotes;
mod round;
mod store;
mod tally;

#[derive(clap::Subcommand)]
enum Subcommand {
    /// Print the league table
    Table,
    /// Add a player to the league
    Join {
        player: String,
    },
    /// Remove players from the league
    Remove {
        #[clap(required = true)]
        players: Vec<String>,
    },
    /// Add points to a player, creating them if needed
    Points {
        player: String,
        #[clap(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Pair the next round
    Pairings,
    /// Undo the current round's pairings and pair it again
    Repair,
    /// Print the current round's pairings
    Round,
}

#[derive(clap::Parser)]
#[clap(version)]
struct Args {
    /// Config file to use instead of the one in the platform config directory
    #[clap(long)]
    config: Option<PathBuf>,
    /// Directory holding league.json, round.json, decklists.json and tally.json
    #[clap(long)]
    data_dir: Option<PathBuf>,
    /// Without a subcommand, the Discord bot is started
    #[clap(subcommand)]
    subcommand: Option<Subcommand>,
}

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error(transparent)] Config(#[from] config::Error),
    #[error(transparent)] Serenity(#[from] serenity::Error),
    #[error(transparent)] Store(#[from] store::Error),
}

fn print_plan(plan: &RoundPlan) {
    if plan.is_empty() {
        println!("not enough players to generate pairings");
        return
    }
    for m in &plan.matches {
        match m {
            Match::Pair { home, away } => println!("{home} vs {away}"),
            Match::Bye { player } => println!("{player} has a bye"),
        }
    }
    for player in &plan.unpaired {
        println!("{player} could not be paired");
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    let Args { config, data_dir, subcommand } = Args::parse();
    let config = Config::load(config.as_deref()).await?;
    let data_dir = data_dir.unwrap_or_else(|| config.data_dir.clone());
    let mut league = League::load(&data_dir, config.pairing_strategy);
    match subcommand {
        None => {
            let token = config.bot_token()?;
            let state = State {
                league,
                decklists: DecklistStore::load(&data_dir),
                quotes: QuotePool::new(config.quotes),
                tally: Tally::load(&data_dir),
            };
            log::info!("starting Discord bot with data in {}", data_dir.display());
            discord_bot::run(&token, config.command_prefix, state).await?;
        }
        Some(Subcommand::Table) => for (rank, (id, player)) in league.store().standings().into_iter().enumerate() {
            println!("{}. {id}: {} pts{}", rank + 1, player.points, if player.received_bye { " (had a bye)" } else { "" });
        },
        Some(Subcommand::Join { player }) => if league.store_mut().add_player(PlayerId::from(player.clone()))? {
            println!("{player} joined the league");
        } else {
            println!("{player} is already in the league");
        },
        Some(Subcommand::Remove { players }) => for player in players {
            if league.store_mut().remove_player(&PlayerId::from(player.clone()))? {
                println!("removed {player}");
            } else {
                println!("{player} is not in the league");
            }
        },
        Some(Subcommand::Points { player, amount }) => {
            let total = league.store_mut().add_points(&PlayerId::from(player.clone()), amount)?;
            println!("{player} now has {total} pts");
        }
        Some(Subcommand::Pairings) => print_plan(&league.generate()?),
        Some(Subcommand::Repair) => print_plan(&league.repair()?),
        Some(Subcommand::Round) => if let Some(record) = league.current_round() {
            println!("round {} (generated {})", record.round, record.generated_at.format("%Y-%m-%d %H:%M:%S"));
            print_plan(&record.plan());
        } else {
            println!("no round has been paired yet");
        },
    }
    Ok(())
}
