//! Thin CLI harness: issues commands to a `runetided` server and renders
//! the `FeedbackEvent` stream a running [`runetide_reconciler::FeedbackQueue`]
//! produces from each `wait_for_update` push. No terminal UI of its own —
//! the feedback stream is the product here, this is just a console sink for
//! it, matching the "a renderer consumes it" framing of the engine's
//! rendering boundary.

use std::io::{self, BufRead, Write};

use clap::Parser;
use tarpc::{client, context, tokio_serde::formats::Json};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use common::game::command::{BuildTarget, Command};
use common::model::temple::Upgrade;
use common::rpc::{GameId, PlayerSecret, RunetideRpcClient};
use runetide_reconciler::{FeedbackEvent, FeedbackQueue, FeedbackSink, Overlay};

#[derive(Parser, Debug)]
#[command(name = "runetide-client")]
struct Args {
    /// `host:port` of a running `runetided`.
    #[arg(long, default_value = "[::1]:21311")]
    addr: String,

    /// GameId to join, printed by the server on startup.
    #[arg(long, default_value_t = 0)]
    game: u64,

    /// PlayerSecret for the seat to act as, printed by the server on startup.
    #[arg(long)]
    secret: u64,
}

struct ConsoleSink;

impl FeedbackSink for ConsoleSink {
    fn on_event(&mut self, _overlay: &Overlay, event: &FeedbackEvent) {
        match event {
            FeedbackEvent::Movement { source, target, count, .. } => {
                println!("{count} soldiers march from region {source} to region {target}.")
            }
            FeedbackEvent::Conquest { source, target, new_owner, .. } => match source {
                Some(source) => println!("Region {target} falls to player {new_owner}, attacked from region {source}!"),
                None => println!("Region {target} is claimed by player {new_owner}."),
            },
            FeedbackEvent::FailedAttack { source, target, retreats, .. } => {
                if *retreats {
                    println!("The attack from region {source} on region {target} is repelled; survivors retreat.")
                } else {
                    println!("The attack from region {source} on region {target} is repelled; the attackers are destroyed.")
                }
            }
            FeedbackEvent::Recruitment { region, .. } => println!("A new soldier garrisons region {region}."),
            FeedbackEvent::Upgrade { region, .. } => println!("The temple at region {region} channels a new upgrade."),
        }
    }
}

fn parse_upgrade(name: &str) -> Option<Upgrade> {
    match name.to_ascii_lowercase().as_str() {
        "earth" => Some(Upgrade::Earth),
        "fire" => Some(Upgrade::Fire),
        "water" => Some(Upgrade::Water),
        "air" => Some(Upgrade::Air),
        _ => None,
    }
}

/// Long-polls `wait_for_update`, deriving a `FeedbackEvent` plan for every
/// update and replaying it through `queue`. Runs until the server connection
/// drops.
async fn run_reconciler(client: RunetideRpcClient, game: GameId, secret: PlayerSecret, queue: FeedbackQueue, mut previous: common::model::GameState) {
    let mut since_update_id = previous.update_id;
    loop {
        let update = match client.wait_for_update(context::current(), game, secret, since_update_id).await {
            Ok(update) => update,
            Err(e) => {
                warn!(error = %e, "wait_for_update failed, stopping the reconciler loop");
                return;
            }
        };
        if update.state.update_id <= since_update_id {
            continue;
        }
        let plan = runetide_reconciler::build_plan(&previous, &update.state, update.turn_moves.as_deref(), update.last_move.as_ref());
        since_update_id = update.state.update_id;
        previous = update.state;
        if !plan.is_empty() {
            let _ = queue.enqueue(plan).await;
        }
    }
}

fn print_help() {
    println!("commands:");
    println!(" move <source> <target> <count> army move");
    println!(" build soldier <region> recruit a soldier");
    println!(" build upgrade <region> <elem> buy/advance an upgrade (earth/fire/water/air)");
    println!(" end end turn");
    println!(" resign resign from the game");
    println!(" state print the authoritative game state");
    println!(" quit disconnect");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();
    let game = GameId(args.game);
    let secret = PlayerSecret(args.secret);

    let transport = tarpc::serde_transport::tcp::connect(args.addr.as_str(), Json::default).await?;
    let client = RunetideRpcClient::new(client::Config::default(), transport).spawn();

    let state = client
        .game_state(context::current(), game, secret)
        .await?
        .ok_or_else(|| anyhow::anyhow!("server has no such game/secret"))?;
    info!(update_id = state.update_id, player = state.current_player_slot, "joined game");

    let queue = FeedbackQueue::spawn(Overlay::new(state.clone()), ConsoleSink);
    tokio::spawn(run_reconciler(client.clone(), game, secret, queue.clone(), state));

    print_help();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    print!("> ");
    io::stdout().flush().ok();
    while let Some(line) = lines.next() {
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        let outcome = match words.as_slice() {
            ["move", source, target, count] => {
                let (source, target, count) = match (source.parse(), target.parse(), count.parse()) {
                    (Ok(s), Ok(t), Ok(c)) => (s, t, c),
                    _ => {
                        println!("usage: move <source> <target> <count>");
                        print!("> ");
                        io::stdout().flush().ok();
                        continue;
                    }
                };
                Some(client.army_move(context::current(), game, secret, source, target, count).await)
            }
            ["build", "soldier", region] => match region.parse() {
                Ok(region) => Some(client.build(context::current(), game, secret, region, BuildTarget::Soldier).await),
                Err(_) => {
                    println!("usage: build soldier <region>");
                    print!("> ");
                    io::stdout().flush().ok();
                    continue;
                }
            },
            ["build", "upgrade", region, elem] => match (region.parse(), parse_upgrade(elem)) {
                (Ok(region), Some(upgrade)) => Some(client.build(context::current(), game, secret, region, BuildTarget::Upgrade(upgrade)).await),
                _ => {
                    println!("usage: build upgrade <region> <earth|fire|water|air>");
                    print!("> ");
                    io::stdout().flush().ok();
                    continue;
                }
            },
            ["end"] => Some(client.end_turn(context::current(), game, secret, Vec::<Command>::new()).await),
            ["resign"] => Some(client.resign(context::current(), game, secret).await),
            ["state"] => {
                if let Ok(Some(state)) = client.game_state(context::current(), game, secret).await {
                    println!("{}", serde_json::to_string_pretty(&state)?);
                }
                print!("> ");
                io::stdout().flush().ok();
                continue;
            }
            ["quit"] => break,
            [] => {
                print!("> ");
                io::stdout().flush().ok();
                continue;
            }
            _ => {
                print_help();
                print!("> ");
                io::stdout().flush().ok();
                continue;
            }
        };

        match outcome {
            Some(Ok(outcome)) if !outcome.success => println!("rejected: {:?}", outcome.error),
            Some(Ok(_)) => {}
            Some(Err(e)) => error!(error = %e, "rpc call failed"),
            None => {}
        }
        print!("> ");
        io::stdout().flush().ok();
    }

    Ok(())
}

