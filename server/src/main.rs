mod actor;
mod registry;
mod world;

use std::collections::HashMap;
use std::net::{IpAddr, Ipv6Addr};
use std::sync::Arc;

use clap::Parser;
use futures::{future, prelude::*};
use tarpc::{
    context::Context,
    server::{self, incoming::Incoming, Channel},
    tokio_serde::formats::Json,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use common::conf;
use common::game::command::{BuildTarget, Command, CommandOutcome};
use common::model::player::{AiLevel, Player};
use common::model::region::RegionIndex;
use common::rng::RngSeed;
use common::rpc::{GameId, GameStateUpdate, PlayerSecret, RunetideRpc};
use runetide_ai::personality;

use actor::{AiSeat, GameHandle};
use registry::GameRegistry;

/// One human-readable seat spec on the command line, e.g. `human`,
/// `ai:Aggressor`, or `ai:Berserker:Mean`.
fn parse_seat(spec: &str) -> (bool, Option<String>, AiLevel) {
    let mut parts = spec.split(':');
    match parts.next() {
        Some("ai") => {
            let personality = parts.next().map(|s| s.to_string());
            let level = parts.next().map(AiLevel::from_difficulty_str).unwrap_or_default();
            (true, personality, level)
        }
        _ => (false, None, AiLevel::default()),
    }
}

#[derive(Parser, Debug)]
#[command(name = conf::APP_NAME, version = conf::APP_VERSION)]
struct Args {
    /// TCP port to listen on.
    #[arg(long, default_value_t = 21311)]
    port: u16,

    /// Comma-separated seat specs for the one game started at boot, e.g.
    /// `human,ai:Aggressor,ai:Defender:Mean`.
    #[arg(long, default_value = "human,ai:Aggressor")]
    seats: String,

    /// Number of regions in the built-in ring map, ignored if `--world` is given.
    #[arg(long, default_value_t = 12)]
    regions: u32,

    /// Path to a JSON world fixture (`{"regions": [...], "players": [...]}`)
    /// instead of the built-in ring map.
    #[arg(long)]
    world: Option<std::path::PathBuf>,

    /// Deterministic RNG seed for the one game started at boot.
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

#[derive(Clone)]
struct RunetideServer {
    registry: Arc<GameRegistry>,
}

impl RunetideServer {
    fn handle_for(&self, game: GameId) -> Option<GameHandle> {
        self.registry.get(game)
    }
}

#[tarpc::server]
impl RunetideRpc for RunetideServer {
    async fn game_state(self, _: Context, game: GameId, player_secret: PlayerSecret) -> Option<common::model::GameState> {
        self.handle_for(game)?.game_state(player_secret).await
    }

    async fn army_move(
        self,
        _: Context,
        game: GameId,
        player_secret: PlayerSecret,
        source: RegionIndex,
        target: RegionIndex,
        count: u32,
    ) -> CommandOutcome {
        match self.handle_for(game) {
            Some(handle) => handle.army_move(player_secret, source, target, count).await,
            None => CommandOutcome { success: false, ..Default::default() },
        }
    }

    async fn build(self, _: Context, game: GameId, player_secret: PlayerSecret, region: RegionIndex, target: BuildTarget) -> CommandOutcome {
        match self.handle_for(game) {
            Some(handle) => handle.build(player_secret, region, target).await,
            None => CommandOutcome { success: false, ..Default::default() },
        }
    }

    async fn end_turn(self, _: Context, game: GameId, player_secret: PlayerSecret, queued: Vec<Command>) -> CommandOutcome {
        match self.handle_for(game) {
            Some(handle) => handle.end_turn(player_secret, queued).await,
            None => CommandOutcome { success: false, ..Default::default() },
        }
    }

    async fn resign(self, _: Context, game: GameId, player_secret: PlayerSecret) -> CommandOutcome {
        match self.handle_for(game) {
            Some(handle) => handle.resign(player_secret).await,
            None => CommandOutcome { success: false, ..Default::default() },
        }
    }

    async fn wait_for_update(self, _: Context, game: GameId, player_secret: PlayerSecret, since_update_id: u64) -> GameStateUpdate {
        match self.handle_for(game) {
            Some(handle) => handle
                .wait_for_update(player_secret, since_update_id)
                .await
                .unwrap_or_else(|| GameStateUpdate { state: empty_state(), last_move: None, turn_moves: None }),
            None => GameStateUpdate { state: empty_state(), last_move: None, turn_moves: None },
        }
    }
}

fn empty_state() -> common::model::GameState {
    common::model::GameState::new(Vec::new(), Vec::new(), 0, RngSeed::from_u64(0))
}

/// Builds the one game started at boot from `args`, registers it, and
/// prints out each seat's connection info: the RPC surface never
/// allocates seats itself, so a human still needs this printed secret to
/// join.
fn bootstrap_game(registry: &GameRegistry, args: &Args) {
    let seat_specs: Vec<&str> = args.seats.split(',').collect();
    let mut seed_players = Vec::with_capacity(seat_specs.len());
    let mut levels: HashMap<common::model::player::PlayerSlot, AiLevel> = HashMap::new();
    for (slot, spec) in seat_specs.iter().enumerate() {
        let (is_ai, personality_name, level) = parse_seat(spec);
        if is_ai {
            let personality = personality::by_name(personality_name.as_deref());
            seed_players.push(Player::ai(slot, format!("Bot {slot}"), "gray", personality.name));
            levels.insert(slot, level);
        } else {
            seed_players.push(Player::human(slot, format!("Player {slot}"), "red"));
        }
    }

    let (players, state) = if let Some(path) = &args.world {
        match world::load_world(path) {
            Ok(config) => {
                let state = common::model::GameState::new(config.regions, config.players.clone(), 0, RngSeed::from_u64(args.seed));
                (config.players, state)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load world file, falling back to the built-in ring map");
                world::default_world(seed_players, args.regions, RngSeed::from_u64(args.seed))
            }
        }
    } else {
        world::default_world(seed_players, args.regions, RngSeed::from_u64(args.seed))
    };

    let ai_seats: HashMap<_, _> = players
        .iter()
        .filter(|p| p.is_ai)
        .map(|p| {
            let personality = personality::by_name(p.personality.as_deref());
            let level = levels.get(&p.slot).copied().unwrap_or_default();
            (p.slot, AiSeat { personality, level })
    })
        .collect();

    let game_id = registry.reserve_game_id();
    let mut secrets = HashMap::new();
    for player in &players {
        let secret = registry.mint_secret();
        info!(game = game_id.0, player = player.slot, secret = secret.0, name = %player.name, "seat ready");
        secrets.insert(secret, player.slot);
    }

    let handle = actor::spawn(state, secrets, ai_seats);
    registry.register(game_id, handle);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();
    let registry = Arc::new(GameRegistry::new());
    bootstrap_game(&registry, &args);

    let server_addr = (IpAddr::V6(Ipv6Addr::LOCALHOST), args.port);
    let mut listener = tarpc::serde_transport::tcp::listen(&server_addr, Json::default).await?;
    info!(port = listener.local_addr().port(), "listening");
    listener.config_mut().max_frame_length(usize::MAX);

    listener
        .filter_map(|r| future::ready(r.ok()))
        .map(server::BaseChannel::with_defaults)
        .max_channels_per_key(64, |t| t.transport().peer_addr().map(|a| a.ip()).unwrap_or(IpAddr::V6(Ipv6Addr::LOCALHOST)))
        .map(|channel| {
            let server = RunetideServer { registry: registry.clone() };
            channel.execute(server.serve())
    })
        .buffer_unordered(64)
        .for_each(|_| async {})
        .await;

    Ok(())
}

