//! Where a game's starting `GameState` comes from. The engine treats a
//! `Region` graph as a pre-existing collaborator it never generates itself,
//! so this lives in the server binary rather than in `common`: either a
//! JSON fixture (the persisted-layout mirror the wire format already uses)
//! or a small built-in ring map for a quick local game.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use common::model::player::Player;
use common::model::region::Region;
use common::model::state::GameState;
use common::model::temple::Temple;
use common::model::soldier::Soldier;
use common::rng::{RngSeed, SeededRng};

#[derive(Serialize, Deserialize)]
pub struct WorldConfig {
    pub regions: Vec<Region>,
    pub players: Vec<Player>,
}

pub fn load_world(path: &Path) -> Result<WorldConfig> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading world file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing world file {}", path.display()))
}

/// A ring of `region_count` regions, each linked to its two ring neighbors
/// plus one cross-ring chord for a bit of topological variety, with one
/// starting region (and a temple) handed to each player in `players`.
pub fn default_world(players: Vec<Player>, region_count: u32, seed: RngSeed) -> (Vec<Player>, GameState) {
    let region_count = region_count.max(players.len() as u32 * 2).max(4);
    let mut regions: Vec<Region> = (0..region_count)
        .map(|i| {
            let angle = (i as f32) / (region_count as f32) * std::f32::consts::TAU;
            Region::new(i, angle.cos(), angle.sin())
    })
        .collect();
    for i in 0..region_count {
        let next = (i + 1) % region_count;
        let chord = (i + region_count / 2) % region_count;
        regions[i as usize].neighbors.insert(next);
        regions[i as usize].neighbors.insert(chord);
        regions[next as usize].neighbors.insert(i);
        regions[chord as usize].neighbors.insert(i);
    }

    let mut rng = SeededRng::from_seed(&seed);
    let mut start_regions: Vec<u32> = (0..region_count).collect();
    rng.shuffle(&mut start_regions);

    let mut state = GameState::new(regions, players.clone(), 0, seed);
    for (player, region) in players.iter().zip(start_regions.iter()) {
        state.owners_by_region.insert(*region, player.slot);
        let soldiers = (0..3).map(|_| {
                let id = state.next_soldier_id();
                Soldier::new(id)
        });
        state.soldiers_by_region.insert(*region, soldiers.collect());
        state.temples_by_region.insert(*region, Temple::new(*region));
    }

    (players, state)
}

