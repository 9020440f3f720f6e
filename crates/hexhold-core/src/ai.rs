//! Opponent decision-making: role classification, weighted utility
//! scoring over nearby candidate tiles, and validation of the best
//! candidates against the real pathfinder and the real budget.
//!
//! Scoring never commits to a plan. The scheduler asks once per decision
//! point and gets back either a route, a grow-in-place instruction, or
//! nothing.

use std::collections::HashSet;

use hexhold_protocol::Hex;

use crate::{
    agent::Agent,
    config::Tuning,
    growth::check_growth,
    pathfind::{find_path, Path},
    tile::{Tile, TileMap},
};

/// Behavioral role, re-derived from current agent/world data at every
/// decision point. Priority order matters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AiMode {
    /// Nearly broke: search close, take any cheap land.
    Survival,
    /// Cycle queue not full: harvest the nearest virgin tiles.
    Expand,
    /// Low rank: capture tiles exactly at the current rank to climb.
    Evolution,
    /// Resourced and ranked: build the highest reachable level.
    Development,
    /// Fallback: contest virgin land near the rival.
    Competition,
}

/// The plan a decision point produces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AiPlan {
    Relocate { goal: Hex, path: Path },
    GrowHere,
}

pub fn classify(agent: &Agent, tuning: &Tuning) -> AiMode {
    let w = &tuning.ai;
    if agent.spendable(tuning) < w.survival_threshold {
        AiMode::Survival
    } else if !agent.cycle_full(tuning) {
        AiMode::Expand
    } else if agent.player_level < w.evolution_rank {
        AiMode::Evolution
    } else if agent.spendable(tuning) >= w.development_resources {
        AiMode::Development
    } else {
        AiMode::Competition
    }
}

/// Everything the AI may see: read-only world state plus the explicit
/// obstacle set the scheduler passes in. Proposals only; the scheduler
/// commits.
pub struct AiContext<'a> {
    pub map: &'a TileMap,
    pub obstacles: &'a HashSet<Hex>,
    pub tuning: &'a Tuning,
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    at: Hex,
    score: f64,
    distance: i32,
}

/// Produce a plan for one agent, or `None` to pass (the scheduler then
/// recharges moves from idle coins).
pub fn select_plan(agent: &Agent, ctx: &AiContext) -> Option<AiPlan> {
    let tuning = ctx.tuning;
    let mode = classify(agent, tuning);
    let spendable = agent.spendable(tuning);

    let standing = ctx.map.get(agent.position).copied().unwrap_or_default();
    let standing_growable = check_growth(&standing, agent, tuning).is_ok();

    // Critically exhausted: if even a single step is out of reach, in-place
    // growth is the only legal action left.
    if spendable == 0 {
        return standing_growable.then_some(AiPlan::GrowHere);
    }

    let (radius, top_k) = match mode {
        AiMode::Survival => (tuning.ai.survival_radius, tuning.ai.validate_top_survival),
        _ => (tuning.ai.search_radius, tuning.ai.validate_top),
    };

    let mut candidates: Vec<Candidate> = agent
        .position
        .ring_inclusive(radius)
        .filter(|h| *h != agent.position && !ctx.obstacles.contains(h))
        .filter(|h| ctx.map.passable_for(*h, agent.player_level))
        .map(|at| {
            let tile = ctx.map.get(at).copied().unwrap_or_default();
            let distance = agent.position.distance(at);
            Candidate {
                at,
                score: score_candidate(agent, mode, at, &tile, distance, spendable, ctx),
                distance,
            }
        })
        .collect();

    // Highest score first; ties broken by distance then coordinate so the
    // choice is deterministic.
    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.distance.cmp(&b.distance))
            .then(a.at.cmp(&b.at))
    });

    // Irresistible-to-relocate bias: a role-consistent growable tile under
    // our feet competes with a head start.
    let role_consistent_stand = match mode {
        // Virgin land under our feet is exactly what these modes harvest.
        AiMode::Expand | AiMode::Competition => standing.max_level == 0,
        AiMode::Evolution | AiMode::Development => standing.max_level >= 1,
        AiMode::Survival => true,
    };
    let stay_score = (standing_growable && role_consistent_stand).then(|| {
        score_candidate(agent, mode, agent.position, &standing, 0, spendable, ctx)
            + tuning.ai.stay_bias
    });

    // Validate the best candidates against reality: the first one whose
    // actual path cost fits the budget wins.
    let mut chosen: Option<(Candidate, Path)> = None;
    for candidate in candidates.into_iter().take(top_k) {
        let Some(path) = find_path(
            ctx.map,
            agent.position,
            candidate.at,
            agent.player_level,
            ctx.obstacles,
            tuning.path_budget,
        ) else {
            continue;
        };
        if path.cost <= spendable {
            chosen = Some((candidate, path));
            break;
        }
    }

    match (chosen, stay_score) {
        (Some((candidate, path)), Some(stay)) if stay < candidate.score => Some(AiPlan::Relocate {
            goal: candidate.at,
            path,
        }),
        (_, Some(_)) => Some(AiPlan::GrowHere),
        (Some((candidate, path)), None) => Some(AiPlan::Relocate {
            goal: candidate.at,
            path,
        }),
        (None, None) => standing_growable.then_some(AiPlan::GrowHere),
    }
}

/// Soft level ceiling for a mode; exceeding it is penalized, not banned.
fn soft_cap(agent: &Agent, mode: AiMode) -> u32 {
    match mode {
        AiMode::Survival | AiMode::Expand | AiMode::Competition => 1,
        AiMode::Evolution | AiMode::Development => agent.player_level + 1,
    }
}

fn score_candidate(
    agent: &Agent,
    mode: AiMode,
    at: Hex,
    tile: &Tile,
    distance: i32,
    spendable: u64,
    ctx: &AiContext,
) -> f64 {
    let w = &ctx.tuning.ai;
    let height = tile.max_level;
    let rank = agent.player_level;

    let strategic = match mode {
        // Any cheap land will do; cheaper is strictly better.
        AiMode::Survival => 12.0 - tile.entry_cost() as f64,
        // Only virgin tiles fill a cycle slot; anything else wastes one.
        AiMode::Expand => {
            if height == 0 {
                15.0
            } else {
                -6.0 * height as f64
            }
        }
        // Tiles exactly at our rank are the ones whose capture raises it.
        AiMode::Evolution => {
            if height == rank {
                20.0
            } else {
                -2.0 * (height as i64 - rank as i64).abs() as f64
            }
        }
        // Reward height quadratically under the cap, with a strong bonus
        // for the exact rank-raising level.
        AiMode::Development => {
            let h = height as f64;
            let bonus = if height == rank { 15.0 } else { 0.0 };
            h * h + bonus
        }
        AiMode::Competition => {
            if height == 0 {
                10.0
            } else {
                0.0
            }
        }
    };

    // Income potential: where this tile is heading under our occupation.
    let next = (height.max(tile.current_level) + 1) as f64;
    let income = w.income * next * next;

    let distance_weight = match mode {
        AiMode::Expand => w.distance_expand,
        _ => w.distance,
    };
    let distance_penalty = distance_weight * distance as f64;

    // Disqualifying-but-soft: an unaffordable-looking trip sinks to the
    // bottom without being filtered, so emergencies still have options.
    let estimated_cost = tile.entry_cost() + distance as u64;
    let risk = if estimated_cost >= spendable { w.risk } else { 0.0 };

    let cap = soft_cap(agent, mode);
    let over_cap = w.soft_cap * height.saturating_sub(cap) as f64;

    // A tile already holding a cycle slot would waste a new capture.
    let duplicate = if mode == AiMode::Expand && agent.recent_upgrades.contains(&at) {
        w.queue_duplicate
    } else {
        0.0
    };

    let mut score =
        w.strategic * strategic + income - distance_penalty - risk - over_cap - duplicate;

    // Aggression: when rich, lean toward the rival's last known position.
    if spendable >= w.abundance_threshold {
        if let Some(rival) = agent.last_seen_rival {
            let toward = (w.search_radius - at.distance(rival)) as f64;
            score += w.aggression * toward.max(0.0);
        }
    }

    score
}
