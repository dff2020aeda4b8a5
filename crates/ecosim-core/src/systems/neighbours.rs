//! Neighbour index - buffered prey lists refreshed on a schedule.
//!
//! Checking every predator against every prey each tick is O(n²). Instead
//! each predator keeps a list of prey within `neighbour_range`, rebuilt
//! every `neighbour_update_interval` ticks. The range is padded so that
//! nothing that could come within feeding range before the next refresh
//! is left out: between refreshes two organisms close at most
//! `2 * max_speed * interval`, and the range adds another `2 * max_speed`
//! on top of that.
//!
//! Extra entries are harmless (eating re-checks the real feeding range);
//! a missing entry would silently lose a predation event.

use hecs::{Entity, World};

use crate::components::{Neighbours, Vec2};
use crate::error::SimError;
use crate::navigation::Navigator;
use crate::population::Population;

use super::lifecycle::living_position;

/// Buffered neighbour radius for the fastest organism in the simulation.
///
/// `None` means no neighbours are possible: there are no populations, or
/// the speed is not a usable number. A speed of zero gives a zero radius,
/// which still links organisms standing on the same spot.
pub fn neighbour_range(max_speed: Option<f64>, update_interval: u32) -> Option<f64> {
    let speed = max_speed?;
    if !speed.is_finite() || speed < 0.0 {
        return None;
    }
    Some(speed * (2.0 * update_interval as f64 + 2.0))
}

/// Fastest species speed across `populations`
pub fn max_speed(populations: &[Population]) -> Option<f64> {
    populations.iter().map(|p| p.species().speed).reduce(f64::max)
}

/// Empty every organism's neighbour list
pub fn clear_neighbours(world: &mut World) {
    for (_, neighbours) in world.query_mut::<&mut Neighbours>() {
        neighbours.0.clear();
    }
}

/// Rebuild all neighbour lists from scratch. Returns the number of links.
///
/// `populations` must be sorted by descending trophic level: predators in
/// population `i` are only linked with prey in populations `j >= i` of a
/// strictly lower level, never with their own level.
pub fn rebuild_neighbours(
    world: &mut World,
    populations: &[Population],
    navigator: &dyn Navigator,
    range: Option<f64>,
) -> Result<usize, SimError> {
    clear_neighbours(world);
    let Some(range) = range else {
        return Ok(0);
    };

    let mut links = 0;
    for (i, predators) in populations.iter().enumerate() {
        for prey_population in &populations[i..] {
            if predators.trophic_level() <= prey_population.trophic_level() {
                continue;
            }

            let prey: Vec<(Entity, Vec2)> = prey_population
                .living()
                .iter()
                .filter_map(|&e| living_position(world, e).map(|pos| (e, pos)))
                .collect();
            if prey.is_empty() {
                continue;
            }

            for &hunter in predators.living() {
                let Some(origin) = living_position(world, hunter) else {
                    continue;
                };
                let found: Vec<Entity> = prey
                    .iter()
                    .filter(|(_, pos)| navigator.is_in_range(origin, *pos, range))
                    .map(|(e, _)| *e)
                    .collect();
                if found.is_empty() {
                    continue;
                }

                links += found.len();
                let neighbours = world
                    .query_one_mut::<&mut Neighbours>(hunter)
                    .map_err(|_| SimError::Detached { entity: hunter })?;
                neighbours.0.extend(found);
            }
        }
    }

    Ok(links)
}
