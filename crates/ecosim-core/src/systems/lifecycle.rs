//! Organism lifecycle - spawning, epoch reset and the per-tick
//! move -> eat -> reproduce state machine.
//!
//! An organism only ever writes to its own components, with one exception:
//! eating flips the prey's `LifeState` to `Dead`. Other organisms are read
//! through short-lived borrows so a stale handle is just "not alive".

use std::sync::Arc;

use hecs::{Entity, World};
use rand::Rng;

use crate::components::{
    Body, LifeState, Navigation, Neighbours, Offspring, Organism, SpeciesSpec, Vec2,
};
use crate::error::SimError;
use crate::ids::IdAllocator;
use crate::navigation::Navigator;

/// Succeeds iff a uniform draw from `0..=100` is at most `reference`
pub fn stochastic_trial(reference: u32, rng: &mut impl Rng) -> bool {
    rng.gen_range(0..=100u32) <= reference
}

/// Whether `entity` exists and is alive
pub fn is_alive(world: &World, entity: Entity) -> bool {
    world
        .get::<&Organism>(entity)
        .map(|org| org.is_alive())
        .unwrap_or(false)
}

/// Position of `entity` if it exists and is alive
pub fn living_position(world: &World, entity: Entity) -> Option<Vec2> {
    let mut query = world.query_one::<(&Organism, &Body)>(entity).ok()?;
    let (org, body) = query.get()?;
    org.is_alive().then_some(body.position)
}

/// Spawn a new organism and place it in the environment
pub fn spawn_organism(
    world: &mut World,
    species: Arc<SpeciesSpec>,
    navigator: Box<dyn Navigator>,
    ids: &mut IdAllocator,
    rng: &mut impl Rng,
) -> Result<Entity, SimError> {
    let id = ids.next_id(&species.species_name);
    let entity = world.spawn((
        Organism::new(id, species),
        Body::default(),
        Navigation(navigator),
        Neighbours::default(),
        Offspring::default(),
    ));
    reset_organism(world, entity, rng)?;
    Ok(entity)
}

/// Start-of-epoch reset: fresh placement, hunger back to base, lists
/// cleared and the organism alive again.
pub fn reset_organism(
    world: &mut World,
    entity: Entity,
    rng: &mut impl Rng,
) -> Result<(), SimError> {
    let (org, body, nav, neighbours, offspring) = world
        .query_one_mut::<(
            &mut Organism,
            &mut Body,
            &mut Navigation,
            &mut Neighbours,
            &mut Offspring,
        )>(entity)
        .map_err(|_| SimError::Detached { entity })?;

    let (position, heading) = nav.0.initialize(rng);
    body.position = position;
    body.velocity = heading * org.species.speed;

    org.hunger = org.species.base_hunger;
    org.state = LifeState::Alive;
    org.reproduced_this_epoch = false;
    neighbours.0.clear();
    offspring.0.clear();
    Ok(())
}

/// Run one tick for a living organism. Dead organisms are left untouched.
pub fn advance_organism(
    world: &mut World,
    entity: Entity,
    ids: &mut IdAllocator,
    rng: &mut impl Rng,
) -> Result<(), SimError> {
    if !is_alive(world, entity) {
        return Ok(());
    }
    move_organism(world, entity)?;
    eat(world, entity, rng)?;
    reproduce(world, entity, ids, rng)?;
    Ok(())
}

/// Move one step using the organism's own navigator
pub fn move_organism(world: &mut World, entity: Entity) -> Result<(), SimError> {
    let targets = world
        .get::<&Neighbours>(entity)
        .map_err(|_| SimError::Detached { entity })?
        .0
        .clone();
    let neighbour_positions: Vec<Vec2> = targets
        .iter()
        .filter_map(|&n| living_position(world, n))
        .collect();

    let (org, body, nav) = world
        .query_one_mut::<(&Organism, &mut Body, &mut Navigation)>(entity)
        .map_err(|_| SimError::Detached { entity })?;

    let speed = org.species.speed;
    let (position, heading) = nav.0.step(body.position, speed, &neighbour_positions);
    body.position = position;
    body.velocity = heading * speed;
    Ok(())
}

/// What the eater needs to know about a neighbour
struct PreyView {
    alive: bool,
    trophic_level: i32,
    food_value: i32,
    position: Vec2,
}

fn view(world: &World, entity: Entity) -> Option<PreyView> {
    let mut query = world.query_one::<(&Organism, &Body)>(entity).ok()?;
    let (org, body) = query.get()?;
    Some(PreyView {
        alive: org.is_alive(),
        trophic_level: org.trophic_level(),
        food_value: org.species.food_value(),
        position: body.position,
    })
}

/// Try to eat one neighbour.
///
/// Neighbours are tried in list order and the first successful attempt
/// ends the step, so at most one prey dies per eater per tick. Neighbours
/// found dead are dropped from the list on the way. Returns the prey eaten.
pub fn eat(
    world: &mut World,
    entity: Entity,
    rng: &mut impl Rng,
) -> Result<Option<Entity>, SimError> {
    let (species, position, candidates) = {
        let (org, body, neighbours) = world
            .query_one_mut::<(&Organism, &Body, &Neighbours)>(entity)
            .map_err(|_| SimError::Detached { entity })?;
        (org.species.clone(), body.position, neighbours.0.clone())
    };

    let mut stale = Vec::new();
    let mut meal = None;

    for prey in candidates {
        let Some(prey_view) = view(world, prey).filter(|v| v.alive) else {
            stale.push(prey);
            continue;
        };
        if !species.outranks(prey_view.trophic_level) {
            continue;
        }

        let in_range = world
            .get::<&Navigation>(entity)
            .map_err(|_| SimError::Detached { entity })?
            .0
            .is_in_range(position, prey_view.position, species.feeding_range);
        if !in_range || !stochastic_trial(species.feeding_chance, rng) {
            continue;
        }

        let prey_org = world
            .query_one_mut::<&mut Organism>(prey)
            .map_err(|_| SimError::Detached { entity: prey })?;
        prey_org.state = LifeState::Dead;
        meal = Some((prey, prey_view.food_value));
        break;
    }

    let (org, neighbours) = world
        .query_one_mut::<(&mut Organism, &mut Neighbours)>(entity)
        .map_err(|_| SimError::Detached { entity })?;

    if !stale.is_empty() {
        neighbours.0.retain(|n| !stale.contains(n));
    }
    if let Some((prey, food)) = meal {
        org.hunger = org.hunger.saturating_sub(food);
        log::trace!(
            "{} #{} ate {:?} (+{} food, hunger {})",
            org.species.species_name,
            org.id,
            prey,
            food,
            org.hunger
        );
    }

    Ok(meal.map(|(prey, _)| prey))
}

/// Queue a litter of offspring when satiated and the trial succeeds.
///
/// Children are spawned and placed immediately but stay out of the
/// population until the parent is harvested at epoch rollover. Returns
/// the number of children born.
pub fn reproduce(
    world: &mut World,
    entity: Entity,
    ids: &mut IdAllocator,
    rng: &mut impl Rng,
) -> Result<usize, SimError> {
    let (satiated, offspring_chance) = {
        let org = world
            .query_one_mut::<&Organism>(entity)
            .map_err(|_| SimError::Detached { entity })?;
        (org.is_satiated(), org.species.offspring_chance)
    };
    if !satiated || !stochastic_trial(offspring_chance, rng) {
        return Ok(0);
    }

    let (species, navigators) = {
        let (org, nav) = world
            .query_one_mut::<(&Organism, &Navigation)>(entity)
            .map_err(|_| SimError::Detached { entity })?;
        let navigators: Vec<Box<dyn Navigator>> = (0..org.species.litter_size)
            .map(|_| nav.0.replicate())
            .collect();
        (org.species.clone(), navigators)
    };

    let mut children = Vec::with_capacity(navigators.len());
    for navigator in navigators {
        children.push(spawn_organism(world, species.clone(), navigator, ids, rng)?);
    }

    let (org, offspring) = world
        .query_one_mut::<(&mut Organism, &mut Offspring)>(entity)
        .map_err(|_| SimError::Detached { entity })?;
    org.reproduced_this_epoch = true;
    offspring.0.extend(children.iter().copied());

    Ok(children.len())
}

/// Remove and return the offspring queued on `entity`
pub fn take_offspring(world: &mut World, entity: Entity) -> Result<Vec<Entity>, SimError> {
    let offspring = world
        .query_one_mut::<&mut Offspring>(entity)
        .map_err(|_| SimError::Detached { entity })?;
    Ok(std::mem::take(&mut offspring.0))
}
