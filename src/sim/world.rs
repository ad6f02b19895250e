//! World container
//!
//! Entities live in an arena addressed by stable `EntityId` handles. Role
//! membership (collide, interact, regen) is kept in side tables that are
//! updated on spawn, despawn and when an unstable block breaks or returns.
//! Side tables are ordered sets, so role iteration is ascending by id.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::entity::{Background, Entity, EntityKind, GridCell, PlaneColor, UnstableChange};
use super::geom::Rect;
use super::state::{PlayerState, WorldState};
use crate::consts::{GRID_COLUMNS, GRID_ROWS};
use crate::level::LevelData;
use crate::tuning::Tuning;

/// Stable handle to an entity within one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Role side tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Collide,
    Interact,
    Regen,
}

/// Typed entity storage with role side tables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityArena {
    slots: Vec<Option<Entity>>,
    collide: BTreeSet<EntityId>,
    interact: BTreeSet<EntityId>,
    regen: BTreeSet<EntityId>,
}

impl EntityArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.slots.len() as u32);
        let caps = entity.capabilities();
        if caps.collides {
            self.collide.insert(id);
        }
        if caps.interacts {
            self.interact.insert(id);
        }
        if caps.regenerates {
            self.regen.insert(id);
        }
        self.slots.push(Some(entity));
        id
    }

    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.slots.get_mut(id.0 as usize)?.take()?;
        self.collide.remove(&id);
        self.interact.remove(&id);
        self.regen.remove(&id);
        Some(entity)
    }

    /// Remove everything. Handles restart from zero.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.collide.clear();
        self.interact.clear();
        self.regen.clear();
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id.0 as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots.get_mut(id.0 as usize)?.as_mut()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All live entities, ascending by id
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|e| (EntityId(i as u32), e)))
    }

    fn table(&self, role: Role) -> &BTreeSet<EntityId> {
        match role {
            Role::Collide => &self.collide,
            Role::Interact => &self.interact,
            Role::Regen => &self.regen,
        }
    }

    /// Members of a role table, ascending by id
    pub fn with_role(&self, role: Role) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.table(role)
            .iter()
            .filter_map(|&id| self.get(id).map(|e| (id, e)))
    }

    pub fn has_role(&self, id: EntityId, role: Role) -> bool {
        self.table(role).contains(&id)
    }

    /// Add to or drop from the collide table
    pub fn set_collidable(&mut self, id: EntityId, collidable: bool) {
        if collidable {
            if self.get(id).is_some() {
                self.collide.insert(id);
            }
        } else {
            self.collide.remove(&id);
        }
    }

    /// Role members not merged into `background` whose rect overlaps `rect`
    pub fn overlapping(&self, role: Role, rect: &Rect, background: Background) -> Vec<EntityId> {
        self.with_role(role)
            .filter(|(_, e)| e.is_active(background) && e.rect.overlaps(rect))
            .map(|(id, _)| id)
            .collect()
    }

    /// Reset every regenerable entity and restore its collision role
    pub fn regen_all(&mut self) {
        let ids: Vec<EntityId> = self.regen.iter().copied().collect();
        for id in ids {
            if let Some(entity) = self.get_mut(id) {
                entity.regen();
                let collides = entity.capabilities().collides;
                self.set_collidable(id, collides);
            }
        }
    }

    /// Advance every entity one tick, keeping the collide table in step with
    /// unstable block changes
    pub fn advance_all(&mut self, background: Background, tuning: &Tuning, dt: f32) -> Vec<(EntityId, UnstableChange)> {
        let mut changes = Vec::new();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let Some(entity) = slot else { continue };
            if let Some(change) = entity.advance(background, tuning, dt) {
                changes.push((EntityId(i as u32), change));
            }
        }
        for &(id, change) in &changes {
            self.set_collidable(id, change == UnstableChange::Restored);
        }
        changes
    }
}

/// Everything that exists while a level is loaded
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    pub state: WorldState,
    pub entities: EntityArena,
    /// `None` once the player has left through the RGB exit
    pub player: Option<PlayerState>,
}

impl World {
    /// Instantiate a decoded level, adding boundary walls when not wrapping
    pub fn from_level(level: &LevelData) -> Self {
        let mut world = Self {
            state: WorldState::new(level.background, level.wrapping),
            entities: EntityArena::new(),
            player: None,
        };

        for placement in &level.placements {
            match placement.kind {
                EntityKind::Player { facing, .. } => {
                    world.player = Some(PlayerState::spawn_at(placement.cell, facing));
                }
                kind => {
                    world.entities.spawn(Entity::new(kind, placement.color, placement.cell));
                }
            }
        }

        if !level.wrapping {
            world.add_boundary_walls();
        }
        world
    }

    /// Grey block columns just outside the left and right screen edges
    fn add_boundary_walls(&mut self) {
        for column in [-1, GRID_COLUMNS as i32] {
            for row in 0..GRID_ROWS as i32 {
                self.entities
                    .spawn(Entity::new(EntityKind::Block, PlaneColor::Grey, GridCell::new(column, row)));
            }
        }
    }

    /// Restore the level to its loaded state without touching static entities
    pub fn regen(&mut self) {
        self.state.background = self.state.initial_background;
        self.state.flip_cooldown = 0.0;
        if let Some(player) = self.player.as_mut() {
            player.reset_to_spawn();
        }
        self.entities.regen_all();
    }

    /// Remove all level-scoped entities
    pub fn clear(&mut self) {
        self.entities.clear();
        self.player = None;
    }
}
