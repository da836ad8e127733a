//! Authoritative actor store and basic types.

use crate::combat::Team;
use data_runtime::ids::ActorId;
use glam::Vec3;

#[derive(Copy, Clone, Debug)]
pub struct Health {
    pub hp: i32,
    pub max: i32,
}

impl Health {
    #[inline]
    #[must_use]
    pub fn alive(&self) -> bool {
        self.hp > 0
    }
    #[inline]
    pub fn clamp(&mut self) {
        if self.hp > self.max {
            self.hp = self.max;
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct ResourcePool {
    pub mana: i32,
    pub max: i32,
}

impl ResourcePool {
    #[inline]
    pub fn clamp(&mut self) {
        if self.mana > self.max {
            self.mana = self.max;
        }
    }
}

/// Crowd-control flags checked during request validation. Each maps to its
/// own enumerated reject reason.
#[derive(Copy, Clone, Debug, Default)]
pub struct StatusFlags {
    pub stunned: bool,
    pub silenced: bool,
    pub disarmed: bool,
    pub rooted: bool,
}

#[derive(Copy, Clone, Debug)]
pub struct Transform {
    pub pos: Vec3,
    pub yaw: f32,
    pub radius: f32,
}

#[derive(Clone, Debug)]
pub struct Actor {
    pub id: ActorId,
    pub team: Team,
    pub tr: Transform,
    pub hp: Health,
    pub pool: ResourcePool,
    pub status: StatusFlags,
}

#[derive(Default, Debug)]
pub struct ActorStore {
    next_id: u32,
    actors: Vec<Actor>,
}

impl ActorStore {
    pub fn spawn(&mut self, team: Team, tr: Transform, hp: Health, pool: ResourcePool) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.actors.push(Actor {
            id,
            team,
            tr,
            hp,
            pool,
            status: StatusFlags::default(),
        });
        id
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id == id)
    }
    #[inline]
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|a| a.id == id)
    }
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter()
    }
    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.actors.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_assigns_increasing_ids() {
        let mut store = ActorStore::default();
        let tr = Transform {
            pos: Vec3::ZERO,
            yaw: 0.0,
            radius: 0.5,
        };
        let hp = Health { hp: 50, max: 50 };
        let pool = ResourcePool { mana: 20, max: 20 };
        let a = store.spawn(Team::Players, tr, hp, pool);
        let b = store.spawn(Team::Hostiles, tr, hp, pool);
        assert_ne!(a, b);
        assert!(store.get(a).is_some());
        assert_eq!(store.get(b).unwrap().team, Team::Hostiles);
    }

    #[test]
    fn health_clamps_to_max() {
        let mut hp = Health { hp: 60, max: 50 };
        hp.clamp();
        assert_eq!(hp.hp, 50);
    }
}
