use thiserror::Error;
use tracing::{debug, trace, warn};

use super::commands::{Command, Commands};
use super::entity::{Entity, Kind};
use super::field::PlayField;
use super::input::{KeyListenerIndex, PressedKeys};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("an entity named {name} is already registered")]
    DuplicateName { name: String },
}

/// Counters for one call to [`Registry::advance_frame`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frame: u64,
    pub keys_dispatched: usize,
    pub colliding_pairs: usize,
    pub edges_hit: usize,
    pub commands_applied: usize,
}

/// Owns every entity of a running game and advances them one frame at a time.
///
/// Entities are kept in registration order, which is also the order in which collision
/// callbacks fire.
#[derive(Debug)]
pub struct Registry<K: Kind> {
    entities: Vec<Entity<K>>,
    key_listeners: KeyListenerIndex,
    play_field: PlayField,
    frame_count: u64,
}

impl<K: Kind> Default for Registry<K> {
    fn default() -> Self {
        Self::new(PlayField::default())
    }
}

impl<K: Kind> Registry<K> {
    pub fn new(play_field: PlayField) -> Self {
        Self {
            entities: Vec::new(),
            key_listeners: KeyListenerIndex::default(),
            play_field,
            frame_count: 0,
        }
    }

    /// Adds `entity` under its name. An entity already registered under that name is replaced in
    /// place and returned.
    pub fn register(&mut self, entity: Entity<K>) -> Option<Entity<K>> {
        let name = entity.name().to_string();
        self.key_listeners.purge(&name);
        self.key_listeners.insert(&name, entity.listened_keys());

        match self.position(&name) {
            Some(index) => {
                warn!(entity = %name, "entity_replaced");
                Some(std::mem::replace(&mut self.entities[index], entity))
            }
            None => {
                debug!(entity = %name, kind = ?entity.kind(), "entity_registered");
                self.entities.push(entity);
                None
            }
        }
    }

    pub fn try_register(&mut self, entity: Entity<K>) -> Result<(), RegistryError> {
        if self.contains(entity.name()) {
            return Err(RegistryError::DuplicateName {
                name: entity.name().to_string(),
            });
        }
        self.register(entity);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<Entity<K>> {
        let index = self.position(name)?;
        self.key_listeners.purge(name);
        let removed = self.entities.remove(index);
        debug!(entity = %name, "entity_removed");
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.key_listeners.clear();
        self.frame_count = 0;
    }

    pub fn get(&self, name: &str) -> Option<&Entity<K>> {
        self.entities.iter().find(|entity| entity.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Entity<K>> {
        find_mut(&mut self.entities, name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn entities(&self) -> &[Entity<K>] {
        &self.entities
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entities.iter().map(Entity::name)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn key_listeners(&self) -> &KeyListenerIndex {
        &self.key_listeners
    }

    pub fn play_field(&self) -> PlayField {
        self.play_field
    }

    pub fn set_play_field(&mut self, play_field: PlayField) {
        self.play_field = play_field;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Applies queued commands in request order and returns how many were applied.
    pub fn apply(&mut self, commands: Commands<K>) -> usize {
        let queued = commands.into_queued();
        let applied = queued.len();
        for command in queued {
            match command {
                Command::Spawn(entity) => {
                    self.register(entity);
                }
                Command::Despawn(name) => {
                    if self.remove(&name).is_none() {
                        debug!(entity = %name, "despawn_target_missing");
                    }
                }
                Command::Modify { name, edit } => match self.get_mut(&name) {
                    Some(entity) => edit(entity),
                    None => debug!(entity = %name, "modify_target_missing"),
                },
            }
        }
        applied
    }

    /// Runs one tick: input dispatch, collision detection, edge detection, then motion.
    ///
    /// Each phase visits the membership it started with; commands queued by its callbacks are
    /// applied before the next phase begins. `dt` reaches update hooks only; velocity is added
    /// as a whole per frame.
    pub fn advance_frame(&mut self, pressed: &PressedKeys, dt: f32) -> FrameStats {
        let mut stats = FrameStats {
            frame: self.frame_count,
            ..FrameStats::default()
        };

        let commands = self.dispatch_input(pressed, &mut stats);
        stats.commands_applied += self.apply(commands);

        let commands = self.detect_collisions(&mut stats);
        stats.commands_applied += self.apply(commands);

        let commands = self.detect_edges(&mut stats);
        stats.commands_applied += self.apply(commands);

        let commands = self.integrate_motion(dt);
        stats.commands_applied += self.apply(commands);

        self.frame_count = self.frame_count.saturating_add(1);
        trace!(
            frame = stats.frame,
            entity_count = self.entities.len(),
            keys_dispatched = stats.keys_dispatched,
            colliding_pairs = stats.colliding_pairs,
            edges_hit = stats.edges_hit,
            commands_applied = stats.commands_applied,
            "frame_advanced"
        );
        stats
    }

    fn dispatch_input(&mut self, pressed: &PressedKeys, stats: &mut FrameStats) -> Commands<K> {
        let mut commands = Commands::new();
        for (key, names) in self.key_listeners.iter() {
            if !pressed.is_down(key) {
                continue;
            }
            for name in names {
                if let Some(entity) = find_mut(&mut self.entities, name) {
                    entity.key_pressed(key, &mut commands);
                    stats.keys_dispatched += 1;
                }
            }
        }
        commands
    }

    fn detect_collisions(&mut self, stats: &mut FrameStats) -> Commands<K> {
        let mut commands = Commands::new();
        let pairs = colliding_pairs(&self.entities);
        stats.colliding_pairs = pairs.len();
        if pairs.is_empty() {
            return commands;
        }

        // Partners are read from phase-start state, not from entities already edited this phase.
        let partners = self.entities.clone();
        for (index, other_index) in pairs {
            self.entities[index].collided_with(&partners[other_index], &mut commands);
        }
        commands
    }

    fn detect_edges(&mut self, stats: &mut FrameStats) -> Commands<K> {
        let mut commands = Commands::new();
        let field = self.play_field;
        for entity in &mut self.entities {
            if let Some(edge) = field.edge_hit(entity) {
                stats.edges_hit += 1;
                entity.hit_edge(edge, &mut commands);
            }
        }
        commands
    }

    fn integrate_motion(&mut self, dt: f32) -> Commands<K> {
        let mut commands = Commands::new();
        for entity in &mut self.entities {
            entity.step(dt, &mut commands);
        }
        commands
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entities.iter().position(|entity| entity.name() == name)
    }
}

fn find_mut<'a, K: Kind>(entities: &'a mut [Entity<K>], name: &str) -> Option<&'a mut Entity<K>> {
    entities.iter_mut().find(|entity| entity.name() == name)
}

/// Every ordered pair `(a, b)`, `a != b`, whose boxes overlap right now.
fn colliding_pairs<K: Kind>(entities: &[Entity<K>]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (index, entity) in entities.iter().enumerate() {
        for (other_index, other) in entities.iter().enumerate() {
            if index != other_index && entity.collides_with(other) {
                pairs.push((index, other_index));
            }
        }
    }
    pairs
}
