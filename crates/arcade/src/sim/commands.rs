use std::fmt;

use super::entity::{Entity, Kind};

type EntityEdit<K> = Box<dyn FnOnce(&mut Entity<K>)>;

pub(crate) enum Command<K: Kind> {
    Spawn(Entity<K>),
    Despawn(String),
    Modify { name: String, edit: EntityEdit<K> },
}

/// Registry changes requested from inside listener callbacks.
///
/// Nothing here touches the registry directly; the frame loop applies the queue, in request
/// order, once the phase that produced it has visited every entity.
pub struct Commands<K: Kind> {
    queued: Vec<Command<K>>,
}

impl<K: Kind> Commands<K> {
    pub fn new() -> Self {
        Self { queued: Vec::new() }
    }

    /// Registers `entity` (replacing any entity of the same name).
    pub fn spawn(&mut self, entity: Entity<K>) {
        self.queued.push(Command::Spawn(entity));
    }

    pub fn despawn(&mut self, name: impl Into<String>) {
        self.queued.push(Command::Despawn(name.into()));
    }

    /// Edits another entity by name. Skipped if no such entity exists when the queue is applied.
    pub fn modify<F>(&mut self, name: impl Into<String>, edit: F)
    where
        F: FnOnce(&mut Entity<K>) + 'static,
    {
        self.queued.push(Command::Modify {
            name: name.into(),
            edit: Box::new(edit),
        });
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    pub(crate) fn into_queued(self) -> Vec<Command<K>> {
        self.queued
    }
}

impl<K: Kind> Default for Commands<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kind> fmt::Debug for Commands<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self
            .queued
            .iter()
            .map(|command| match command {
                Command::Spawn(entity) => format!("spawn {}", entity.name()),
                Command::Despawn(name) => format!("despawn {name}"),
                Command::Modify { name, .. } => format!("modify {name}"),
            })
            .collect::<Vec<_>>();
        f.debug_struct("Commands").field("queued", &summary).finish()
    }
}
