use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::commands::Commands;
use super::field::Edge;
use super::input::Key;
use super::velocity::Velocity;

/// Variant tag of an entity, used as the collision-listener lookup key.
///
/// Implemented for any small closed enum a game declares, e.g. `enum Kind { Paddle, Ball }`.
pub trait Kind: Copy + Eq + Hash + fmt::Debug + 'static {}

impl<T> Kind for T where T: Copy + Eq + Hash + fmt::Debug + 'static {}

pub type KeypressCallback<K> = Rc<dyn Fn(&mut Entity<K>, &mut Commands<K>)>;
pub type CollisionCallback<K> = Rc<dyn Fn(&mut Entity<K>, &Entity<K>, &mut Commands<K>)>;
pub type EdgeCallback<K> = Rc<dyn Fn(&mut Entity<K>, Edge, &mut Commands<K>)>;
pub type UpdateCallback<K> = Rc<dyn Fn(&mut Entity<K>, f32, &mut Commands<K>)>;

/// RGBA color handed to the renderer untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const WHITE: Color = Color([255, 255, 255, 255]);
    pub const BLACK: Color = Color([0, 0, 0, 255]);
    pub const RED: Color = Color([220, 60, 60, 255]);
    pub const GREEN: Color = Color([70, 200, 90, 255]);
    pub const BLUE: Color = Color([70, 110, 230, 255]);
    pub const YELLOW: Color = Color([240, 210, 70, 255]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    pub const fn rgba(self) -> [u8; 4] {
        self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("entity name is required")]
    MissingName,
    #[error("entity {name} has a negative extent: width={width}, height={height}")]
    NegativeExtent {
        name: String,
        width: f32,
        height: f32,
    },
}

/// Template attribute values copied into each new entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityDefaults {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Color,
    pub velocity: Velocity,
    pub score: u32,
}

impl Default for EntityDefaults {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            color: Color::WHITE,
            velocity: Velocity::ZERO,
            score: 0,
        }
    }
}

pub struct Entity<K: Kind> {
    name: String,
    kind: K,
    pub x: f32,
    pub y: f32,
    width: f32,
    height: f32,
    pub color: Color,
    pub velocity: Velocity,
    pub score: u32,
    keypress_listeners: HashMap<Key, KeypressCallback<K>>,
    collision_listeners: HashMap<K, CollisionCallback<K>>,
    edge_listener: Option<EdgeCallback<K>>,
    update_hook: Option<UpdateCallback<K>>,
}

impl<K: Kind> Entity<K> {
    pub fn builder(kind: K) -> EntityBuilder<K> {
        EntityBuilder::new(kind)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> K {
        self.kind
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn set_size(&mut self, width: f32, height: f32) -> Result<(), ConfigurationError> {
        check_extent(&self.name, width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn move_up(&mut self, pixels: f32) {
        self.y -= pixels;
    }

    pub fn move_down(&mut self, pixels: f32) {
        self.y += pixels;
    }

    pub fn move_left(&mut self, pixels: f32) {
        self.x -= pixels;
    }

    pub fn move_right(&mut self, pixels: f32) {
        self.x += pixels;
    }

    /// Inclusive AABB overlap: edges that touch count as a collision. Never true for `self`.
    pub fn collides_with(&self, other: &Entity<K>) -> bool {
        if std::ptr::eq(self, other) {
            return false;
        }
        !(self.bottom() < other.top()
            || self.top() > other.bottom()
            || self.right() < other.left()
            || self.left() > other.right())
    }

    pub fn listens_for_key(&self, key: Key) -> bool {
        self.keypress_listeners.contains_key(&key)
    }

    pub fn listened_keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.keypress_listeners.keys().copied()
    }

    pub fn can_collide_with(&self, kind: K) -> bool {
        self.collision_listeners.contains_key(&kind)
    }

    pub fn has_edge_listener(&self) -> bool {
        self.edge_listener.is_some()
    }

    pub fn key_pressed(&mut self, key: Key, commands: &mut Commands<K>) {
        let Some(callback) = self.keypress_listeners.get(&key).cloned() else {
            return;
        };
        callback(self, commands);
    }

    pub fn collided_with(&mut self, other: &Entity<K>, commands: &mut Commands<K>) {
        let Some(callback) = self.collision_listeners.get(&other.kind).cloned() else {
            return;
        };
        callback(self, other, commands);
    }

    pub fn hit_edge(&mut self, edge: Edge, commands: &mut Commands<K>) {
        let Some(callback) = self.edge_listener.clone() else {
            return;
        };
        callback(self, edge, commands);
    }

    /// Adds the velocity as a raw per-frame displacement. `dt` is only forwarded to the update
    /// hook; it does not scale movement.
    pub fn step(&mut self, dt: f32, commands: &mut Commands<K>) {
        if !self.velocity.is_zero() {
            self.x += self.velocity.x;
            self.y += self.velocity.y;
        }

        if let Some(hook) = self.update_hook.clone() {
            hook(self, dt, commands);
        }
    }
}

impl<K: Kind> Clone for Entity<K> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            color: self.color,
            velocity: self.velocity,
            score: self.score,
            keypress_listeners: self.keypress_listeners.clone(),
            collision_listeners: self.collision_listeners.clone(),
            edge_listener: self.edge_listener.clone(),
            update_hook: self.update_hook.clone(),
        }
    }
}

impl<K: Kind> fmt::Debug for Entity<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = self.listened_keys().collect::<Vec<_>>();
        keys.sort();
        f.debug_struct("Entity")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("color", &self.color)
            .field("velocity", &self.velocity)
            .field("score", &self.score)
            .field("keypress_listeners", &keys)
            .field(
                "collision_listeners",
                &self.collision_listeners.keys().collect::<Vec<_>>(),
            )
            .field("edge_listener", &self.edge_listener.is_some())
            .field("update_hook", &self.update_hook.is_some())
            .finish()
    }
}

/// Collects an entity's attributes and listeners; `build` fails fast on a missing name.
pub struct EntityBuilder<K: Kind> {
    kind: K,
    name: Option<String>,
    attributes: EntityDefaults,
    keypress_listeners: HashMap<Key, KeypressCallback<K>>,
    collision_listeners: HashMap<K, CollisionCallback<K>>,
    edge_listener: Option<EdgeCallback<K>>,
    update_hook: Option<UpdateCallback<K>>,
}

impl<K: Kind> EntityBuilder<K> {
    pub fn new(kind: K) -> Self {
        Self::with_defaults(kind, &EntityDefaults::default())
    }

    pub fn with_defaults(kind: K, defaults: &EntityDefaults) -> Self {
        Self {
            kind,
            name: None,
            attributes: *defaults,
            keypress_listeners: HashMap::new(),
            collision_listeners: HashMap::new(),
            edge_listener: None,
            update_hook: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn position(mut self, x: f32, y: f32) -> Self {
        self.attributes.x = x;
        self.attributes.y = y;
        self
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.attributes.width = width;
        self.attributes.height = height;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.attributes.color = color;
        self
    }

    pub fn velocity(mut self, velocity: Velocity) -> Self {
        self.attributes.velocity = velocity;
        self
    }

    pub fn score(mut self, score: u32) -> Self {
        self.attributes.score = score;
        self
    }

    /// Replaces any listener already declared for `key`.
    pub fn on_keypress<F>(mut self, key: Key, callback: F) -> Self
    where
        F: Fn(&mut Entity<K>, &mut Commands<K>) + 'static,
    {
        self.keypress_listeners.insert(key, Rc::new(callback));
        self
    }

    /// Replaces any listener already declared for `kind`.
    pub fn on_collides_with<F>(mut self, kind: K, callback: F) -> Self
    where
        F: Fn(&mut Entity<K>, &Entity<K>, &mut Commands<K>) + 'static,
    {
        self.collision_listeners.insert(kind, Rc::new(callback));
        self
    }

    pub fn on_hit_edge<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Entity<K>, Edge, &mut Commands<K>) + 'static,
    {
        self.edge_listener = Some(Rc::new(callback));
        self
    }

    pub fn on_update<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Entity<K>, f32, &mut Commands<K>) + 'static,
    {
        self.update_hook = Some(Rc::new(callback));
        self
    }

    pub fn build(self) -> Result<Entity<K>, ConfigurationError> {
        let name = self.name.ok_or(ConfigurationError::MissingName)?;
        let EntityDefaults {
            x,
            y,
            width,
            height,
            color,
            velocity,
            score,
        } = self.attributes;
        check_extent(&name, width, height)?;

        Ok(Entity {
            name,
            kind: self.kind,
            x,
            y,
            width,
            height,
            color,
            velocity,
            score,
            keypress_listeners: self.keypress_listeners,
            collision_listeners: self.collision_listeners,
            edge_listener: self.edge_listener,
            update_hook: self.update_hook,
        })
    }
}

fn check_extent(name: &str, width: f32, height: f32) -> Result<(), ConfigurationError> {
    // NaN fails both comparisons and is rejected as well.
    if width >= 0.0 && height >= 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::NegativeExtent {
            name: name.to_string(),
            width,
            height,
        })
    }
}
