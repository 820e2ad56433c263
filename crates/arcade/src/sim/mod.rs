mod commands;
mod entity;
mod field;
mod input;
mod registry;
mod velocity;

pub use commands::Commands;
pub use entity::{
    CollisionCallback, Color, ConfigurationError, EdgeCallback, Entity, EntityBuilder,
    EntityDefaults, KeypressCallback, Kind, UpdateCallback,
};
pub use field::{Edge, PlayField};
pub use input::{Key, KeyListenerIndex, PressedKeys};
pub use registry::{FrameStats, Registry, RegistryError};
pub use velocity::Velocity;
