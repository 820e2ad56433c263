pub mod app;
pub mod sim;

pub use app::{
    run_app, run_app_with_metrics, AppError, LoopConfig, LoopMetricsSnapshot, MetricsHandle,
    Renderer, Scene, Viewport,
};
pub use sim::{
    CollisionCallback, Color, Commands, ConfigurationError, Edge, EdgeCallback, Entity,
    EntityBuilder, EntityDefaults, FrameStats, Key, KeyListenerIndex, KeypressCallback, Kind,
    PlayField, PressedKeys, Registry, RegistryError, UpdateCallback, Velocity,
};
