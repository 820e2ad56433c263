use crate::sim::{FrameStats, Kind, PlayField, PressedKeys, Registry};

/// A game plugged into the loop runner: registers its entities and names the window.
pub trait Scene {
    type Kind: Kind;

    fn load(&mut self, registry: &mut Registry<Self::Kind>);
    fn unload(&mut self, _registry: &mut Registry<Self::Kind>) {}
    fn debug_title(&self, _registry: &Registry<Self::Kind>) -> Option<String> {
        None
    }
}

pub(crate) struct SceneRuntime<S: Scene> {
    scene: S,
    registry: Registry<S::Kind>,
    is_loaded: bool,
}

impl<S: Scene> SceneRuntime<S> {
    pub(crate) fn new(scene: S, play_field: PlayField) -> Self {
        Self {
            scene,
            registry: Registry::new(play_field),
            is_loaded: false,
        }
    }

    pub(crate) fn load(&mut self) {
        if self.is_loaded {
            return;
        }
        self.scene.load(&mut self.registry);
        self.is_loaded = true;
    }

    pub(crate) fn advance_frame(&mut self, pressed: &PressedKeys, dt: f32) -> FrameStats {
        self.registry.advance_frame(pressed, dt)
    }

    pub(crate) fn set_play_field(&mut self, play_field: PlayField) {
        self.registry.set_play_field(play_field);
    }

    pub(crate) fn registry(&self) -> &Registry<S::Kind> {
        &self.registry
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title(&self.registry)
    }

    pub(crate) fn shutdown(&mut self) {
        if !self.is_loaded {
            return;
        }
        self.scene.unload(&mut self.registry);
        self.registry.clear();
        self.is_loaded = false;
    }
}
