//! External collaborators the engine talks to.
//!
//! The master clock, the scene store and the flash indicator are handed to the
//! engine at construction.

use std::sync::Arc;

use beatscene_types::ExternalClockState;

/// Shared master clock. Several engines may observe the same instance.
pub trait ClockSource: Send + Sync {
    fn is_playing(&self) -> bool;
    /// Monotonically increasing beat number.
    fn current_beat(&self) -> i64;
    fn bpm(&self) -> f64;
    /// Fire-and-forget request to flip the master transport.
    fn request_toggle_play_pause(&self);

    fn snapshot(&self) -> ExternalClockState {
        ExternalClockState {
            is_playing: self.is_playing(),
            current_beat: self.current_beat(),
        }
    }
}

/// The ordered scene list and its index-advancement policy.
pub trait SceneStore: Send {
    fn scene_count(&self) -> usize;
    /// Move to the next scene by whatever policy the store implements.
    /// Loading the scene is the store's concern.
    fn request_advance(&mut self);
}

/// Visual pulse shown when a fire happens.
pub trait FlashSink: Send {
    fn request_flash(&mut self);
}

impl<F: FnMut() + Send> FlashSink for F {
    fn request_flash(&mut self) {
        self()
    }
}

/// Bundle of collaborators handed to an engine.
pub struct EngineServices {
    pub clock: Arc<dyn ClockSource>,
    pub scenes: Box<dyn SceneStore>,
    pub flash: Box<dyn FlashSink>,
}

impl EngineServices {
    pub fn new(
        clock: Arc<dyn ClockSource>,
        scenes: Box<dyn SceneStore>,
        flash: Box<dyn FlashSink>,
    ) -> Self {
        Self { clock, scenes, flash }
    }
}
