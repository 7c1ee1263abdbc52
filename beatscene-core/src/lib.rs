//! # beatscene-core
//!
//! Beat-synchronized scene automation. Advances an ordered scene list every N
//! beats, taking its beats from one of three tempo sources: the shared master
//! clock, a manual BPM, or a tap-tempo BPM.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use beatscene_core::config::Config;
//! use beatscene_core::runtime::EngineHandle;
//! use beatscene_core::services::EngineServices;
//!
//! // 1. Initial settings from embedded defaults + user config
//! let config = Config::load();
//!
//! // 2. Inject the collaborators: master clock, scene store, flash indicator
//! let services = EngineServices::new(clock, Box::new(scenes), Box::new(|| flash()));
//!
//! // 3. Run the engine on its own thread
//! let mut engine = EngineHandle::spawn(config.engine_config(), services, config.flash_duration());
//!
//! // 4. Forward UI edits and clock notifications
//! engine.set_enabled(true);
//! engine.notify_external_clock_changed();
//!
//! // 5. Drain telemetry for display
//! if let Some(t) = engine.drain_telemetry() { /* ... */ }
//! ```
//!
//! ## Module Overview
//!
//! - [`engine`]: `AutoSceneEngine` and its components: local beat clock,
//!   master clock observer, accumulator, trigger dispatcher, play state
//! - [`timer`]: `TimerService` with deterministic `VirtualTimers` and
//!   wall-clock `ChannelTimers`
//! - [`services`]: collaborator traits (`ClockSource`, `SceneStore`, `FlashSink`)
//! - [`runtime`]: `EngineHandle`, a threaded engine driven over channels
//! - [`config`]: TOML configuration loading (embedded + user override)

pub mod config;
pub mod engine;
pub mod runtime;
pub mod services;
pub mod timer;

pub use engine::AutoSceneEngine;
pub use runtime::EngineHandle;
pub use services::{ClockSource, EngineServices, FlashSink, SceneStore};
pub use timer::{ChannelTimers, TimerService, VirtualTimers};
