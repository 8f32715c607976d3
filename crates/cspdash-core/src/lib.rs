#![forbid(unsafe_code)]

//! cspdash core
//!
//! Data and logic behind the CSP-S study dashboard. The centre of the crate is
//! the algorithm-visualization playback engine; the rest is the problem bank,
//! study plan, exam history, progress tracking and the tutor boundary.
//!
//! # Key Components
//!
//! - [`PlaybackEngine`] - Step/play/pause/seek/speed over one scenario
//! - [`ScenarioCatalog`] - Built-in scenarios keyed by [`ScenarioKind`]
//! - [`render::render`] - Pure renderer dispatch producing a [`Visual`]
//! - [`Ticker`] - Repeating timer seam ([`ThreadTicker`], [`VirtualTicker`])
//! - [`ProblemCatalog`] - Embedded problem bank with filtering and statistics
//! - [`TutorSession`] - Chat transcript over a [`TutorBackend`]
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use cspdash_core::prelude::*;
//!
//! let catalog = Arc::new(ScenarioCatalog::builtin());
//! let mut engine = PlaybackEngine::with_scenario(
//!     catalog,
//!     VirtualTicker::new(),
//!     EngineConfig::default(),
//!     "binary_search",
//! );
//! engine.play();
//! engine.advance_time(Duration::from_secs(10));
//! assert!(engine.is_at_end());
//! assert!(!engine.is_playing());
//! ```

pub mod catalog;
pub mod code_panel;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod plan;
pub mod problem;
pub mod progress;
pub mod render;
pub mod scenario;
pub mod timer;
pub mod tutor;

pub use catalog::{Resolved, ScenarioCatalog};
pub use config::DashboardConfig;
pub use engine::{
    EngineConfig, PlaybackEngine, PlaybackEvent, PlaybackLog, PlaybackState, Speed,
    VisualizerFrame,
};
pub use error::{DashError, Result};
pub use render::{RendererKind, Tone, Visual};
pub use scenario::{AlgorithmScenario, AnimationStep, CellValue, DynamicValues, ScenarioKind};
pub use timer::{ThreadTicker, Ticker, TimerHandle, TimerId, VirtualClock, VirtualTicker};
pub use problem::{AlgorithmTag, Problem, ProblemCatalog, ProblemFilter, Tier};
pub use tutor::{TutorBackend, TutorSession};

pub mod prelude {
    pub use crate::{
        AlgorithmScenario, AnimationStep, DashError, DashboardConfig, EngineConfig,
        PlaybackEngine, PlaybackState, ProblemCatalog, ProblemFilter, Result, ScenarioCatalog,
        ScenarioKind, Speed, ThreadTicker, Ticker, Tier, VirtualTicker, Visual,
    };
}
