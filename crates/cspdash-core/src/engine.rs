#![forbid(unsafe_code)]

//! Playback engine for algorithm scenarios.
//!
//! Owns the playback state of one mounted visualizer: step index, play/pause,
//! speed, and the accumulated dynamic values. Commands mutate that state; a
//! single repeating timer advances it while playing.
//!
//! # Invariants
//!
//! 1. **Progress bounds**: `0 <= step_index < step_count`.
//! 2. **Accumulation**: every change of `step_index` merges the new current
//!    step's `values` into `dynamic_values`, last write wins. Nothing but
//!    [`PlaybackEngine::load_scenario`] and [`PlaybackEngine::reset`] removes
//!    entries, so stepping backward keeps values written by later steps.
//! 3. **Timer singularity**: at most one timer handle is held. It is stopped
//!    before a replacement starts and on pause, reset, scenario load and drop.
//! 4. **No stale ticks**: ticks whose id is not the held timer's id are
//!    ignored.
//! 5. **Termination**: a tick at the last step stops playback; it never wraps.
//!
//! # Failure Modes
//!
//! None are surfaced. Out-of-range indices clamp; unknown scenario keys load
//! the catalog default.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::catalog::ScenarioCatalog;
use crate::code_panel::{CodeLine, CodePanel};
use crate::render::{self, RenderInput, Visual};
use crate::scenario::{AlgorithmScenario, AnimationStep, DynamicValues, ScenarioKind};
use crate::timer::{Ticker, TimerHandle, TimerId, VirtualTicker};

/// Auto-advance interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl Speed {
    pub const ALL: [Self; 3] = [Self::Slow, Self::Normal, Self::Fast];

    pub fn interval(self) -> Duration {
        Duration::from_millis(self.millis())
    }

    pub fn millis(self) -> u64 {
        match self {
            Self::Slow => 1500,
            Self::Normal => 1000,
            Self::Fast => 500,
        }
    }

    pub fn from_millis(ms: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|speed| speed.millis() == ms)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Normal => "normal",
            Self::Fast => "fast",
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} ms)", self.label(), self.millis())
    }
}

/// Play/pause state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Paused,
    Playing,
}

impl PlaybackState {
    /// Human-readable label for display (includes both icon and text).
    pub fn label(self) -> &'static str {
        match self {
            Self::Paused => "⏸ Paused",
            Self::Playing => "▶ Playing",
        }
    }
}

// =============================================================================
// Diagnostic log
// =============================================================================

/// A diagnostic log entry. Serialized one per line by [`PlaybackLog::to_jsonl`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlaybackEvent {
    ScenarioLoaded {
        seq: u64,
        requested: String,
        resolved: ScenarioKind,
        fell_back: bool,
        step_count: usize,
    },
    Navigation {
        seq: u64,
        action: &'static str,
        from: usize,
        to: usize,
        step_count: usize,
    },
    Playback {
        seq: u64,
        from: PlaybackState,
        to: PlaybackState,
        step: usize,
    },
    Speed {
        seq: u64,
        from: Speed,
        to: Speed,
        rescheduled: bool,
    },
}

/// Bounded diagnostic log.
#[derive(Debug)]
pub struct PlaybackLog {
    entries: VecDeque<PlaybackEvent>,
    max_entries: usize,
    seq: u64,
}

impl PlaybackLog {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries.min(1000)),
            max_entries,
            seq: 0,
        }
    }

    /// Get and increment the sequence number.
    pub fn next_seq(&mut self) -> u64 {
        let s = self.seq;
        self.seq = self.seq.wrapping_add(1);
        s
    }

    pub fn push(&mut self, entry: PlaybackEvent) {
        if self.max_entries == 0 {
            return;
        }
        while self.entries.len() >= self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn entries(&self) -> &VecDeque<PlaybackEvent> {
        &self.entries
    }

    pub fn to_jsonl(&self) -> String {
        self.entries
            .iter()
            .filter_map(|e| serde_json::to_string(e).ok())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Engine construction options.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub speed: Speed,
    /// Diagnostic entries retained; zero disables the log.
    pub log_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            speed: Speed::Normal,
            log_capacity: 500,
        }
    }
}

/// Everything a visualizer needs to draw one frame.
#[derive(Debug, Clone, Serialize)]
pub struct VisualizerFrame {
    pub title: String,
    pub kind: ScenarioKind,
    /// Zero-based.
    pub step_index: usize,
    pub step_count: usize,
    pub state: PlaybackState,
    pub speed: Speed,
    pub description: String,
    pub visual: Visual,
    pub code: Vec<CodeLine>,
}

pub struct PlaybackEngine<T: Ticker> {
    catalog: Arc<ScenarioCatalog>,
    kind: ScenarioKind,
    scenario: Arc<AlgorithmScenario>,
    step_index: usize,
    playing: bool,
    speed: Speed,
    dynamic_values: DynamicValues,
    ticker: T,
    timer: Option<T::Handle>,
    log: PlaybackLog,
}

impl<T: Ticker> fmt::Debug for PlaybackEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("kind", &self.kind)
            .field("step_index", &self.step_index)
            .field("playing", &self.playing)
            .field("speed", &self.speed)
            .field("dynamic_values", &self.dynamic_values)
            .field("timer", &self.timer.as_ref().map(TimerHandle::id))
            .finish_non_exhaustive()
    }
}

impl<T: Ticker> PlaybackEngine<T> {
    /// Create an engine showing the catalog's default scenario.
    pub fn new(catalog: Arc<ScenarioCatalog>, ticker: T, config: EngineConfig) -> Self {
        let kind = catalog.default_kind();
        let resolved = catalog.resolve(kind.key());
        let mut engine = Self {
            catalog,
            kind,
            scenario: resolved.scenario,
            step_index: 0,
            playing: false,
            speed: config.speed,
            dynamic_values: DynamicValues::new(),
            ticker,
            timer: None,
            log: PlaybackLog::new(config.log_capacity),
        };
        engine.merge_step_values(0);
        engine
    }

    /// Create an engine and load `key` immediately.
    pub fn with_scenario(
        catalog: Arc<ScenarioCatalog>,
        ticker: T,
        config: EngineConfig,
        key: &str,
    ) -> Self {
        let mut engine = Self::new(catalog, ticker, config);
        engine.load_scenario(key);
        engine
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn kind(&self) -> ScenarioKind {
        self.kind
    }

    pub fn scenario(&self) -> &AlgorithmScenario {
        &self.scenario
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn step_count(&self) -> usize {
        self.scenario.step_count()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn playback_state(&self) -> PlaybackState {
        if self.playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        }
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn dynamic_values(&self) -> &DynamicValues {
        &self.dynamic_values
    }

    pub fn current_step(&self) -> &AnimationStep {
        self.scenario.step(self.step_index)
    }

    pub fn is_at_end(&self) -> bool {
        self.step_index >= self.scenario.last_index()
    }

    /// Id of the running timer, if any.
    pub fn active_timer(&self) -> Option<TimerId> {
        self.timer.as_ref().map(TimerHandle::id)
    }

    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    pub fn playback_log(&self) -> &PlaybackLog {
        &self.log
    }

    pub fn export_diagnostics(&self) -> String {
        self.log.to_jsonl()
    }

    /// Render the current state.
    pub fn visual(&self) -> Visual {
        render::render(&RenderInput {
            kind: self.kind,
            step: self.current_step(),
            values: &self.dynamic_values,
            initial: self.scenario.initial_data(),
        })
    }

    pub fn frame(&self) -> VisualizerFrame {
        let step = self.current_step();
        VisualizerFrame {
            title: self.scenario.title().to_owned(),
            kind: self.kind,
            step_index: self.step_index,
            step_count: self.step_count(),
            state: self.playback_state(),
            speed: self.speed,
            description: step.description.clone(),
            visual: self.visual(),
            code: CodePanel::new(self.scenario.code(), step.line_index).lines(),
        }
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Switch to the scenario for `key`, discarding all playback state.
    ///
    /// Unknown keys load the catalog default. Returns the kind loaded.
    pub fn load_scenario(&mut self, key: &str) -> ScenarioKind {
        self.cancel_timer();
        let resolved = self.catalog.resolve(key);
        self.kind = resolved.kind;
        self.scenario = resolved.scenario;
        self.step_index = 0;
        self.playing = false;
        self.dynamic_values.clear();
        self.merge_step_values(0);

        tracing::info!(
            requested = key,
            resolved = %self.kind,
            fell_back = resolved.fell_back,
            steps = self.step_count(),
            "scenario loaded"
        );
        let seq = self.log.next_seq();
        self.log.push(PlaybackEvent::ScenarioLoaded {
            seq,
            requested: key.to_owned(),
            resolved: self.kind,
            fell_back: resolved.fell_back,
            step_count: self.step_count(),
        });
        self.kind
    }

    /// Start auto-advance. No-op at the last step.
    pub fn play(&mut self) {
        if self.playing || self.is_at_end() {
            return;
        }
        let from = self.playback_state();
        self.playing = true;
        self.restart_timer();
        self.log_playback(from);
    }

    pub fn pause(&mut self) {
        self.cancel_timer();
        if !self.playing {
            return;
        }
        let from = self.playback_state();
        self.playing = false;
        self.log_playback(from);
    }

    pub fn toggle_playback(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Step to next step, clamped at the end.
    pub fn step_forward(&mut self) {
        let to = (self.step_index + 1).min(self.scenario.last_index());
        self.move_to(to, "step_forward");
    }

    /// Step to previous step, clamped at zero.
    pub fn step_backward(&mut self) {
        let to = self.step_index.saturating_sub(1);
        self.move_to(to, "step_backward");
    }

    /// Jump to `index`, clamped into range.
    ///
    /// A forward jump merges the writes of every step passed over, so the
    /// values match a sequential walk. A backward jump merges only the target.
    pub fn seek(&mut self, index: usize) {
        let to = index.min(self.scenario.last_index());
        self.move_to(to, "seek");
    }

    /// Stop playback and return to step 0 with no accumulated values.
    pub fn reset(&mut self) {
        let from_index = self.step_index;
        let from_state = self.playback_state();
        self.cancel_timer();
        self.playing = false;
        self.step_index = 0;
        self.dynamic_values.clear();
        if from_state != PlaybackState::Paused {
            self.log_playback(from_state);
        }
        self.log_navigation("reset", from_index);
    }

    /// Change the auto-advance interval, rescheduling a running timer.
    pub fn set_speed(&mut self, speed: Speed) {
        if speed == self.speed {
            return;
        }
        let from = self.speed;
        self.speed = speed;
        let rescheduled = self.playing;
        if rescheduled {
            self.restart_timer();
        }
        tracing::debug!(from = %from, to = %speed, rescheduled, "playback speed changed");
        let seq = self.log.next_seq();
        self.log.push(PlaybackEvent::Speed {
            seq,
            from,
            to: speed,
            rescheduled,
        });
    }

    /// Handle a tick delivered by the ticker.
    ///
    /// Returns `true` when the tick was accepted (advanced or stopped playback).
    pub fn on_tick(&mut self, timer_id: TimerId) -> bool {
        if !self.playing || self.active_timer() != Some(timer_id) {
            tracing::trace!(timer_id, "ignoring stale tick");
            return false;
        }
        if self.is_at_end() {
            let from = self.playback_state();
            self.cancel_timer();
            self.playing = false;
            self.log_playback(from);
            return true;
        }
        let to = self.step_index + 1;
        self.move_to(to, "tick");
        true
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn move_to(&mut self, to: usize, action: &'static str) {
        let from = self.step_index;
        if to == from {
            return;
        }
        let first = if to > from { from + 1 } else { to };
        for index in first..=to {
            self.merge_step_values(index);
        }
        self.step_index = to;
        tracing::debug!(action, from, to, "step changed");
        self.log_navigation(action, from);
    }

    fn merge_step_values(&mut self, index: usize) {
        let values = &self.scenario.step(index).values;
        self.dynamic_values
            .extend(values.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    fn restart_timer(&mut self) {
        self.cancel_timer();
        self.timer = Some(self.ticker.start(self.speed.interval()));
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop();
        }
    }

    fn log_navigation(&mut self, action: &'static str, from: usize) {
        let seq = self.log.next_seq();
        self.log.push(PlaybackEvent::Navigation {
            seq,
            action,
            from,
            to: self.step_index,
            step_count: self.step_count(),
        });
    }

    fn log_playback(&mut self, from: PlaybackState) {
        tracing::debug!(from = from.label(), to = self.playback_state().label(), "playback state changed");
        let seq = self.log.next_seq();
        self.log.push(PlaybackEvent::Playback {
            seq,
            from,
            to: self.playback_state(),
            step: self.step_index,
        });
    }
}

impl<T: Ticker> Drop for PlaybackEngine<T> {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

impl PlaybackEngine<VirtualTicker> {
    /// Advance the virtual clock by `elapsed`, delivering every tick due.
    ///
    /// Ticks are delivered one at a time, so a timer cancelled by an earlier
    /// tick in the same window never fires. Returns the number of ticks the
    /// engine accepted.
    pub fn advance_time(&mut self, elapsed: Duration) -> usize {
        let clock = self.ticker.clock().clone();
        let deadline = clock.now() + elapsed;
        let mut accepted = 0;
        while let Some(id) = clock.pop_due(deadline) {
            if self.on_tick(id) {
                accepted += 1;
            }
        }
        clock.set_now(deadline);
        accepted
    }
}
