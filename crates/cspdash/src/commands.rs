#![forbid(unsafe_code)]

//! Subcommand implementations. Each writes to the given sink.

use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;

use cspdash_core::history::ExamHistory;
use cspdash_core::plan::StudyPlan;
use cspdash_core::problem::Problem;
use cspdash_core::progress::{ProblemStatus, ProgressStore};
use cspdash_core::tutor::{OfflineTutor, Role, TutorSession, problem_prompt};
use cspdash_core::{
    DashError, DashboardConfig, EngineConfig, PlaybackEngine, ProblemCatalog, ProblemFilter,
    Result, ScenarioCatalog, Speed, VirtualTicker, VisualizerFrame,
};

use crate::paint::{self, pad};

/// Number of algorithm tags shown in the stats summary.
const TOP_TAGS: usize = 7;

const BAR_WIDTH: usize = 20;

fn status_marker(status: ProblemStatus) -> &'static str {
    match status {
        ProblemStatus::Completed => "✓",
        ProblemStatus::Incomplete => "·",
        ProblemStatus::Flagged => "?",
    }
}

fn bar(count: usize, total: usize) -> String {
    let filled = if total == 0 { 0 } else { count * BAR_WIDTH / total };
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

pub fn list_problems(
    out: &mut impl Write,
    catalog: &ProblemCatalog,
    progress: &ProgressStore,
    filter: ProblemFilter,
) -> Result<()> {
    let mut shown = 0usize;
    for problem in catalog.filter(filter) {
        writeln!(
            out,
            "{} {} {} {} {}",
            status_marker(progress.status(&problem.id)),
            pad(&problem.id, 7),
            problem.tier,
            pad(&problem.judge_label, 12),
            problem.title
        )?;
        shown += 1;
    }
    writeln!(out, "{shown} problem(s)")?;
    Ok(())
}

pub fn show_problem(
    out: &mut impl Write,
    problem: &Problem,
    progress: &ProgressStore,
    scenarios: &ScenarioCatalog,
) -> Result<()> {
    let band = problem.judge_band();
    let tags: Vec<String> = problem
        .tags
        .iter()
        .map(|tag| format!("{} ({})", tag.label_cn(), tag))
        .collect();
    let status = progress.status(&problem.id);
    let visualizer = scenarios.resolve(&problem.visualizer);

    writeln!(out, "{}", problem.title)?;
    writeln!(out, "tier:        {}", problem.tier)?;
    writeln!(
        out,
        "difficulty:  {} ({:?} {})",
        problem.judge_label,
        band,
        band.hex()
    )?;
    writeln!(out, "tags:        {}", tags.join(", "))?;
    writeln!(out, "knowledge:   {}", problem.knowledge_points.join(" / "))?;
    writeln!(out, "status:      {} {}", status_marker(status), status.label_cn())?;
    writeln!(
        out,
        "visualizer:  {} ({})",
        visualizer.kind,
        visualizer.scenario.title()
    )?;
    writeln!(out, "link:        {}", problem.judge_url())?;
    writeln!(out)?;
    writeln!(out, "{}", problem.description)?;
    writeln!(out)?;
    writeln!(out, "{}", problem.key_insights)?;
    Ok(())
}

pub fn show_plan(out: &mut impl Write, plan: &StudyPlan) -> Result<()> {
    for (stage, state) in plan.states() {
        writeln!(out, "{} {}  {}", state.marker(), stage.week_range, stage.title)?;
        writeln!(out, "    {}", stage.description)?;
        for task in &stage.tasks {
            writeln!(out, "    - {task}")?;
        }
    }
    Ok(())
}

pub fn show_stats(
    out: &mut impl Write,
    catalog: &ProblemCatalog,
    progress: &ProgressStore,
    history: &ExamHistory,
) -> Result<()> {
    writeln!(out, "Progress by tier")?;
    for row in progress.tier_breakdown(catalog.problems()) {
        writeln!(
            out,
            "  {} {} {:>3}/{:<3} done  {:>3} flagged  {:>3} open",
            row.tier,
            bar(row.completed, row.total),
            row.completed,
            row.total,
            row.flagged,
            row.incomplete
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Most practised topics")?;
    for entry in catalog.top_tags(TOP_TAGS) {
        writeln!(
            out,
            "  {} {:>3}",
            pad(entry.tag.label_cn(), 10),
            entry.count
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Exam topics {}-{}", first_year(history), last_year(history))?;
    for entry in history.tag_frequency() {
        writeln!(out, "  {} {:>2}", pad(entry.tag, 10), entry.count)?;
    }
    Ok(())
}

fn first_year(history: &ExamHistory) -> u16 {
    history.years().iter().map(|y| y.year).min().unwrap_or_default()
}

fn last_year(history: &ExamHistory) -> u16 {
    history.years().iter().map(|y| y.year).max().unwrap_or_default()
}

pub fn list_scenarios(out: &mut impl Write, scenarios: &ScenarioCatalog) -> Result<()> {
    for kind in scenarios.kinds() {
        let Some(scenario) = scenarios.get(kind) else {
            continue;
        };
        let default = if kind == scenarios.default_kind() { " (default)" } else { "" };
        writeln!(
            out,
            "{} {:?} {} steps  {}{default}",
            pad(kind.key(), 14),
            kind.renderer(),
            scenario.step_count(),
            scenario.title()
        )?;
    }
    Ok(())
}

/// Replay a scenario headlessly, returning one frame per visited step.
pub fn replay_frames(scenarios: Arc<ScenarioCatalog>, key: &str, speed: Speed) -> Vec<VisualizerFrame> {
    let mut engine = PlaybackEngine::with_scenario(
        scenarios,
        VirtualTicker::new(),
        EngineConfig {
            speed,
            ..EngineConfig::default()
        },
        key,
    );
    let mut frames = vec![engine.frame()];
    engine.play();
    while engine.is_playing() {
        let before = engine.step_index();
        engine.advance_time(speed.interval());
        if engine.step_index() != before {
            frames.push(engine.frame());
        }
    }
    frames
}

pub fn print_frames(out: &mut impl Write, frames: &[VisualizerFrame], json: bool) -> Result<()> {
    for frame in frames {
        if json {
            writeln!(out, "{}", serde_json::to_string(frame)?)?;
        } else {
            for line in paint::paint_frame(frame) {
                writeln!(out, "{}", paint::to_plain(&line))?;
            }
            writeln!(out, "{}", "─".repeat(40))?;
        }
    }
    Ok(())
}

/// A `--status ID=STATUS` flag: one status for this run only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMark {
    pub id: String,
    pub status: ProblemStatus,
}

impl FromStr for StatusMark {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self> {
        let (id, status) = s
            .split_once('=')
            .ok_or_else(|| DashError::invalid(format!("expected ID=STATUS, got '{s}'")))?;
        Ok(Self {
            id: id.trim().to_owned(),
            status: status.parse()?,
        })
    }
}

/// Build the session's progress from `marks`, applied in order.
pub fn session_progress(catalog: &ProblemCatalog, marks: &[StatusMark]) -> Result<ProgressStore> {
    let mut store = ProgressStore::new();
    for mark in marks {
        let problem = catalog.find(&mark.id)?;
        store.set_status(problem.id.clone(), mark.status);
    }
    Ok(store)
}

/// One-shot tutor exchange against the offline backend.
pub fn ask_tutor(
    out: &mut impl Write,
    catalog: &ProblemCatalog,
    config: &DashboardConfig,
    problem: Option<&str>,
    message: &str,
) -> Result<()> {
    let text = match problem {
        Some(id) => problem_prompt(catalog.find(id)?),
        None => message.to_owned(),
    };
    if text.trim().is_empty() {
        return Err(DashError::invalid("nothing to ask: pass a message or --problem"));
    }
    let mut session = TutorSession::new(OfflineTutor::new(catalog.clone()), config.tutor.clone());
    session.send(&text);
    for message in session.messages() {
        let speaker = match message.role {
            Role::User => "you",
            Role::Model => "tutor",
        };
        writeln!(out, "[{speaker}] {}", message.text)?;
        writeln!(out)?;
    }
    Ok(())
}
