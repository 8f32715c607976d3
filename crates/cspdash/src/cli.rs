#![forbid(unsafe_code)]

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use cspdash_core::history::ExamHistory;
use cspdash_core::plan::StudyPlan;
use cspdash_core::progress::ProgressStore;
use cspdash_core::{
    AlgorithmTag, DashboardConfig, PlaybackEngine, ProblemCatalog, ProblemFilter,
    Result, ScenarioCatalog, ScenarioKind, Speed, ThreadTicker, Tier,
};

use crate::commands::{self, StatusMark};
use crate::logging::{self, LogOptions};
use crate::player;

#[derive(Debug, Parser)]
#[command(
    name = "cspdash",
    about = "CSP-S study dashboard with an algorithm visualizer",
    version
)]
pub struct Cli {
    /// Configuration file (TOML, or JSON by extension).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter directive, e.g. `debug` or `cspdash_core=trace`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Problem status for this run, e.g. `--status P1090=completed`. Repeatable.
    #[arg(long = "status", value_name = "ID=STATUS", global = true)]
    pub statuses: Vec<StatusMark>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List problems, optionally filtered.
    Problems(ProblemsArgs),

    /// Show one problem in detail.
    Show { id: String },

    /// Print the study plan.
    Plan {
        /// Zero-based index of the stage in progress.
        #[arg(long)]
        stage: Option<usize>,
    },

    /// Progress, topic and exam-history statistics.
    Stats,

    /// List the built-in visualizer scenarios.
    Scenarios,

    /// Replay a scenario headlessly and print every frame.
    Frames(FramesArgs),

    /// Play a scenario interactively in the terminal.
    Play(PlayArgs),

    /// Ask the offline tutor about a problem.
    Ask(AskArgs),
}

#[derive(Debug, Args)]
pub struct ProblemsArgs {
    #[arg(long)]
    pub tier: Option<Tier>,

    /// English name or Chinese label.
    #[arg(long)]
    pub tag: Option<AlgorithmTag>,
}

#[derive(Debug, Args)]
pub struct FramesArgs {
    /// Scenario key, or a problem id to replay its visualizer.
    pub key: String,

    /// One JSON object per frame.
    #[arg(long)]
    pub json: bool,

    #[arg(long, value_parser = parse_speed)]
    pub speed: Option<Speed>,
}

#[derive(Debug, Args)]
pub struct PlayArgs {
    /// Scenario key or problem id; defaults to the configured scenario.
    pub key: Option<String>,

    #[arg(long, value_parser = parse_speed)]
    pub speed: Option<Speed>,
}

#[derive(Debug, Args)]
pub struct AskArgs {
    /// Ask about this problem's key insight.
    #[arg(long)]
    pub problem: Option<String>,

    pub message: Vec<String>,
}

fn parse_speed(value: &str) -> std::result::Result<Speed, String> {
    Speed::ALL
        .into_iter()
        .find(|speed| speed.label().eq_ignore_ascii_case(value) || speed.millis().to_string() == value)
        .ok_or_else(|| format!("unknown speed '{value}' (slow, normal, fast, or 1500/1000/500)"))
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    logging::init(
        &LogOptions {
            level: cli.log_level.clone(),
            json: cli.log_json,
        },
        &config.log_filter,
    )?;
    run(cli, &config, &mut io::stdout().lock())
}

pub fn load_config(cli: &Cli) -> Result<DashboardConfig> {
    let config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };
    config.validated()
}

/// Map a problem id onto its visualizer key; scenario keys pass through.
fn scenario_key(key: &str, problems: &ProblemCatalog) -> String {
    if ScenarioKind::from_key(key).is_some() {
        return key.to_owned();
    }
    problems
        .find(key)
        .map_or_else(|_| key.to_owned(), |problem| problem.visualizer.clone())
}

fn progress(cli: &Cli, problems: &ProblemCatalog) -> Result<ProgressStore> {
    commands::session_progress(problems, &cli.statuses)
}

pub fn run(cli: Cli, config: &DashboardConfig, out: &mut impl Write) -> Result<()> {
    let scenarios = Arc::new(ScenarioCatalog::builtin());
    match &cli.command {
        Commands::Problems(args) => {
            let filter = ProblemFilter {
                tier: args.tier,
                tag: args.tag,
            };
            let problems = ProblemCatalog::embedded()?;
            commands::list_problems(out, &problems, &progress(&cli, &problems)?, filter)
        }
        Commands::Show { id } => {
            let problems = ProblemCatalog::embedded()?;
            commands::show_problem(out, problems.find(id)?, &progress(&cli, &problems)?, &scenarios)
        }
        Commands::Plan { stage } => {
            let plan = StudyPlan::embedded()?;
            let plan = match stage {
                Some(stage) => plan.with_current(*stage),
                None => plan,
            };
            commands::show_plan(out, &plan)
        }
        Commands::Stats => {
            let problems = ProblemCatalog::embedded()?;
            let progress = progress(&cli, &problems)?;
            commands::show_stats(out, &problems, &progress, &ExamHistory::embedded()?)
        }
        Commands::Scenarios => commands::list_scenarios(out, &scenarios),
        Commands::Frames(args) => {
            let key = scenario_key(&args.key, &ProblemCatalog::embedded()?);
            let speed = args.speed.unwrap_or(config.default_speed);
            let frames = commands::replay_frames(scenarios, &key, speed);
            commands::print_frames(out, &frames, args.json)
        }
        Commands::Play(args) => {
            let key = match &args.key {
                Some(key) => scenario_key(key, &ProblemCatalog::embedded()?),
                None => config.default_scenario.clone(),
            };
            let (ticker, ticks) = ThreadTicker::channel();
            let mut engine_config = config.engine_config();
            if let Some(speed) = args.speed {
                engine_config.speed = speed;
            }
            let engine = PlaybackEngine::with_scenario(scenarios, ticker, engine_config, &key);
            player::run(engine, ticks)?;
            Ok(())
        }
        Commands::Ask(args) => commands::ask_tutor(
            out,
            &ProblemCatalog::embedded()?,
            config,
            args.problem.as_deref(),
            &args.message.join(" "),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("cspdash").chain(args.iter().copied())).unwrap()
    }

    fn run_to_string(args: &[&str]) -> Result<String> {
        let cli = parse(args);
        let config = load_config(&cli)?;
        let mut out = Vec::new();
        run(cli, &config, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = parse(&["frames", "matrix", "--json", "--log-level", "debug", "--speed", "fast"]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        let Commands::Frames(args) = cli.command else {
            panic!("frames subcommand");
        };
        assert!(args.json);
        assert_eq!(args.speed, Some(Speed::Fast));
    }

    #[test]
    fn speed_accepts_names_and_millis() {
        assert_eq!(parse_speed("SLOW"), Ok(Speed::Slow));
        assert_eq!(parse_speed("500"), Ok(Speed::Fast));
        assert!(parse_speed("250").is_err());
    }

    #[test]
    fn tier_and_tag_are_validated_by_clap() {
        let cli = parse(&["problems", "--tier", "t2", "--tag", "动态规划"]);
        let Commands::Problems(args) = cli.command else {
            panic!("problems subcommand");
        };
        assert_eq!(args.tier, Some(Tier::T2));
        assert_eq!(args.tag, Some(AlgorithmTag::Dp));
        assert!(Cli::try_parse_from(["cspdash", "problems", "--tier", "T9"]).is_err());
    }

    #[test]
    fn problem_ids_map_to_their_visualizer() {
        let problems = ProblemCatalog::embedded().unwrap();
        assert_eq!(scenario_key("matrix", &problems), "matrix");
        assert_eq!(scenario_key("P1090", &problems), "greedy");
        assert_eq!(scenario_key("nonsense", &problems), "nonsense");
    }

    #[test]
    fn frames_for_a_problem_id() {
        let text = run_to_string(&["frames", "P1090", "--speed", "fast"]).unwrap();
        assert!(text.starts_with("Greedy Strategy (Sorting/Selection)"));
    }

    #[test]
    fn show_unknown_problem_exits_with_two() {
        let err = run_to_string(&["show", "P0000"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn status_flags_shape_the_listing() {
        let listing = run_to_string(&[
            "problems",
            "--tier",
            "T1",
            "--status",
            "P1090=completed",
        ])
        .unwrap();
        assert!(listing.lines().any(|l| l.starts_with("✓ P1090")));

        let plain = run_to_string(&["problems", "--tier", "T1"]).unwrap();
        assert!(plain.lines().any(|l| l.starts_with("· P1090")));

        let err = run_to_string(&["stats", "--status", "P0000=flagged"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(Cli::try_parse_from(["cspdash", "stats", "--status", "P1090"]).is_err());
    }

    #[test]
    fn bad_config_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cspdash.toml");
        std::fs::write(&path, "default_scenario = \"heap\"\n").unwrap();
        let err = run_to_string(&["scenarios", "--config", path.to_str().unwrap()]).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
