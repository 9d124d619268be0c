use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use liquid_sort_motion_core::{
    AnimationEngine, AppConfig, BoundingBox, ElementRef, Gesture, SilentBackend, SloshKind,
    SoundBoard, SoundCue, Stage, SwapDelta,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

const BOTTLE_WIDTH: f32 = 64.0;
const BOTTLE_HEIGHT: f32 = 128.0;
const BOTTLE_GAP: f32 = 16.0;

fn main() -> liquid_sort_motion_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Demo {
            scenario,
            bottles,
            fps,
        } => run_demo(config, scenario, bottles, fps),
        Commands::Schedule {
            gesture,
            dx,
            dy,
            count,
        } => run_schedule(config, gesture.into(), SwapDelta { dx, dy }, count),
        Commands::Config => {
            println!("{}", config.to_json_pretty()?);
            Ok(())
        }
    }
}

fn run_demo(
    config: AppConfig,
    scenario: Scenario,
    bottles: usize,
    fps: u32,
) -> liquid_sort_motion_core::Result<()> {
    tracing::info!(?scenario, bottles, fps, "starting demo");

    let bottles = bottles.max(2);
    let step = 1.0 / fps.max(1) as f32;
    let mut stage = Stage::new();
    let (row, liquids) = build_row(&mut stage, bottles);
    let overlay = stage.add("overlay", BoundingBox::new(0.0, 0.0, 640.0, 480.0));
    overlay.update(|t| t.opacity = 0.0);

    let mut sounds = SoundBoard::new(SilentBackend, config.audio.clone());
    sounds.init();
    let mut engine = AnimationEngine::new(config.motion);

    if matches!(scenario, Scenario::Hover | Scenario::All) {
        engine.hover(row.first(), true);
        engine.slosh(liquids.first(), None, SloshKind::Hover);
        settle(&mut engine, step, "hover on");
        engine.hover(row.first(), false);
        settle(&mut engine, step, "hover off");
    }

    if matches!(scenario, Scenario::Select | Scenario::All) {
        sounds.play(SoundCue::Select);
        engine.select(row.first());
        settle(&mut engine, step, "select");
        sounds.play(SoundCue::Deselect);
        engine.deselect(row.first());
        settle(&mut engine, step, "deselect");
    }

    if matches!(scenario, Scenario::Swap | Scenario::All) {
        let last = row.len() - 1;
        sounds.play(SoundCue::Swap);
        engine.swap(row.first(), row.get(last), liquids.first(), liquids.get(last));
        settle(&mut engine, step, "swap");
        stage.swap_layouts("bottle-0", &format!("bottle-{last}"));
    }

    if matches!(scenario, Scenario::Win | Scenario::All) {
        sounds.play(SoundCue::Submit);
        if let Some(row_node) = stage.element("row") {
            sounds.play(SoundCue::Correct);
            engine.pulse(Some(&row_node));
        }
        engine.win_celebration(&row);
        sounds.play(SoundCue::Win);
        settle(&mut engine, step, "win");
        engine.fade_overlay(Some(&overlay), true);
        settle(&mut engine, step, "overlay");
    }

    let report = DemoReport {
        clock_seconds: engine.scheduler().clock().time_seconds,
        nodes: stage.snapshot(),
    };
    sounds.dispose();
    engine.dispose();

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_schedule(
    config: AppConfig,
    gesture: Gesture,
    delta: SwapDelta,
    count: usize,
) -> liquid_sort_motion_core::Result<()> {
    tracing::info!(?gesture, "printing gesture schedule");

    let mut stage = Stage::new();
    let (row, _) = build_row(&mut stage, count.max(2));
    let engine = AnimationEngine::new(config.motion);
    let profiles = engine.profiles();
    let first = &row[0];

    let timeline = match gesture {
        Gesture::HoverOn => profiles.hover(first, true),
        Gesture::HoverOff => profiles.hover(first, false),
        Gesture::Select => profiles.select(first),
        Gesture::Deselect => profiles.deselect(first),
        Gesture::Swap => profiles.swap(first, &row[1], delta),
        Gesture::Pulse => profiles.pulse(first),
        Gesture::WinCelebration => profiles.win_celebration(&row[..count.max(1)]),
        Gesture::FadeIn => profiles.fade(first, true),
        Gesture::FadeOut => profiles.fade(first, false),
    };

    println!("{}", serde_json::to_string_pretty(&timeline.schedule())?);
    Ok(())
}

/// Lays out `count` bottles side by side, each with a liquid node, plus the
/// row container they sit in.
fn build_row(stage: &mut Stage, count: usize) -> (Vec<ElementRef>, Vec<ElementRef>) {
    let top = 100.0;
    stage.add(
        "row",
        BoundingBox::new(
            0.0,
            top,
            count as f32 * (BOTTLE_WIDTH + BOTTLE_GAP),
            BOTTLE_HEIGHT,
        ),
    );

    let mut bottles = Vec::with_capacity(count);
    let mut liquids = Vec::with_capacity(count);
    for index in 0..count {
        let left = index as f32 * (BOTTLE_WIDTH + BOTTLE_GAP);
        let bounds = BoundingBox::new(left, top, BOTTLE_WIDTH, BOTTLE_HEIGHT);
        bottles.push(stage.add(format!("bottle-{index}"), bounds));
        liquids.push(stage.add(format!("liquid-{index}"), bounds));
    }
    (bottles, liquids)
}

fn settle(engine: &mut AnimationEngine, step: f32, label: &str) {
    let elapsed = engine.settle(step);
    tracing::debug!(label, elapsed, "gesture settled");
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Serialize)]
struct DemoReport {
    clock_seconds: f64,
    nodes: Vec<liquid_sort_motion_core::NodeSnapshot>,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Liquid sort animation choreography", long_about = None)]
struct Cli {
    /// Optional JSON configuration overriding the default motion tunables.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scripted gesture sequence on a headless stage and print the
    /// final poses.
    Demo {
        #[arg(short, long, value_enum, default_value_t = Scenario::All)]
        scenario: Scenario,
        /// Number of bottles in the row.
        #[arg(short, long, default_value_t = 4)]
        bottles: usize,
        /// Ticks per simulated second.
        #[arg(long, default_value_t = 60)]
        fps: u32,
    },
    /// Print the resolved phase schedule of one gesture.
    Schedule {
        #[arg(value_enum)]
        gesture: GestureArg,
        /// Horizontal delta used by the swap gesture.
        #[arg(long, default_value_t = 80.0)]
        dx: f32,
        /// Vertical delta used by the swap gesture.
        #[arg(long, default_value_t = 0.0)]
        dy: f32,
        /// Element count used by the win celebration.
        #[arg(long, default_value_t = 4)]
        count: usize,
    },
    /// Print the effective configuration as JSON.
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Scenario {
    Hover,
    Select,
    Swap,
    Win,
    All,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum GestureArg {
    HoverOn,
    HoverOff,
    Select,
    Deselect,
    Swap,
    Pulse,
    Win,
    FadeIn,
    FadeOut,
}

impl From<GestureArg> for Gesture {
    fn from(value: GestureArg) -> Self {
        match value {
            GestureArg::HoverOn => Gesture::HoverOn,
            GestureArg::HoverOff => Gesture::HoverOff,
            GestureArg::Select => Gesture::Select,
            GestureArg::Deselect => Gesture::Deselect,
            GestureArg::Swap => Gesture::Swap,
            GestureArg::Pulse => Gesture::Pulse,
            GestureArg::Win => Gesture::WinCelebration,
            GestureArg::FadeIn => Gesture::FadeIn,
            GestureArg::FadeOut => Gesture::FadeOut,
        }
    }
}
