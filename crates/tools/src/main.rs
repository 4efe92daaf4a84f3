use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use directories::ProjectDirs;
use roomgen::floor_state_file::FLOOR_STATE_FORMAT_VERSION;
use roomgen::{
    CancelToken, Direction, FloorProgress, FloorStateFile, GenerationObserver, GeneratorConfig,
    Layout, ObserverSet, PlacedRoom, Pos, RoomKind, generate_with_cancel, publish_layout,
};
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Generate one dungeon floor and print it", long_about = None)]
struct Args {
    /// Run seed; 0 draws a fresh one
    #[arg(short, long, default_value_t = 0)]
    seed: u64,
    /// Floor number, starting at 1
    #[arg(short, long, default_value_t = 1)]
    floor: u32,
    /// TOML generator config; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Save `{seed, floor, isGenerated}` after generating, optionally to a given path
    #[arg(long)]
    save: Option<Option<PathBuf>>,
    /// Continue from the saved state instead of --seed/--floor
    #[arg(long, conflicts_with_all = ["seed", "floor"])]
    resume: bool,
    /// Print the layout as JSON instead of a map
    #[arg(long)]
    json: bool,
    /// Give up after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

/// Logs each event, handing rooms their configured visual as a spawner would.
struct TracingObserver {
    config: GeneratorConfig,
}

impl TracingObserver {
    fn visual(&self, kind: RoomKind) -> String {
        self.config.visual(kind).map_or_else(|| kind.to_string(), str::to_owned)
    }
}

impl GenerationObserver for TracingObserver {
    fn room_placed(&mut self, room: &PlacedRoom) {
        debug!(
            x = room.pos.x,
            y = room.pos.y,
            kind = %room.kind,
            visual = %self.visual(room.kind),
            "room placed"
        );
    }

    fn doors_connected(&mut self, from: Pos, direction: Direction, to: Pos) {
        debug!(?from, ?direction, ?to, "doors connected");
    }

    fn generation_complete(&mut self, layout: &Layout) {
        info!(
            floor = layout.floor,
            rooms = layout.rooms.len(),
            fingerprint = %format!("{:016x}", layout.fingerprint()),
            "floor ready"
        );
    }
}

fn default_save_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "roomgen").map(|proj_dirs| {
        let mut path = proj_dirs.data_dir().to_path_buf();
        path.push("floor_state.json");
        path
    })
}

fn resolve_save_path(save: Option<&Option<PathBuf>>) -> Result<PathBuf> {
    match save {
        Some(Some(path)) => Ok(path.clone()),
        _ => default_save_path().context("no data directory available for the save file"),
    }
}

fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    let Some(path) = path else {
        return Ok(GeneratorConfig::default());
    };
    GeneratorConfig::load(path)
        .with_context(|| format!("Failed to load config file: {}", path.display()))
}

fn room_glyph(kind: RoomKind) -> char {
    match kind {
        RoomKind::Start => 'S',
        RoomKind::Normal => '#',
        RoomKind::Boss => 'B',
        RoomKind::Treasure => 'T',
        RoomKind::Shop => '$',
    }
}

/// Rooms on even columns/rows, doors between them.
fn render_map(layout: &Layout) -> String {
    let mut out = String::new();
    for y in 0..layout.height as i32 {
        let mut row = String::new();
        let mut below = String::new();
        for x in 0..layout.width as i32 {
            let room = layout.room_at(Pos::new(x, y));
            row.push(room.map_or('.', |room| room_glyph(room.kind)));
            let east = room.is_some_and(|room| room.doors.has(Direction::East));
            row.push(if east { '-' } else { ' ' });
            let south = room.is_some_and(|room| room.doors.has(Direction::South));
            below.push(if south { '|' } else { ' ' });
            below.push(' ');
        }
        out.push_str(row.trim_end());
        out.push('\n');
        if y + 1 < layout.height as i32 {
            out.push_str(below.trim_end());
            out.push('\n');
        }
    }
    out
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let cancel = args.timeout_ms.map_or_else(CancelToken::new, |ms| {
        CancelToken::with_timeout(Duration::from_millis(ms))
    });

    let (layout, progress) = if args.resume {
        let path = resolve_save_path(args.save.as_ref())?;
        let state = FloorStateFile::load(&path)
            .with_context(|| format!("Failed to read save file: {}", path.display()))?;
        let mut progress = FloorProgress::from_file(&state);
        if progress.is_generated() {
            progress.descend();
        }
        info!(seed = progress.base_seed(), floor = progress.floor(), "resuming run");
        let layout = generate_with_cancel(progress.base_seed(), progress.floor(), &config, &cancel)
            .context("Floor generation failed")?;
        progress.mark_generated();
        (layout, progress)
    } else {
        if args.floor == 0 {
            bail!("floor numbers start at 1");
        }
        let layout = generate_with_cancel(args.seed, args.floor, &config, &cancel)
            .context("Floor generation failed")?;
        let progress = FloorProgress::from_file(&FloorStateFile {
            format_version: FLOOR_STATE_FORMAT_VERSION,
            seed: layout.base_seed,
            floor: layout.floor,
            is_generated: true,
        });
        (layout, progress)
    };

    let mut observers = ObserverSet::new();
    observers.subscribe(Box::new(TracingObserver { config: config.clone() }));
    publish_layout(&layout, &mut observers);

    if args.json {
        let json = serde_json::to_string_pretty(&layout).context("Failed to serialize layout")?;
        println!("{json}");
    } else {
        println!(
            "Floor {} (seed {}, base seed {}, {} attempt(s))",
            layout.floor, layout.seed, layout.base_seed, layout.attempts
        );
        print!("{}", render_map(&layout));
    }

    if args.save.is_some() || args.resume {
        let path = resolve_save_path(args.save.as_ref())?;
        progress
            .to_file()
            .write_atomic(&path)
            .with_context(|| format!("Failed to write save file: {}", path.display()))?;
        info!("saved run state to {}", path.display());
    }

    Ok(())
}
