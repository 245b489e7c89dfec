use anyhow::Context;
use clap::{Parser, Subcommand};
use marking::config::{self, Settings};
use marking::events::{HostEvent, MenuEvent};
use marking::menu::{self, Menu, NodeId};
use marking::pointer::PointerTracker;
use radian::{Point, angle, arc};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Clock step used to play back waits.
const FRAME: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(name = "marking", version, about, long_about = None)]
struct Cli {
    /// Settings file, defaults to the user config directory
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Parse a menu definition and report problems
    Check { menu: PathBuf },
    /// Print the sector partition for item directions in degrees
    Sectors {
        #[arg(required = true, allow_negative_numbers = true)]
        directions: Vec<f64>,
    },
    /// Drive a menu with a pointer script and print its events as JSON lines
    Replay { menu: PathBuf, script: PathBuf },
    /// Write the default settings file
    InitSettings,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { menu } => check(&menu),
        Commands::Sectors { directions } => {
            sectors(&directions);
            Ok(())
        }
        Commands::Replay { menu, script } => {
            let settings = config::load_settings(cli.settings.as_deref())?;
            replay(&menu, &script, settings)
        }
        Commands::InitSettings => {
            let path = config::write_default_settings(cli.settings.as_deref())?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn load_menu(path: &Path) -> anyhow::Result<menu::ParseOutcome> {
    let json = fs_err::read_to_string(path)?;
    menu::parse_str(&json).with_context(|| format!("invalid menu in {}", path.display()))
}

fn check(path: &Path) -> anyhow::Result<()> {
    let outcome = load_menu(path)?;
    print_tree(&outcome.menu, outcome.menu.root(), 0);

    for id in &outcome.duplicate_ids {
        println!("duplicate id: {id}");
    }
    for c in &outcome.collisions {
        println!(
            "angle collision: {} ({}°) points back into {} ({}°)",
            c.item, c.angle, c.parent, c.parent_angle
        );
    }
    if outcome.has_duplicate_ids() || !outcome.collisions.is_empty() {
        anyhow::bail!("{} has problems", path.display());
    }
    Ok(())
}

fn print_tree(menu: &Menu, id: NodeId, depth: usize) {
    println!("{}{}", "  ".repeat(depth), menu.display(id));
    for &child in menu.children(id) {
        print_tree(menu, child, depth + 1);
    }
}

fn sectors(directions: &[f64]) {
    let angles: Vec<f64> = directions.iter().map(|&d| angle::from_direction(d)).collect();
    for sector in arc::from_angles(&angles) {
        println!(
            "{:>7.2}°  {:>7.2}° .. {:>7.2}°",
            angle::to_deg(sector.orig_angle),
            angle::to_deg(sector.from),
            angle::to_deg(sector.to)
        );
    }
}

fn replay(menu_path: &Path, script_path: &Path, settings: Settings) -> anyhow::Result<()> {
    let mut menu = load_menu(menu_path)?.menu;
    let script = fs_err::read_to_string(script_path)?;

    let mut tracker = PointerTracker::new(settings.main.input_timeout);
    let (tx, rx) = async_channel::unbounded::<MenuEvent>();
    let root = menu.root();
    menu.set_settings(root, settings)?;
    menu.set_event_channel(root, tx)?;
    menu.init()?;

    let mut now = Instant::now();
    let mut position = Point::ZERO;

    for (number, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event: HostEvent = line
            .parse()
            .with_context(|| format!("{}:{}", script_path.display(), number + 1))?;
        log::debug!("{event:?}");

        match event {
            HostEvent::Show(at) => {
                position = at;
                menu.show(at)?;
            }
            HostEvent::Hide => menu.hide()?,
            HostEvent::Move(to) => {
                position = to;
                for action in tracker.moved(to, now) {
                    menu.apply(action, now)?;
                }
            }
            HostEvent::Press(button) => {
                for action in tracker.press(button, position, now) {
                    menu.apply(action, now)?;
                }
            }
            HostEvent::Release(button) => {
                for action in tracker.release(button, position, now) {
                    menu.apply(action, now)?;
                }
            }
            HostEvent::Wheel(delta) => menu.wheel(delta)?,
            HostEvent::Wait(duration) => {
                let until = now + duration;
                while now < until {
                    now = (now + FRAME).min(until);
                    menu.tick(now)?;
                }
            }
        }

        while let Ok(event) = rx.try_recv() {
            println!("{}", serde_json::to_string(&event)?);
        }
    }
    Ok(())
}
