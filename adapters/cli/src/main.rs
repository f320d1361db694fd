#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays one game over stdin/stdout.
//!
//! Stdout belongs to the engine, so all logging goes to a file. On a
//! fatal error or a panic mid-match, the last seen state is summarized
//! into the log as a JSON failure report before exiting, since the
//! engine swallows stderr.

use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::{self, BufRead, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use armada_adapter_protocol::Connection;
use armada_system_overmind::Overmind;
use armada_world::{query, refresh, World};
use clap::Parser;
use log::{error, info};
use serde::Serialize;

const NAME: &str = "Armada";
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "armada")]
#[command(about = "Autonomous fleet agent speaking the contest text protocol")]
struct Cli {
    /// Never open with ship hunts, even in a close two-player start
    #[arg(long)]
    conservative: bool,
    /// Strip diagnostic tags from thrust headings
    #[arg(long)]
    no_msg: bool,
    /// Log file path; defaults to log<pid>.txt in the working directory
    #[arg(long)]
    log: Option<PathBuf>,
}

/// Entry point: wire the engine's pipes into one full game session.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log)?;
    info!("{NAME} {VERSION} starting up");

    let mut conn = Connection::new(io::stdin().lock(), io::stdout().lock());
    run(&mut conn, cli.conservative, !cli.no_msg)
}

/// Plays one game: handshake, starting map, name, then a turn loop that
/// answers every frame with exactly one orders line.
///
/// The engine streams the full starting map right after the size line and
/// only then reads the name, so that map is consumed here without an
/// orders line in reply; the first answered frame is turn 0.
fn run<R: BufRead, W: Write>(
    conn: &mut Connection<R, W>,
    conservative: bool,
    include_tags: bool,
) -> Result<()> {
    let handshake = conn.handshake().context("startup handshake")?;
    info!(
        "playing as player {} on a {}x{} map",
        handshake.player_id.get(),
        handshake.width,
        handshake.height
    );

    let Some((_, raw)) = conn.read_turn().context("reading the starting map")? else {
        info!("engine closed the stream during startup");
        return Ok(());
    };
    let mut last_raw = raw;
    conn.send_name(&format!("{NAME} {VERSION}"))
        .context("announcing name")?;

    let mut world = World::new(handshake);
    let mut overmind = Overmind::new(conservative);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        turn_loop(conn, &mut world, &mut overmind, include_tags, &mut last_raw)
    }));
    let outcome = match outcome {
        Ok(result) => result,
        Err(payload) => Err(anyhow!("panicked: {}", panic_message(payload.as_ref()))),
    };
    if let Err(err) = &outcome {
        error!("quitting: {err:#}");
        let report = FailureReport::gather(&world, &last_raw, err);
        match serde_json::to_string(&report) {
            Ok(json) => error!("failure report: {json}"),
            Err(json_err) => error!("failure report unavailable: {json_err}"),
        }
    }
    outcome
}

fn turn_loop<R: BufRead, W: Write>(
    conn: &mut Connection<R, W>,
    world: &mut World,
    overmind: &mut Overmind,
    include_tags: bool,
    last_raw: &mut String,
) -> Result<()> {
    let mut longest = Duration::ZERO;
    let mut longest_turn = 0_u32;
    loop {
        let Some((observation, raw)) = conn.read_turn().context("reading turn state")? else {
            info!("engine closed the stream; longest turn ({longest_turn}) took {longest:?}");
            return Ok(());
        };
        *last_raw = raw;
        let started = Instant::now();

        refresh(world, &observation);
        let orders = overmind.step(world);
        conn.send_orders(&orders, include_tags)
            .context("sending orders")?;

        let elapsed = started.elapsed();
        if elapsed > longest {
            longest = elapsed;
            longest_turn = query::turn(world);
        }
    }
}

fn init_logging(path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(format!("log{}.txt", std::process::id())));
    let file = File::create(&path).with_context(|| format!("creating log file {path:?}"))?;
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    let _ = builder.target(env_logger::Target::Pipe(Box::new(file)));
    builder.init();
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text
    } else {
        "non-string panic payload"
    }
}

/// Snapshot of the game written to the log when the agent dies.
#[derive(Serialize)]
struct FailureReport {
    turn: u32,
    state_hash: u64,
    fleets: Vec<FleetCount>,
    error: String,
}

/// One player's surviving and cumulative ship totals.
#[derive(Serialize)]
struct FleetCount {
    player: u32,
    surviving: usize,
    cumulative: u32,
}

impl FailureReport {
    fn gather(world: &World, last_raw: &str, err: &anyhow::Error) -> Self {
        let fleets = query::surviving_player_ids(world)
            .iter()
            .map(|&player| FleetCount {
                player: player.get(),
                surviving: query::ships_owned_by(world, player).len(),
                cumulative: query::cumulative_ship_count(world, player),
            })
            .collect();
        Self {
            turn: query::turn(world),
            state_hash: state_hash(last_raw),
            fleets,
            error: format!("{err:#}"),
        }
    }
}

fn state_hash(raw: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    raw.hash(&mut hasher);
    hasher.finish()
}
