/// Example: Play a move list headlessly and print where every piece ended up
///
/// Usage: cargo run --example play_script -- "x1+ y0- z-1+"
use std::env;

use anyhow::{bail, Result};
use imgcube_core::{format_twists, Config, NullSurface, Session, SessionEvent};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("Usage: {} <moves>", args[0]);
    }

    let config = Config {
        pause_ticks: 0,
        ..Config::default()
    };
    let mut session = Session::new(config)?;
    let mut handle = session.play_notation(&args[1])?;

    let mut ticks = 0usize;
    while session.is_busy() {
        for event in session.tick(&mut NullSurface)? {
            if let SessionEvent::TurnBegan { twist, pieces } = event {
                println!("{twist}: pieces {pieces:?}");
            }
        }
        ticks += 1;
    }

    if let Ok(Some(report)) = handle.try_recv() {
        println!("played {} in {ticks} ticks", format_twists(&report.twists));
    }
    for piece in session.cube().pieces() {
        println!("{} -> {}", piece.home(), piece.coord());
    }
    println!("solved: {}", session.cube().is_solved());
    Ok(())
}
