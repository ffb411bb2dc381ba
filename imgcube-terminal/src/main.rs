/// imgcube terminal demo
///
/// Renders the picture cube as ASCII and animates its layer turns.
/// Controls:
///   - Space: Shuffle
///   - x/y/z, 1/2/3, +/-: Turn a layer (axis, layer, direction)
///   - C: Clear or restore the face art
///   - Arrow Keys: Turn the view
///   - R: Reset the view
///   - Q/ESC: Quit
use anyhow::{Context, Result};
use clap::Parser;
use imgcube_core::{Config, Session};
use imgcube_terminal::TerminalApp;
use log::info;
use std::fs::File;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "imgcube-terminal", about = "Animated picture cube in the terminal")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for repeatable shuffles
    #[arg(long)]
    seed: Option<u64>,

    /// Start with this many random turns
    #[arg(long, value_name = "N")]
    shuffle: Option<usize>,

    /// Start by playing these turns, e.g. "x1+ y0-"
    #[arg(long, value_name = "NOTATION", conflicts_with = "shuffle")]
    moves: Option<String>,

    /// Frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Write log records here instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    if args.print_config {
        let text = config
            .to_toml_string()
            .context("configuration has no TOML form")?;
        print!("{text}");
        return Ok(());
    }

    let mut session = Session::new(config).context("invalid configuration")?;
    if let Some(moves) = &args.moves {
        let _handle = session
            .play_notation(moves)
            .with_context(|| format!("cannot play {moves:?}"))?;
    } else if let Some(n) = args.shuffle {
        let _handle = session.shuffle(n)?;
    }

    info!("starting terminal renderer at {} fps", args.fps);
    let mut app = TerminalApp::new(session, args.fps)?;
    app.run()?;

    println!("Thank you for using imgcube!");
    Ok(())
}
