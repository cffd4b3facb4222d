//! acordeon - play a diatonic button accordion from the computer keyboard
//!
//! Run with: cargo run -- --tonality BbEbAb

mod app;
mod audio;
mod ui;

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
};

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::supports_keyboard_enhancement,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use acordeon::{config::AccordionConfig, Accordion, Handoff};
use app::App;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HandoffArg {
    Hold,
    Steal,
}

impl From<HandoffArg> for Handoff {
    fn from(arg: HandoffArg) -> Self {
        match arg {
            HandoffArg::Hold => Handoff::Hold,
            HandoffArg::Steal => Handoff::Steal,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "acordeon", version, about = "Diatonic button accordion in the terminal")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Starting tonality (GCF, BbEbAb or one from the config)
    #[arg(short, long)]
    tonality: Option<String>,

    /// What the opposite bellows key does while one direction is held
    #[arg(long, value_enum)]
    handoff: Option<HandoffArg>,

    /// Log file; "-" disables logging
    #[arg(long, default_value = "acordeon.log")]
    log: PathBuf,
}

fn init_logging(path: &Path) -> EyreResult<()> {
    if path.as_os_str() == "-" {
        return Ok(());
    }

    let file = File::create(path).wrap_err_with(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("acordeon=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging(&args.log)?;

    let mut config = match &args.config {
        Some(path) => AccordionConfig::load(path)
            .wrap_err_with(|| format!("loading config {}", path.display()))?,
        None => AccordionConfig::default(),
    };
    if let Some(tonality) = args.tonality {
        config.tonality = tonality;
    }
    if let Some(handoff) = args.handoff {
        config.bellows.handoff = handoff.into();
    }

    let tonality = config.starting_tonality()?;
    info!(tonality = %tonality.name, handoff = ?config.bellows.handoff, "starting");

    let (accordion, output) = match audio::start(&config) {
        Ok(output) => {
            let accordion = Accordion::new(tonality, output.bank.clone(), config.settings())?;
            (accordion, Some(output))
        }
        Err(err) => {
            warn!("audio output unavailable: {err:#}");
            (Accordion::degraded(tonality, config.settings())?, None)
        }
    };

    let mut terminal = ratatui::init();
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            std::io::stdout(),
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                    | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
            )
        )?;
    } else {
        warn!("terminal cannot report key releases, falling back to timed release");
    }

    let result = App::new(accordion, config.all_tonalities(), output, enhanced).run(&mut terminal);

    if enhanced {
        execute!(std::io::stdout(), PopKeyboardEnhancementFlags)?;
    }
    ratatui::restore();
    result
}
