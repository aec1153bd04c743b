use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use ledmodel::{Model, Settings};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;
use visualizer::{LedColors, LedVisualizer};

use crate::bindings::{apply_overrides, visualizer_config};
use crate::cli::Cli;
use crate::paths::{resolve_config, ConfigSource};

/// Upper bound on how long the demo loop sleeps before checking liveness.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(cli: Cli) -> Result<()> {
    let source = resolve_config(cli.config.as_deref())?;
    let mut settings = load_settings(&source)?;
    apply_overrides(&mut settings, &cli);
    settings
        .validate()
        .context("invalid settings after applying command-line overrides")?;

    let model = Model::load(&cli.model)
        .with_context(|| format!("failed to load model {}", cli.model.display()))?;
    tracing::debug!(
        model = model.display_name(),
        leds = model.led_count(),
        triangles = model.triangle_count(),
        "loaded model"
    );

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let colors = LedColors::new(model.led_count());
    randomise(&colors, &mut rng);

    let visualizer = LedVisualizer::spawn(&model, colors, visualizer_config(&settings))?;
    let interval = settings.demo.interval;
    tracing::info!(
        interval = %humantime::format_duration(interval),
        "writing random LED colors; press Escape in the window to quit"
    );

    let mut next_update = Instant::now() + interval;
    while visualizer.running() {
        let now = Instant::now();
        if now >= next_update {
            randomise(visualizer.colors(), &mut rng);
            visualizer.refresh();
            next_update += interval;
            if next_update < now {
                next_update = now + interval;
            }
        }
        thread::sleep(next_update.saturating_duration_since(now).min(POLL_INTERVAL));
    }

    tracing::info!("visualizer closed");
    visualizer.shutdown()
}

fn load_settings(source: &ConfigSource) -> Result<Settings> {
    match source.path() {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading settings");
            Settings::load(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))
        }
        None => {
            tracing::debug!("no settings file found; using defaults");
            Ok(Settings::default())
        }
    }
}

/// Writes a fresh random color to every LED.
pub fn randomise<R: Rng>(colors: &LedColors, rng: &mut R) {
    colors.fill_with(|_| rng.gen());
}
