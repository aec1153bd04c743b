use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use ledmodel::AntialiasSetting;

pub const DEFAULT_MODEL: &str = "assets/models/cube.json";

#[derive(Parser, Debug)]
#[command(
    name = "ledvis",
    author,
    version,
    about = "Simulate an LED cube or strip on the desktop with random colors"
)]
pub struct Cli {
    /// Model description (JSON with `led-strip` and `led-enclosure`).
    #[arg(value_name = "MODEL", default_value = DEFAULT_MODEL)]
    pub model: PathBuf,

    /// Settings file; falls back to `<config dir>/ledvis/config.toml` when present.
    #[arg(long, value_name = "FILE", env = "LEDVIS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory containing `enclosure.vert/.frag` and `marker.vert/.frag`.
    #[arg(long, value_name = "DIR")]
    pub shader_dir: Option<PathBuf>,

    /// Frame rate cap for the render loop.
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Anti-aliasing policy: `auto`, `off`, or an MSAA sample count (2/4/8/16).
    #[arg(long, value_name = "MODE", value_parser = AntialiasSetting::parse)]
    pub antialias: Option<AntialiasSetting>,

    /// Time between random color updates (e.g. `1s`, `250ms`).
    #[arg(long, value_name = "DURATION", value_parser = parse_interval)]
    pub interval: Option<Duration>,

    /// Seed for the random color generator; random when omitted.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Start with LED markers and frame stats enabled.
    #[arg(long)]
    pub debug: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid window width".to_string())?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid window height".to_string())?;
    if width == 0 || height == 0 {
        return Err("window size must be greater than zero".into());
    }
    Ok((width, height))
}

pub fn parse_interval(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    let interval = match trimmed.parse::<f64>() {
        Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => Duration::from_secs_f64(seconds),
        Ok(_) => return Err("interval must be a non-negative number of seconds".into()),
        Err(_) => humantime::parse_duration(trimmed)
            .map_err(|err| format!("invalid interval '{trimmed}': {err}"))?,
    };
    if interval.is_zero() {
        return Err("interval must be greater than zero".into());
    }
    Ok(interval)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_window_size() {
        assert_eq!(parse_size("1280x720"), Ok((1280, 720)));
        assert_eq!(parse_size(" 640 X 480 "), Ok((640, 480)));
        assert!(parse_size("1280").is_err());
        assert!(parse_size("0x720").is_err());
        assert!(parse_size("widexhigh").is_err());
    }

    #[test]
    fn parses_interval_in_seconds_or_humantime() {
        assert_eq!(parse_interval("2"), Ok(Duration::from_secs(2)));
        assert_eq!(parse_interval("0.5"), Ok(Duration::from_millis(500)));
        assert_eq!(parse_interval("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_interval("1m"), Ok(Duration::from_secs(60)));
        assert!(parse_interval("0").is_err());
        assert!(parse_interval("-1").is_err());
        assert!(parse_interval("soon").is_err());
    }

    #[test]
    fn defaults_to_bundled_cube() {
        let cli = Cli::try_parse_from(["ledvis"]).expect("parse");
        assert_eq!(cli.model, PathBuf::from(DEFAULT_MODEL));
        assert!(cli.size.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::try_parse_from([
            "ledvis",
            "strip.json",
            "--fps",
            "30",
            "--size",
            "1024x768",
            "--antialias",
            "4",
            "--interval",
            "100ms",
            "--seed",
            "7",
            "--debug",
        ])
        .expect("parse");
        assert_eq!(cli.model, PathBuf::from("strip.json"));
        assert_eq!(cli.fps, Some(30.0));
        assert_eq!(cli.size, Some((1024, 768)));
        assert_eq!(cli.antialias, Some(AntialiasSetting::Samples4));
        assert_eq!(cli.interval, Some(Duration::from_millis(100)));
        assert_eq!(cli.seed, Some(7));
        assert!(cli.debug);
    }

    #[test]
    fn rejects_unsupported_sample_count() {
        assert!(Cli::try_parse_from(["ledvis", "--antialias", "3"]).is_err());
    }
}
