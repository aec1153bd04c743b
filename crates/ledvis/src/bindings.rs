use ledmodel::{AntialiasSetting, Settings};
use visualizer::{Antialiasing, CameraTuning, VisualizerConfig};

use crate::cli::Cli;

/// Folds command-line overrides into the loaded settings so they go through
/// the same validation.
pub fn apply_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(dir) = &cli.shader_dir {
        settings.shaders.directory = dir.clone();
    }
    if let Some(fps) = cli.fps {
        settings.render.fps = fps;
    }
    if let Some((width, height)) = cli.size {
        settings.window.width = width;
        settings.window.height = height;
    }
    if let Some(antialias) = cli.antialias {
        settings.render.antialias = antialias;
    }
    if let Some(interval) = cli.interval {
        settings.demo.interval = interval;
    }
    if cli.debug {
        settings.render.debug = true;
    }
}

pub fn antialiasing(setting: AntialiasSetting) -> Antialiasing {
    match setting.samples() {
        None => Antialiasing::Auto,
        Some(1) => Antialiasing::Off,
        Some(samples) => Antialiasing::Samples(samples),
    }
}

pub fn visualizer_config(settings: &Settings) -> VisualizerConfig {
    let render = &settings.render;
    let camera = &settings.camera;
    VisualizerConfig {
        window_size: (settings.window.width, settings.window.height),
        window_title: settings.window.title.clone(),
        target_fps: Some(render.fps),
        fov: render.fov,
        near: render.near,
        far: render.far,
        clear_color: render.clear_color,
        antialiasing: antialiasing(render.antialias),
        vsync: render.vsync,
        cull_back_faces: render.cull_back_faces,
        marker_size: render.marker_size,
        camera: CameraTuning {
            horizontal_angle: camera.horizontal_angle,
            vertical_angle: camera.vertical_angle,
            start_distance: camera.start_distance,
            animation_speed: camera.animation_speed,
            drag_speed: camera.drag_speed,
            scroll_speed: camera.scroll_speed,
        },
        exposure_rate: settings.exposure.change_rate,
        shader_dir: settings.shaders.directory.clone(),
        debug: render.debug,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn default_settings_match_visualizer_defaults() {
        let config = visualizer_config(&Settings::default());
        let expected = VisualizerConfig::default();
        assert_eq!(config.window_size, expected.window_size);
        assert_eq!(config.window_title, expected.window_title);
        assert_eq!(config.target_fps, expected.target_fps);
        assert_eq!(config.fov, expected.fov);
        assert_eq!(config.clear_color, expected.clear_color);
        assert_eq!(config.antialiasing, expected.antialiasing);
        assert_eq!(config.camera, expected.camera);
        assert_eq!(config.exposure_rate, expected.exposure_rate);
        assert_eq!(config.shader_dir, expected.shader_dir);
        assert_eq!(config.marker_size, expected.marker_size);
    }

    #[test]
    fn maps_antialias_settings() {
        assert_eq!(antialiasing(AntialiasSetting::Auto), Antialiasing::Auto);
        assert_eq!(antialiasing(AntialiasSetting::Off), Antialiasing::Off);
        assert_eq!(
            antialiasing(AntialiasSetting::Samples8),
            Antialiasing::Samples(8)
        );
    }

    #[test]
    fn cli_overrides_settings() {
        let cli = Cli::try_parse_from([
            "ledvis",
            "--shader-dir",
            "/opt/ledvis/shaders",
            "--fps",
            "24",
            "--size",
            "320x200",
            "--antialias",
            "off",
            "--interval",
            "3s",
            "--debug",
        ])
        .expect("parse");
        let mut settings = Settings::default();
        apply_overrides(&mut settings, &cli);

        assert_eq!(settings.render.fps, 24.0);
        assert_eq!((settings.window.width, settings.window.height), (320, 200));
        assert_eq!(settings.render.antialias, AntialiasSetting::Off);
        assert_eq!(settings.demo.interval, Duration::from_secs(3));
        assert!(settings.render.debug);

        let config = visualizer_config(&settings);
        assert_eq!(config.shader_dir, PathBuf::from("/opt/ledvis/shaders"));
        assert_eq!(config.target_fps, Some(24.0));
        assert_eq!(config.antialiasing, Antialiasing::Off);
        assert!(config.debug);
    }

    #[test]
    fn absent_flags_keep_settings() {
        let cli = Cli::try_parse_from(["ledvis"]).expect("parse");
        let mut settings = Settings::default();
        settings.render.fps = 90.0;
        apply_overrides(&mut settings, &cli);
        assert_eq!(settings.render.fps, 90.0);
        assert!(!settings.render.debug);
    }
}
