use std::fmt::Display;
use std::fs;
use std::path::Path;

use arcade::{Color, LoopConfig};
use serde::Deserialize;

pub(crate) const CONFIG_ENV_VAR: &str = "PONG_CONFIG";

pub(crate) type ConfigResult<T> = Result<T, String>;

/// Tunables for the Pong binary. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PongConfig {
    pub(crate) window_title: String,
    pub(crate) window_width: u32,
    pub(crate) window_height: u32,
    pub(crate) target_tps: u32,
    pub(crate) max_render_fps: Option<u32>,
    pub(crate) paddle_width: f32,
    pub(crate) paddle_height: f32,
    pub(crate) paddle_margin: f32,
    pub(crate) paddle_speed: f32,
    pub(crate) ball_size: f32,
    pub(crate) ball_speed_x: f32,
    pub(crate) ball_speed_y: f32,
    pub(crate) paddle_color: Color,
    pub(crate) ball_color: Color,
    pub(crate) clear_color: Color,
}

impl Default for PongConfig {
    fn default() -> Self {
        Self {
            window_title: "Pong".to_string(),
            window_width: 640,
            window_height: 480,
            target_tps: 60,
            max_render_fps: None,
            paddle_width: 10.0,
            paddle_height: 60.0,
            paddle_margin: 20.0,
            paddle_speed: 6.0,
            ball_size: 10.0,
            ball_speed_x: 4.0,
            ball_speed_y: 3.0,
            paddle_color: Color::WHITE,
            ball_color: Color::YELLOW,
            clear_color: Color::BLACK,
        }
    }
}

impl PongConfig {
    pub(crate) fn to_loop_config(&self) -> LoopConfig {
        LoopConfig {
            window_title: self.window_title.clone(),
            window_width: self.window_width,
            window_height: self.window_height,
            target_tps: self.target_tps,
            max_render_fps: self.max_render_fps,
            clear_color: self.clear_color,
            ..LoopConfig::default()
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.window_width == 0 {
            return Err(expected_actual("window_width", "> 0", self.window_width));
        }
        if self.window_height == 0 {
            return Err(expected_actual("window_height", "> 0", self.window_height));
        }
        if self.target_tps == 0 {
            return Err(expected_actual("target_tps", "> 0", self.target_tps));
        }
        for (path, value) in [
            ("paddle_width", self.paddle_width),
            ("paddle_height", self.paddle_height),
            ("paddle_speed", self.paddle_speed),
            ("ball_size", self.ball_size),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(expected_actual(path, "finite positive number", value));
            }
        }
        if !self.paddle_margin.is_finite() || self.paddle_margin < 0.0 {
            return Err(expected_actual(
                "paddle_margin",
                "finite non-negative number",
                self.paddle_margin,
            ));
        }
        if !self.ball_speed_x.is_finite() || self.ball_speed_x == 0.0 {
            return Err(expected_actual(
                "ball_speed_x",
                "finite non-zero number",
                self.ball_speed_x,
            ));
        }
        if !self.ball_speed_y.is_finite() {
            return Err(expected_actual(
                "ball_speed_y",
                "finite number",
                self.ball_speed_y,
            ));
        }

        let court_width = self.window_width as f32;
        let occupied = 2.0 * (self.paddle_margin + self.paddle_width) + self.ball_size;
        if occupied >= court_width {
            return Err(validation_err(
                "paddle_margin",
                format!("paddles and ball need {occupied}px but the window is {court_width}px wide"),
            ));
        }
        if self.paddle_height >= self.window_height as f32 {
            return Err(expected_actual(
                "paddle_height",
                format!("< window_height ({})", self.window_height),
                self.paddle_height,
            ));
        }
        Ok(())
    }
}

/// Reads the file named by `PONG_CONFIG`; an unset or blank variable means built-in defaults.
pub(crate) fn load_from_env() -> ConfigResult<PongConfig> {
    match std::env::var(CONFIG_ENV_VAR) {
        Ok(raw) if !raw.trim().is_empty() => load_from_path(Path::new(raw.trim())),
        Ok(_) | Err(std::env::VarError::NotPresent) => Ok(PongConfig::default()),
        Err(error) => Err(format!("read {CONFIG_ENV_VAR}: {error}")),
    }
}

pub(crate) fn load_from_path(path: &Path) -> ConfigResult<PongConfig> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("read config '{}': {error}", path.display()))?;
    let config = parse_config_json(&raw)?;
    config.validate()?;
    Ok(config)
}

fn parse_config_json(raw: &str) -> ConfigResult<PongConfig> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    match serde_path_to_error::deserialize::<_, PongConfig>(&mut deserializer) {
        Ok(config) => Ok(config),
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            if path.is_empty() || path == "." {
                Err(format!("parse config json: {source}"))
            } else {
                Err(format!("parse config json at {path}: {source}"))
            }
        }
    }
}

fn validation_err(path: &str, message: impl Into<String>) -> String {
    format!("validation failed at {path}: {}", message.into())
}

fn expected_actual(path: &str, expected: impl Display, actual: impl Display) -> String {
    validation_err(path, format!("expected {expected}, got {actual}"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write_config(dir: &TempDir, raw: &str) -> std::path::PathBuf {
        let path = dir.path().join("pong.json");
        fs::write(&path, raw).expect("write config");
        path
    }

    #[test]
    fn empty_object_yields_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_config(&dir, "{}");

        let config = load_from_path(&path).expect("load");
        assert_eq!(config, PongConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_config(
            &dir,
            r#"{ "paddle_speed": 9.5, "ball_color": [255, 0, 0, 255], "max_render_fps": 30 }"#,
        );

        let config = load_from_path(&path).expect("load");
        assert_eq!(config.paddle_speed, 9.5);
        assert_eq!(config.ball_color, Color([255, 0, 0, 255]));
        assert_eq!(config.max_render_fps, Some(30));
        assert_eq!(config.paddle_height, PongConfig::default().paddle_height);
    }

    #[test]
    fn type_errors_report_json_path() {
        let error = parse_config_json(r#"{ "paddle_speed": "fast" }"#).expect_err("bad type");
        assert!(error.contains("at paddle_speed"), "{error}");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = parse_config_json(r#"{ "paddle_sped": 3.0 }"#).expect_err("unknown field");
        assert!(error.contains("paddle_sped"), "{error}");
    }

    #[test]
    fn missing_file_error_names_the_path() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("absent.json");

        let error = load_from_path(&path).expect_err("missing file");
        assert!(error.contains("absent.json"), "{error}");
    }

    #[test]
    fn validation_rejects_non_positive_sizes() {
        let config = PongConfig {
            paddle_height: 0.0,
            ..PongConfig::default()
        };
        let error = config.validate().expect_err("zero paddle");
        assert!(error.starts_with("validation failed at paddle_height"), "{error}");
    }

    #[test]
    fn validation_rejects_stationary_serve() {
        let config = PongConfig {
            ball_speed_x: 0.0,
            ..PongConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_rejects_court_too_narrow() {
        let config = PongConfig {
            window_width: 40,
            ..PongConfig::default()
        };
        let error = config.validate().expect_err("narrow court");
        assert!(error.contains("paddle_margin"), "{error}");
    }

    #[test]
    fn loop_config_carries_window_and_timing() {
        let config = PongConfig {
            window_width: 800,
            target_tps: 120,
            ..PongConfig::default()
        };
        let loop_config = config.to_loop_config();
        assert_eq!(loop_config.window_width, 800);
        assert_eq!(loop_config.target_tps, 120);
        assert_eq!(loop_config.window_title, "Pong");
        assert_eq!(loop_config.clear_color, Color::BLACK);
    }
}
