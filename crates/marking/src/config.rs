use directories::ProjectDirs;
use radian::color::{ColorSpec, StopSpec, StopValue};
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MainSettings {
    /// Minimum distance in px between a parent and its active child.
    pub min_distance: f64,
    /// Minimum length of a gesture in px.
    pub min_trace_distance: f64,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub animation_duration: Duration,
    /// Clicking outside `radii.max_click_radius` closes the menu.
    pub enable_max_click_radius: bool,
    /// Longest press that still counts as a click.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub input_timeout: Duration,
}

impl Default for MainSettings {
    fn default() -> Self {
        Self {
            min_distance: 150.0,
            min_trace_distance: 175.0,
            animation_duration: Duration::from_millis(250),
            enable_max_click_radius: true,
            input_timeout: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StrokeSettings {
    pub enabled: bool,
    pub color: Option<String>,
    pub width: f64,
}

impl Default for StrokeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            color: Some("rgba(62, 62, 64, 1.0)".to_string()),
            width: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LabelColors {
    pub color: String,
    pub selection_color: String,
}

impl Default for LabelColors {
    fn default() -> Self {
        Self {
            color: "#fff".to_string(),
            selection_color: "#fff".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeometrySettings {
    pub size: f64,
    /// Radius around the center with no directional selection.
    pub size_dead_zone: f64,
    pub color: String,
    pub selection_color: String,
    pub stroke: StrokeSettings,
    /// Leaf items get a drop shape pointing away from the parent.
    pub use_action_shape: bool,
    pub text: LabelColors,
    pub icon: LabelColors,
}

impl Default for GeometrySettings {
    fn default() -> Self {
        Self {
            size: 50.0,
            size_dead_zone: 25.0,
            color: "#575859".to_string(),
            selection_color: "#577a85".to_string(),
            stroke: StrokeSettings::default(),
            use_action_shape: false,
            text: LabelColors::default(),
            icon: LabelColors::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CheckboxSettings {
    pub selection_color: String,
    pub corner_radius: f64,
}

impl Default for CheckboxSettings {
    fn default() -> Self {
        Self {
            selection_color: "#4b9a56".to_string(),
            corner_radius: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RibbonSliderSettings {
    pub gradient_color: String,
    pub gradient_color_sides: String,
    pub gradient_length: f64,
    pub ribbon_height: f64,
    /// Start of the fade mask, `0..0.5`.
    pub mask_start: f64,
    /// Mask length relative to the surface width.
    pub mask_length_multiplier: f64,
}

impl Default for RibbonSliderSettings {
    fn default() -> Self {
        Self {
            gradient_color: "#575859".to_string(),
            gradient_color_sides: "rgba(87, 88, 89, 0)".to_string(),
            gradient_length: 100.0,
            ribbon_height: 50.0,
            mask_start: 0.1,
            mask_length_multiplier: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectorSettings {
    pub enabled: bool,
    pub color: String,
    pub width: f64,
}

impl Default for ConnectorSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            color: "#393a3c".to_string(),
            width: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ArcStrokeSettings {
    pub enabled: bool,
    pub color: Option<String>,
    pub width: f64,
}

impl Default for ArcStrokeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            color: None,
            width: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ArcSettings {
    pub enabled: bool,
    pub color: ColorSpec,
    pub radial: bool,
    pub stroke: ArcStrokeSettings,
}

impl Default for ArcSettings {
    fn default() -> Self {
        let pair = |color: &str, offset: f64| {
            StopSpec::Pair(vec![
                StopValue::Color(color.to_string()),
                StopValue::Offset(offset),
            ])
        };
        Self {
            enabled: true,
            color: ColorSpec::Stops(vec![
                pair("#575859", 0.15),
                pair("rgba(87, 122, 133, 0.5)", 0.5),
                pair("rgba(74, 159, 158, 0.15)", 0.8),
                StopSpec::Color("rgba(87, 88, 89, 0)".to_string()),
            ]),
            radial: true,
            stroke: ArcStrokeSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IconScales {
    /// Glyphs are 512 units, 1/16 makes them 32 px.
    pub base: f64,
    pub solo: f64,
    pub child: f64,
}

impl Default for IconScales {
    fn default() -> Self {
        Self {
            base: 0.0625,
            solo: 1.6,
            child: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScaleSettings {
    pub parent: f64,
    pub child: f64,
    pub dot: f64,
    pub icon: IconScales,
}

impl Default for ScaleSettings {
    fn default() -> Self {
        Self {
            parent: 0.5,
            child: 0.5,
            dot: 0.15,
            icon: IconScales::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RadiiSettings {
    pub child: f64,
    pub dot: f64,
    pub arc: f64,
    pub max_click_radius: f64,
}

impl Default for RadiiSettings {
    fn default() -> Self {
        Self {
            child: 100.0,
            dot: 25.0,
            arc: 300.0,
            max_click_radius: 450.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub main: MainSettings,
    pub geometry: GeometrySettings,
    pub checkbox: CheckboxSettings,
    pub ribbon_slider: RibbonSliderSettings,
    pub connector: ConnectorSettings,
    pub arc: ArcSettings,
    pub scales: ScaleSettings,
    pub radii: RadiiSettings,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

pub fn get_settings_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "marking", "marking").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("MARKING")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Loads settings from `path`, or the default location when `None`.
/// A missing file falls back to defaults; environment variables win over both.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => get_settings_path()?,
    };

    let s = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(environment())
        .build()?;

    Ok(s.try_deserialize()?)
}

/// Parses settings from a TOML string, unset keys keep their defaults.
pub fn settings_from_toml(toml: &str) -> Result<Settings, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn write_default_settings(path: Option<&Path>) -> std::io::Result<PathBuf> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => get_settings_path()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?,
    };
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_SETTINGS)?;
    }
    Ok(path)
}

pub const DEFAULT_SETTINGS: &str = include_str!("default_settings.toml");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_file_matches_defaults() {
        let parsed = settings_from_toml(DEFAULT_SETTINGS).unwrap();
        assert_eq!(parsed, Settings::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let parsed = settings_from_toml(
            r#"
            [main]
            min_trace_distance = 90
            animation_duration = 100

            [geometry.stroke]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(parsed.main.min_trace_distance, 90.0);
        assert_eq!(parsed.main.animation_duration, Duration::from_millis(100));
        assert_eq!(parsed.main.min_distance, 150.0);
        assert!(!parsed.geometry.stroke.enabled);
        assert_eq!(parsed.geometry.stroke.width, 2.0);
        assert_eq!(parsed.radii, RadiiSettings::default());
    }

    #[test]
    fn arrays_replace_the_default_gradient() {
        let parsed = settings_from_toml(
            r##"
            [arc]
            color = ["#000", "#fff"]
            "##,
        )
        .unwrap();

        assert_eq!(
            parsed.arc.color,
            ColorSpec::Stops(vec![
                StopSpec::Color("#000".to_string()),
                StopSpec::Color("#fff".to_string()),
            ])
        );
        assert!(parsed.arc.radial);
    }

    #[test]
    fn settings_deserialize_from_json() {
        let parsed: Settings =
            serde_json::from_str(r#"{"arc": {"color": "red"}, "scales": {"dot": 0.2}}"#).unwrap();
        assert_eq!(parsed.arc.color, ColorSpec::solid("red"));
        assert_eq!(parsed.scales.dot, 0.2);
        assert_eq!(parsed.scales.icon, IconScales::default());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = std::env::temp_dir().join("marking-settings-missing");
        let parsed = load_settings(Some(&dir.join("nope.toml"))).unwrap();
        assert_eq!(parsed.connector, ConnectorSettings::default());
    }
}
