// Topics, scale parameters and command-line arguments
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Result, TeleopError};

// Zenoh topic
pub const TOPIC_CMD_VEL: &str = "cmd_vel"; // velocity commands

// Used when a scale is neither on the command line nor in the parameter file
pub const DEFAULT_SCALE_LINEAR: f64 = 2.0;
pub const DEFAULT_SCALE_ANGULAR: f64 = 2.0;

/// Keyboard teleop: publishes a velocity command for every recognized key press
#[derive(Debug, Clone, Parser)]
#[command(name = "keyboard-teleop", version)]
pub struct Args {
    /// Multiplier applied to forward/backward keys
    #[arg(long)]
    pub scale_linear: Option<f64>,

    /// Multiplier applied to rotation keys
    #[arg(long)]
    pub scale_angular: Option<f64>,

    /// JSON file with `scale_linear` / `scale_angular` parameters
    #[arg(long, value_name = "FILE")]
    pub params: Option<PathBuf>,

    /// Key expression the commands are published on
    #[arg(long, default_value = TOPIC_CMD_VEL)]
    pub topic: String,

    /// Zenoh configuration file (defaults to the zenoh default config)
    #[arg(long, value_name = "FILE")]
    pub zenoh_config: Option<PathBuf>,
}

/// Parameter file contents. Either field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParamFile {
    pub scale_linear: Option<f64>,
    pub scale_angular: Option<f64>,
}

impl ParamFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| TeleopError::ParamFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(path, &text)
    }

    fn parse(path: &Path, text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| TeleopError::ParamFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Linear and angular scales, fixed for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleConfig {
    pub linear: f64,
    pub angular: f64,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            linear: DEFAULT_SCALE_LINEAR,
            angular: DEFAULT_SCALE_ANGULAR,
        }
    }
}

impl ScaleConfig {
    pub fn new(linear: f64, angular: f64) -> Self {
        Self { linear, angular }
    }

    /// Resolve each scale independently: command line, then parameter file, then default
    pub fn resolve(args: &Args) -> Result<Self> {
        let params = match &args.params {
            Some(path) => ParamFile::load(path)?,
            None => ParamFile::default(),
        };
        let scales = Self::merge(args, &params)?;
        info!(
            "Scales: linear={}, angular={}",
            scales.linear, scales.angular
        );
        Ok(scales)
    }

    fn merge(args: &Args, params: &ParamFile) -> Result<Self> {
        let linear = pick("scale_linear", args.scale_linear, params.scale_linear, DEFAULT_SCALE_LINEAR)?;
        let angular = pick(
            "scale_angular",
            args.scale_angular,
            params.scale_angular,
            DEFAULT_SCALE_ANGULAR,
        )?;
        Ok(Self { linear, angular })
    }
}

fn pick(name: &str, cli: Option<f64>, file: Option<f64>, default: f64) -> Result<f64> {
    let value = cli.or(file).unwrap_or(default);
    if !value.is_finite() {
        return Err(TeleopError::Config(format!("{name} must be finite, got {value}")));
    }
    if value <= 0.0 {
        warn!("{} is {}, keys will not move the robot as labelled", name, value);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["keyboard-teleop"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_when_nothing_given() {
        let a = args(&[]);
        let scales = ScaleConfig::merge(&a, &ParamFile::default()).unwrap();
        assert_eq!(scales, ScaleConfig::new(2.0, 2.0));
        assert_eq!(a.topic, TOPIC_CMD_VEL);
    }

    #[test]
    fn test_missing_field_falls_back_per_field() {
        let params = ParamFile::parse(Path::new("p.json"), r#"{"scale_angular": 0.5}"#).unwrap();
        let scales = ScaleConfig::merge(&args(&[]), &params).unwrap();
        assert_eq!(scales, ScaleConfig::new(DEFAULT_SCALE_LINEAR, 0.5));
    }

    #[test]
    fn test_command_line_overrides_param_file() {
        let params = ParamFile::parse(
            Path::new("p.json"),
            r#"{"scale_linear": 1.0, "scale_angular": 1.0}"#,
        )
        .unwrap();
        let scales =
            ScaleConfig::merge(&args(&["--scale-linear", "3.5"]), &params).unwrap();
        assert_eq!(scales, ScaleConfig::new(3.5, 1.0));
    }

    #[test]
    fn test_non_finite_scale_rejected() {
        let params = ParamFile {
            scale_linear: Some(f64::NAN),
            scale_angular: None,
        };
        let err = ScaleConfig::merge(&args(&[]), &params).unwrap_err();
        assert!(matches!(err, TeleopError::Config(_)));
    }

    #[test]
    fn test_non_positive_scale_accepted() {
        let scales = ScaleConfig::merge(
            &args(&["--scale-angular=-1.0", "--scale-linear", "0"]),
            &ParamFile::default(),
        )
        .unwrap();
        assert_eq!(scales, ScaleConfig::new(0.0, -1.0));
    }

    #[test]
    fn test_malformed_param_file() {
        let err = ParamFile::parse(Path::new("p.json"), "scale_linear: 2").unwrap_err();
        assert!(matches!(err, TeleopError::ParamFile { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let path = std::env::temp_dir().join(format!("teleop-params-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"scale_linear": 0.25}"#).unwrap();
        let scales = ScaleConfig::resolve(&args(&["--params", path.to_str().unwrap()])).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(scales, ScaleConfig::new(0.25, DEFAULT_SCALE_ANGULAR));
    }

    #[test]
    fn test_missing_param_file() {
        let err = ScaleConfig::resolve(&args(&["--params", "/nonexistent/teleop.json"])).unwrap_err();
        assert!(matches!(err, TeleopError::ParamFile { .. }));
    }
}
