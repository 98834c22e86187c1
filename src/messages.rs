// Message types published by the teleop node

use serde::{Deserialize, Serialize};

use crate::config::ScaleConfig;
use crate::keymap::Effect;

// One command per recognized key press, built from scratch each time
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VelocityCommand {
    pub linear: f64,
    pub angular: f64,
}

impl VelocityCommand {
    pub fn new(linear: f64, angular: f64) -> Self {
        Self { linear, angular }
    }

    /// Scale an effect. Emergency stop is always zero; an axis with a zero
    /// multiplier stays zero whatever the scale.
    pub fn from_effect(effect: Effect, scales: &ScaleConfig) -> Self {
        match effect {
            Effect::EmergencyStop => Self::default(),
            Effect::Move { linear, angular } => Self {
                linear: scaled(linear, scales.linear),
                angular: scaled(angular, scales.angular),
            },
        }
    }
}

fn scaled(multiplier: f64, scale: f64) -> f64 {
    if multiplier == 0.0 {
        0.0
    } else {
        multiplier * scale
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

// Wire form of a VelocityCommand: linear.x and angular.z carry the command
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Twist {
    pub linear: Vector3,
    pub angular: Vector3,
}

impl From<&VelocityCommand> for Twist {
    fn from(cmd: &VelocityCommand) -> Self {
        Self {
            linear: Vector3 {
                x: cmd.linear,
                ..Default::default()
            },
            angular: Vector3 {
                z: cmd.angular,
                ..Default::default()
            },
        }
    }
}

impl From<&Twist> for VelocityCommand {
    fn from(twist: &Twist) -> Self {
        Self {
            linear: twist.linear.x,
            angular: twist.angular.z,
        }
    }
}
