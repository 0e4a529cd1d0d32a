use std::f32::consts::{FRAC_PI_2, TAU};

use crate::geometry::{Vec3, vec3};

pub const FOCUS_OFFSET: Vec3 = vec3(0.0, 10.0, 50.0);
pub const HOME_POSITION: Vec3 = vec3(0.0, 0.0, 250.0);
pub const FIELD_OF_VIEW_DEG: f32 = 50.0;
pub const NEAR_PLANE: f32 = 1.0;
pub const FAR_PLANE: f32 = 2000.0;

const MIN_DISTANCE: f32 = 20.0;
const MAX_DISTANCE: f32 = 1500.0;
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.05;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: HOME_POSITION,
            look_at: Vec3::ZERO,
        }
    }
}

impl CameraPose {
    pub fn distance(&self) -> f32 {
        self.position.distance(self.look_at)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Smoothing {
    Exponential { rate: f32 },
    Linear { rate: f32 },
}

impl Default for Smoothing {
    fn default() -> Self {
        Self::Exponential { rate: 2.0 }
    }
}

impl Smoothing {
    pub fn factor(self, dt: f32) -> f32 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0.0;
        }

        match self {
            Self::Exponential { rate } => 1.0 - (-rate.max(0.0) * dt).exp(),
            Self::Linear { rate } => (rate.max(0.0) * dt).min(1.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraController {
    pub smoothing: Smoothing,
    /// Orbit-control style speed: 1.0 is one turn per minute.
    pub auto_rotate_speed: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            smoothing: Smoothing::default(),
            auto_rotate_speed: 0.5,
        }
    }
}

impl CameraController {
    pub fn new(smoothing: Smoothing) -> Self {
        Self {
            smoothing,
            ..Self::default()
        }
    }

    pub fn advance(&self, pose: CameraPose, focus: Option<Vec3>, dt: f32) -> CameraPose {
        let Some(target) = focus else {
            return pose;
        };

        let t = self.smoothing.factor(dt);
        CameraPose {
            position: pose.position.lerp(target + FOCUS_OFFSET, t),
            look_at: pose.look_at.lerp(target, t),
        }
    }

    pub fn auto_rotate(&self, pose: CameraPose, dt: f32) -> CameraPose {
        if !dt.is_finite() || dt <= 0.0 {
            return pose;
        }

        let angle = self.auto_rotate_speed * (TAU / 60.0) * dt;
        let offset = pose.position - pose.look_at;
        let (sin, cos) = angle.sin_cos();
        let rotated = vec3(
            (offset.x * cos) + (offset.z * sin),
            offset.y,
            (offset.z * cos) - (offset.x * sin),
        );

        CameraPose {
            position: pose.look_at + rotated,
            look_at: pose.look_at,
        }
    }
}

/// Drag-rotate around the look-at point; pitch stays clear of the poles.
pub fn orbit(pose: CameraPose, yaw_delta: f32, pitch_delta: f32) -> CameraPose {
    let offset = pose.position - pose.look_at;
    let radius = offset.length().max(MIN_DISTANCE);

    let yaw = offset.x.atan2(offset.z) + yaw_delta;
    let pitch = ((offset.y / radius).clamp(-1.0, 1.0).asin() + pitch_delta)
        .clamp(-PITCH_LIMIT, PITCH_LIMIT);

    let horizontal = radius * pitch.cos();
    CameraPose {
        position: pose.look_at + vec3(horizontal * yaw.sin(), radius * pitch.sin(), horizontal * yaw.cos()),
        look_at: pose.look_at,
    }
}

pub fn dolly(pose: CameraPose, factor: f32) -> CameraPose {
    if !factor.is_finite() || factor <= 0.0 {
        return pose;
    }

    let offset = pose.position - pose.look_at;
    let direction = offset.normalized_or(vec3(0.0, 0.0, 1.0));
    let distance = (pose.distance() * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);

    CameraPose {
        position: pose.look_at + direction * distance,
        look_at: pose.look_at,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewBasis {
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}

pub fn view_basis(pose: &CameraPose) -> ViewBasis {
    let forward = (pose.look_at - pose.position).normalized_or(vec3(0.0, 0.0, -1.0));
    let right = forward
        .cross(Vec3::Y)
        .normalized_or(vec3(1.0, 0.0, 0.0));
    let up = right.cross(forward);

    ViewBasis { right, up, forward }
}
