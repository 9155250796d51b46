//! Point-cloud parameters and camera math for the particle background.
//!
//! Everything here is plain data so the tier table and the transforms can be
//! checked without a GL context; `wasm::background` uploads the results.

use std::f32::consts::TAU;

use glam::{EulerRot, Mat4, Vec3};

use crate::config::BackgroundConfig;

/// How many points to draw and how large, for one viewport width band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleTier {
    pub count: usize,
    pub size: f32,
}

const TIERS: [(f64, ParticleTier); 3] = [
    (480.0, ParticleTier { count: 2000, size: 0.8 }),
    (768.0, ParticleTier { count: 4000, size: 1.0 }),
    (1024.0, ParticleTier { count: 6000, size: 1.2 }),
];

const WIDEST: ParticleTier = ParticleTier {
    count: 10000,
    size: 1.5,
};

/// Tier for a viewport width. Each band is `[previous, limit)`, so a width
/// equal to a limit lands in the next band up.
pub fn tier_for_width(width: f64) -> ParticleTier {
    TIERS
        .iter()
        .find(|(limit, _)| width < *limit)
        .map(|(_, tier)| *tier)
        .unwrap_or(WIDEST)
}

/// Uniform value in `[-range / 2, range / 2)` from a `[0, 1)` sample.
pub fn spread(sample: f32, range: f32) -> f32 {
    range * (sample - 0.5)
}

/// Flat `xyz` position buffer for `count` points, each axis drawn
/// independently from `random`.
pub fn generate_positions(count: usize, range: f32, mut random: impl FnMut() -> f32) -> Vec<f32> {
    let mut positions = Vec::with_capacity(count * 3);
    for _ in 0..count * 3 {
        positions.push(spread(random(), range));
    }
    positions
}

/// Rotation of the cloud, advanced once per frame. Angles are kept in
/// `[0, TAU)` so the per-frame step never drops below `f32` resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
}

impl Rotation {
    pub fn advance(&mut self, step: f32) {
        self.x = (self.x + step).rem_euclid(TAU);
        self.y = (self.y + step).rem_euclid(TAU);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub distance: f32,
}

impl Camera {
    pub fn new(config: &BackgroundConfig, aspect: f32) -> Self {
        Self {
            fov_y: config.fov_degrees.to_radians(),
            aspect,
            near: config.near,
            far: config.far,
            distance: config.camera_distance,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn model_view(&self, rotation: Rotation) -> Mat4 {
        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -self.distance));
        let model = Mat4::from_euler(EulerRot::XYZ, rotation.x, rotation.y, 0.0);
        view * model
    }
}

/// Everything the renderer needs to build the cloud once.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudSpec {
    pub tier: ParticleTier,
    pub positions: Vec<f32>,
}

impl CloudSpec {
    pub fn build(config: &BackgroundConfig, width: f64, random: impl FnMut() -> f32) -> Self {
        let tier = tier_for_width(width);
        Self {
            tier,
            positions: generate_positions(tier.count, config.spread, random),
        }
    }

    pub fn point_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// Whether an uncaught error message comes from the rendering path.
pub fn is_render_error(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("webgl") || message.contains("context lost")
}
