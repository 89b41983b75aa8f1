//! Steering - straight-line seek/arrive/wander primitives shared by all agents

use rand::Rng;

use crate::components::Vec2;

/// Advance `position` toward `destination` at `speed` for `delta_seconds`.
///
/// A step that would pass the destination lands exactly on it. When the
/// position already equals the destination nothing moves.
pub fn steer_toward(position: Vec2, destination: Vec2, speed: f32, delta_seconds: f32) -> Vec2 {
    let diff = destination - position;
    let distance = diff.length();
    if distance <= 0.0 {
        return position;
    }

    let step = (speed * delta_seconds).max(0.0);
    if step >= distance {
        return destination;
    }

    position + diff.normalize() * step
}

/// True once `position` is within `threshold` of `destination`
pub fn has_arrived(position: Vec2, destination: Vec2, threshold: f32) -> bool {
    position.distance_squared(&destination) <= threshold * threshold
}

/// Uniformly random point inside the circle of `radius` around `center`
pub fn random_point_in_circle(center: Vec2, radius: f32, rng: &mut impl Rng) -> Vec2 {
    if radius <= 0.0 {
        return center;
    }
    // sqrt keeps the density uniform over the disc area instead of bunching at the center
    let r = radius * rng.gen::<f32>().sqrt();
    let theta = rng.gen_range(0.0..std::f32::consts::TAU);
    center + Vec2::new(r * theta.cos(), r * theta.sin())
}
