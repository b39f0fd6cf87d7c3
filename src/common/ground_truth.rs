//! Synthetic ground-truth trajectories
//!
//! Noise-free trajectories for exercising the noise models and the filter.

use std::f64::consts::PI;

use crate::types::{GroupId, Observation};

/// One full revolution on a circle of `radius` centred at the origin.
///
/// Sampled at `n_points` evenly spaced angles with unit time steps.
pub fn circular_trajectory(radius: f64, n_points: usize, id: impl Into<GroupId>) -> Vec<Observation> {
    let id = id.into();
    (0..n_points)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / n_points as f64;
            Observation {
                time: i as f64,
                x: radius * angle.cos(),
                y: radius * angle.sin(),
                id: id.clone(),
            }
        })
        .collect()
}

/// Straight line from the origin moving with constant velocity.
///
/// Row `i` is at time `i·dt` and position `(vx, vy)·i·dt`.
pub fn linear_trajectory(
    n_points: usize,
    dt: f64,
    velocity: (f64, f64),
    id: impl Into<GroupId>,
) -> Vec<Observation> {
    let id = id.into();
    (0..n_points)
        .map(|i| {
            let t = i as f64 * dt;
            Observation {
                time: t,
                x: velocity.0 * t,
                y: velocity.1 * t,
                id: id.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_stays_on_radius() {
        let circle = circular_trajectory(10.0, 100, GroupId::Default);
        assert_eq!(circle.len(), 100);
        for obs in &circle {
            assert!((obs.x.hypot(obs.y) - 10.0).abs() < 1e-10);
        }
        assert_eq!(circle[99].time, 99.0);
    }

    #[test]
    fn test_linear_positions() {
        let line = linear_trajectory(5, 0.5, (2.0, -1.0), 3_i64);
        assert_eq!(line[4].time, 2.0);
        assert_eq!(line[4].x, 4.0);
        assert_eq!(line[4].y, -2.0);
        assert_eq!(line[0].id, GroupId::Int(3));
    }
}
