//! Wall-bounce geometry kernel.
//!
//! Pure functions over an axis-aligned confining volume: boundary-crossing
//! detection, parametric collision-point solves and rebound directions.
//! All checks work on bounds inset by the body radius so a body counts as
//! touching a wall when its surface does, not its center.

use crate::math::{DeterministicRng, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned confining box. Immutable for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub center: Vec3,
    pub size: Vec3,
}

impl Volume {
    pub fn new(center: Vec3, size: Vec3) -> Self {
        Self { center, size }
    }

    /// Lower bound on `axis`, pulled inward by `inset`.
    pub fn min_bound(&self, axis: usize, inset: f32) -> f32 {
        self.center[axis] - self.size[axis] / 2.0 + inset
    }

    /// Upper bound on `axis`, pulled inward by `inset`.
    pub fn max_bound(&self, axis: usize, inset: f32) -> f32 {
        self.center[axis] + self.size[axis] / 2.0 - inset
    }

    /// Whether `point` lies inside the volume once every face is pulled
    /// inward by `inset`.
    pub fn contains_inset(&self, point: Vec3, inset: f32) -> bool {
        (0..3).all(|axis| {
            point[axis] >= self.min_bound(axis, inset)
                && point[axis] <= self.max_bound(axis, inset)
        })
    }

    /// True when `point` sits on or beyond the inset boundary on `axis`.
    fn against_wall(&self, point: Vec3, axis: usize, inset: f32) -> bool {
        (point[axis] - self.center[axis]).abs() >= self.size[axis] / 2.0 - inset
    }

    /// Sign of the wall a point is against on `axis`, relative to center.
    fn wall_sign(&self, point: Vec3, axis: usize) -> f32 {
        (point[axis] - self.center[axis]).signum()
    }
}

/// Scalar crossing test on one axis: true when the coordinate entered or
/// exited the range `[min, max]` between `previous` and `current`. Both
/// directions are detected so a body already pushed outside still reports
/// the crossing on its way back in.
pub fn crossed_boundary(min: f32, max: f32, previous: f32, current: f32) -> bool {
    (previous > min && current <= min)
        || (previous < max && current >= max)
        || (previous < min && current >= min)
        || (previous > max && current <= max)
}

/// Whether the move from `previous` to `next` crosses any wall of
/// `volume`, with bounds inset by `radius`.
pub fn check_wall_collision(volume: &Volume, previous: Vec3, next: Vec3, radius: f32) -> bool {
    (0..3).any(|axis| {
        crossed_boundary(
            volume.min_bound(axis, radius),
            volume.max_bound(axis, radius),
            previous[axis],
            next[axis],
        )
    })
}

/// Solve `position + t * direction` for the first axis (x > y > z
/// priority) whose inset boundary the position sits against, and return
/// the point on that boundary.
///
/// Edge and corner hits resolve only the first triggering axis; the
/// remaining axes keep their overshoot until a later tick. An axis with a
/// zero direction component cannot be solved and falls through to the
/// next priority axis; `None` means every triggering axis was degenerate
/// and the caller should keep the uncorrected position.
pub fn collision_point(
    volume: &Volume,
    position: Vec3,
    direction: Vec3,
    radius: f32,
) -> Option<Vec3> {
    for axis in 0..3 {
        if !volume.against_wall(position, axis, radius) {
            continue;
        }
        if direction[axis] == 0.0 {
            tracing::debug!(axis, "degenerate direction on crossed axis, skipping");
            continue;
        }

        let boundary = volume.center[axis]
            + volume.wall_sign(position, axis) * (volume.size[axis] / 2.0 - radius);
        let t = (boundary - position[axis]) / direction[axis];
        return Some(position + t * direction);
    }

    None
}

/// Mirror `direction` about the wall normal at `position`.
///
/// The normal sums a signed unit vector per triggering axis, so an edge
/// or corner hit reflects about the combined (non-unit) normal. The
/// result is re-normalized and scaled back to the input magnitude.
pub fn reflect(volume: &Volume, direction: Vec3, position: Vec3, radius: f32) -> Vec3 {
    let mut normal = Vec3::ZERO;

    for axis in 0..3 {
        if volume.against_wall(position, axis, radius) {
            let mut unit = Vec3::ZERO;
            unit[axis] = 1.0;
            normal += volume.wall_sign(position, axis) * unit;
        }
    }

    if normal == Vec3::ZERO {
        return direction;
    }

    let reflected = direction - 2.0 * direction.dot(normal) * normal;
    reflected.normalize_or(direction.normalize_or_zero()) * direction.length()
}

/// Rebound variant that ignores the wall normal: aim from the collision
/// point toward a random interior point. Keeps bodies inside the volume
/// when bounce realism is secondary.
///
/// The target is sampled from the volume inset by `radius`: the collision
/// point sits exactly on the inset bound, so a target beyond it would aim
/// the body back out through the wall.
pub fn random_rebound(
    volume: &Volume,
    collision_point: Vec3,
    radius: f32,
    rng: &mut DeterministicRng,
) -> Vec3 {
    let target = rng.point_in_box(volume.center, volume.size, radius);
    let rebound = (target - collision_point).normalize_or_zero();
    if rebound == Vec3::ZERO {
        // Sampled the collision point itself
        rng.unit_vec3()
    } else {
        rebound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_volume() -> Volume {
        Volume::new(Vec3::ZERO, Vec3::splat(10.0))
    }

    #[test]
    fn no_crossing_when_stationary_inside() {
        let volume = unit_volume();
        let inside = Vec3::new(3.0, -2.0, 4.0);
        assert!(!check_wall_collision(&volume, inside, inside, 0.5));
    }

    #[test]
    fn crossing_reported_on_exactly_one_axis() {
        let volume = unit_volume();
        let radius = 0.5;
        let previous = Vec3::new(4.0, 0.0, 0.0);
        let next = Vec3::new(4.9, 0.0, 0.0); // past the inset bound of 4.5 on x

        assert!(crossed_boundary(
            volume.min_bound(0, radius),
            volume.max_bound(0, radius),
            previous.x,
            next.x
        ));
        for axis in 1..3 {
            assert!(!crossed_boundary(
                volume.min_bound(axis, radius),
                volume.max_bound(axis, radius),
                previous[axis],
                next[axis]
            ));
        }
        assert!(check_wall_collision(&volume, previous, next, radius));
    }

    #[test]
    fn crossing_detected_reentering_from_outside() {
        let volume = unit_volume();
        // Was beyond the inset bound, coming back inside
        assert!(crossed_boundary(-4.5, 4.5, 4.8, 4.2));
        assert!(crossed_boundary(-4.5, 4.5, -4.8, -4.2));
    }

    #[test]
    fn collision_point_lands_exactly_on_inset_boundary() {
        let volume = unit_volume();
        let radius = 0.5;
        let position = Vec3::new(5.9, 0.0, 0.0);
        let direction = Vec3::new(1.0, 0.0, 0.0);

        let point = collision_point(&volume, position, direction, radius).unwrap();
        assert_eq!(point.x, 4.5);
        assert_eq!(point.y, 0.0);
        assert_eq!(point.z, 0.0);
    }

    #[test]
    fn collision_point_respects_axis_priority() {
        let volume = unit_volume();
        let radius = 0.5;
        // Corner overshoot on x and y; x wins
        let position = Vec3::new(4.8, 4.9, 0.0);
        let direction = Vec3::new(1.0, 1.0, 0.0).normalize();

        let point = collision_point(&volume, position, direction, radius).unwrap();
        assert!((point.x - 4.5).abs() < 1e-6);
    }

    #[test]
    fn degenerate_axis_falls_through_to_next() {
        let volume = unit_volume();
        let radius = 0.5;
        // Against both x and y walls, but direction has no x component
        let position = Vec3::new(4.8, 4.9, 0.0);
        let direction = Vec3::new(0.0, 1.0, 0.0);

        let point = collision_point(&volume, position, direction, radius).unwrap();
        assert!((point.y - 4.5).abs() < 1e-6);
    }

    #[test]
    fn all_axes_degenerate_returns_none() {
        let volume = unit_volume();
        let radius = 0.5;
        let position = Vec3::new(4.8, 0.0, 0.0);
        let direction = Vec3::new(0.0, 0.0, 1.0);

        assert!(collision_point(&volume, position, direction, radius).is_none());
    }

    #[test]
    fn reflect_preserves_magnitude() {
        let volume = unit_volume();
        let direction = Vec3::new(0.8, 0.6, 0.0);
        let against_x = Vec3::new(4.6, 0.0, 0.0);

        let reflected = reflect(&volume, direction, against_x, 0.5);
        assert!((reflected.length() - direction.length()).abs() < 1e-5);
        assert!(reflected.x < 0.0);
        assert!((reflected.y - direction.y).abs() < 1e-5);
    }

    #[test]
    fn double_reflection_returns_original() {
        let volume = unit_volume();
        let direction = Vec3::new(0.6, -0.48, 0.64).normalize();
        let against_x = Vec3::new(4.7, 0.0, 0.0);

        let once = reflect(&volume, direction, against_x, 0.5);
        let twice = reflect(&volume, once, against_x, 0.5);
        assert!((twice - direction).length() < 1e-5);
    }

    #[test]
    fn corner_hit_reflects_about_combined_normal() {
        let volume = unit_volume();
        let direction = Vec3::new(1.0, 1.0, 0.0).normalize();
        let corner = Vec3::new(4.6, 4.6, 0.0);

        let reflected = reflect(&volume, direction, corner, 0.5);
        assert!(reflected.x < 0.0);
        assert!(reflected.y < 0.0);
        assert!((reflected.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn reflect_away_from_walls_is_identity() {
        let volume = unit_volume();
        let direction = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(reflect(&volume, direction, Vec3::ZERO, 0.5), direction);
    }

    #[test]
    fn random_rebound_points_into_volume() {
        let volume = unit_volume();
        let mut rng = DeterministicRng::new(11);
        let corner = Vec3::new(4.5, 4.5, 4.5);

        for _ in 0..50 {
            let rebound = random_rebound(&volume, corner, 0.5, &mut rng);
            assert!((rebound.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn random_rebound_heads_inward_from_every_wall() {
        let volume = unit_volume();
        let radius = 0.5;
        let mut rng = DeterministicRng::new(23);

        // One collision point per face, exactly on the inset bound
        for axis in 0..3 {
            for sign in [-1.0f32, 1.0] {
                let mut point = Vec3::ZERO;
                point[axis] = sign * 4.5;

                for _ in 0..100 {
                    let rebound = random_rebound(&volume, point, radius, &mut rng);
                    assert!(
                        rebound[axis] * sign <= 0.0,
                        "rebound {rebound:?} leaves through axis {axis}"
                    );
                }
            }
        }
    }
}
