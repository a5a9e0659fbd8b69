//! Small scalar helpers shared by the simulation systems.

use glam::Vec3;

/// Linear interpolation. `t` is not clamped, so values outside [0, 1] extrapolate.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Component-wise unclamped linear interpolation of colors.
#[inline]
pub fn lerp_rgb(a: [f32; 3], b: [f32; 3], t: f32) -> Vec3 {
    Vec3::from_array(a).lerp(Vec3::from_array(b), t)
}

/// Teleport a coordinate to the opposite edge once it leaves `[-half, half]`.
///
/// The world is a torus: exiting at +half re-enters exactly at -half.
#[inline]
pub fn wrap_edge(value: f32, half: f32) -> f32 {
    if value > half {
        -half
    } else if value < -half {
        half
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_at_equilibrium_is_identity() {
        for &k in &[0.0, 0.05, 0.1, 0.5, 1.0, 3.0] {
            assert_eq!(lerp(2.5, 2.5, k), 2.5);
            assert_eq!(lerp(-7.0, -7.0, k), -7.0);
        }
    }

    #[test]
    fn test_lerp_extrapolates() {
        assert_eq!(lerp(0.0, 10.0, 1.5), 15.0);
        assert_eq!(lerp(0.0, 10.0, -0.5), -5.0);
    }

    #[test]
    fn test_wrap_edge() {
        assert_eq!(wrap_edge(512.1, 512.0), -512.0);
        assert_eq!(wrap_edge(-512.1, 512.0), 512.0);
        assert_eq!(wrap_edge(512.0, 512.0), 512.0);
        assert_eq!(wrap_edge(3.0, 512.0), 3.0);
    }
}
