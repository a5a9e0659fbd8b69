//! Flat ocean grid mesh; displacement happens in the vertex shader.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::params::OceanParams;

/// Vertex data for ocean mesh (position + UV coordinates)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Flat XZ grid centered on the origin.
///
/// The grid is drawn with a translation that follows the camera in whole
/// grid cells (see [`OceanGrid::anchor_for`]), so each vertex always samples
/// the wave field at a fixed lattice point and the surface does not swim.
pub struct OceanGrid {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    grid_spacing: f32,
}

impl OceanGrid {
    /// Create a new ocean grid with specified parameters
    pub fn new(params: &OceanParams) -> Self {
        let grid_size = params.grid_size;
        let grid_spacing = params.grid_spacing_m;
        let half_size = params.grid_extent_m() / 2.0;

        let mut vertices = Vec::with_capacity((grid_size + 1) * (grid_size + 1));
        let mut indices = Vec::with_capacity(grid_size * grid_size * 6);

        // Generate flat XZ plane grid
        for z in 0..=grid_size {
            for x in 0..=grid_size {
                let x_pos = x as f32 * grid_spacing - half_size;
                let z_pos = z as f32 * grid_spacing - half_size;

                vertices.push(Vertex {
                    position: [x_pos, params.water_level_m, z_pos],
                    uv: [x as f32 / grid_size as f32, z as f32 / grid_size as f32],
                });
            }
        }

        // Generate triangle indices (counter-clockwise winding seen from above)
        for z in 0..grid_size {
            for x in 0..grid_size {
                let top_left = (z * (grid_size + 1) + x) as u32;
                let top_right = top_left + 1;
                let bottom_left = ((z + 1) * (grid_size + 1) + x) as u32;
                let bottom_right = bottom_left + 1;

                indices.extend_from_slice(&[
                    top_left,
                    bottom_left,
                    top_right,
                    top_right,
                    bottom_left,
                    bottom_right,
                ]);
            }
        }

        Self {
            vertices,
            indices,
            grid_spacing,
        }
    }

    /// Grid translation for a viewer at `camera_pos`, snapped to whole cells
    pub fn anchor_for(&self, camera_pos: Vec3) -> Vec3 {
        let snap = |v: f32| (v / self.grid_spacing).round() * self.grid_spacing;
        Vec3::new(snap(camera_pos.x), 0.0, snap(camera_pos.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ocean_grid_creation() {
        let params = OceanParams {
            grid_size: 16,
            ..OceanParams::default()
        };
        let grid = OceanGrid::new(&params);

        // Check vertex count: (grid_size + 1)^2
        assert_eq!(grid.vertices.len(), (params.grid_size + 1).pow(2));

        // Check triangle count: grid_size^2 * 2 triangles * 3 indices
        assert_eq!(grid.indices.len(), params.grid_size.pow(2) * 6);
    }

    #[test]
    fn test_grid_is_centered() {
        let params = OceanParams {
            grid_size: 4,
            grid_spacing_m: 2.0,
            ..OceanParams::default()
        };
        let grid = OceanGrid::new(&params);
        let first = grid.vertices[0].position;
        let last = grid.vertices[grid.vertices.len() - 1].position;
        assert_eq!(first, [-4.0, 0.0, -4.0]);
        assert_eq!(last, [4.0, 0.0, 4.0]);
    }

    #[test]
    fn test_anchor_snaps_to_cells() {
        let params = OceanParams {
            grid_size: 4,
            grid_spacing_m: 4.0,
            ..OceanParams::default()
        };
        let grid = OceanGrid::new(&params);
        let anchor = grid.anchor_for(Vec3::new(9.9, 55.0, -6.1));
        assert_eq!(anchor, Vec3::new(8.0, 0.0, -8.0));
    }
}
