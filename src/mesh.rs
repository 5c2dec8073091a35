use crate::cut::{pinch_point, ColumnBounds, CutSet};
use crate::math::{inverse_lerp, lerp, Point2, Point3, Vector3, TOLERANCE};
use crate::params::StalkParams;
use crate::rings::{emitting_ring_count, next_ring, previous_ring, ring_count, ring_params};

/// Render mesh for one stalk: positions, normals, UVs, and triangles.
///
/// Buffers are sized once from the segment and panel counts and rewritten
/// in place on every regeneration; they are never shared between solids.
#[derive(Debug, Clone)]
pub struct StalkMesh {
    positions: Vec<Point3>,
    normals: Vec<Vector3>,
    uvs: Vec<Point2>,
    indices: Vec<[u32; 3]>,
}

impl StalkMesh {
    pub(crate) fn new(params: &StalkParams) -> Self {
        let vertex_count = ring_count(params) * params.ring_width();
        let triangle_count = emitting_ring_count(params) * params.panels * 2;
        Self {
            positions: vec![Point3::origin(); vertex_count],
            normals: vec![Vector3::zeros(); vertex_count],
            uvs: vec![Point2::origin(); vertex_count],
            indices: vec![[0; 3]; triangle_count],
        }
    }

    /// Vertex positions.
    #[must_use]
    pub fn positions(&self) -> &[Point3] {
        &self.positions
    }

    /// Vertex normals (blended, not renormalized).
    #[must_use]
    pub fn normals(&self) -> &[Vector3] {
        &self.normals
    }

    /// Texture coordinates.
    #[must_use]
    pub fn uvs(&self) -> &[Point2] {
        &self.uvs
    }

    /// Triangle index triples.
    #[must_use]
    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    /// Rebuilds every vertex against the accumulated cut planes.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub(crate) fn regenerate(&mut self, params: &StalkParams, cuts: &CutSet) {
        let wedge = params.panel_angle();
        let full_height = params.full_height();
        let width = params.ring_width();
        let mut t_index = 0;

        for i in 0..ring_count(params) {
            let ring = ring_params(params, i);

            for j in 0..=params.panels {
                let angle = wedge * j as f64;
                let out_dir = Vector3::new(angle.cos(), 0.0, angle.sin());
                let index = i * width + j;

                let mut radius = ring.radius;
                let mut position =
                    Point3::origin() + out_dir * radius + Vector3::y() * ring.offset;
                let outer_position = Point3::origin()
                    + out_dir * params.outer_radius
                    + Vector3::y() * ring.offset;

                let bounds = cuts.column_bounds(position.x, position.z, full_height);
                let mut min_y = bounds.min_y;
                let mut max_y = bounds.max_y;

                // The winning planes re-evaluated at the outer wall, for
                // rings whose nominal radius differs from it.
                let outside_min_y = bounds.down.map_or(0.0, |cut| {
                    cut.height_at(outer_position.x, outer_position.z)
                });
                let outside_max_y = bounds.up.map_or(full_height, |cut| {
                    cut.height_at(outer_position.x, outer_position.z)
                });

                let up_normal = bounds.up_normal();
                let down_normal = bounds.down_normal();

                // If the valid interval at the outer wall itself has
                // collapsed, this column's wall thickness is gone: snap the
                // ring to the outer radius so it cannot poke through.
                if (radius - params.outer_radius).abs() > TOLERANCE
                    && outside_max_y <= outside_min_y
                {
                    position = outer_position;
                    min_y = outside_min_y;
                    max_y = outside_max_y;
                    radius = params.outer_radius;
                }

                if max_y <= min_y {
                    position = resolve_collapsed(
                        params,
                        &out_dir,
                        radius,
                        &ColumnBounds {
                            min_y,
                            max_y,
                            ..bounds
                        },
                        &up_normal,
                        &down_normal,
                        full_height,
                    );
                } else if position.y <= min_y {
                    if radius > params.outer_radius {
                        position = outer_position;
                        min_y = outside_min_y;
                    }
                    position.y = min_y;
                } else if position.y >= max_y {
                    if radius > params.outer_radius {
                        position = outer_position;
                        max_y = outside_max_y;
                    }
                    position.y = max_y;
                }

                // A vertex pushed off its ring's base height takes its V
                // from the neighboring ring in the intended geometry, so
                // the texture stays continuous across the cut.
                let mut final_v = ring.v;
                if position.y > ring.offset {
                    if let Some(ni) = next_ring(params, i) {
                        let next = ring_params(params, ni);
                        final_v = lerp(
                            ring.v,
                            next.v,
                            inverse_lerp(ring.offset, next.offset, position.y),
                        );
                    }
                } else if position.y < ring.offset {
                    if let Some(pi) = previous_ring(params, i) {
                        let prev = ring_params(params, pi);
                        final_v = lerp(
                            prev.v,
                            ring.v,
                            inverse_lerp(prev.offset, ring.offset, position.y),
                        );
                    }
                }

                self.positions[index] = position;
                self.normals[index] = out_dir * ring.normal_out
                    + up_normal * ring.normal_up
                    + down_normal * ring.normal_down;
                self.uvs[index] = Point2::new(
                    lerp(ring.u_min, ring.u_max, j as f64 / params.panels as f64),
                    final_v,
                );

                // The duplicated seam panel never starts a triangle.
                if ring.emits_triangles && j != params.panels {
                    let here = index as u32;
                    let right = (i * width + j + 1) as u32;
                    let above = ((i + 1) * width + j) as u32;
                    let above_right = ((i + 1) * width + j + 1) as u32;

                    self.indices[t_index] = [here, above, right];
                    self.indices[t_index + 1] = [right, above, above_right];
                    t_index += 2;
                }
            }
        }

        debug_assert_eq!(t_index, self.indices.len());
    }
}

/// Resolves a collapsed column to the pinch point between the two winning
/// planes, then refines against the wall cylinder when the pinch lands
/// inside the ring's radius.
#[allow(clippy::too_many_arguments)]
fn resolve_collapsed(
    params: &StalkParams,
    out_dir: &Vector3,
    radius: f64,
    bounds: &ColumnBounds,
    up_normal: &Vector3,
    down_normal: &Vector3,
    full_height: f64,
) -> Point3 {
    let (x, mut position) = pinch_point(out_dir, radius, bounds, full_height);

    if x * radius < params.inner_radius {
        // Walk along the cut planes' intersection line to where it
        // meets the wall cylinder, taking the root nearer the axis.
        let Some(line_dir) = up_normal.cross(down_normal).try_normalize(TOLERANCE) else {
            return position;
        };

        let a = line_dir.x * line_dir.x + line_dir.z * line_dir.z;
        let b = 2.0 * (line_dir.x * position.x + line_dir.z * position.z);
        let c = position.x * position.x + position.z * position.z - radius * radius;

        let discriminant = b * b - 4.0 * a * c;
        if a.abs() < TOLERANCE || discriminant < 0.0 {
            return position;
        }

        let sqrt_d = discriminant.sqrt();
        let root1 = (-b + sqrt_d) / (2.0 * a);
        let root2 = (-b - sqrt_d) / (2.0 * a);

        if root1.abs() < root2.abs() {
            position += root1 * line_dir;
        } else if root2.abs() < root1.abs() {
            position += root2 * line_dir;
        } else {
            // Equal magnitudes: keep the root on the outward side of
            // the column's direction, projected to the ground plane.
            let candidate = position + root1 * line_dir;
            if out_dir.x * candidate.x + out_dir.z * candidate.z > 0.0 {
                position += root1 * line_dir;
            } else {
                position += root2 * line_dir;
            }
        }
    }

    position
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cut::CutPlane;
    use approx::assert_relative_eq;

    fn params() -> StalkParams {
        StalkParams::default()
    }

    fn uncut_mesh() -> StalkMesh {
        let p = params();
        let mut mesh = StalkMesh::new(&p);
        mesh.regenerate(&p, &CutSet::new());
        mesh
    }

    #[test]
    fn vertex_count_is_deterministic() {
        let mesh = uncut_mesh();
        assert_eq!(mesh.positions().len(), (5 * 6 + 4) * 13);
        assert_eq!(mesh.normals().len(), mesh.positions().len());
        assert_eq!(mesh.uvs().len(), mesh.positions().len());
    }

    #[test]
    fn triangle_count_is_deterministic() {
        let mesh = uncut_mesh();
        assert_eq!(mesh.indices().len(), (5 * 4 + 2) * 12 * 2);
    }

    #[test]
    fn all_indices_are_in_range() {
        let mesh = uncut_mesh();
        let count = mesh.positions().len() as u32;
        for tri in mesh.indices() {
            assert!(tri.iter().all(|&i| i < count));
        }
    }

    #[test]
    fn uncut_rings_sit_at_their_nominal_radius() {
        let p = params();
        let mesh = uncut_mesh();
        for i in 0..ring_count(&p) {
            let ring = ring_params(&p, i);
            for j in 0..=p.panels {
                let v = mesh.positions()[i * p.ring_width() + j];
                let r = (v.x * v.x + v.z * v.z).sqrt();
                assert_relative_eq!(r, ring.radius, epsilon = 1e-9);
                assert_relative_eq!(v.y, ring.offset, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn flat_up_cut_caps_every_vertex() {
        let p = params();
        let mut cuts = CutSet::new();
        cuts.push_up(CutPlane::new(Vector3::y(), 3.0).unwrap());

        let mut mesh = StalkMesh::new(&p);
        mesh.regenerate(&p, &cuts);
        for v in mesh.positions() {
            assert!(v.y <= 3.0 + 1e-9, "vertex above the cut: {v:?}");
        }
    }

    #[test]
    fn clamped_vertex_interpolates_v_from_neighbor_ring() {
        let p = params();
        let mut cuts = CutSet::new();
        cuts.push_up(CutPlane::new(Vector3::y(), 2.5).unwrap());

        let mut mesh = StalkMesh::new(&p);
        mesh.regenerate(&p, &cuts);

        // Segment 2's OuterTop ring (base 3.0, v = 1.0) clamps down to
        // y = 2.5; its V blends toward the BumpTop ring below it
        // (base 2.2, v = 0.3).
        let i = 2 * 6 + 3;
        let uv = mesh.uvs()[i * p.ring_width()];
        let expected = lerp(0.3, 1.0, inverse_lerp(2.2, 3.0, 2.5));
        assert_relative_eq!(uv.y, expected, epsilon = 1e-9);
        assert_relative_eq!(mesh.positions()[i * p.ring_width()].y, 2.5);
    }

    #[test]
    fn crossing_tilted_cuts_stay_finite() {
        let p = params();
        let mut cuts = CutSet::new();
        cuts.push_up(CutPlane::new(Vector3::new(0.4, 1.0, 0.1), 2.0).unwrap());
        cuts.push_down(CutPlane::new(Vector3::new(0.3, -1.0, -0.2), 2.3).unwrap());

        let mut mesh = StalkMesh::new(&p);
        mesh.regenerate(&p, &cuts);
        for v in mesh.positions() {
            assert!(
                v.x.is_finite() && v.y.is_finite() && v.z.is_finite(),
                "non-finite vertex: {v:?}"
            );
        }
    }

    #[test]
    fn parallel_crossing_cuts_stay_finite() {
        // Both planes horizontal, lower bound above upper bound: the
        // intersection line is undefined and the pinch must stand alone.
        let p = params();
        let mut cuts = CutSet::new();
        cuts.push_up(CutPlane::new(Vector3::y(), 2.0).unwrap());
        cuts.push_down(CutPlane::new(-Vector3::y(), 2.4).unwrap());

        let mut mesh = StalkMesh::new(&p);
        mesh.regenerate(&p, &cuts);
        for v in mesh.positions() {
            assert!(
                v.x.is_finite() && v.y.is_finite() && v.z.is_finite(),
                "non-finite vertex: {v:?}"
            );
        }
    }

    #[test]
    fn equal_magnitude_roots_resolve_to_the_outward_side() {
        // Equal-center crossing cuts pinch on the axis, and their
        // intersection line runs along z, so the two cylinder roots have
        // equal magnitude and the column's outward direction decides.
        let p = params();
        let mut cuts = CutSet::new();
        cuts.push_up(CutPlane::new(Vector3::new(1.0, 1.0, 0.0), 2.0).unwrap());
        cuts.push_down(CutPlane::new(Vector3::new(1.0, -1.0, 0.0), 2.0).unwrap());

        let bounds = cuts.column_bounds(1.0, 0.0, p.full_height());
        assert!(bounds.is_collapsed());
        let up_normal = bounds.up_normal();
        let down_normal = bounds.down_normal();

        let behind = resolve_collapsed(
            &p,
            &Vector3::new(0.0, 0.0, -1.0),
            p.outer_radius,
            &bounds,
            &up_normal,
            &down_normal,
            p.full_height(),
        );
        assert_relative_eq!(behind.z, -p.outer_radius, epsilon = 1e-9);
        assert_relative_eq!(behind.y, 2.0, epsilon = 1e-9);

        let ahead = resolve_collapsed(
            &p,
            &Vector3::new(0.0, 0.0, 1.0),
            p.outer_radius,
            &bounds,
            &up_normal,
            &down_normal,
            p.full_height(),
        );
        assert_relative_eq!(ahead.z, p.outer_radius, epsilon = 1e-9);
    }

    #[test]
    fn normals_of_outer_wall_point_outward() {
        let p = params();
        let mesh = uncut_mesh();
        // BumpBottom of segment 0, panel 0 faces +x.
        let n = mesh.normals()[0];
        assert_relative_eq!(n.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(n.y, 0.0, epsilon = 1e-9);
        // Top cap faces straight up while uncut.
        let top_outside = (p.segments * 6) * p.ring_width();
        assert_relative_eq!(mesh.normals()[top_outside].y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn seam_panel_shares_position_but_not_u() {
        let p = params();
        let mesh = uncut_mesh();
        let first = mesh.positions()[0];
        let seam = mesh.positions()[p.panels];
        assert_relative_eq!((first - seam).norm(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(mesh.uvs()[0].x, p.uv.u_min_outer);
        assert_relative_eq!(mesh.uvs()[p.panels].x, p.uv.u_max_outer);
    }
}
