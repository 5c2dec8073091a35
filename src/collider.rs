use crate::cut::{pinch_point, CutSet};
use crate::math::{Point3, Vector3};
use crate::params::StalkParams;

/// Coarse collision hull for one stalk, plus its derived mass.
///
/// A single-wall envelope at the outer radius: one top and one bottom
/// vertex per panel and a shared center vertex per cap. The bump and the
/// inner wall are ignored. Buffers are sized once and rewritten in place.
#[derive(Debug, Clone)]
pub struct StalkCollider {
    positions: Vec<Point3>,
    indices: Vec<[u32; 3]>,
    mass: f64,
}

impl StalkCollider {
    pub(crate) fn new(params: &StalkParams) -> Self {
        Self {
            positions: vec![Point3::origin(); params.panels * 2 + 2],
            indices: vec![[0; 3]; params.panels * 4],
            mass: 0.0,
        }
    }

    /// Hull vertices: panel tops, panel bottoms, top center, bottom center.
    #[must_use]
    pub fn positions(&self) -> &[Point3] {
        &self.positions
    }

    /// Hull triangle index triples.
    #[must_use]
    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    /// Mass as the fraction of full height remaining after all cuts.
    ///
    /// A crude approximation, not a volume integral. Non-positive values
    /// mean the piece has fully degenerated and should be discarded.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Rebuilds the hull against the accumulated cut planes.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub(crate) fn regenerate(&mut self, params: &StalkParams, cuts: &CutSet) {
        let wedge = params.panel_angle();
        let full_height = params.full_height();

        let final_bottom = cuts.bottom_center();
        let final_top = cuts.top_center(full_height);

        let top_center = params.panels * 2;
        let bottom_center = params.panels * 2 + 1;
        self.positions[top_center] = Point3::new(0.0, final_top, 0.0);
        self.positions[bottom_center] = Point3::new(0.0, final_bottom, 0.0);

        let mut t_index = 0;
        for j in 0..params.panels {
            let angle = wedge * j as f64;
            let out_dir = Vector3::new(angle.cos(), 0.0, angle.sin());
            let rim = out_dir * params.outer_radius;

            let bounds = cuts.column_bounds(rim.x, rim.z, full_height);

            let mut top = Point3::origin() + rim + Vector3::y() * bounds.max_y;
            let mut bottom = Point3::origin() + rim + Vector3::y() * bounds.min_y;

            if bounds.min_y > bounds.max_y {
                // Collapsed column: both vertices land on the pinch point
                // (no inner-cylinder refinement, the hull has no inner wall).
                let (_, point) =
                    pinch_point(&out_dir, params.outer_radius, &bounds, full_height);
                top = point;
                bottom = point;
            }

            self.positions[j] = top;
            self.positions[j + params.panels] = bottom;

            let here = j as u32;
            let next = ((j + 1) % params.panels) as u32;
            let panels = params.panels as u32;

            self.indices[t_index] = [here, next + panels, here + panels];
            self.indices[t_index + 1] = [here, next, next + panels];
            self.indices[t_index + 2] = [here, top_center as u32, next];
            self.indices[t_index + 3] = [next + panels, bottom_center as u32, here + panels];
            t_index += 4;
        }

        self.mass = (final_top - final_bottom) / (params.segment_height * params.segments as f64);
    }
}
