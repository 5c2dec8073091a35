use crate::error::{ParamError, Result};

/// Geometry and texture-layout parameters for one bamboo stalk.
///
/// Immutable after the owning solid is created; children inherit a copy.
/// The stalk is a double-walled tube of `segments` stacked segments, each
/// with a bulged node ("bump") at its base, hollow between `inner_radius`
/// and `outer_radius`.
#[derive(Debug, Clone, Copy)]
pub struct StalkParams {
    /// Number of stacked segments.
    pub segments: usize,
    /// Angular subdivisions per ring.
    pub panels: usize,
    /// Height of one segment.
    pub segment_height: f64,
    /// Height of the node bump at the base of each segment.
    pub bump_height: f64,
    /// Radius at the widest point of the bump.
    pub bump_radius: f64,
    /// Radius of the outer wall.
    pub outer_radius: f64,
    /// Radius of the inner (cavity) wall.
    pub inner_radius: f64,
    /// Texture layout for the walls.
    pub uv: UvLayout,
}

/// Texture-space ranges for the outer wall, bump band, and inner wall.
#[derive(Debug, Clone, Copy)]
pub struct UvLayout {
    pub u_min_outer: f64,
    pub u_max_outer: f64,
    pub v_min_bump: f64,
    pub v_mid_bump: f64,
    pub v_max_bump: f64,
    pub v_max_outer: f64,
    pub u_min_inner: f64,
    pub u_max_inner: f64,
    pub v_min_inner: f64,
    pub v_max_inner: f64,
}

impl Default for UvLayout {
    fn default() -> Self {
        Self {
            u_min_outer: 0.0,
            u_max_outer: 0.2,
            v_min_bump: 0.1,
            v_mid_bump: 0.2,
            v_max_bump: 0.3,
            v_max_outer: 1.0,
            u_min_inner: 0.0,
            u_max_inner: 0.2,
            v_min_inner: 0.0,
            v_max_inner: 0.1,
        }
    }
}

impl Default for StalkParams {
    fn default() -> Self {
        Self {
            segments: 5,
            panels: 12,
            segment_height: 1.0,
            bump_height: 0.2,
            bump_radius: 1.1,
            outer_radius: 1.0,
            inner_radius: 0.8,
            uv: UvLayout::default(),
        }
    }
}

impl StalkParams {
    /// Checks that the parameters describe a buildable stalk.
    ///
    /// # Errors
    ///
    /// Returns an error if a count is too small, a length or radius is
    /// non-positive, or the inner wall is not inside the outer wall.
    pub fn validate(&self) -> Result<()> {
        if self.segments < 1 {
            return Err(ParamError::TooFew {
                parameter: "segments",
                value: self.segments,
                min: 1,
            }
            .into());
        }
        if self.panels < 3 {
            return Err(ParamError::TooFew {
                parameter: "panels",
                value: self.panels,
                min: 3,
            }
            .into());
        }
        for (parameter, value) in [
            ("segment_height", self.segment_height),
            ("bump_height", self.bump_height),
            ("bump_radius", self.bump_radius),
            ("outer_radius", self.outer_radius),
            ("inner_radius", self.inner_radius),
        ] {
            if value <= 0.0 {
                return Err(ParamError::NotPositive { parameter, value }.into());
            }
        }
        if self.inner_radius >= self.outer_radius {
            return Err(ParamError::InnerNotInsideOuter {
                inner: self.inner_radius,
                outer: self.outer_radius,
            }
            .into());
        }
        Ok(())
    }

    /// Height of the uncut stalk.
    #[must_use]
    pub fn full_height(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let n = self.segments as f64;
        n * self.segment_height
    }

    /// Angle covered by one panel.
    #[must_use]
    pub fn panel_angle(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let panels = self.panels as f64;
        std::f64::consts::TAU / panels
    }

    /// Number of vertices per ring (the seam vertex is duplicated).
    #[must_use]
    pub fn ring_width(&self) -> usize {
        self.panels + 1
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        StalkParams::default().validate().unwrap();
    }

    #[test]
    fn rejects_zero_segments() {
        let params = StalkParams {
            segments: 0,
            ..StalkParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn rejects_too_few_panels() {
        let params = StalkParams {
            panels: 2,
            ..StalkParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn rejects_negative_segment_height() {
        let params = StalkParams {
            segment_height: -1.0,
            ..StalkParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn rejects_inner_radius_outside_outer() {
        let params = StalkParams {
            inner_radius: 1.5,
            ..StalkParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn full_height_is_segments_times_height() {
        let params = StalkParams::default();
        assert!((params.full_height() - 5.0).abs() < crate::math::TOLERANCE);
    }
}
