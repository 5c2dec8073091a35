use crate::error::{CutError, Result};
use crate::math::{lerp, Point3, Vector3};

/// A half-space constraint on stalk height.
///
/// Stored as `(nx, ny, nz, w)`. Evaluated at a horizontal position
/// `(x, z)` it bounds the height by `w − (x·nx + z·nz)/ny`; whether that is
/// an upper or a lower bound depends on which list of a [`CutSet`] the
/// plane lives in.
#[derive(Debug, Clone, Copy)]
pub struct CutPlane {
    normal: Vector3,
    offset: f64,
}

impl CutPlane {
    /// Creates a cut plane from its normal and center height `w`.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal has a zero vertical component, since
    /// such a plane cannot bound height.
    pub fn new(normal: Vector3, offset: f64) -> Result<Self> {
        if normal.y == 0.0 {
            return Err(CutError::HorizontalNormal.into());
        }
        Ok(Self { normal, offset })
    }

    /// Returns the plane normal.
    #[must_use]
    pub fn normal(&self) -> Vector3 {
        self.normal
    }

    /// Height bound this plane imposes at horizontal position `(x, z)`.
    #[must_use]
    pub fn height_at(&self, x: f64, z: f64) -> f64 {
        self.offset - (x * self.normal.x + z * self.normal.z) / self.normal.y
    }

    /// Height bound on the vertical axis (`x = z = 0`).
    #[must_use]
    pub fn center_height(&self) -> f64 {
        self.offset
    }

    /// The complementary half-space: negated normal, same offset.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: self.offset,
        }
    }
}

/// Ordered upper- and lower-bound cut planes attached to one solid.
///
/// Lists only ever grow; all constraints combine by "most restrictive
/// wins" at evaluation time.
#[derive(Debug, Clone, Default)]
pub struct CutSet {
    up: Vec<CutPlane>,
    down: Vec<CutPlane>,
}

impl CutSet {
    /// Creates an empty cut set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upper-bound planes, in insertion order.
    #[must_use]
    pub fn up(&self) -> &[CutPlane] {
        &self.up
    }

    /// Lower-bound planes, in insertion order.
    #[must_use]
    pub fn down(&self) -> &[CutPlane] {
        &self.down
    }

    /// Appends an upper-bound plane.
    pub fn push_up(&mut self, cut: CutPlane) {
        self.up.push(cut);
    }

    /// Appends a lower-bound plane.
    pub fn push_down(&mut self, cut: CutPlane) {
        self.down.push(cut);
    }

    /// Discards all accumulated cuts.
    pub fn clear(&mut self) {
        self.up.clear();
        self.down.clear();
    }

    /// Effective lower bound on the vertical axis (0 when uncut).
    #[must_use]
    pub fn bottom_center(&self) -> f64 {
        self.down
            .iter()
            .fold(0.0, |acc, cut| acc.max(cut.center_height()))
    }

    /// Effective upper bound on the vertical axis (`full_height` when uncut).
    #[must_use]
    pub fn top_center(&self, full_height: f64) -> f64 {
        self.up
            .iter()
            .fold(full_height, |acc, cut| acc.min(cut.center_height()))
    }

    /// Resolves the most restrictive bounds for the column at `(x, z)`.
    ///
    /// The winning plane on each side is retained so callers can
    /// re-evaluate it at another radius and read its normal. The returned
    /// interval may be empty (`max_y <= min_y`); that is a valid collapsed
    /// column, not an error.
    #[must_use]
    pub fn column_bounds(&self, x: f64, z: f64, full_height: f64) -> ColumnBounds {
        let mut bounds = ColumnBounds {
            min_y: 0.0,
            max_y: full_height,
            down: None,
            up: None,
        };

        for cut in &self.down {
            let min_y = cut.height_at(x, z);
            if min_y > bounds.min_y {
                bounds.min_y = min_y;
                bounds.down = Some(*cut);
            }
        }

        for cut in &self.up {
            let max_y = cut.height_at(x, z);
            if max_y < bounds.max_y {
                bounds.max_y = max_y;
                bounds.up = Some(*cut);
            }
        }

        bounds
    }
}

/// Most restrictive height interval for one vertical column, plus the
/// planes that produced it.
#[derive(Debug, Clone, Copy)]
pub struct ColumnBounds {
    /// Evaluated lower bound.
    pub min_y: f64,
    /// Evaluated upper bound.
    pub max_y: f64,
    /// Winning lower-bound plane, if any cut beat the floor.
    pub down: Option<CutPlane>,
    /// Winning upper-bound plane, if any cut beat the full height.
    pub up: Option<CutPlane>,
}

impl ColumnBounds {
    /// Center height of the winning lower-bound plane (0 when uncut).
    #[must_use]
    pub fn bottom_center(&self) -> f64 {
        self.down.map_or(0.0, |cut| cut.center_height())
    }

    /// Center height of the winning upper-bound plane.
    #[must_use]
    pub fn top_center(&self, full_height: f64) -> f64 {
        self.up.map_or(full_height, |cut| cut.center_height())
    }

    /// Normal of the winning lower-bound plane, straight down when uncut.
    #[must_use]
    pub fn down_normal(&self) -> Vector3 {
        self.down.map_or(-Vector3::y(), |cut| cut.normal())
    }

    /// Normal of the winning upper-bound plane, straight up when uncut.
    #[must_use]
    pub fn up_normal(&self) -> Vector3 {
        self.up.map_or_else(Vector3::y, |cut| cut.normal())
    }

    /// Whether the column's valid interval is empty.
    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.max_y <= self.min_y
    }
}

/// Resolves a collapsed column to the single point where its upper- and
/// lower-bound planes meet along the radial line through the column.
///
/// Interpolates between the planes' center heights and their values at the
/// column; when both center heights coincide, or the denominator vanishes
/// (parallel crossing planes), the interpolation parameter is forced to 0
/// instead of dividing by zero. Returns the parameter (radial
/// fraction of `radius`) and the resolved point.
pub(crate) fn pinch_point(
    out_dir: &Vector3,
    radius: f64,
    bounds: &ColumnBounds,
    full_height: f64,
) -> (f64, Point3) {
    let top_center = bounds.top_center(full_height);
    let bottom_center = bounds.bottom_center();

    let denominator = bounds.max_y + bottom_center - bounds.min_y - top_center;
    let x = if bottom_center == top_center || denominator == 0.0 {
        0.0
    } else {
        (bottom_center - top_center) / denominator
    };

    let height = lerp(top_center, bounds.max_y, x);
    let point = Point3::origin() + out_dir * (x * radius) + Vector3::y() * height;
    (x, point)
}
