use crate::params::StalkParams;

/// Rings per segment: the bump band, the outer wall top, and the two
/// inner-wall rings that fold back down into the cavity.
pub const RINGS_PER_SEGMENT: usize = 6;

/// Rings closing the tube above the last segment.
pub const CAP_RINGS: usize = 4;

/// One of the six cross-section rings repeated per segment, bottom to top
/// in buffer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentRing {
    BumpBottom,
    BumpMid,
    BumpTop,
    OuterTop,
    InnerTop,
    InnerBottom,
}

/// One of the four rings capping the top of the stalk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapRing {
    TopOutside,
    TopInside,
    BottomInside,
    BottomOutside,
}

/// Classification of a ring index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingKind {
    Segment { segment: usize, ring: SegmentRing },
    Cap(CapRing),
}

/// Resolved per-ring generation parameters.
///
/// `normal_out`, `normal_up`, and `normal_down` are blend weights for the
/// outward radial direction and the active up/down cut plane normals.
#[derive(Debug, Clone, Copy)]
pub struct RingParams {
    /// Base height of the ring in the uncut stalk.
    pub offset: f64,
    /// Nominal radius of the ring.
    pub radius: f64,
    /// Whether this ring emits triangles toward the next buffer ring.
    pub emits_triangles: bool,
    /// Texture U range across the ring's panels.
    pub u_min: f64,
    /// Texture U at the seam panel.
    pub u_max: f64,
    /// Texture V of the ring at its base height.
    pub v: f64,
    /// Blend weight of the active up-cut normal.
    pub normal_up: f64,
    /// Blend weight of the active down-cut normal.
    pub normal_down: f64,
    /// Blend weight of the outward radial direction.
    pub normal_out: f64,
}

/// Total ring count for a stalk.
#[must_use]
pub fn ring_count(params: &StalkParams) -> usize {
    params.segments * RINGS_PER_SEGMENT + CAP_RINGS
}

/// Number of rings that emit triangle strips toward the following ring.
#[must_use]
pub fn emitting_ring_count(params: &StalkParams) -> usize {
    (0..ring_count(params))
        .filter(|&i| ring_params(params, i).emits_triangles)
        .count()
}

/// Classifies a ring index as a segment ring or a cap ring.
#[must_use]
pub fn ring_kind(params: &StalkParams, i: usize) -> RingKind {
    let segment_rings = params.segments * RINGS_PER_SEGMENT;
    if i < segment_rings {
        let ring = match i % RINGS_PER_SEGMENT {
            0 => SegmentRing::BumpBottom,
            1 => SegmentRing::BumpMid,
            2 => SegmentRing::BumpTop,
            3 => SegmentRing::OuterTop,
            4 => SegmentRing::InnerTop,
            _ => SegmentRing::InnerBottom,
        };
        RingKind::Segment {
            segment: i / RINGS_PER_SEGMENT,
            ring,
        }
    } else {
        RingKind::Cap(match (i - segment_rings) % CAP_RINGS {
            0 => CapRing::TopOutside,
            1 => CapRing::TopInside,
            2 => CapRing::BottomInside,
            _ => CapRing::BottomOutside,
        })
    }
}

/// Maps a ring index to its generation parameters.
#[must_use]
pub fn ring_params(params: &StalkParams, i: usize) -> RingParams {
    let uv = &params.uv;
    let mut p = RingParams {
        offset: 0.0,
        radius: params.outer_radius,
        emits_triangles: true,
        u_min: uv.u_min_outer,
        u_max: uv.u_max_outer,
        v: 0.0,
        normal_up: 0.0,
        normal_down: 0.0,
        normal_out: 1.0,
    };

    match ring_kind(params, i) {
        RingKind::Segment { segment, ring } => {
            #[allow(clippy::cast_precision_loss)]
            let base = segment as f64 * params.segment_height;
            p.offset = base;

            match ring {
                SegmentRing::BumpBottom => {
                    p.v = uv.v_min_bump;
                }
                SegmentRing::BumpMid => {
                    p.v = uv.v_mid_bump;
                    p.offset += params.bump_height / 2.0;
                    p.radius = params.bump_radius;
                }
                SegmentRing::BumpTop => {
                    p.v = uv.v_max_bump;
                    p.offset += params.bump_height;
                }
                SegmentRing::OuterTop => {
                    p.v = uv.v_max_outer;
                    p.offset += params.segment_height;
                    p.emits_triangles = false;
                }
                SegmentRing::InnerTop => {
                    p.u_min = uv.u_min_inner;
                    p.u_max = uv.u_max_inner;
                    p.v = uv.v_max_inner;
                    p.offset += params.segment_height;
                    p.radius = params.inner_radius;
                    p.normal_out = -1.0;
                }
                SegmentRing::InnerBottom => {
                    p.u_min = uv.u_min_inner;
                    p.u_max = uv.u_max_inner;
                    p.v = uv.v_min_inner;
                    p.radius = params.inner_radius;
                    p.emits_triangles = false;
                    p.normal_out = -1.0;
                }
            }
        }
        RingKind::Cap(ring) => {
            p.u_min = uv.u_min_inner;
            p.u_max = uv.u_max_inner;
            p.v = uv.v_min_inner;
            p.normal_out = 0.0;

            match ring {
                CapRing::TopOutside => {
                    p.v = uv.v_max_inner;
                    p.offset = params.full_height();
                    p.normal_up = 1.0;
                }
                CapRing::TopInside => {
                    p.offset = params.full_height();
                    p.radius = params.inner_radius;
                    p.normal_up = 1.0;
                    p.emits_triangles = false;
                }
                CapRing::BottomInside => {
                    p.normal_down = 1.0;
                    p.radius = params.inner_radius;
                }
                CapRing::BottomOutside => {
                    p.normal_down = 1.0;
                    p.v = uv.v_max_inner;
                    p.emits_triangles = false;
                }
            }
        }
    }

    p
}

/// Ring vertically above ring `i` in the intended (uncut) geometry,
/// honoring the fold between the outer and inner walls.
///
/// Returns `None` where the intended surface ends. Cap rings have no
/// vertical neighbors.
#[must_use]
pub fn next_ring(params: &StalkParams, i: usize) -> Option<usize> {
    match ring_kind(params, i) {
        RingKind::Segment { segment, ring } => match ring {
            SegmentRing::BumpBottom | SegmentRing::BumpMid | SegmentRing::BumpTop => Some(i + 1),
            // The outer wall continues at the next segment's bump bottom.
            SegmentRing::OuterTop if segment < params.segments - 1 => Some(i + 3),
            SegmentRing::OuterTop => None,
            // The inner wall descends toward the previous segment's floor.
            SegmentRing::InnerTop if segment > 1 => Some(i - 5),
            SegmentRing::InnerTop => None,
            SegmentRing::InnerBottom => Some(i - 1),
        },
        RingKind::Cap(_) => None,
    }
}

/// Ring vertically below ring `i` in the intended (uncut) geometry.
///
/// Inverse of [`next_ring`], with the same fold hops and boundaries.
#[must_use]
pub fn previous_ring(params: &StalkParams, i: usize) -> Option<usize> {
    match ring_kind(params, i) {
        RingKind::Segment { segment, ring } => match ring {
            SegmentRing::BumpBottom if segment > 1 => Some(i - 3),
            SegmentRing::BumpBottom => None,
            SegmentRing::BumpMid | SegmentRing::BumpTop | SegmentRing::OuterTop => Some(i - 1),
            SegmentRing::InnerTop => Some(i + 1),
            SegmentRing::InnerBottom if segment < params.segments - 1 => Some(i + 5),
            SegmentRing::InnerBottom => None,
        },
        RingKind::Cap(_) => None,
    }
}
