use log::{debug, trace};

use crate::collider::StalkCollider;
use crate::cut::{CutPlane, CutSet};
use crate::error::Result;
use crate::math::{Isometry3, Point3, UnitQuaternion, Vector3};
use crate::mesh::StalkMesh;
use crate::params::StalkParams;

/// Minimum distance between a new cut's center height and the current
/// bounds. Cuts closer than this are rejected as slivers.
pub const MIN_PIECE_HEIGHT: f64 = 0.01;

/// Gating thresholds for implement contacts.
#[derive(Debug, Clone, Copy)]
pub struct ContactSettings {
    /// Minimum relative speed for a contact to cut.
    pub min_speed: f64,
    /// Minimum seconds between accepted contacts on one solid.
    pub cooldown: f64,
}

impl Default for ContactSettings {
    fn default() -> Self {
        Self {
            min_speed: 7.0,
            cooldown: 0.5,
        }
    }
}

/// A contact reported by the external collision system, in world space.
///
/// The implement's cutting plane faces its local `-z`; `orientation` is the
/// implement's rotation at the moment of contact.
#[derive(Debug, Clone, Copy)]
pub struct ContactEvent {
    pub point: Point3,
    pub relative_velocity: Vector3,
    pub orientation: UnitQuaternion,
}

/// One piece of bamboo: geometry parameters, accumulated cut planes, render
/// mesh, collision hull, and the pieces cut off of it.
///
/// Children are owned exclusively; dropping a stalk tears down its whole
/// subtree depth-first.
#[derive(Debug)]
pub struct Stalk {
    params: StalkParams,
    cuts: CutSet,
    mesh: StalkMesh,
    collider: StalkCollider,
    children: Vec<Stalk>,
    pose: Isometry3,
    settings: ContactSettings,
    last_cut_time: f64,
    anchored: bool,
}

impl Stalk {
    /// Creates an uncut, anchored stalk and generates its geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters fail validation.
    pub fn new(params: StalkParams) -> Result<Self> {
        params.validate()?;
        let mut stalk = Self {
            cuts: CutSet::new(),
            mesh: StalkMesh::new(&params),
            collider: StalkCollider::new(&params),
            children: Vec::new(),
            pose: Isometry3::identity(),
            settings: ContactSettings::default(),
            last_cut_time: f64::NEG_INFINITY,
            anchored: true,
            params,
        };
        stalk.regenerate();
        Ok(stalk)
    }

    /// Replaces the contact gating thresholds.
    #[must_use]
    pub fn with_settings(mut self, settings: ContactSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Geometry parameters (shared by every piece in the tree).
    #[must_use]
    pub fn params(&self) -> &StalkParams {
        &self.params
    }

    /// Accumulated cut planes.
    #[must_use]
    pub fn cuts(&self) -> &CutSet {
        &self.cuts
    }

    /// Render mesh buffers for the external mesh display.
    #[must_use]
    pub fn mesh(&self) -> &StalkMesh {
        &self.mesh
    }

    /// Collision hull for the external rigid body.
    #[must_use]
    pub fn collider(&self) -> &StalkCollider {
        &self.collider
    }

    /// Mass for the external rigid body; non-positive means "discard".
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.collider.mass()
    }

    /// Pieces cut off of this stalk.
    #[must_use]
    pub fn children(&self) -> &[Stalk] {
        &self.children
    }

    /// Mutable access to the pieces, for routing further contacts.
    pub fn children_mut(&mut self) -> &mut [Stalk] {
        &mut self.children
    }

    /// Whether this piece is still held in place by external constraints.
    #[must_use]
    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    /// Local-to-world transform of this piece.
    #[must_use]
    pub fn pose(&self) -> &Isometry3 {
        &self.pose
    }

    /// Updates the local-to-world transform (driven by external physics).
    pub fn set_pose(&mut self, pose: Isometry3) {
        self.pose = pose;
    }

    /// Timestamp of the most recent accepted contact.
    #[must_use]
    pub fn last_cut_time(&self) -> f64 {
        self.last_cut_time
    }

    fn regenerate(&mut self) {
        self.mesh.regenerate(&self.params, &self.cuts);
        self.collider.regenerate(&self.params, &self.cuts);
    }

    /// A copy of this piece with its own buffer storage and no children.
    fn clone_piece(&self) -> Stalk {
        Stalk {
            params: self.params,
            cuts: self.cuts.clone(),
            mesh: self.mesh.clone(),
            collider: self.collider.clone(),
            children: Vec::new(),
            pose: self.pose,
            settings: self.settings,
            last_cut_time: self.last_cut_time,
            anchored: false,
        }
    }

    /// Applies an up-cut plane, splitting off a new free-falling child that
    /// occupies the complementary half-space.
    ///
    /// Rejects (returning `None`, changing nothing) cuts whose center
    /// height is within [`MIN_PIECE_HEIGHT`] of the current effective
    /// bounds. On acceptance both pieces regenerate their mesh and hull,
    /// and the child is returned.
    pub fn split(&mut self, cut: CutPlane) -> Option<&Stalk> {
        let bottom = self.cuts.bottom_center();
        let top = self.cuts.top_center(self.params.full_height());

        if cut.center_height() < bottom + MIN_PIECE_HEIGHT
            || cut.center_height() > top - MIN_PIECE_HEIGHT
        {
            trace!(
                "rejected sliver cut at {:.3} against bounds ({:.3}, {:.3})",
                cut.center_height(),
                bottom,
                top
            );
            return None;
        }

        let mut child = self.clone_piece();
        child.cuts.push_down(cut.mirrored());
        child.regenerate();

        self.cuts.push_up(cut);
        self.regenerate();

        debug!(
            "split at {:.3}: parent mass {:.3}, child mass {:.3}",
            cut.center_height(),
            self.mass(),
            child.mass()
        );

        self.children.push(child);
        self.children.last()
    }

    /// Handles an implement contact at time `now` (seconds).
    ///
    /// Ignored unless the relative speed exceeds the configured threshold
    /// and the cooldown window has elapsed. The contact point and the
    /// implement's cutting normal are transformed into this piece's local
    /// space; contacts whose local normal has no vertical component cannot
    /// form a cut and are dropped.
    pub fn on_contact(&mut self, contact: &ContactEvent, now: f64) -> Option<&Stalk> {
        if contact.relative_velocity.norm() <= self.settings.min_speed {
            return None;
        }
        if now - self.settings.cooldown < self.last_cut_time {
            trace!("contact ignored: within cooldown");
            return None;
        }
        self.last_cut_time = now;

        let local_point = self.pose.inverse_transform_point(&contact.point);
        let world_normal = contact.orientation * -Vector3::z();
        let local_normal = self.pose.inverse_transform_vector(&world_normal);

        if local_normal.y == 0.0 {
            return None;
        }

        let offset = local_point.y
            + (-local_point.x * local_normal.x - local_point.z * local_normal.z)
                / local_normal.y;

        let cut = CutPlane::new(local_normal, offset).ok()?;
        self.split(cut)
    }

    /// Discards all children and cut history and regenerates the uncut
    /// stalk. Editor-facing; not part of steady-state slicing.
    pub fn reset(&mut self) {
        self.children.clear();
        self.cuts.clear();
        self.regenerate();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stalk() -> Stalk {
        Stalk::new(StalkParams::default()).unwrap()
    }

    fn flat_cut(height: f64) -> CutPlane {
        CutPlane::new(Vector3::y(), height).unwrap()
    }

    #[test]
    fn rejects_invalid_params() {
        let params = StalkParams {
            segments: 0,
            ..StalkParams::default()
        };
        assert!(Stalk::new(params).is_err());
    }

    #[test]
    fn fresh_stalk_is_uncut_and_anchored() {
        let s = stalk();
        assert!(s.cuts().up().is_empty());
        assert!(s.cuts().down().is_empty());
        assert!(s.children().is_empty());
        assert!(s.is_anchored());
        assert_relative_eq!(s.mass(), 1.0);
        assert_eq!(s.mesh().positions().len(), (5 * 6 + 4) * 13);
    }

    #[test]
    fn split_at_three_divides_mass_sixty_forty() {
        let mut s = stalk();
        let child = s.split(flat_cut(3.0));
        let child_mass = child.map(Stalk::mass).unwrap();
        assert_relative_eq!(child_mass, 0.4);
        assert_relative_eq!(s.mass(), 0.6);

        assert_eq!(s.cuts().up().len(), 1);
        assert_eq!(s.children().len(), 1);
        let child = &s.children()[0];
        assert_eq!(child.cuts().down().len(), 1);
        assert!(!child.is_anchored());
    }

    #[test]
    fn child_down_cut_mirrors_parent_up_cut() {
        let mut s = stalk();
        let cut = CutPlane::new(Vector3::new(0.2, 1.0, -0.1), 2.0).unwrap();
        s.split(cut).unwrap();

        let parent_cut = s.cuts().up()[0];
        let child_cut = s.children()[0].cuts().down()[0];
        assert_relative_eq!(child_cut.normal().x, -parent_cut.normal().x);
        assert_relative_eq!(child_cut.normal().y, -parent_cut.normal().y);
        assert_relative_eq!(child_cut.normal().z, -parent_cut.normal().z);
        assert_relative_eq!(child_cut.center_height(), parent_cut.center_height());
    }

    #[test]
    fn sliver_cuts_are_no_ops() {
        let mut s = stalk();
        assert!(s.split(flat_cut(0.005)).is_none());
        assert!(s.split(flat_cut(5.0 - 0.005)).is_none());
        assert!(s.split(flat_cut(-1.0)).is_none());
        assert!(s.split(flat_cut(6.0)).is_none());
        assert!(s.cuts().up().is_empty());
        assert!(s.children().is_empty());
    }

    #[test]
    fn sliver_band_respects_tightened_bounds() {
        let mut s = stalk();
        s.split(flat_cut(3.0)).unwrap();
        // Parent now spans [0, 3]; cuts hugging the new top are rejected.
        // Stay inside the band: 3.0 - MIN_PIECE_HEIGHT is not exactly
        // representable, so the band edge itself rounds either way.
        assert!(s.split(flat_cut(2.995)).is_none());
        assert!(s.split(flat_cut(2.992)).is_none());
        assert!(s.split(flat_cut(2.5)).is_some());
    }

    #[test]
    fn increasing_cut_heights_converge() {
        let params = StalkParams {
            segments: 1,
            panels: 3,
            segment_height: 0.1,
            bump_height: 0.02,
            inner_radius: 0.08,
            outer_radius: 0.1,
            bump_radius: 0.11,
            ..StalkParams::default()
        };
        let mut s = Stalk::new(params).unwrap();

        let mut accepted = 0;
        let mut h = 0.0;
        while h < 0.1 {
            if s.split(flat_cut(h)).is_some() {
                accepted += 1;
            }
            h += 0.002;
        }
        // floor((top - bottom) / MIN_PIECE_HEIGHT)
        assert!(accepted <= 10, "accepted {accepted} cuts");
    }

    #[test]
    fn repeated_splits_accumulate_children() {
        let mut s = stalk();
        for height in [4.0, 3.0, 2.0, 1.0] {
            assert!(s.split(flat_cut(height)).is_some());
        }
        assert_eq!(s.children().len(), 4);
        assert_eq!(s.cuts().up().len(), 4);
        assert_relative_eq!(s.mass(), 0.2);
        // Each child keeps the cuts it inherited plus its own mirror.
        assert_eq!(s.children()[3].cuts().down().len(), 1);
        assert_eq!(s.children()[3].cuts().up().len(), 3);
    }

    #[test]
    fn grandchildren_nest_under_children() {
        let mut s = stalk();
        s.split(flat_cut(2.0)).unwrap();
        let child = &mut s.children_mut()[0];
        child.split(flat_cut(4.0)).unwrap();
        assert_eq!(s.children()[0].children().len(), 1);
        assert_relative_eq!(s.children()[0].children()[0].mass(), 0.2);
    }

    #[test]
    fn reset_restores_uncut_state() {
        let mut s = stalk();
        s.split(flat_cut(2.0)).unwrap();
        s.split(flat_cut(1.0)).unwrap();
        s.reset();
        assert!(s.children().is_empty());
        assert!(s.cuts().up().is_empty());
        assert_relative_eq!(s.mass(), 1.0);
    }

    fn slicing_contact(point: Point3) -> ContactEvent {
        // Rotate the implement's -z cutting normal to point straight up.
        let orientation = UnitQuaternion::rotation_between(
            &Vector3::new(0.0, 0.0, -1.0),
            &Vector3::y(),
        )
        .unwrap();
        ContactEvent {
            point,
            relative_velocity: Vector3::new(0.0, 0.0, 10.0),
            orientation,
        }
    }

    #[test]
    fn fast_contact_splits_at_contact_height() {
        let mut s = stalk();
        let child = s.on_contact(&slicing_contact(Point3::new(1.0, 2.5, 0.0)), 0.0);
        assert!(child.is_some());
        assert_relative_eq!(s.cuts().up()[0].center_height(), 2.5);
        assert_relative_eq!(s.mass(), 0.5);
    }

    #[test]
    fn slow_contact_is_ignored() {
        let mut s = stalk();
        let mut contact = slicing_contact(Point3::new(1.0, 2.5, 0.0));
        contact.relative_velocity = Vector3::new(0.0, 0.0, 3.0);
        assert!(s.on_contact(&contact, 0.0).is_none());
        assert!(s.cuts().up().is_empty());
    }

    #[test]
    fn cooldown_throttles_contacts() {
        let mut s = stalk();
        let contact = slicing_contact(Point3::new(1.0, 2.5, 0.0));
        assert!(s.on_contact(&contact, 0.0).is_some());

        let again = slicing_contact(Point3::new(1.0, 1.5, 0.0));
        assert!(s.on_contact(&again, 0.2).is_none());
        assert!(s.on_contact(&again, 0.6).is_some());
        assert_eq!(s.children().len(), 2);
    }

    #[test]
    fn custom_settings_relax_the_speed_gate() {
        let mut s = stalk().with_settings(ContactSettings {
            min_speed: 1.0,
            cooldown: 0.5,
        });
        let mut contact = slicing_contact(Point3::new(1.0, 2.5, 0.0));
        contact.relative_velocity = Vector3::new(0.0, 0.0, 3.0);
        assert!(s.on_contact(&contact, 0.0).is_some());
    }

    #[test]
    fn contact_with_horizontal_local_normal_is_dropped() {
        let mut s = stalk();
        // Identity orientation: cutting normal stays -z, no vertical part.
        let contact = ContactEvent {
            point: Point3::new(1.0, 2.5, 0.0),
            relative_velocity: Vector3::new(0.0, 0.0, 10.0),
            orientation: UnitQuaternion::identity(),
        };
        assert!(s.on_contact(&contact, 0.0).is_none());
        assert!(s.cuts().up().is_empty());
    }

    #[test]
    fn contact_point_is_taken_in_local_space() {
        let mut s = stalk();
        s.set_pose(Isometry3::translation(0.0, 10.0, 0.0));
        let child = s.on_contact(&slicing_contact(Point3::new(1.0, 12.5, 0.0)), 0.0);
        assert!(child.is_some());
        assert_relative_eq!(s.cuts().up()[0].center_height(), 2.5);
    }

    #[test]
    fn rejected_sliver_contact_still_arms_cooldown() {
        let mut s = stalk();
        let sliver = slicing_contact(Point3::new(1.0, 0.005, 0.0));
        assert!(s.on_contact(&sliver, 0.0).is_none());
        assert_relative_eq!(s.last_cut_time(), 0.0);
        // A clean contact within the cooldown window is still throttled.
        let clean = slicing_contact(Point3::new(1.0, 2.5, 0.0));
        assert!(s.on_contact(&clean, 0.3).is_none());
        assert!(s.on_contact(&clean, 0.8).is_some());
    }
}
