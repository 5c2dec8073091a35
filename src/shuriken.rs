use crate::error::{ParamError, Result};
use crate::math::{Point2, Point3, Vector3};

/// Parameters for the multi-bladed cutting implement.
///
/// A flat star: `tines` points alternating between `max_radius` and
/// `min_radius`, a hub ring at `hole_radius`, extruded to `thickness`.
#[derive(Debug, Clone, Copy)]
pub struct ShurikenParams {
    pub hole_radius: f64,
    pub min_radius: f64,
    pub max_radius: f64,
    pub thickness: f64,
    pub tines: usize,
}

impl Default for ShurikenParams {
    fn default() -> Self {
        Self {
            hole_radius: 0.1,
            min_radius: 0.3,
            max_radius: 0.6,
            thickness: 0.1,
            tines: 4,
        }
    }
}

impl ShurikenParams {
    /// Checks that the parameters describe a buildable star.
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than two tines, a length is
    /// non-positive, or the radii are not strictly nested.
    pub fn validate(&self) -> Result<()> {
        if self.tines < 2 {
            return Err(ParamError::TooFew {
                parameter: "tines",
                value: self.tines,
                min: 2,
            }
            .into());
        }
        for (parameter, value) in [
            ("hole_radius", self.hole_radius),
            ("min_radius", self.min_radius),
            ("max_radius", self.max_radius),
            ("thickness", self.thickness),
        ] {
            if value <= 0.0 {
                return Err(ParamError::NotPositive { parameter, value }.into());
            }
        }
        if self.hole_radius >= self.min_radius {
            return Err(ParamError::InnerNotInsideOuter {
                inner: self.hole_radius,
                outer: self.min_radius,
            }
            .into());
        }
        if self.min_radius >= self.max_radius {
            return Err(ParamError::InnerNotInsideOuter {
                inner: self.min_radius,
                outer: self.max_radius,
            }
            .into());
        }
        Ok(())
    }
}

/// Render mesh of the implement: front face, back face, and hub wall.
#[derive(Debug, Clone)]
pub struct ShurikenMesh {
    positions: Vec<Point3>,
    normals: Vec<Vector3>,
    uvs: Vec<Point2>,
    indices: Vec<[u32; 3]>,
}

impl ShurikenMesh {
    /// Vertex positions.
    #[must_use]
    pub fn positions(&self) -> &[Point3] {
        &self.positions
    }

    /// Vertex normals.
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
}

/// Coarse disc hull: one vertex per tine tip and a center per face.
#[derive(Debug, Clone)]
pub struct ShurikenCollider {
    positions: Vec<Point3>,
    indices: Vec<[u32; 3]>,
}

impl ShurikenCollider {
    /// Hull vertices.
    #[must_use]
    pub fn positions(&self) -> &[Point3] {
        &self.positions
    }

    /// Hull triangle index triples.
    #[must_use]
    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }
}

/// The cutting implement's static geometry.
///
/// Unlike a [`Stalk`](crate::solid::Stalk) it is never re-cut, so both
/// meshes are generated once at construction. Its flight is external.
#[derive(Debug, Clone)]
pub struct Shuriken {
    params: ShurikenParams,
    mesh: ShurikenMesh,
    collider: ShurikenCollider,
}

impl Shuriken {
    /// Builds the star from validated parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters fail validation.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn new(params: ShurikenParams) -> Result<Self> {
        params.validate()?;

        let rim = params.tines * 2;
        let mut mesh = ShurikenMesh {
            positions: vec![Point3::origin(); rim * 6],
            normals: vec![Vector3::zeros(); rim * 6],
            uvs: vec![Point2::origin(); rim * 6],
            indices: vec![[0; 3]; rim * 6],
        };

        // Half-angle steps: even steps land on tine tips, odd steps on the
        // notches between them.
        let wedge = std::f64::consts::PI / params.tines as f64;
        let half_thick = params.thickness * 0.5;

        let mut t_index = 0;
        for i in 0..rim {
            let angle = wedge * i as f64;
            let (sin, cos) = angle.sin_cos();
            let length = if i % 2 == 0 {
                params.max_radius
            } else {
                params.min_radius
            };

            let tip = Point3::new(cos * length, sin * length, 0.0);
            let hub_front = Point3::new(cos * params.hole_radius, sin * params.hole_radius, half_thick);
            let hub_back = Point3::new(cos * params.hole_radius, sin * params.hole_radius, -half_thick);

            let base = i * 6;
            mesh.positions[base] = tip;
            mesh.positions[base + 1] = tip;
            mesh.positions[base + 2] = hub_front;
            mesh.positions[base + 3] = hub_back;
            mesh.positions[base + 4] = hub_front;
            mesh.positions[base + 5] = hub_back;

            let front = Vector3::new(cos * 0.5, sin * 0.5, length).normalize();
            let back = Vector3::new(cos * 0.5, sin * 0.5, -length).normalize();
            let inward = Vector3::new(-cos, -sin, 0.0);
            mesh.normals[base] = front;
            mesh.normals[base + 1] = back;
            mesh.normals[base + 2] = front;
            mesh.normals[base + 3] = back;
            mesh.normals[base + 4] = inward;
            mesh.normals[base + 5] = inward;

            let u = (i % 2) as f64;
            mesh.uvs[base] = Point2::new(u, 1.0);
            mesh.uvs[base + 1] = Point2::new(u, 1.0);
            mesh.uvs[base + 2] = Point2::new(u, 0.0);
            mesh.uvs[base + 3] = Point2::new(u, 0.0);
            mesh.uvs[base + 4] = Point2::new(u, 0.0);
            mesh.uvs[base + 5] = Point2::new(u, 0.1);

            let here = base as u32;
            let next = (((i + 1) % rim) * 6) as u32;

            mesh.indices[t_index] = [here, next, here + 2];
            mesh.indices[t_index + 1] = [here + 2, next, next + 2];

            mesh.indices[t_index + 2] = [here + 1, here + 3, next + 1];
            mesh.indices[t_index + 3] = [next + 1, here + 3, next + 3];

            mesh.indices[t_index + 4] = [here + 4, next + 4, here + 5];
            mesh.indices[t_index + 5] = [here + 5, next + 4, next + 5];
            t_index += 6;
        }

        let mut collider = ShurikenCollider {
            positions: vec![Point3::origin(); params.tines + 2],
            indices: vec![[0; 3]; params.tines * 2],
        };

        let front_center = params.tines;
        let back_center = params.tines + 1;
        collider.positions[front_center] = Point3::new(0.0, 0.0, half_thick);
        collider.positions[back_center] = Point3::new(0.0, 0.0, -half_thick);

        let tip_wedge = std::f64::consts::TAU / params.tines as f64;
        for i in 0..params.tines {
            let angle = tip_wedge * i as f64;
            let (sin, cos) = angle.sin_cos();
            collider.positions[i] =
                Point3::new(cos * params.max_radius, sin * params.max_radius, 0.0);

            let here = i as u32;
            let next = ((i + 1) % params.tines) as u32;
            collider.indices[i * 2] = [here, next, front_center as u32];
            collider.indices[i * 2 + 1] = [here, next, back_center as u32];
        }

        Ok(Self {
            params,
            mesh,
            collider,
        })
    }

    /// Build parameters.
    #[must_use]
    pub fn params(&self) -> &ShurikenParams {
        &self.params
    }

    /// Render mesh for the external mesh display.
    #[must_use]
    pub fn mesh(&self) -> &ShurikenMesh {
        &self.mesh
    }

    /// Collision hull for the external rigid body.
    #[must_use]
    pub fn collider(&self) -> &ShurikenCollider {
        &self.collider
    }
}
