pub mod collider;
pub mod cut;
pub mod error;
pub mod math;
pub mod mesh;
pub mod params;
pub mod rings;
pub mod shuriken;
pub mod solid;

pub use error::{CulmError, Result};
