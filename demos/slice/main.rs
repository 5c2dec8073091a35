//! Slices a stalk a few times and prints what each piece would hand to the
//! renderer and the physics body.

use culm::cut::CutPlane;
use culm::math::{Point3, UnitQuaternion, Vector3};
use culm::params::StalkParams;
use culm::solid::{ContactEvent, Stalk};

fn describe(label: &str, stalk: &Stalk) {
    println!(
        "{label}: {} vertices, {} triangles, hull {} vertices, mass {:.3}{}",
        stalk.mesh().positions().len(),
        stalk.mesh().indices().len(),
        stalk.collider().positions().len(),
        stalk.mass(),
        if stalk.is_anchored() { " (anchored)" } else { "" },
    );
    for (i, child) in stalk.children().iter().enumerate() {
        describe(&format!("{label}.{i}"), child);
    }
}

fn main() -> culm::Result<()> {
    let mut stalk = Stalk::new(StalkParams::default())?;
    describe("root", &stalk);

    // A flat cut at height 3, as the editor would inject it.
    if let Some(piece) = stalk.split(CutPlane::new(Vector3::y(), 3.0)?) {
        describe("cut off", piece);
    }

    // A glancing hit from a thrown implement, slightly tilted.
    let orientation = UnitQuaternion::rotation_between(
        &Vector3::new(0.0, 0.0, -1.0),
        &Vector3::new(0.2, 1.0, 0.0).normalize(),
    )
    .unwrap_or_else(UnitQuaternion::identity);
    let contact = ContactEvent {
        point: Point3::new(1.0, 1.5, 0.0),
        relative_velocity: Vector3::new(0.0, 0.0, 9.0),
        orientation,
    };
    if let Some(piece) = stalk.on_contact(&contact, 0.0) {
        describe("cut off", piece);
    }

    println!("\nafter two cuts:");
    describe("root", &stalk);

    stalk.reset();
    println!("\nafter reset:");
    describe("root", &stalk);
    Ok(())
}
