//! Cyclic wedge walkthrough: derive the transform of a rotated wedge patch,
//! scramble its second half and recover the face ordering.
//!
//! Usage:
//! ```text
//! cargo run --example cyclic_wedge
//! RUST_LOG=geocouple=debug cargo run --example cyclic_wedge
//! ```

use std::f64::consts::PI;

use geocouple::coupling::{CoupledPatch, CyclicPatch, MatchSettings, PatchOrdering};
use geocouple::math::tensor::rotation_about_axis;
use geocouple::math::{Point3, Vector3};
use geocouple::topology::PatchGeometry;
use geocouple::Result;

/// Sector angle of the wedge.
const ANGLE: f64 = PI / 8.0;

/// Radial and axial face counts of each wedge side.
const RADIAL: usize = 3;
const AXIAL: usize = 2;

/// Faces of one wedge side in the y = 0 plane, outward normal -y.
#[allow(clippy::cast_precision_loss)]
fn side_polygons() -> Vec<Vec<Point3>> {
    let mut polygons = Vec::with_capacity(RADIAL * AXIAL);
    for k in 0..AXIAL {
        for i in 0..RADIAL {
            let (r0, r1) = (1.0 + i as f64, 2.0 + i as f64);
            let (z0, z1) = (k as f64, 1.0 + k as f64);
            polygons.push(vec![
                Point3::new(r0, 0.0, z0),
                Point3::new(r1, 0.0, z0),
                Point3::new(r1, 0.0, z1),
                Point3::new(r0, 0.0, z1),
            ]);
        }
    }
    polygons
}

fn main() -> Result<()> {
    // Default: WARN for everything, INFO for the crate.
    // Override with RUST_LOG env var (e.g. RUST_LOG=geocouple=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("geocouple=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let rotation = rotation_about_axis(&Vector3::z(), ANGLE);
    let owner = side_polygons();
    let neighbour: Vec<Vec<Point3>> = owner
        .iter()
        .map(|poly| {
            let mut image: Vec<Point3> = poly
                .iter()
                .map(|p| Point3::from(rotation * p.coords))
                .collect();
            image[1..].reverse();
            image
        })
        .collect();

    let mut polygons: Vec<Vec<Point3>> = owner.iter().cloned().chain(neighbour).collect();
    let geometry = PatchGeometry::from_polygons(&polygons)?;
    let settings = MatchSettings::default().with_diagnostics_dir(std::env::temp_dir());
    let mut patch = CyclicPatch::new("wedge", geometry)?.with_settings(settings);
    patch.init_geometry()?;
    patch.calc_geometry()?;

    let transform = patch.transform()?;
    println!("kind:       {}", transform.kind());
    println!("parallel:   {}", transform.parallel());
    println!("separated:  {}", transform.separated());
    if let Some(t) = transform.forward_t().first() {
        println!("forward_t: {t}");
    }

    // Reverse the second half and shift every anchor by one vertex.
    let half = patch.half_size();
    polygons[half..].reverse();
    for poly in &mut polygons[half..] {
        poly.rotate_left(1);
    }
    let candidate = PatchGeometry::from_polygons(&polygons)?;

    patch.init_order(&candidate)?;
    let ordering = patch.order(&candidate)?;
    println!("changed:    {}", ordering.changed);
    println!("face_map:   {:?}", ordering.face_map);
    println!("rotation:   {:?}", ordering.rotation);

    let restored = ordering.apply(candidate.faces())?;
    patch.init_update_mesh()?;
    patch.update_mesh(PatchGeometry::new(restored, candidate.points().to_vec())?)?;
    let reordered = patch.order(patch.geometry())?;
    println!("reordered:  changed = {}", reordered.changed);
    Ok(())
}
