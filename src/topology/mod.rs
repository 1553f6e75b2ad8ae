pub mod face;
pub mod patch;

pub use face::Face;
pub use patch::PatchGeometry;
