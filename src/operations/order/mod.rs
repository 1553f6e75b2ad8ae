mod match_points;
mod orderer;
mod patch_range;
mod rotation;

pub use match_points::{match_points, nearest_distance, nearest_index, PointMatch};
pub use orderer::{FaceOrderer, FaceOrdering};
pub use patch_range::{which_patch, PatchRange};
pub use rotation::{anchor_distance, get_rotation};
