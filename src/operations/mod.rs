pub mod order;
pub mod tolerance;
pub mod transform;
