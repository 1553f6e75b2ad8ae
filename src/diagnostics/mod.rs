pub mod obj;

pub use obj::{write_patch_obj, ObjWriter};
