pub mod classify;
mod kind;
mod tensors;

pub use classify::{
    Classification, CoupledFaceData, RotationProbe, Separation, TransformClassifier,
};
pub use kind::{ParseTransformKindError, TransformKind};
pub use tensors::{CalcTransformTensors, CouplingTransform};
