#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Linear algebra kernels for rigid transforms.
pub mod linalg;

/// Rotation orthogonalization.
pub mod orthogonal;

/// Pose row codec and batch views.
pub mod pose;

/// Batch pose application and inversion.
pub mod transforms;
