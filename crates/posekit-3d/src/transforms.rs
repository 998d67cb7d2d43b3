use rayon::prelude::*;

use crate::linalg::{self, invert_rigid_transform};
use crate::pose::{
    decode_pose, encode_pose, split_pose_row, PointBatch, PoseBatch, ShapeError, POINT_COLS,
    POSE_COLS,
};

/// Transform a batch of points by a batch of rigid poses.
///
/// Every pose is applied to every point with the affine rule `p' = R * p + t`.
/// The output stacks the results pose-major: index `i * M + j` holds pose `i`
/// applied to point `j`, where `M` is the point count. This layout is part of
/// the contract, not an implementation detail.
///
/// With `invert` set, each pose is replaced inline by its rigid inverse
/// `(R^T, -R^T * t)` before being applied; see [`invert_single_pose`] for the
/// rule and its orthogonality assumption.
///
/// An empty pose or point batch yields an empty result.
///
/// # Arguments
///
/// * `poses` - A batch of N poses.
/// * `points` - A batch of M points.
/// * `invert` - Apply the inverse of each pose instead of the pose itself.
///
/// # Returns
///
/// A freshly allocated vector of N * M transformed points.
///
/// Example:
///
/// ```
/// use posekit_3d::pose::{PointBatch, PoseBatch};
/// use posekit_3d::transforms::transform_points_by_poses;
///
/// let pose = [1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 2.0, 0.0, 0.0, 1.0, 3.0];
/// let poses = PoseBatch::from_slice(&pose).unwrap();
/// let points = PointBatch::from_rows(&[[0.0, 0.0, 0.0]]);
/// let transformed = transform_points_by_poses(&poses, &points, false);
/// assert_eq!(transformed, vec![[1.0, 2.0, 3.0]]);
/// ```
pub fn transform_points_by_poses(
    poses: &PoseBatch<'_>,
    points: &PointBatch<'_>,
    invert: bool,
) -> Vec<[f64; 3]> {
    let num_poses = poses.len();
    let num_points = points.len();

    let mut transformed = vec![[0.0f64; 3]; num_poses * num_points];
    if num_poses == 0 || num_points == 0 {
        return transformed;
    }

    log::debug!(
        "transforming {} points by {} poses (invert: {})",
        num_points,
        num_poses,
        invert
    );

    // one output chunk of M points per pose; chunks are disjoint so the pose
    // loop parallelizes without any coordination
    transformed
        .as_flattened_mut()
        .par_chunks_exact_mut(num_points * POINT_COLS)
        .zip(poses.as_slice().par_chunks_exact(POSE_COLS))
        .for_each(|(chunk, pose_row)| {
            let (mut rotation, mut translation) = split_pose_row(pose_row);
            if invert {
                (rotation, translation) = invert_rigid_transform(&rotation, &translation);
            }
            linalg::apply_rigid_transform(points.as_slice(), &rotation, &translation, chunk);
        });

    transformed
}

/// Invert every pose in a batch.
///
/// Row `i` of the result is the rigid inverse of input row `i`; the row count
/// and order are preserved, and a zero-row batch yields a zero-row result.
/// Each inversion is O(1) via the transpose shortcut of
/// [`invert_rigid_transform`], exact to rounding while the rotation block is
/// orthogonal.
///
/// Example:
///
/// ```
/// use posekit_3d::pose::PoseBatch;
/// use posekit_3d::transforms::invert_poses;
///
/// let pose = [1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 2.0, 0.0, 0.0, 1.0, 3.0];
/// let poses = PoseBatch::from_slice(&pose).unwrap();
/// let inverted = invert_poses(&poses);
/// assert_eq!(inverted[0][3], -1.0);
/// ```
pub fn invert_poses(poses: &PoseBatch<'_>) -> Vec<[f64; POSE_COLS]> {
    log::debug!("inverting {} poses", poses.len());
    poses
        .iter()
        .map(|row| {
            let (rotation, translation) = split_pose_row(row);
            let (rot_inv, trans_inv) = invert_rigid_transform(&rotation, &translation);
            encode_pose(&rot_inv, &trans_inv)
        })
        .collect()
}

/// Invert a single 12-value pose row.
///
/// Convenience wrapper around the rule used by [`invert_poses`].
///
/// # Errors
///
/// Returns [`ShapeError::RowWidth`] unless `pose` has exactly 12 values.
pub fn invert_single_pose(pose: &[f64]) -> Result<[f64; POSE_COLS], ShapeError> {
    let (rotation, translation) = decode_pose(pose)?;
    let (rot_inv, trans_inv) = invert_rigid_transform(&rotation, &translation);
    Ok(encode_pose(&rot_inv, &trans_inv))
}
