use thiserror::Error;

/// Error type for the linear algebra kernels.
#[derive(Debug, Error)]
pub enum LinalgError {
    /// Source and destination buffers must describe the same number of points.
    #[error("source ({0}) and destination ({1}) point counts differ")]
    MismatchedPointCounts(usize, usize),
}

/// Dot product of two 3D vectors.
pub fn dot_product3(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Multiply two 3x3 matrices into a pre-allocated output.
///
/// # Arguments
///
/// * `a` - Left-hand matrix.
/// * `b` - Right-hand matrix.
/// * `m` - Output matrix holding `a * b`.
pub fn matmul33(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3], m: &mut [[f64; 3]; 3]) {
    for i in 0..3 {
        for j in 0..3 {
            m[i][j] = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
}

/// Transpose of a 3x3 matrix.
pub fn transpose33(a: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    [
        [a[0][0], a[1][0], a[2][0]],
        [a[0][1], a[1][1], a[2][1]],
        [a[0][2], a[1][2], a[2][2]],
    ]
}

/// Invert a rigid transform given as a rotation and translation.
///
/// Computes `R' = R^T` and `t' = -R^T * t`. The transpose stands in for the
/// matrix inverse, which is exact only while `R` is orthogonal; this is not
/// a general affine inverse.
///
/// Example:
///
/// ```
/// use posekit_3d::linalg::invert_rigid_transform;
///
/// let rotation = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
/// let translation = [1.0, 2.0, 3.0];
/// let (rot_inv, trans_inv) = invert_rigid_transform(&rotation, &translation);
/// assert_eq!(trans_inv, [-1.0, -2.0, -3.0]);
/// assert_eq!(rot_inv, rotation);
/// ```
pub fn invert_rigid_transform(
    rotation: &[[f64; 3]; 3],
    translation: &[f64; 3],
) -> ([[f64; 3]; 3], [f64; 3]) {
    let rot_inv = transpose33(rotation);
    let trans_inv = [
        -dot_product3(&rot_inv[0], translation),
        -dot_product3(&rot_inv[1], translation),
        -dot_product3(&rot_inv[2], translation),
    ];
    (rot_inv, trans_inv)
}

/// Transform a set of points using a rotation and translation.
///
/// # Arguments
///
/// * `src_points` - A set of points to be transformed.
/// * `dst_r_src` - A rotation matrix.
/// * `dst_t_src` - A translation vector.
/// * `dst_points` - A pre-allocated buffer to store the transformed points.
///
/// # Errors
///
/// Fails if `src_points` and `dst_points` have different lengths.
///
/// Example:
///
/// ```
/// use posekit_3d::linalg::transform_points3d;
///
/// let src_points = vec![[2.0, 2.0, 2.0], [3.0, 4.0, 5.0]];
/// let rotation = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
/// let translation = [0.0, 0.0, 0.0];
/// let mut dst_points = vec![[0.0; 3]; src_points.len()];
/// transform_points3d(&src_points, &rotation, &translation, &mut dst_points).unwrap();
/// assert_eq!(dst_points, src_points);
/// ```
pub fn transform_points3d(
    src_points: &[[f64; 3]],
    dst_r_src: &[[f64; 3]; 3],
    dst_t_src: &[f64; 3],
    dst_points: &mut [[f64; 3]],
) -> Result<(), LinalgError> {
    if src_points.len() != dst_points.len() {
        return Err(LinalgError::MismatchedPointCounts(
            src_points.len(),
            dst_points.len(),
        ));
    }
    apply_rigid_transform(
        src_points.as_flattened(),
        dst_r_src,
        dst_t_src,
        dst_points.as_flattened_mut(),
    );
    Ok(())
}

/// Flat-buffer kernel behind [`transform_points3d`].
///
/// `src` and `dst` are row-major Mx3 buffers of equal length. The rotation is
/// applied to all points with a single matrix multiply: the 3xM product is
/// written through a column-major view of `dst`, which lays the result out as
/// row-major Mx3, then the translation is added per column.
///
/// PRECONDITION: `src.len() == dst.len()` and both are multiples of 3.
pub(crate) fn apply_rigid_transform(
    src: &[f64],
    rotation: &[[f64; 3]; 3],
    translation: &[f64; 3],
    dst: &mut [f64],
) {
    debug_assert_eq!(src.len(), dst.len());
    debug_assert_eq!(src.len() % 3, 0);

    let num_points = src.len() / 3;
    if num_points == 0 {
        return;
    }

    // strided views over the flat buffers
    let rotation_mat = faer::mat::from_row_major_slice(rotation.as_flattened(), 3, 3);
    let points_in_src = faer::mat::from_row_major_slice(src, num_points, 3);
    let mut points_in_dst = faer::mat::from_column_major_slice_mut(dst, 3, num_points);

    faer::linalg::matmul::matmul(
        &mut points_in_dst,
        rotation_mat,
        points_in_src.transpose(),
        None,
        1.0,
        faer::Parallelism::None,
    );

    let (tx, ty, tz) = (translation[0], translation[1], translation[2]);
    for mut col in points_in_dst.col_iter_mut() {
        col.write(0, col.read(0) + tx);
        col.write(1, col.read(1) + ty);
        col.write(2, col.read(2) + tz);
    }
}
