use glam::{DMat3, DQuat, DVec3};
use thiserror::Error;

// Quaternion or complex extractions with a norm below this are rejected.
const DEGENERATE_NORM_EPS: f64 = 1e-9;

/// Error type for the orthogonalization routines.
#[derive(Debug, Error)]
pub enum OrthogonalError {
    /// The input is too far from a rotation for a stable fit.
    #[error("matrix is too far from a rotation to extract a stable fit")]
    DegenerateRotation,
}

/// Project a drifted 3x3 matrix back onto the rotation manifold.
///
/// Treats the input as a rotation that accumulated floating-point drift
/// through repeated composition: it is converted to its nearest unit
/// quaternion, the quaternion is renormalized, and a rotation matrix is
/// rebuilt from it. The result satisfies `R^T * R ~ I` and `det(R) ~ +1` to
/// floating tolerance.
///
/// The fit minimizes the quaternion-metric distance to the input, which is
/// not in general the rotation nearest in Frobenius norm; that trade-off is
/// intentional.
///
/// # Errors
///
/// Inputs with non-finite entries, or whose quaternion extraction collapses
/// to a non-finite or near-zero norm, fail with
/// [`OrthogonalError::DegenerateRotation`]. Inputs that are merely far from
/// orthogonal still produce a best-effort fit; the precondition is that the
/// input is already close to a valid rotation.
///
/// Example:
///
/// ```
/// use posekit_3d::orthogonal::to_orthogonal3d;
///
/// let drifted = [[1.0, 1e-3, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
/// let fitted = to_orthogonal3d(&drifted).unwrap();
/// assert!((fitted[0][1] - 5e-4).abs() < 1e-9);
/// ```
pub fn to_orthogonal3d(rotation: &[[f64; 3]; 3]) -> Result<[[f64; 3]; 3], OrthogonalError> {
    // glam stores column-major, the input rows become columns here
    let mat = DMat3::from_cols(
        DVec3::new(rotation[0][0], rotation[1][0], rotation[2][0]),
        DVec3::new(rotation[0][1], rotation[1][1], rotation[2][1]),
        DVec3::new(rotation[0][2], rotation[1][2], rotation[2][2]),
    );
    if !mat.is_finite() {
        return Err(OrthogonalError::DegenerateRotation);
    }

    let quat = DQuat::from_mat3(&mat);
    let norm = quat.length();
    if !norm.is_finite() || norm < DEGENERATE_NORM_EPS {
        return Err(OrthogonalError::DegenerateRotation);
    }

    let fitted = DMat3::from_quat(quat.normalize());
    Ok([
        [fitted.x_axis.x, fitted.y_axis.x, fitted.z_axis.x],
        [fitted.x_axis.y, fitted.y_axis.y, fitted.z_axis.y],
        [fitted.x_axis.z, fitted.y_axis.z, fitted.z_axis.z],
    ])
}

/// Project a drifted 2x2 matrix back onto the planar rotation manifold.
///
/// The two cos/sin estimates of the input are averaged into one complex
/// number which is then normalized to unit length, the planar analogue of
/// the quaternion fit in [`to_orthogonal3d`].
///
/// # Errors
///
/// Fails with [`OrthogonalError::DegenerateRotation`] when the averaged
/// complex number has a non-finite or near-zero norm.
pub fn to_orthogonal2d(rotation: &[[f64; 2]; 2]) -> Result<[[f64; 2]; 2], OrthogonalError> {
    let re = 0.5 * (rotation[0][0] + rotation[1][1]);
    let im = 0.5 * (rotation[1][0] - rotation[0][1]);

    let norm = re.hypot(im);
    if !norm.is_finite() || norm < DEGENERATE_NORM_EPS {
        return Err(OrthogonalError::DegenerateRotation);
    }

    let (cos, sin) = (re / norm, im / norm);
    Ok([[cos, -sin], [sin, cos]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    use crate::linalg::{matmul33, transpose33};

    fn determinant33(m: &[[f64; 3]; 3]) -> f64 {
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    fn assert_is_rotation(m: &[[f64; 3]; 3]) {
        let mut gram = [[0.0; 3]; 3];
        matmul33(&transpose33(m), m, &mut gram);
        for (i, row) in gram.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(*value, expected, epsilon = 1e-9);
            }
        }
        assert_relative_eq!(determinant33(m), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_to_orthogonal3d_reference() -> Result<(), OrthogonalError> {
        let mut drifted = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        drifted[0][1] = 1e-3;

        let fitted = to_orthogonal3d(&drifted)?;
        let expected = [
            [9.99999875e-01, 5.0e-04, 0.0],
            [-5.0e-04, 9.99999875e-01, 0.0],
            [0.0, 0.0, 1.0],
        ];
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(fitted[i][j], expected[i][j], epsilon = 1e-8);
            }
        }
        assert_is_rotation(&fitted);
        Ok(())
    }

    #[test]
    fn test_to_orthogonal3d_validity() -> Result<(), OrthogonalError> {
        // 90 degree rotation around z, uniformly scaled and perturbed
        let drifted = [
            [0.01, -1.1, 0.02],
            [1.1, 0.01, -0.01],
            [0.0, 0.02, 1.1],
        ];
        let fitted = to_orthogonal3d(&drifted)?;
        assert_is_rotation(&fitted);
        Ok(())
    }

    #[test]
    fn test_to_orthogonal3d_idempotent() -> Result<(), OrthogonalError> {
        let drifted = [
            [1.0, 2e-3, -1e-3],
            [-1e-3, 1.0, 2e-3],
            [1e-3, -2e-3, 1.0],
        ];
        let once = to_orthogonal3d(&drifted)?;
        let twice = to_orthogonal3d(&once)?;
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(twice[i][j], once[i][j], epsilon = 1e-12);
            }
        }
        Ok(())
    }

    #[test]
    fn test_to_orthogonal3d_non_finite() {
        let bad = [[f64::NAN; 3]; 3];
        assert!(matches!(
            to_orthogonal3d(&bad),
            Err(OrthogonalError::DegenerateRotation)
        ));
    }

    #[test]
    fn test_to_orthogonal2d_scaled_rotation() -> Result<(), OrthogonalError> {
        let angle = std::f64::consts::FRAC_PI_6;
        let (sin, cos) = angle.sin_cos();
        let drifted = [[1.05 * cos, -1.05 * sin], [1.05 * sin, 1.05 * cos]];

        let fitted = to_orthogonal2d(&drifted)?;
        assert_relative_eq!(fitted[0][0], cos, epsilon = 1e-12);
        assert_relative_eq!(fitted[0][1], -sin, epsilon = 1e-12);
        assert_relative_eq!(fitted[1][0], sin, epsilon = 1e-12);
        assert_relative_eq!(fitted[1][1], cos, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_to_orthogonal2d_degenerate() {
        let zero = [[0.0; 2]; 2];
        assert!(matches!(
            to_orthogonal2d(&zero),
            Err(OrthogonalError::DegenerateRotation)
        ));
    }
}
