use thiserror::Error;

/// Number of values in a flattened pose row.
///
/// A pose is the row-major flattening of a 3x4 `[R | t]` matrix, so each row
/// interleaves a rotation row with one translation component:
/// `[r00 r01 r02 t0 r10 r11 r12 t1 r20 r21 r22 t2]`.
pub const POSE_COLS: usize = 12;

/// Number of values in a 3D point row.
pub const POINT_COLS: usize = 3;

/// Error type for interpreting flat buffers as pose or point batches.
#[derive(Debug, Error)]
pub enum ShapeError {
    /// Buffer cannot be split into fixed-width rows.
    #[error("{name} buffer holds {len} values, which is not a multiple of the {width}-value row width")]
    Misaligned {
        /// Which batch the buffer was meant for.
        name: &'static str,
        /// Number of values in the buffer.
        len: usize,
        /// Expected row width.
        width: usize,
    },

    /// A single row had the wrong number of values.
    #[error("{name} row has {len} values, expected {expected}")]
    RowWidth {
        /// Which kind of row was being decoded.
        name: &'static str,
        /// Number of values in the row.
        len: usize,
        /// Expected row width.
        expected: usize,
    },
}

/// Read-only view of N rigid poses stored as flattened 12-value rows in a
/// contiguous buffer.
///
/// The view borrows the buffer with a fixed row stride of [`POSE_COLS`];
/// nothing is copied and the underlying data is never mutated.
///
/// Example:
///
/// ```
/// use posekit_3d::pose::PoseBatch;
///
/// let data = vec![1.0, 0.0, 0.0, 0.5, 0.0, 1.0, 0.0, -0.5, 0.0, 0.0, 1.0, 2.0];
/// let poses = PoseBatch::from_slice(&data).unwrap();
/// assert_eq!(poses.len(), 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PoseBatch<'a> {
    data: &'a [f64],
}

impl<'a> PoseBatch<'a> {
    /// Interpret a contiguous buffer as pose rows.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::Misaligned`] if the buffer length is not a
    /// multiple of [`POSE_COLS`]. An empty buffer is a valid zero-row batch.
    pub fn from_slice(data: &'a [f64]) -> Result<Self, ShapeError> {
        if data.len() % POSE_COLS != 0 {
            return Err(ShapeError::Misaligned {
                name: "poses",
                len: data.len(),
                width: POSE_COLS,
            });
        }
        Ok(Self { data })
    }

    /// View over rows that already carry the pose width in their type.
    pub fn from_rows(rows: &'a [[f64; POSE_COLS]]) -> Self {
        Self {
            data: rows.as_flattened(),
        }
    }

    /// Number of poses in the batch.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / POSE_COLS
    }

    /// Check if the batch holds no poses.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The `index`-th pose row.
    pub fn row(&self, index: usize) -> &'a [f64] {
        &self.data[index * POSE_COLS..(index + 1) * POSE_COLS]
    }

    /// The underlying flat buffer.
    pub fn as_slice(&self) -> &'a [f64] {
        self.data
    }

    /// Iterator over the pose rows in batch order.
    pub fn iter(&self) -> impl Iterator<Item = &'a [f64]> {
        self.data.chunks_exact(POSE_COLS)
    }
}

/// Read-only view of M 3D points stored as flattened 3-value rows in a
/// contiguous buffer.
///
/// Example:
///
/// ```
/// use posekit_3d::pose::PointBatch;
///
/// let data = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0];
/// let points = PointBatch::from_slice(&data).unwrap();
/// assert_eq!(points.len(), 2);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PointBatch<'a> {
    data: &'a [f64],
}

impl<'a> PointBatch<'a> {
    /// Interpret a contiguous buffer as point rows.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::Misaligned`] if the buffer length is not a
    /// multiple of [`POINT_COLS`]. An empty buffer is a valid zero-row batch.
    pub fn from_slice(data: &'a [f64]) -> Result<Self, ShapeError> {
        if data.len() % POINT_COLS != 0 {
            return Err(ShapeError::Misaligned {
                name: "points",
                len: data.len(),
                width: POINT_COLS,
            });
        }
        Ok(Self { data })
    }

    /// View over rows that already carry the point width in their type.
    pub fn from_rows(rows: &'a [[f64; POINT_COLS]]) -> Self {
        Self {
            data: rows.as_flattened(),
        }
    }

    /// Number of points in the batch.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / POINT_COLS
    }

    /// Check if the batch holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The `index`-th point row.
    pub fn row(&self, index: usize) -> &'a [f64] {
        &self.data[index * POINT_COLS..(index + 1) * POINT_COLS]
    }

    /// The underlying flat buffer.
    pub fn as_slice(&self) -> &'a [f64] {
        self.data
    }
}

/// Split a 12-value pose row into its rotation block and translation.
///
/// # Arguments
///
/// * `pose` - A flattened row-major 3x4 `[R | t]` matrix.
///
/// # Returns
///
/// The 3x3 rotation block and the translation column.
///
/// # Errors
///
/// Returns [`ShapeError::RowWidth`] unless `pose` has exactly [`POSE_COLS`]
/// values; a short row is rejected rather than truncated.
///
/// Example:
///
/// ```
/// use posekit_3d::pose::decode_pose;
///
/// let pose = [1.0, 0.0, 0.0, 4.0, 0.0, 1.0, 0.0, 5.0, 0.0, 0.0, 1.0, 6.0];
/// let (rotation, translation) = decode_pose(&pose).unwrap();
/// assert_eq!(rotation, [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
/// assert_eq!(translation, [4.0, 5.0, 6.0]);
/// ```
pub fn decode_pose(pose: &[f64]) -> Result<([[f64; 3]; 3], [f64; 3]), ShapeError> {
    if pose.len() != POSE_COLS {
        return Err(ShapeError::RowWidth {
            name: "pose",
            len: pose.len(),
            expected: POSE_COLS,
        });
    }
    Ok(split_pose_row(pose))
}

/// Flatten a rotation block and translation back into a 12-value pose row.
///
/// The exact inverse of [`decode_pose`], row-major.
pub fn encode_pose(rotation: &[[f64; 3]; 3], translation: &[f64; 3]) -> [f64; POSE_COLS] {
    [
        rotation[0][0],
        rotation[0][1],
        rotation[0][2],
        translation[0],
        rotation[1][0],
        rotation[1][1],
        rotation[1][2],
        translation[1],
        rotation[2][0],
        rotation[2][1],
        rotation[2][2],
        translation[2],
    ]
}

/// Split a pose row whose width was already validated.
///
/// PRECONDITION: `row` has exactly [`POSE_COLS`] values.
pub(crate) fn split_pose_row(row: &[f64]) -> ([[f64; 3]; 3], [f64; 3]) {
    (
        [
            [row[0], row[1], row[2]],
            [row[4], row[5], row[6]],
            [row[8], row[9], row[10]],
        ],
        [row[3], row[7], row[11]],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_pose() -> Result<(), ShapeError> {
        let pose = [
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0,
        ];
        let (rotation, translation) = decode_pose(&pose)?;
        assert_eq!(rotation, [[1.0, 2.0, 3.0], [5.0, 6.0, 7.0], [9.0, 10.0, 11.0]]);
        assert_eq!(translation, [4.0, 8.0, 12.0]);
        Ok(())
    }

    #[test]
    fn test_encode_decode_roundtrip() -> Result<(), ShapeError> {
        // asymmetric values so a truncated or reordered codec cannot pass
        let pose = [
            0.1, 0.2, 0.3, -4.0, 0.5, 0.6, 0.7, -8.0, 0.9, 1.0, 1.1, -12.0,
        ];
        let (rotation, translation) = decode_pose(&pose)?;
        assert_eq!(encode_pose(&rotation, &translation), pose);
        Ok(())
    }

    #[test]
    fn test_decode_pose_wrong_width() {
        let pose = [0.0; 11];
        match decode_pose(&pose) {
            Err(ShapeError::RowWidth { name, len, expected }) => {
                assert_eq!(name, "pose");
                assert_eq!(len, 11);
                assert_eq!(expected, POSE_COLS);
            }
            other => panic!("expected a row width error, got {other:?}"),
        }
    }

    #[test]
    fn test_pose_batch_from_slice() -> Result<(), ShapeError> {
        let data: Vec<f64> = (0..24).map(f64::from).collect();
        let poses = PoseBatch::from_slice(&data)?;
        assert_eq!(poses.len(), 2);
        assert!(!poses.is_empty());
        assert_eq!(poses.row(1)[0], 12.0);
        assert_eq!(poses.iter().count(), 2);
        Ok(())
    }

    #[test]
    fn test_pose_batch_misaligned() {
        let data = [0.0; 13];
        assert!(matches!(
            PoseBatch::from_slice(&data),
            Err(ShapeError::Misaligned {
                name: "poses",
                len: 13,
                width: POSE_COLS
            })
        ));
    }

    #[test]
    fn test_pose_batch_empty() -> Result<(), ShapeError> {
        let poses = PoseBatch::from_slice(&[])?;
        assert_eq!(poses.len(), 0);
        assert!(poses.is_empty());
        Ok(())
    }

    #[test]
    fn test_point_batch_from_slice() -> Result<(), ShapeError> {
        let data = [0.0, 0.0, 0.0, 1.0, 2.0, 3.0];
        let points = PointBatch::from_slice(&data)?;
        assert_eq!(points.len(), 2);
        assert_eq!(points.row(1), &[1.0, 2.0, 3.0]);
        Ok(())
    }

    #[test]
    fn test_point_batch_misaligned() {
        let data = [0.0; 7];
        assert!(matches!(
            PointBatch::from_slice(&data),
            Err(ShapeError::Misaligned {
                name: "points",
                len: 7,
                width: POINT_COLS
            })
        ));
    }

    #[test]
    fn test_pose_batch_from_rows() {
        let rows = [[0.0; POSE_COLS], [1.0; POSE_COLS]];
        let poses = PoseBatch::from_rows(&rows);
        assert_eq!(poses.len(), 2);
        assert_eq!(poses.row(1), &[1.0; POSE_COLS]);
    }
}
