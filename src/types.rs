use crate::{
    error::{BoxError, Result},
    frame::Frame,
};
use nalgebra as na;

/// Columns every box row starts with: center (3), size (3), yaw.
pub const BASE_DIM: usize = 7;
pub const YAW: usize = 6;

/// A set of 3D boxes stored as a row-major `N x box_dim` table.
///
/// Each row is `(x, y, z, size_x, size_y, size_z, yaw, attrs...)`. The center
/// is the bottom center of the box in the frame's convention (see
/// [`Frame::relative_origin`]); trailing attributes are opaque and never
/// touched by geometric operations. The number of rows and the row width are
/// fixed once the set is built.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSet {
    pub(crate) data: Vec<f64>,
    pub(crate) box_dim: usize,
    pub(crate) with_yaw: bool,
    pub(crate) frame: Frame,
}

/// Borrowed view of a single box row.
#[derive(Debug, Clone, Copy)]
pub struct BoxRow<'a>(pub(crate) &'a [f64]);

impl<'a> BoxRow<'a> {
    pub fn center(&self) -> na::Point3<f64> {
        na::Point3::new(self.0[0], self.0[1], self.0[2])
    }

    pub fn size(&self) -> na::Vector3<f64> {
        na::Vector3::new(self.0[3], self.0[4], self.0[5])
    }

    pub fn yaw(&self) -> f64 {
        self.0[YAW]
    }

    pub fn attrs(&self) -> &'a [f64] {
        &self.0[BASE_DIM..]
    }

    pub fn as_slice(&self) -> &'a [f64] {
        self.0
    }
}

impl BoxSet {
    /// Build a box set from a flat row-major table.
    ///
    /// A 6-column table without yaw is padded with a zero yaw column. When
    /// `with_yaw` is false every yaw is forced to 0.
    pub fn new(frame: Frame, data: Vec<f64>, box_dim: usize, with_yaw: bool) -> Result<Self> {
        let (data, box_dim) = if box_dim == BASE_DIM - 1 && !with_yaw {
            check_width(data.len(), box_dim)?;
            let data = data
                .chunks_exact(box_dim)
                .flat_map(|row| row.iter().copied().chain([0.0]))
                .collect();
            (data, BASE_DIM)
        } else {
            (data, box_dim)
        };

        if box_dim < BASE_DIM {
            return Err(BoxError::BoxDimTooSmall(box_dim));
        }
        check_width(data.len(), box_dim)?;

        let mut boxes = Self {
            data,
            box_dim,
            with_yaw,
            frame,
        };
        if !with_yaw {
            boxes.rows_mut().for_each(|row| row[YAW] = 0.0);
        }
        Ok(boxes)
    }

    /// Build a box set whose centers are given at `origin`, a position
    /// relative to the box extent, and move them to the frame's reference
    /// point.
    pub fn with_origin(
        frame: Frame,
        data: Vec<f64>,
        box_dim: usize,
        with_yaw: bool,
        origin: na::Vector3<f64>,
    ) -> Result<Self> {
        let mut boxes = Self::new(frame, data, box_dim, with_yaw)?;
        let shift = frame.relative_origin() - origin;
        boxes.rows_mut().for_each(|row| {
            for axis in 0..3 {
                row[axis] += row[3 + axis] * shift[axis];
            }
        });
        Ok(boxes)
    }

    pub fn from_rows<R: AsRef<[f64]>>(
        frame: Frame,
        rows: impl IntoIterator<Item = R>,
        box_dim: usize,
        with_yaw: bool,
    ) -> Result<Self> {
        let mut data = vec![];
        for row in rows {
            let row = row.as_ref();
            if row.len() != box_dim {
                return Err(BoxError::WidthMismatch {
                    len: row.len(),
                    box_dim,
                });
            }
            data.extend_from_slice(row);
        }
        Self::new(frame, data, box_dim, with_yaw)
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.box_dim
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn box_dim(&self) -> usize {
        self.box_dim
    }

    pub fn with_yaw(&self) -> bool {
        self.with_yaw
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    pub fn row(&self, index: usize) -> Option<BoxRow<'_>> {
        self.rows().nth(index)
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = BoxRow<'_>> + '_ {
        self.data.chunks_exact(self.box_dim).map(BoxRow)
    }

    pub(crate) fn rows_mut(&mut self) -> impl Iterator<Item = &mut [f64]> + '_ {
        self.data.chunks_exact_mut(self.box_dim)
    }

    /// Same layout and flags, new rows.
    pub(crate) fn with_data(&self, frame: Frame, data: Vec<f64>) -> Self {
        Self {
            data,
            box_dim: self.box_dim,
            with_yaw: self.with_yaw,
            frame,
        }
    }

    pub fn bottom_center(&self) -> Vec<na::Point3<f64>> {
        self.rows().map(|row| row.center()).collect()
    }

    pub fn dims(&self) -> Vec<na::Vector3<f64>> {
        self.rows().map(|row| row.size()).collect()
    }

    pub fn yaw(&self) -> Vec<f64> {
        self.rows().map(|row| row.yaw()).collect()
    }

    /// Vertical extent of each box.
    pub fn height(&self) -> Vec<f64> {
        let axis = self.frame.vertical_axis();
        self.rows().map(|row| row.size()[axis]).collect()
    }

    /// Vertical coordinate of the bottom face.
    pub fn bottom_height(&self) -> Vec<f64> {
        let axis = self.frame.vertical_axis();
        self.rows().map(|row| row.center()[axis]).collect()
    }

    /// Vertical coordinate of the top face.
    pub fn top_height(&self) -> Vec<f64> {
        let axis = self.frame.vertical_axis();
        let up = self.frame.up_sign();
        self.rows()
            .map(|row| row.center()[axis] + up * row.size()[axis])
            .collect()
    }

    pub fn volume(&self) -> Vec<f64> {
        self.rows().map(|row| row.size().product()).collect()
    }

    /// Boxes whose three sizes are all strictly larger than `threshold`.
    pub fn nonempty(&self, threshold: f64) -> Vec<bool> {
        self.rows()
            .map(|row| row.size().iter().all(|&s| s > threshold))
            .collect()
    }

    pub fn select(&self, indices: &[usize]) -> Result<Self> {
        let len = self.len();
        let mut data = Vec::with_capacity(indices.len() * self.box_dim);
        for &index in indices {
            let row = self
                .row(index)
                .ok_or(BoxError::IndexOutOfRange { index, len })?;
            data.extend_from_slice(row.as_slice());
        }
        Ok(self.with_data(self.frame, data))
    }

    pub fn select_mask(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.len() {
            return Err(BoxError::Incompatible(format!(
                "mask of length {} for {} boxes",
                mask.len(),
                self.len()
            )));
        }
        let data = self
            .rows()
            .zip(mask)
            .filter(|(_, keep)| **keep)
            .flat_map(|(row, _)| row.as_slice().iter().copied())
            .collect();
        Ok(self.with_data(self.frame, data))
    }

    /// Concatenate box sets sharing the same frame, width and yaw flag.
    pub fn cat(sets: &[BoxSet]) -> Result<Self> {
        let (first, rest) = sets
            .split_first()
            .ok_or_else(|| BoxError::Incompatible("nothing to concatenate".to_string()))?;
        if let Some(other) = rest.iter().find(|other| {
            other.frame != first.frame
                || other.box_dim != first.box_dim
                || other.with_yaw != first.with_yaw
        }) {
            return Err(BoxError::Incompatible(format!(
                "({}, {} columns, with_yaw={}) vs ({}, {} columns, with_yaw={})",
                first.frame,
                first.box_dim,
                first.with_yaw,
                other.frame,
                other.box_dim,
                other.with_yaw
            )));
        }
        let data = sets.iter().flat_map(|s| s.data.iter().copied()).collect();
        Ok(first.with_data(first.frame, data))
    }

    /// Pairwise overlap of the vertical extents of `self` and `other`,
    /// clamped at zero. Row `i`, column `j` compares `self[i]` with `other[j]`.
    pub fn height_overlaps(&self, other: &BoxSet) -> Result<na::DMatrix<f64>> {
        if self.frame != other.frame {
            return Err(BoxError::Incompatible(format!(
                "height overlaps between {} and {} boxes",
                self.frame, other.frame
            )));
        }
        // Heights measured along the upward direction.
        let up = self.frame.up_sign();
        let span = |boxes: &BoxSet| -> Vec<(f64, f64)> {
            boxes
                .bottom_height()
                .into_iter()
                .zip(boxes.top_height())
                .map(|(bottom, top)| (up * bottom, up * top))
                .collect()
        };
        let lhs = span(self);
        let rhs = span(other);
        Ok(na::DMatrix::from_fn(lhs.len(), rhs.len(), |i, j| {
            let (b1, t1) = lhs[i];
            let (b2, t2) = rhs[j];
            (t1.min(t2) - b1.max(b2)).max(0.0)
        }))
    }
}

fn check_width(len: usize, box_dim: usize) -> Result<()> {
    if box_dim == 0 || len % box_dim != 0 {
        return Err(BoxError::WidthMismatch { len, box_dim });
    }
    Ok(())
}
