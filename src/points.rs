use crate::error::{BoxError, Result};
use nalgebra as na;

/// A row-major point array of shape `[M, C]` (or `[1, M, C]`), `C >= 3`.
///
/// The first three columns are the coordinates; any further columns
/// (intensity, color, ...) are carried along untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    data: Vec<f64>,
    width: usize,
    batched: bool,
}

impl PointSet {
    pub fn new(data: Vec<f64>, shape: &[usize]) -> Result<Self> {
        let (batched, num_points, width) = match *shape {
            [m, c] => (false, m, c),
            [1, m, c] => (true, m, c),
            [b, _, _] => return Err(BoxError::PointBatch(b)),
            _ => return Err(BoxError::PointShape(shape.to_vec())),
        };
        if width < 3 || data.len() != num_points * width {
            return Err(BoxError::PointShape(shape.to_vec()));
        }
        Ok(Self {
            data,
            width,
            batched,
        })
    }

    pub fn from_points(points: impl IntoIterator<Item = na::Point3<f64>>) -> Self {
        let data = points
            .into_iter()
            .flat_map(|p| [p.x, p.y, p.z])
            .collect();
        Self {
            data,
            width: 3,
            batched: false,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.width
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_batched(&self) -> bool {
        self.batched
    }

    pub fn shape(&self) -> Vec<usize> {
        if self.batched {
            vec![1, self.len(), self.width]
        } else {
            vec![self.len(), self.width]
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    pub fn point(&self, index: usize) -> Option<na::Point3<f64>> {
        let row = self.data.chunks_exact(self.width).nth(index)?;
        Some(na::Point3::new(row[0], row[1], row[2]))
    }

    pub fn xyz(&self) -> impl Iterator<Item = na::Point3<f64>> + '_ {
        self.data
            .chunks_exact(self.width)
            .map(|row| na::Point3::new(row[0], row[1], row[2]))
    }

    /// Replace the coordinates of every point with `f(coordinates)`.
    pub(crate) fn map_xyz(&mut self, mut f: impl FnMut(na::Vector3<f64>) -> na::Vector3<f64>) {
        for row in self.data.chunks_exact_mut(self.width) {
            let out = f(na::Vector3::new(row[0], row[1], row[2]));
            row[..3].copy_from_slice(out.as_slice());
        }
    }

    pub(crate) fn negate_axis(&mut self, axis: usize) {
        for row in self.data.chunks_exact_mut(self.width) {
            row[axis] = -row[axis];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_validation() {
        let pts = PointSet::new(vec![0.0; 8], &[2, 4]).unwrap();
        assert_eq!(pts.len(), 2);
        assert_eq!(pts.shape(), vec![2, 4]);

        let pts = PointSet::new(vec![0.0; 6], &[1, 2, 3]).unwrap();
        assert!(pts.is_batched());
        assert_eq!(pts.shape(), vec![1, 2, 3]);

        assert!(matches!(
            PointSet::new(vec![0.0; 12], &[2, 2, 3]),
            Err(BoxError::PointBatch(2))
        ));
        assert!(matches!(
            PointSet::new(vec![0.0; 4], &[2, 2]),
            Err(BoxError::PointShape(_))
        ));
        assert!(matches!(
            PointSet::new(vec![0.0; 5], &[2, 3]),
            Err(BoxError::PointShape(_))
        ));
        assert!(matches!(
            PointSet::new(vec![0.0; 3], &[3]),
            Err(BoxError::PointShape(_))
        ));
    }

    #[test]
    fn extra_columns_are_untouched() {
        let mut pts = PointSet::new(vec![1.0, 2.0, 3.0, 0.7], &[1, 4]).unwrap();
        pts.map_xyz(|v| v * 2.0);
        pts.negate_axis(1);
        assert_eq!(pts.as_slice(), &[2.0, -4.0, 6.0, 0.7]);
    }
}
