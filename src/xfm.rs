//! Affine transforms from surface coordinates into the voxel grid of a functional volume.
//!
//! A transform file is plain text. The first line gives the grid shape, the remaining lines
//! the rows of the affine matrix:
//!
//! ```text
//! shape 30 100 100
//! 0.0 0.0 0.4 15.0
//! 0.0 0.4 0.0 50.0
//! 0.4 0.0 0.0 50.0
//! 0.0 0.0 0.0 1.0
//! ```
//!
//! The fourth row may be omitted, it defaults to `0 0 0 1`.

use ndarray::{arr1, Array2, ArrayView1};

use std::fs;
use std::path::Path;

use crate::error::{CortexRoiError, Result};

/// A named surface-to-voxel transform together with the shape of the voxel grid it addresses.
#[derive(Debug, Clone, PartialEq)]
pub struct Xfm {
    pub name: String,
    pub matrix: Array2<f64>,
    pub shape: [usize; 3],
}

impl Xfm {
    pub fn new(name: &str, matrix: Array2<f64>, shape: [usize; 3]) -> Result<Xfm> {
        if matrix.dim() != (4, 4) {
            return Err(CortexRoiError::InvalidXfmFormat(format!("matrix must be 4x4, got {:?}", matrix.dim())));
        }
        Ok(Xfm { name: String::from(name), matrix, shape })
    }

    /// Identity transform: surface coordinates are voxel coordinates.
    pub fn identity(name: &str, shape: [usize; 3]) -> Xfm {
        Xfm { name: String::from(name), matrix: Array2::eye(4), shape }
    }

    pub fn num_voxels(&self) -> usize {
        self.shape.iter().product()
    }

    /// Transform a surface point into continuous voxel coordinates.
    pub fn apply(&self, point: ArrayView1<f64>) -> [f64; 3] {
        let homogeneous = arr1(&[point[0], point[1], point[2], 1.0]);
        let v = self.matrix.dot(&homogeneous);
        [v[0], v[1], v[2]]
    }

    /// The row-major flat index of the voxel nearest to the continuous voxel coordinate, if inside the grid.
    pub fn nearest_voxel(&self, coord: [f64; 3]) -> Option<usize> {
        let mut flat = 0usize;
        for (axis, c) in coord.iter().enumerate() {
            let r = c.round();
            if !r.is_finite() || r < 0.0 || r >= self.shape[axis] as f64 {
                return None;
            }
            flat = flat * self.shape[axis] + r as usize;
        }
        Some(flat)
    }

    pub fn from_file<P: AsRef<Path>>(name: &str, path: P) -> Result<Xfm> {
        let content = fs::read_to_string(path)?;
        Xfm::from_str(name, &content)
    }

    /// Parse the text format described in the module documentation.
    pub fn from_str(name: &str, content: &str) -> Result<Xfm> {
        let mut lines = content
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty() && !l.starts_with('#'));

        let shape_line = lines
            .next()
            .ok_or_else(|| CortexRoiError::InvalidXfmFormat(String::from("empty transform file")))?;
        let mut fields = shape_line.split_whitespace();
        if fields.next() != Some("shape") {
            return Err(CortexRoiError::InvalidXfmFormat(String::from("first line must start with 'shape'")));
        }
        let dims: Vec<usize> = fields
            .map(|f| f.parse::<usize>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| CortexRoiError::InvalidXfmFormat(format!("bad shape: {}", e)))?;
        if dims.len() != 3 {
            return Err(CortexRoiError::InvalidXfmFormat(format!("shape needs 3 dimensions, got {}", dims.len())));
        }

        let mut values: Vec<f64> = Vec::with_capacity(16);
        for line in lines {
            let row: Vec<f64> = line
                .split_whitespace()
                .map(|f| f.parse::<f64>())
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| CortexRoiError::InvalidXfmFormat(format!("bad matrix value: {}", e)))?;
            if row.len() != 4 {
                return Err(CortexRoiError::InvalidXfmFormat(format!("matrix rows need 4 values, got {}", row.len())));
            }
            values.extend(row);
        }
        match values.len() {
            12 => values.extend_from_slice(&[0.0, 0.0, 0.0, 1.0]),
            16 => {}
            n => return Err(CortexRoiError::InvalidXfmFormat(format!("expected 3 or 4 matrix rows, got {}", n / 4))),
        }

        let matrix = Array2::from_shape_vec((4, 4), values)
            .map_err(|e| CortexRoiError::InvalidXfmFormat(e.to_string()))?;
        Xfm::new(name, matrix, [dims[0], dims[1], dims[2]])
    }
}
