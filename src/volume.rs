//! Voxel-space feature volumes, and rescaling of a volume to the symmetric extreme of an ROI.

use log::info;
use ndarray::{Array1, Array2, Array3, ArrayD, ArrayViewD, Axis, Zip};
use ndarray_stats::QuantileExt;

use crate::error::{CortexRoiError, Result};
use crate::xfm::Xfm;

pub const DEFAULT_COLORMAP: &str = "RdBu_r";

/// A feature matrix in the voxel space of a subject and transform. Each row is one feature
/// (a PCA component, a weight vector, ...), each column one voxel. Without a mask, the columns
/// run over the full grid in row-major order. With a mask, only the voxels where the mask is
/// `true` are present, in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelVolume {
    pub data: Array2<f64>,
    pub subject: String,
    pub xfm: String,
    pub shape: [usize; 3],
    pub mask: Option<Array3<bool>>,
}

impl VoxelVolume {
    /// Wrap a feature matrix that covers every voxel of the transform's grid.
    pub fn new(data: Array2<f64>, subject: &str, xfm: &Xfm) -> Result<VoxelVolume> {
        VoxelVolume::build(data, subject, xfm, None)
    }

    /// Wrap a feature matrix that only covers the voxels selected by `mask`.
    pub fn masked(data: Array2<f64>, subject: &str, xfm: &Xfm, mask: Array3<bool>) -> Result<VoxelVolume> {
        VoxelVolume::build(data, subject, xfm, Some(mask))
    }

    /// Wrap a single 3D volume as a one-row feature matrix.
    pub fn from_grid(grid: &Array3<f64>, subject: &str, xfm: &Xfm) -> Result<VoxelVolume> {
        let flat: Array1<f64> = grid.iter().cloned().collect();
        let data = flat.insert_axis(Axis(0));
        VoxelVolume::new(data, subject, xfm)
    }

    fn build(data: Array2<f64>, subject: &str, xfm: &Xfm, mask: Option<Array3<bool>>) -> Result<VoxelVolume> {
        let expected = match &mask {
            Some(m) => {
                let (d0, d1, d2) = m.dim();
                if [d0, d1, d2] != xfm.shape {
                    return Err(CortexRoiError::DimensionMismatch(
                        format!("mask voxels (mask shape {:?}, grid shape {:?})", [d0, d1, d2], xfm.shape),
                        xfm.num_voxels(),
                        m.len(),
                    ));
                }
                m.iter().filter(|&&v| v).count()
            }
            None => xfm.num_voxels(),
        };
        if data.ncols() != expected {
            return Err(CortexRoiError::DimensionMismatch(
                String::from("feature matrix columns (voxels)"),
                expected,
                data.ncols(),
            ));
        }
        Ok(VoxelVolume {
            data,
            subject: String::from(subject),
            xfm: xfm.name.clone(),
            shape: xfm.shape,
            mask,
        })
    }

    pub fn num_features(&self) -> usize {
        self.data.nrows()
    }

    /// For each voxel of the full grid, the column of `data` holding it, if present.
    pub fn grid_columns(&self) -> Vec<Option<usize>> {
        match &self.mask {
            None => (0..self.data.ncols()).map(Some).collect(),
            Some(mask) => {
                let mut next = 0usize;
                mask.iter()
                    .map(|&inside| {
                        if inside {
                            next += 1;
                            Some(next - 1)
                        } else {
                            None
                        }
                    })
                    .collect()
            }
        }
    }
}


/// A volume carrying display limits and a colormap for a plotting tool.
#[derive(Debug, Clone, PartialEq)]
pub struct RescaledVolume {
    pub data: ArrayD<f64>,
    pub subject: String,
    pub xfm: String,
    pub vmin: f64,
    pub vmax: f64,
    pub cmap: String,
}


/// Compute symmetric display limits `(-L, L)`, where `L` is the largest absolute value of
/// `variable_data` at the positions where `roi_data` is `1` or `-1` (left and right hemisphere ROI).
///
/// If `mask` is given, `roi_data` is first restricted to the positions where the mask is `true`
/// (in iteration order), and `variable_data` must already be in that masked format.
/// NaN values inside the ROI are ignored.
///
/// The sign of the extreme is dropped, so `vmin <= vmax` always holds: ROI values `{2, -9}` give
/// `(-9, 9)`, not the `(9, -9)` a signed limit would produce.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// let roi = array![0.0, 1.0, -1.0, 1.0, 0.0].into_dyn();
/// let data = array![9.0, -3.0, 7.0, -2.0, -11.0].into_dyn();
/// let (vmin, vmax) = cortexroi::roi_symmetric_limits(roi.view(), data.view(), None).unwrap();
/// assert_eq!((-7.0, 7.0), (vmin, vmax));
/// ```
pub fn roi_symmetric_limits(
    roi_data: ArrayViewD<f64>,
    variable_data: ArrayViewD<f64>,
    mask: Option<ArrayViewD<bool>>,
) -> Result<(f64, f64)> {
    let in_roi = roi_values(roi_data, variable_data, mask)?;
    let values: Array1<f64> = in_roi.into_iter().filter(|v| !v.is_nan()).collect();

    let max = *values.max().map_err(|_| CortexRoiError::EmptyRoi)?;
    let min = *values.min().map_err(|_| CortexRoiError::EmptyRoi)?;
    info!("Max value of variable in ROI = {}, min value = {}", max, min);

    let lim = if max.abs() > min.abs() { max.abs() } else { min.abs() };
    Ok((-lim, lim))
}


fn is_roi_marker(v: f64) -> bool {
    v == 1.0 || v == -1.0
}


/// Collect the variable values at ROI positions, checking all shapes on the way.
fn roi_values(
    roi_data: ArrayViewD<f64>,
    variable_data: ArrayViewD<f64>,
    mask: Option<ArrayViewD<bool>>,
) -> Result<Vec<f64>> {
    match mask {
        None => {
            if roi_data.shape() != variable_data.shape() {
                return Err(CortexRoiError::DimensionMismatch(
                    String::from("variable data voxels"),
                    roi_data.len(),
                    variable_data.len(),
                ));
            }
            let mut values = Vec::new();
            Zip::from(&roi_data).and(&variable_data).apply(|&r, &v| {
                if is_roi_marker(r) {
                    values.push(v);
                }
            });
            Ok(values)
        }
        Some(mask) => {
            if mask.shape() != roi_data.shape() {
                return Err(CortexRoiError::DimensionMismatch(
                    String::from("mask voxels"),
                    roi_data.len(),
                    mask.len(),
                ));
            }
            let masked_roi: Vec<f64> = roi_data
                .iter()
                .zip(mask.iter())
                .filter(|&(_, &m)| m)
                .map(|(&r, _)| r)
                .collect();
            if masked_roi.len() != variable_data.len() {
                return Err(CortexRoiError::DimensionMismatch(
                    String::from("masked variable data voxels"),
                    masked_roi.len(),
                    variable_data.len(),
                ));
            }
            Ok(masked_roi
                .iter()
                .zip(variable_data.iter())
                .filter(|&(&r, _)| is_roi_marker(r))
                .map(|(_, &v)| v)
                .collect())
        }
    }
}


/// Build a volume showing `variable_data` inside the ROI (zero elsewhere), scaled to the
/// symmetric ROI limits of [`roi_symmetric_limits`].
pub fn rescale_to_roi(
    roi_data: ArrayViewD<f64>,
    variable_data: ArrayViewD<f64>,
    subject: &str,
    xfm: &str,
    mask: Option<ArrayViewD<bool>>,
    cmap: &str,
) -> Result<RescaledVolume> {
    let (vmin, vmax) = roi_symmetric_limits(roi_data.view(), variable_data.view(), mask.clone())?;
    info!("Scale of graph will be +/- {}", vmax);

    let data = match mask {
        None => {
            let mut data = ArrayD::<f64>::zeros(variable_data.raw_dim());
            Zip::from(&mut data).and(&roi_data).and(&variable_data).apply(|d, &r, &v| {
                if is_roi_marker(r) {
                    *d = v;
                }
            });
            data
        }
        Some(mask) => {
            let masked_roi = roi_data.iter().zip(mask.iter()).filter(|&(_, &m)| m).map(|(&r, _)| r);
            let mut data = ArrayD::<f64>::zeros(variable_data.raw_dim());
            for ((d, r), &v) in data.iter_mut().zip(masked_roi).zip(variable_data.iter()) {
                if is_roi_marker(r) {
                    *d = v;
                }
            }
            data
        }
    };

    Ok(RescaledVolume {
        data,
        subject: String::from(subject),
        xfm: String::from(xfm),
        vmin,
        vmax,
        cmap: String::from(cmap),
    })
}
