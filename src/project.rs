//! Projection of voxel-space feature matrices onto the vertices of interest.

use log::{debug, info};
use ndarray::{Array2, ArrayViewD, Axis};

use crate::db::SurfaceDatabase;
use crate::error::{CortexRoiError, Result};
use crate::mapper::MapperMethod;
use crate::roi::{select_roi_vertices, VoiSet};
use crate::traits::VoxelMapper;
use crate::volume::{rescale_to_roi, RescaledVolume, VoxelVolume};

/// The value written to vertices outside the vertices of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    /// `0.0`, for plotting.
    Zero,
    /// `NaN`, to tell excluded vertices apart from computed zeros.
    Missing,
}

impl Sentinel {
    pub fn value(&self) -> f64 {
        match self {
            Sentinel::Zero => 0.0,
            Sentinel::Missing => f64::NAN,
        }
    }
}


/// Overwrite every column of `vertex_data` that is not in `voi` with the sentinel, in all rows.
pub fn mask_vertices(vertex_data: &mut Array2<f64>, voi: &VoiSet, sentinel: Sentinel) -> Result<()> {
    if vertex_data.ncols() != voi.total_vertices() {
        return Err(CortexRoiError::DimensionMismatch(
            String::from("vertex data columns"),
            voi.total_vertices(),
            vertex_data.ncols(),
        ));
    }
    let fill = sentinel.value();
    for col in voi.excluded() {
        vertex_data.column_mut(col).fill(fill);
    }
    Ok(())
}


/// Map an already wrapped voxel volume to vertex space and mask it to the vertices of interest.
pub fn project_volume_to_vertices<D: SurfaceDatabase>(
    db: &D,
    volume: &VoxelVolume,
    voi: &VoiSet,
    sentinel: Sentinel,
    method: MapperMethod,
) -> Result<Array2<f64>> {
    let mapper = db.mapper(&volume.subject, &volume.xfm, method)?;
    if mapper.num_vertices() != voi.total_vertices() {
        return Err(CortexRoiError::DimensionMismatch(
            String::from("mapper vertices"),
            voi.total_vertices(),
            mapper.num_vertices(),
        ));
    }

    let mut vertex_data = mapper.apply(volume)?;
    if vertex_data.len_of(Axis(0)) != volume.num_features() {
        return Err(CortexRoiError::DimensionMismatch(
            String::from("mapped feature rows"),
            volume.num_features(),
            vertex_data.nrows(),
        ));
    }
    debug!(
        "Mapped {} features from {} voxels to {} vertices",
        volume.num_features(),
        volume.data.ncols(),
        vertex_data.ncols()
    );

    mask_vertices(&mut vertex_data, voi, sentinel)?;
    Ok(vertex_data)
}


/// Map a feature matrix (features x voxels, covering the full grid of `xfm`) to vertex space with
/// the database's default mapper, and replace all vertices outside `voi` by the sentinel.
///
/// The voxel count is checked against the transform before anything is mapped.
pub fn project_features_to_vertices<D: SurfaceDatabase>(
    db: &D,
    subject: &str,
    xfm: &str,
    voi: &VoiSet,
    voxel_features: Array2<f64>,
    sentinel: Sentinel,
) -> Result<Array2<f64>> {
    let transform = db.transform(subject, xfm)?;
    let volume = VoxelVolume::new(voxel_features, subject, &transform)?;
    project_volume_to_vertices(db, &volume, voi, sentinel, db.mapper_method())
}


/// Select the vertices of interest for an ROI and project the features onto them in one go.
pub fn project_roi_features<D: SurfaceDatabase>(
    db: &D,
    subject: &str,
    xfm: &str,
    roi: &str,
    radius: f64,
    voxel_features: Array2<f64>,
    sentinel: Sentinel,
) -> Result<Array2<f64>> {
    let voi = select_roi_vertices(db, subject, roi, radius)?;
    info!("Projecting {} features onto {} vertices of ROI '{}'", voxel_features.nrows(), voi.len(), roi);
    project_features_to_vertices(db, subject, xfm, &voi, voxel_features, sentinel)
}


/// [`rescale_to_roi`] with the database's colormap.
pub fn rescale_roi_volume<D: SurfaceDatabase>(
    db: &D,
    roi_data: ArrayViewD<f64>,
    variable_data: ArrayViewD<f64>,
    subject: &str,
    xfm: &str,
    mask: Option<ArrayViewD<bool>>,
) -> Result<RescaledVolume> {
    rescale_to_roi(roi_data, variable_data, subject, xfm, mask, db.colormap())
}
