//! Selection of cortical surface vertices in and around a region of interest (ROI), and projection
//! of voxel-space feature data onto those vertices.
//!
//! The surfaces, ROIs and transforms come from a [`SurfaceDatabase`]. [`FsSubjectsDir`] provides
//! one based on FreeSurfer files.

pub mod config;
pub mod db;
pub mod error;
pub mod fs_annot;
pub mod fs_label;
pub mod fs_mgh;
pub mod fs_surface;
pub mod geodesic;
pub mod mapper;
pub mod project;
pub mod roi;
pub mod traits;
pub mod util;
pub mod volume;
pub mod xfm;

pub use config::{MapperConfig, RoiConfig};
pub use db::{FsSubjectsDir, Hemispheres, SurfaceDatabase, SurfaceKind};
pub use error::{CortexRoiError, Result};
pub use fs_annot::{read_annot, FsAnnot, FsAnnotColortable};
pub use fs_label::{read_label, FsLabel, FsLabelVertex};
pub use fs_mgh::{read_mgh, FsMgh, FsMghHeader};
pub use fs_surface::{read_surf, BrainMesh, FsSurface, FsSurfaceHeader};
pub use mapper::{MapperMethod, SampledMapper};
pub use project::{
    mask_vertices, project_features_to_vertices, project_roi_features, project_volume_to_vertices, rescale_roi_volume,
    Sentinel,
};
pub use roi::{select_roi_vertices, select_roi_vertices_on, split_by_hemisphere, vertices_within_radius, VoiSet};
pub use traits::{GeodesicSurface, VoxelMapper};
pub use volume::{rescale_to_roi, roi_symmetric_limits, RescaledVolume, VoxelVolume};
pub use xfm::Xfm;
