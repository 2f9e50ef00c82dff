//! Seams to the geometry provider: anything that can measure distances on a hemisphere
//! mesh, and anything that can carry voxel data over to the surface vertices.

use ndarray::{Array1, Array2};

use crate::error::Result;
use crate::volume::VoxelVolume;

/// A single hemisphere surface.
pub trait GeodesicSurface {
    fn num_vertices(&self) -> usize;

    /// Distance along the surface from every vertex to the closest of the `sources`, which are local
    /// vertex indices. Sources have distance 0. Vertices that cannot be reached from any source,
    /// which includes all vertices when `sources` is empty, have distance `f64::INFINITY`.
    fn geodesic_distance(&self, sources: &[usize]) -> Result<Array1<f64>>;
}

/// Maps voxel-space feature matrices to vertex space.
pub trait VoxelMapper {
    /// The total vertex count over both hemispheres, i.e., the column count of the output.
    fn num_vertices(&self) -> usize;

    /// Map the volume. The output has the same number of rows as `volume.data` and one column per vertex.
    fn apply(&self, volume: &VoxelVolume) -> Result<Array2<f64>>;
}
