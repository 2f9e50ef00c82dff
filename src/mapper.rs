//! Mapping of voxel data onto surface vertices.

use log::debug;
use ndarray::{Array1, Array2};
use serde::Deserialize;

use crate::db::Hemispheres;
use crate::error::{CortexRoiError, Result};
use crate::fs_surface::BrainMesh;
use crate::traits::VoxelMapper;
use crate::volume::VoxelVolume;
use crate::xfm::Xfm;

/// How vertex positions are sampled in the voxel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapperMethod {
    /// Evenly spaced samples on the line between the white and pial vertex, each mapped to its nearest voxel.
    LineNearest,
    /// The nearest voxel of the fiducial (mid-thickness) vertex position.
    Nearest,
}

impl MapperMethod {
    pub fn name(&self) -> &'static str {
        match self {
            MapperMethod::LineNearest => "line_nearest",
            MapperMethod::Nearest => "nearest",
        }
    }
}

impl Default for MapperMethod {
    fn default() -> Self {
        MapperMethod::LineNearest
    }
}


/// A sparse vertex-by-voxel sampling table. Row `v` lists the voxels (flat, row-major grid index)
/// that contribute to vertex `v` and their weights. Left hemisphere vertices come first.
/// Both [`MapperMethod`]s build this table, they only differ in where the vertices are sampled.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledMapper {
    pub method: MapperMethod,
    pub xfm: String,
    pub shape: [usize; 3],
    indptr: Vec<usize>,
    voxels: Vec<usize>,
    weights: Vec<f64>,
}


/// Positions along `[0, 1]` at which the white-to-pial line is sampled.
fn sample_positions(method: MapperMethod, samples: usize) -> Vec<f64> {
    match method {
        MapperMethod::Nearest => vec![0.5],
        MapperMethod::LineNearest if samples <= 1 => vec![0.5],
        MapperMethod::LineNearest => (0..samples).map(|i| i as f64 / (samples - 1) as f64).collect(),
    }
}


impl SampledMapper {
    /// Build the sampling table for both hemispheres. White and pial meshes of a hemisphere must share their topology.
    pub fn new(
        white: &Hemispheres<BrainMesh>,
        pial: &Hemispheres<BrainMesh>,
        xfm: &Xfm,
        method: MapperMethod,
        samples: usize,
    ) -> Result<SampledMapper> {
        if samples == 0 {
            return Err(CortexRoiError::Config(String::from("mapper needs at least one sample per vertex")));
        }
        let positions = sample_positions(method, samples);
        let weight = 1.0 / positions.len() as f64;

        let mut mapper = SampledMapper {
            method,
            xfm: xfm.name.clone(),
            shape: xfm.shape,
            indptr: vec![0],
            voxels: Vec::new(),
            weights: Vec::new(),
        };

        for (w, p) in [(&white.lh, &pial.lh), (&white.rh, &pial.rh)].iter() {
            if w.vertices.dim() != p.vertices.dim() {
                return Err(CortexRoiError::SurfaceMismatch);
            }
            for v in 0..w.num_vertices() {
                let start: Array1<f64> = w.vertex(v).mapv(|c| c as f64);
                let end: Array1<f64> = p.vertex(v).mapv(|c| c as f64);
                for t in positions.iter() {
                    let point = &start + &((&end - &start) * *t);
                    if let Some(voxel) = xfm.nearest_voxel(xfm.apply(point.view())) {
                        mapper.push_sample(voxel, weight);
                    }
                }
                mapper.indptr.push(mapper.voxels.len());
            }
        }
        debug!(
            "Built {} mapper for {} vertices with {} in-bounds samples",
            method.name(),
            mapper.indptr.len() - 1,
            mapper.voxels.len()
        );
        Ok(mapper)
    }

    /// Add a sample to the vertex currently being built, merging samples that hit the same voxel.
    fn push_sample(&mut self, voxel: usize, weight: f64) {
        let row_start = self.indptr[self.indptr.len() - 1];
        match self.voxels[row_start..].iter().position(|&v| v == voxel) {
            Some(pos) => self.weights[row_start + pos] += weight,
            None => {
                self.voxels.push(voxel);
                self.weights.push(weight);
            }
        }
    }

    /// The voxels and weights sampled for the given global vertex.
    pub fn vertex_samples(&self, vertex: usize) -> Result<Vec<(usize, f64)>> {
        if vertex >= self.num_vertices() {
            return Err(CortexRoiError::VertexIndexOutOfRange(vertex, self.num_vertices()));
        }
        let range = self.indptr[vertex]..self.indptr[vertex + 1];
        Ok(self.voxels[range.clone()]
            .iter()
            .cloned()
            .zip(self.weights[range].iter().cloned())
            .collect())
    }
}


impl VoxelMapper for SampledMapper {
    fn num_vertices(&self) -> usize {
        self.indptr.len() - 1
    }

    fn apply(&self, volume: &VoxelVolume) -> Result<Array2<f64>> {
        if volume.shape != self.shape {
            let expected: usize = self.shape.iter().product();
            let actual: usize = volume.shape.iter().product();
            return Err(CortexRoiError::DimensionMismatch(String::from("volume grid voxels"), expected, actual));
        }
        if volume.xfm != self.xfm {
            debug!("Mapping volume in transform '{}' with mapper for '{}'", volume.xfm, self.xfm);
        }

        let grid_columns = volume.grid_columns();
        let mut out = Array2::<f64>::zeros((volume.data.nrows(), self.num_vertices()));
        for v in 0..self.num_vertices() {
            let mut col = out.column_mut(v);
            for k in self.indptr[v]..self.indptr[v + 1] {
                if let Some(c) = grid_columns[self.voxels[k]] {
                    col.scaled_add(self.weights[k], &volume.data.column(c));
                }
            }
        }
        Ok(out)
    }
}
