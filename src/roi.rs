//! Selection of the vertices of interest (VOI): the vertices of an ROI plus a halo of vertices
//! whose geodesic distance to the ROI is below a fraction of the largest distance found.

use log::{debug, info, warn};
use ndarray::{Array1, ArrayView1};
use ndarray_stats::QuantileExt;

use crate::db::{Hemispheres, SurfaceDatabase, SurfaceKind};
use crate::error::{CortexRoiError, Result};
use crate::traits::GeodesicSurface;

/// A set of global vertex indices over both hemispheres, kept sorted and free of duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiSet {
    indices: Vec<usize>,
    total_vertices: usize,
}

impl VoiSet {
    pub fn new(mut indices: Vec<usize>, total_vertices: usize) -> Result<VoiSet> {
        indices.sort_unstable();
        indices.dedup();
        if let Some(&last) = indices.last() {
            if last >= total_vertices {
                return Err(CortexRoiError::VertexIndexOutOfRange(last, total_vertices));
            }
        }
        Ok(VoiSet { indices, total_vertices })
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Vertex count of both hemispheres together, the size of the index space.
    pub fn total_vertices(&self) -> usize {
        self.total_vertices
    }

    pub fn contains(&self, vertex: usize) -> bool {
        self.indices.binary_search(&vertex).is_ok()
    }

    pub fn is_superset_of(&self, vertices: &[usize]) -> bool {
        vertices.iter().all(|&v| self.contains(v))
    }

    /// All vertices of the index space that are not in the set, in ascending order.
    pub fn excluded(&self) -> Vec<usize> {
        let mut excluded = Vec::with_capacity(self.total_vertices - self.indices.len());
        let mut members = self.indices.iter().peekable();
        for v in 0..self.total_vertices {
            if members.peek() == Some(&&v) {
                members.next();
            } else {
                excluded.push(v);
            }
        }
        excluded
    }
}


/// Split global ROI vertex indices into local per-hemisphere indices at `split_index`, the
/// left hemisphere vertex count.
pub fn split_by_hemisphere(roi_vertices: &[usize], split_index: usize) -> Hemispheres<Vec<usize>> {
    let lh = roi_vertices.iter().cloned().filter(|&v| v < split_index).collect();
    let rh = roi_vertices.iter().filter(|&&v| v >= split_index).map(|&v| v - split_index).collect();
    Hemispheres { lh, rh }
}


/// Geodesic distance of every vertex to the ROI of its own hemisphere, left then right, in global index order.
///
/// A hemisphere without ROI vertices gets infinite distance everywhere.
pub fn roi_distances<S: GeodesicSurface>(surfaces: &Hemispheres<S>, roi: &Hemispheres<Vec<usize>>) -> Result<Array1<f64>> {
    let mut all_dists: Vec<f64> = Vec::with_capacity(surfaces.total_vertices());
    for (hemi, (surf, verts)) in ["lh", "rh"].iter().zip(surfaces.as_array().iter().zip(roi.as_array().iter())) {
        let n = surf.num_vertices();
        if verts.is_empty() {
            warn!("ROI has no vertices on hemisphere {}, none of its vertices can be selected", hemi);
            all_dists.extend(std::iter::repeat(f64::INFINITY).take(n));
            continue;
        }
        let dists = surf.geodesic_distance(verts)?;
        if dists.len() != n {
            return Err(CortexRoiError::DimensionMismatch(format!("{} distance vector", hemi), n, dists.len()));
        }
        debug!("Computed geodesic distances to {} ROI vertices on hemisphere {}", verts.len(), hemi);
        all_dists.extend(dists.iter());
    }
    Ok(Array1::from(all_dists))
}


/// Indices of the vertices whose distance is strictly below `radius` times the largest finite
/// distance, together with all vertices at distance 0 (the ROI itself).
///
/// Infinite distances never count towards the maximum and are never selected. Without any
/// finite distance, the result is empty.
pub fn vertices_within_radius(distances: ArrayView1<f64>, radius: f64) -> Result<Vec<usize>> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(CortexRoiError::InvalidRadius(radius));
    }
    let finite: Array1<f64> = distances.iter().cloned().filter(|d| d.is_finite()).collect();
    let max_dist = match finite.max() {
        Ok(m) => *m,
        Err(_) => {
            warn!("No vertex has a finite distance to the ROI");
            return Ok(Vec::new());
        }
    };
    let radi_edge = max_dist * radius;
    debug!("Largest ROI distance {}, radius edge {}", max_dist, radi_edge);

    Ok(distances
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d == 0.0 || d < radi_edge)
        .map(|(idx, _)| idx)
        .collect())
}


/// Select the vertices in the ROI `roi` of `subject` plus those within the proportional `radius`
/// of it, measuring distances on the surfaces of the given kind.
pub fn select_roi_vertices_on<D: SurfaceDatabase>(
    db: &D,
    subject: &str,
    roi: &str,
    radius: f64,
    kind: SurfaceKind,
) -> Result<VoiSet> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(CortexRoiError::InvalidRadius(radius));
    }
    let surfs = db.surfaces(subject, kind)?;
    let all_roi = db.roi_vertices(subject, roi)?;
    let total = surfs.total_vertices();
    if let Some(&bad) = all_roi.iter().find(|&&v| v >= total) {
        return Err(CortexRoiError::VertexIndexOutOfRange(bad, total));
    }

    let roi_verts = split_by_hemisphere(&all_roi, surfs.split_index());
    let all_dists = roi_distances(&surfs, &roi_verts)?;
    let vois = vertices_within_radius(all_dists.view(), radius)?;
    info!(
        "Selected {} vertices of interest for ROI '{}' ({} ROI vertices, radius {})",
        vois.len(),
        roi,
        all_roi.len(),
        radius
    );
    VoiSet::new(vois, total)
}


/// Select the vertices of interest on the database's default surfaces (fiducial unless configured
/// otherwise).
pub fn select_roi_vertices<D: SurfaceDatabase>(db: &D, subject: &str, roi: &str, radius: f64) -> Result<VoiSet> {
    select_roi_vertices_on(db, subject, roi, radius, db.surface_kind())
}
