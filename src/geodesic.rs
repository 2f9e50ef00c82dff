//! Geodesic distance on triangle meshes, approximated by shortest paths along mesh edges.

use ndarray::Array1;

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::{CortexRoiError, Result};
use crate::fs_surface::BrainMesh;
use crate::traits::GeodesicSurface;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    dist: f64,
    vertex: usize,
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed, the heap pops the smallest distance first.
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}


/// Multi-source Dijkstra over a weighted adjacency list. Every source starts at distance 0.
pub fn multi_source_dijkstra(adjacency: &[Vec<(usize, f64)>], sources: &[usize]) -> Result<Array1<f64>> {
    let num_vertices = adjacency.len();
    let mut dist = Array1::<f64>::from_elem(num_vertices, f64::INFINITY);
    let mut heap = BinaryHeap::with_capacity(sources.len());

    for &src in sources {
        if src >= num_vertices {
            return Err(CortexRoiError::VertexIndexOutOfRange(src, num_vertices));
        }
        if dist[src] != 0.0 {
            dist[src] = 0.0;
            heap.push(Candidate { dist: 0.0, vertex: src });
        }
    }

    while let Some(Candidate { dist: d, vertex }) = heap.pop() {
        if d > dist[vertex] {
            continue;
        }
        for &(neighbor, len) in adjacency[vertex].iter() {
            let next = d + len;
            if next < dist[neighbor] {
                dist[neighbor] = next;
                heap.push(Candidate { dist: next, vertex: neighbor });
            }
        }
    }
    Ok(dist)
}


impl GeodesicSurface for BrainMesh {
    fn num_vertices(&self) -> usize {
        BrainMesh::num_vertices(self)
    }

    fn geodesic_distance(&self, sources: &[usize]) -> Result<Array1<f64>> {
        let adjacency = self.vertex_adjacency()?;
        multi_source_dijkstra(&adjacency, sources)
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    /// A 1 x 4 strip of unit squares, vertices 0..5 on the bottom row and 5..10 on top.
    fn strip() -> BrainMesh {
        let mut coords: Vec<f32> = Vec::new();
        for y in 0..2 {
            for x in 0..5 {
                coords.extend_from_slice(&[x as f32, y as f32, 0.0]);
            }
        }
        let mut faces: Vec<i32> = Vec::new();
        for x in 0..4 {
            faces.extend_from_slice(&[x, x + 1, x + 5]);
            faces.extend_from_slice(&[x + 1, x + 6, x + 5]);
        }
        BrainMesh::new(
            Array2::from_shape_vec((10, 3), coords).unwrap(),
            Array2::from_shape_vec((8, 3), faces).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn sources_have_zero_distance() {
        let dist = strip().geodesic_distance(&[0, 7]).unwrap();
        assert_eq!(0.0, dist[0]);
        assert_eq!(0.0, dist[7]);
    }

    #[test]
    fn distances_follow_mesh_edges() {
        let dist = strip().geodesic_distance(&[0]).unwrap();
        assert_abs_diff_eq!(dist[4], 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(dist[5], 1.0, epsilon = 1e-9);
        // 0 -> 5 -> 1 or 0 -> 1 -> 6 style paths, the diagonal edges run from x+1 to x+5.
        assert_abs_diff_eq!(dist[6], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(dist[9], 5.0, epsilon = 1e-9);
    }

    #[test]
    fn the_closest_source_wins() {
        let dist = strip().geodesic_distance(&[0, 4]).unwrap();
        assert_abs_diff_eq!(dist[2], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(dist[3], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn no_sources_means_everything_is_unreachable() {
        let dist = strip().geodesic_distance(&[]).unwrap();
        assert!(dist.iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn out_of_range_sources_are_rejected() {
        assert!(strip().geodesic_distance(&[10]).is_err());
    }

    #[test]
    fn disconnected_vertices_stay_infinite() {
        let adjacency = vec![vec![(1, 1.0)], vec![(0, 1.0)], vec![]];
        let dist = multi_source_dijkstra(&adjacency, &[0]).unwrap();
        assert_eq!(array![0.0, 1.0, f64::INFINITY], dist);
    }
}
