// Reading and writing of FreeSurfer triangle meshes in binary 'surf' files (lh.white, rh.pial, ...).
// Vertex coordinates are stored as big endian f32 triplets, faces as i32 vertex index triplets.


use byteordered::ByteOrdered;
use flate2::write::GzEncoder;
use flate2::Compression;
use ndarray::{Array2, ArrayView1, Zip};

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::error::{CortexRoiError, Result};
use crate::util::{is_gz_file, open_maybe_gz, read_double_newline_terminated_string};

pub const TRIS_MAGIC_FILE_TYPE_NUMBER: i32 = 16777214;

#[derive(Debug, Clone, PartialEq)]
pub struct FsSurfaceHeader {
    pub surf_magic: [u8; 3],
    pub info_line: String,
    pub num_vertices: i32,
    pub num_faces: i32,
}


impl Default for FsSurfaceHeader {
    fn default() -> FsSurfaceHeader {
        FsSurfaceHeader {
            surf_magic: [255, 255, 254],
            info_line: String::from(""),
            num_vertices: 0,
            num_faces: 0,
        }
    }
}

impl FsSurfaceHeader {

    /// Read an FsSurface header from the given byte stream.
    /// It is assumed that the input is currently at the start of the
    /// FsSurface header. After this, the input is positioned at the first vertex coordinate.
    pub fn from_reader<S>(input: &mut S) -> Result<FsSurfaceHeader>
    where
        S: Read,
    {
        let mut hdr = FsSurfaceHeader::default();

        let mut input = ByteOrdered::be(input);

        for v in &mut hdr.surf_magic {
            *v = input.read_u8()?;
        }

        let magic: i32 = interpret_fs_int24(hdr.surf_magic[0], hdr.surf_magic[1], hdr.surf_magic[2]);
        if magic != TRIS_MAGIC_FILE_TYPE_NUMBER {
            return Err(CortexRoiError::InvalidFsSurfaceFormat);
        }

        hdr.info_line = read_double_newline_terminated_string(&mut input)?;
        hdr.num_vertices = input.read_i32()?;
        hdr.num_faces = input.read_i32()?;

        if hdr.num_vertices < 0 || hdr.num_faces < 0 {
            return Err(CortexRoiError::InvalidFsSurfaceFormat);
        }

        Ok(hdr)
    }
}


/// Interpret three bytes as a single 24 bit integer, FreeSurfer style.
pub fn interpret_fs_int24(b1: u8, b2: u8, b3: u8) -> i32 {
    let c1 = (b1 as u32).checked_shl(16).unwrap_or(0);
    let c2 = (b2 as u32).checked_shl(8).unwrap_or(0);
    let c3 = b3 as u32;

    (c1 + c2 + c3) as i32
}


// An FsSurface object
#[derive(Debug, PartialEq, Clone)]
pub struct FsSurface {
    pub header: FsSurfaceHeader,
    pub mesh: BrainMesh,
}

/// A triangular brain mesh. The `vertices` hold one x,y,z row per vertex, the `faces`
/// hold three vertex indices per row.
#[derive(Debug, PartialEq, Clone)]
pub struct BrainMesh {
    pub vertices: Array2<f32>,
    pub faces: Array2<i32>,
}


impl BrainMesh {
    /// Create a mesh, checking that both arrays have 3 columns and that all faces reference existing vertices.
    pub fn new(vertices: Array2<f32>, faces: Array2<i32>) -> Result<BrainMesh> {
        if vertices.ncols() != 3 {
            return Err(CortexRoiError::DimensionMismatch(String::from("mesh vertex coordinates"), 3, vertices.ncols()));
        }
        if faces.ncols() != 3 {
            return Err(CortexRoiError::DimensionMismatch(String::from("mesh face vertex count"), 3, faces.ncols()));
        }
        let num_vertices = vertices.nrows();
        if let Some(&bad) = faces.iter().find(|&&v| v < 0 || v as usize >= num_vertices) {
            return Err(CortexRoiError::VertexIndexOutOfRange(bad.max(0) as usize, num_vertices));
        }
        Ok(BrainMesh { vertices, faces })
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.nrows()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.nrows()
    }

    /// The x,y,z coordinate of a vertex.
    pub fn vertex(&self, index: usize) -> ArrayView1<f32> {
        self.vertices.row(index)
    }

    /// Euclidean distance between two vertices.
    pub fn edge_length(&self, a: usize, b: usize) -> f64 {
        let pa = self.vertices.row(a);
        let pb = self.vertices.row(b);
        pa.iter()
            .zip(pb.iter())
            .map(|(x, y)| ((*x - *y) as f64).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    /// Per-vertex neighbor lists with the Euclidean length of each connecting edge.
    /// Every undirected edge of the mesh shows up once in the list of each of its two vertices.
    pub fn vertex_adjacency(&self) -> Result<Vec<Vec<(usize, f64)>>> {
        let num_vertices = self.num_vertices();
        let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); num_vertices];
        for face in self.faces.outer_iter() {
            for (i, j) in [(0, 1), (1, 2), (2, 0)].iter() {
                let a = checked_index(face[*i], num_vertices)?;
                let b = checked_index(face[*j], num_vertices)?;
                if a == b {
                    continue;
                }
                if !adjacency[a].iter().any(|(n, _)| *n == b) {
                    let len = self.edge_length(a, b);
                    adjacency[a].push((b, len));
                    adjacency[b].push((a, len));
                }
            }
        }
        Ok(adjacency)
    }

    /// The vertex-wise midpoint of two meshes with identical topology, usually the white and pial surfaces.
    pub fn fiducial(white: &BrainMesh, pial: &BrainMesh) -> Result<BrainMesh> {
        if white.vertices.dim() != pial.vertices.dim() || white.faces != pial.faces {
            return Err(CortexRoiError::SurfaceMismatch);
        }
        let mut vertices = Array2::<f32>::zeros(white.vertices.dim());
        Zip::from(&mut vertices)
            .and(&white.vertices)
            .and(&pial.vertices)
            .apply(|m, &w, &p| *m = (w + p) / 2.0);
        Ok(BrainMesh { vertices, faces: white.faces.clone() })
    }
}


fn checked_index(index: i32, num_vertices: usize) -> Result<usize> {
    if index < 0 || index as usize >= num_vertices {
        return Err(CortexRoiError::VertexIndexOutOfRange(index.max(0) as usize, num_vertices));
    }
    Ok(index as usize)
}


/// Read a FreeSurfer brain mesh from a surf file, like `lh.white`.
pub fn read_surf<P: AsRef<Path>>(path: P) -> Result<FsSurface> {
    FsSurface::from_file(path)
}


impl FsSurface {
    /// Read an FsSurface instance from a file.
    /// If the file's name ends with ".gz", the file is assumed to need GZip decoding. This is not typically the case
    /// for FreeSurfer Surface files, but very handy (and it helps us to reduce the size of our test data).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<FsSurface> {
        let mut input = open_maybe_gz(path)?;
        FsSurface::from_reader(&mut input)
    }

    /// Read the header and the mesh from a single stream.
    pub fn from_reader<S>(input: &mut S) -> Result<FsSurface>
    where
        S: Read,
    {
        let hdr = FsSurfaceHeader::from_reader(input)?;
        let mesh = FsSurface::mesh_from_reader(input, &hdr)?;
        Ok(FsSurface { header: hdr, mesh })
    }

    /// Read the mesh data, the input must be positioned directly after the header.
    pub fn mesh_from_reader<S>(input: &mut S, hdr: &FsSurfaceHeader) -> Result<BrainMesh>
    where
        S: Read,
    {
        let mut input = ByteOrdered::be(input);

        let num_vertices = hdr.num_vertices as usize;
        let num_faces = hdr.num_faces as usize;

        let mut vertex_data: Vec<f32> = Vec::with_capacity(num_vertices * 3);
        for _ in 0..num_vertices * 3 {
            vertex_data.push(input.read_f32()?);
        }

        let mut face_data: Vec<i32> = Vec::with_capacity(num_faces * 3);
        for _ in 0..num_faces * 3 {
            face_data.push(input.read_i32()?);
        }

        let vertices = Array2::from_shape_vec((num_vertices, 3), vertex_data)
            .map_err(|_| CortexRoiError::InvalidFsSurfaceFormat)?;
        let faces = Array2::from_shape_vec((num_faces, 3), face_data)
            .map_err(|_| CortexRoiError::InvalidFsSurfaceFormat)?;

        BrainMesh::new(vertices, faces)
    }

    /// Create a surface with a default header for the given mesh.
    pub fn from_mesh(mesh: BrainMesh, info_line: &str) -> FsSurface {
        let header = FsSurfaceHeader {
            info_line: String::from(info_line),
            num_vertices: mesh.num_vertices() as i32,
            num_faces: mesh.num_faces() as i32,
            ..FsSurfaceHeader::default()
        };
        FsSurface { header, mesh }
    }

    /// Write the surface in FreeSurfer surf format to the given stream.
    pub fn to_writer<W: Write>(&self, output: W) -> Result<()> {
        let mut output = ByteOrdered::be(output);
        for v in self.header.surf_magic.iter() {
            output.write_u8(*v)?;
        }
        output.write_all(self.header.info_line.as_bytes())?;
        output.write_all(b"\n\n")?;
        output.write_i32(self.mesh.num_vertices() as i32)?;
        output.write_i32(self.mesh.num_faces() as i32)?;
        for coord in self.mesh.vertices.iter() {
            output.write_f32(*coord)?;
        }
        for idx in self.mesh.faces.iter() {
            output.write_i32(*idx)?;
        }
        output.flush()?;
        Ok(())
    }

    /// Write the surface to a file, GZip compressed if the file name ends with ".gz".
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let gz = is_gz_file(&path);
        let file = BufWriter::new(File::create(path)?);
        if gz {
            let mut encoder = GzEncoder::new(file, Compression::default());
            self.to_writer(&mut encoder)?;
            encoder.finish()?;
            Ok(())
        } else {
            self.to_writer(file)
        }
    }
}
