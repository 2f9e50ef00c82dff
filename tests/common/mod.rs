//! Synthetic subjects shared by the integration tests.

#![allow(dead_code)]

use byteordered::ByteOrdered;
use ndarray::Array2;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use cortexroi::{
    BrainMesh, CortexRoiError, FsSurface, Hemispheres, MapperMethod, SampledMapper, Result,
    SurfaceDatabase, SurfaceKind, Xfm,
};

pub const NX: usize = 5;
pub const NY: usize = 4;
pub const HEMI_VERTICES: usize = NX * NY;
pub const GRID_SHAPE: [usize; 3] = [NX, 2 * NY, 2];
pub const SUBJECT: &str = "S1";
pub const XFM: &str = "fullhead";

/// A flat NX x NY grid of unit squares at height `z`, shifted by `y_offset`. Vertex `y * NX + x` sits at `(x, y + y_offset, z)`.
pub fn grid_mesh(y_offset: f32, z: f32) -> BrainMesh {
    let mut coords: Vec<f32> = Vec::with_capacity(HEMI_VERTICES * 3);
    for y in 0..NY {
        for x in 0..NX {
            coords.extend_from_slice(&[x as f32, y as f32 + y_offset, z]);
        }
    }
    let mut faces: Vec<i32> = Vec::new();
    for y in 0..NY - 1 {
        for x in 0..NX - 1 {
            let v = (y * NX + x) as i32;
            let nx = NX as i32;
            faces.extend_from_slice(&[v, v + 1, v + nx]);
            faces.extend_from_slice(&[v + 1, v + nx + 1, v + nx]);
        }
    }
    let num_faces = faces.len() / 3;
    BrainMesh::new(
        Array2::from_shape_vec((HEMI_VERTICES, 3), coords).unwrap(),
        Array2::from_shape_vec((num_faces, 3), faces).unwrap(),
    )
    .unwrap()
}

/// Left hemisphere in voxel rows y 0..NY, right hemisphere in y NY..2*NY. White at z 0, pial at z 1.
pub fn white() -> Hemispheres<BrainMesh> {
    Hemispheres { lh: grid_mesh(0.0, 0.0), rh: grid_mesh(NY as f32, 0.0) }
}

pub fn pial() -> Hemispheres<BrainMesh> {
    Hemispheres { lh: grid_mesh(0.0, 1.0), rh: grid_mesh(NY as f32, 1.0) }
}

/// The identity transform on the grid both hemispheres live in.
pub fn xfm() -> Xfm {
    Xfm::identity(XFM, GRID_SHAPE)
}

/// Global vertex index of grid position (x, y) on a hemisphere.
pub fn vertex(rh: bool, x: usize, y: usize) -> usize {
    y * NX + x + if rh { HEMI_VERTICES } else { 0 }
}

/// Feature value of row `r` at voxel (i, j, k). Constant along k, so the line average equals it.
pub fn feature_value(r: usize, i: usize, j: usize) -> f64 {
    (r as f64 + 1.0) * (i * 16 + j * 2) as f64
}

/// A features x voxels matrix over the full grid, row-major voxel order.
pub fn voxel_features(rows: usize) -> Array2<f64> {
    let [d0, d1, d2] = GRID_SHAPE;
    Array2::from_shape_fn((rows, d0 * d1 * d2), |(r, flat)| {
        let i = flat / (d1 * d2);
        let j = (flat / d2) % d1;
        feature_value(r, i, j)
    })
}

/// The value a global vertex is expected to get from [`voxel_features`].
pub fn expected_vertex_value(r: usize, global: usize) -> f64 {
    let rh = global >= HEMI_VERTICES;
    let local = global % HEMI_VERTICES;
    let (x, y) = (local % NX, local / NX);
    feature_value(r, x, y + if rh { NY } else { 0 })
}

/// A database holding the synthetic subject in memory.
pub struct MemoryDb {
    pub white: Hemispheres<BrainMesh>,
    pub pial: Hemispheres<BrainMesh>,
    pub rois: HashMap<String, Vec<usize>>,
    pub xfm: Xfm,
    pub samples: usize,
}

impl MemoryDb {
    pub fn new() -> MemoryDb {
        let mut rois = HashMap::new();
        rois.insert(String::from("V1"), vec![vertex(false, 0, 0), vertex(false, 1, 0), vertex(true, 0, 0)]);
        rois.insert(String::from("MT"), vec![vertex(false, 2, 1)]);
        MemoryDb { white: white(), pial: pial(), rois, xfm: xfm(), samples: 2 }
    }

    fn check_subject(&self, subject: &str) -> Result<()> {
        if subject == SUBJECT {
            Ok(())
        } else {
            Err(CortexRoiError::UnknownSubject(String::from(subject)))
        }
    }
}

impl SurfaceDatabase for MemoryDb {
    type Surface = BrainMesh;
    type Mapper = SampledMapper;

    fn surfaces(&self, subject: &str, kind: SurfaceKind) -> Result<Hemispheres<BrainMesh>> {
        self.check_subject(subject)?;
        match kind {
            SurfaceKind::Pial => Ok(self.pial.clone()),
            SurfaceKind::Fiducial => Ok(Hemispheres {
                lh: BrainMesh::fiducial(&self.white.lh, &self.pial.lh)?,
                rh: BrainMesh::fiducial(&self.white.rh, &self.pial.rh)?,
            }),
            _ => Ok(self.white.clone()),
        }
    }

    fn roi_vertices(&self, subject: &str, roi: &str) -> Result<Vec<usize>> {
        self.check_subject(subject)?;
        self.rois.get(roi).cloned().ok_or_else(|| CortexRoiError::UnknownRoi(String::from(roi)))
    }

    fn transform(&self, subject: &str, xfm: &str) -> Result<Xfm> {
        self.check_subject(subject)?;
        if xfm == self.xfm.name {
            Ok(self.xfm.clone())
        } else {
            Err(CortexRoiError::UnknownXfm(String::from(xfm)))
        }
    }

    fn mapper(&self, subject: &str, xfm: &str, method: MapperMethod) -> Result<SampledMapper> {
        let transform = self.transform(subject, xfm)?;
        SampledMapper::new(&self.white, &self.pial, &transform, method, self.samples)
    }
}


fn write_label(path: &Path, local_vertices: &[usize]) {
    let mut content = format!("#!ascii label  , from subject {} vox2ras=TkReg\n{}\n", SUBJECT, local_vertices.len());
    for v in local_vertices {
        let (x, y) = (v % NX, v / NX);
        content.push_str(&format!("{}  {}.000  {}.000  0.000 0.0000000000\n", v, x, y));
    }
    fs::write(path, content).unwrap();
}

/// Write an annot assigning the listed local vertices to region `name`, all others to `unknown`.
fn write_annot(path: &Path, name: &str, local_vertices: &[usize]) {
    let regions: [(&str, [i32; 3]); 2] = [("unknown", [25, 5, 25]), (name, [200, 30, 10])];
    let label = |[r, g, b]: [i32; 3]| r + g * 256 + b * 65536;

    let mut buffer: Vec<u8> = Vec::new();
    {
        let mut out = ByteOrdered::be(&mut buffer);
        out.write_i32(HEMI_VERTICES as i32).unwrap();
        for v in 0..HEMI_VERTICES {
            let region = if local_vertices.contains(&v) { 1 } else { 0 };
            out.write_i32(v as i32).unwrap();
            out.write_i32(label(regions[region].1)).unwrap();
        }
        out.write_i32(1).unwrap();
        out.write_i32(-2).unwrap();
        out.write_i32(2).unwrap();
        out.write_i32(0).unwrap();
        out.write_i32(2).unwrap();
        for (id, (region_name, [r, g, b])) in regions.iter().enumerate() {
            out.write_i32(id as i32).unwrap();
            out.write_i32(region_name.len() as i32).unwrap();
            for c in region_name.bytes() {
                out.write_u8(c).unwrap();
            }
            for v in [*r, *g, *b, 0].iter() {
                out.write_i32(*v).unwrap();
            }
        }
    }
    fs::write(path, buffer).unwrap();
}

/// Write the synthetic subject as a FreeSurfer subjects directory, with the same data as [`MemoryDb`].
/// ROI `V1` comes from label files on both hemispheres, ROI `MT` from the `aparc` annot on the left hemisphere only.
pub fn write_subjects_dir(subjects_dir: &Path) {
    let subject_dir = subjects_dir.join(SUBJECT);
    for sub in ["surf", "label", "xfms"].iter() {
        fs::create_dir_all(subject_dir.join(sub)).unwrap();
    }
    let surf_dir = subject_dir.join("surf");
    let (w, p) = (white(), pial());
    FsSurface::from_mesh(w.lh, "fixture").to_file(surf_dir.join("lh.white")).unwrap();
    FsSurface::from_mesh(w.rh, "fixture").to_file(surf_dir.join("rh.white")).unwrap();
    FsSurface::from_mesh(p.lh, "fixture").to_file(surf_dir.join("lh.pial")).unwrap();
    FsSurface::from_mesh(p.rh, "fixture").to_file(surf_dir.join("rh.pial")).unwrap();

    let label_dir = subject_dir.join("label");
    write_label(&label_dir.join("lh.V1.label"), &[0, 1]);
    write_label(&label_dir.join("rh.V1.label"), &[0]);
    write_annot(&label_dir.join("lh.aparc.annot"), "MT", &[7]);
    write_annot(&label_dir.join("rh.aparc.annot"), "FFA", &[3]);

    fs::write(
        subject_dir.join("xfms").join(format!("{}.xfm", XFM)),
        format!("shape {} {} {}\n1 0 0 0\n0 1 0 0\n0 0 1 0\n", GRID_SHAPE[0], GRID_SHAPE[1], GRID_SHAPE[2]),
    )
    .unwrap();
}

/// Write `voxel_features(frames)` as a float MGH volume with one frame per feature row.
pub fn write_feature_mgh(path: &Path, frames: usize) {
    let [d0, d1, d2] = GRID_SHAPE;
    let mut buffer: Vec<u8> = Vec::new();
    {
        let mut out = ByteOrdered::be(&mut buffer);
        out.write_i32(1).unwrap();
        for d in [d0, d1, d2, frames].iter() {
            out.write_i32(*d as i32).unwrap();
        }
        out.write_i32(3).unwrap();
        out.write_i32(0).unwrap();
        out.write_i16(0).unwrap();
    }
    buffer.resize(284, 0);
    {
        let mut out = ByteOrdered::be(&mut buffer);
        for r in 0..frames {
            for _k in 0..d2 {
                for j in 0..d1 {
                    for i in 0..d0 {
                        out.write_f32(feature_value(r, i, j) as f32).unwrap();
                    }
                }
            }
        }
    }
    fs::write(path, buffer).unwrap();
}
