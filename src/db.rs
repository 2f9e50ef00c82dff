//! Access to per-subject surfaces, ROIs and transforms.
//!
//! [`SurfaceDatabase`] is what the ROI selection and projection code consumes. [`FsSubjectsDir`]
//! implements it on top of a FreeSurfer subjects directory:
//!
//! ```text
//! <subjects_dir>/<subject>/surf/{lh,rh}.{white,pial,inflated}
//! <subjects_dir>/<subject>/label/{lh,rh}.<roi>.label
//! <subjects_dir>/<subject>/label/{lh,rh}.<annot>.annot
//! <subjects_dir>/<subject>/xfms/<xfm>.xfm
//! ```

use log::debug;
use serde::Deserialize;

use std::path::{Path, PathBuf};

use crate::config::RoiConfig;
use crate::error::{CortexRoiError, Result};
use crate::fs_annot::read_annot;
use crate::fs_label::read_label;
use crate::fs_surface::{read_surf, BrainMesh, FsSurfaceHeader};
use crate::mapper::{MapperMethod, SampledMapper};
use crate::traits::{GeodesicSurface, VoxelMapper};
use crate::util::open_maybe_gz;
use crate::volume::DEFAULT_COLORMAP;
use crate::xfm::Xfm;

/// A pair of per-hemisphere values, left first.
#[derive(Debug, Clone, PartialEq)]
pub struct Hemispheres<T> {
    pub lh: T,
    pub rh: T,
}

impl<T> Hemispheres<T> {
    pub fn as_array(&self) -> [&T; 2] {
        [&self.lh, &self.rh]
    }
}

impl<T: GeodesicSurface> Hemispheres<T> {
    /// Global vertex index of the first right hemisphere vertex.
    pub fn split_index(&self) -> usize {
        self.lh.num_vertices()
    }

    pub fn total_vertices(&self) -> usize {
        self.lh.num_vertices() + self.rh.num_vertices()
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    White,
    Pial,
    Inflated,
    /// Midway between white and pial.
    Fiducial,
}

impl Default for SurfaceKind {
    fn default() -> Self {
        SurfaceKind::Fiducial
    }
}


/// The geometry and ROI provider for vertex selection and feature projection.
pub trait SurfaceDatabase {
    type Surface: GeodesicSurface;
    type Mapper: VoxelMapper;

    /// The left and right hemisphere surfaces of the subject.
    fn surfaces(&self, subject: &str, kind: SurfaceKind) -> Result<Hemispheres<Self::Surface>>;

    /// Global vertex indices of the ROI, left hemisphere first, right hemisphere indices offset by
    /// the left hemisphere vertex count. Unknown names are [`CortexRoiError::UnknownRoi`].
    fn roi_vertices(&self, subject: &str, roi: &str) -> Result<Vec<usize>>;

    fn transform(&self, subject: &str, xfm: &str) -> Result<Xfm>;

    fn mapper(&self, subject: &str, xfm: &str, method: MapperMethod) -> Result<Self::Mapper>;

    /// The surface ROI distances are measured on when no kind is given.
    fn surface_kind(&self) -> SurfaceKind {
        SurfaceKind::default()
    }

    /// The mapper used when no method is given.
    fn mapper_method(&self) -> MapperMethod {
        MapperMethod::default()
    }

    /// The colormap attached to rescaled volumes.
    fn colormap(&self) -> &str {
        DEFAULT_COLORMAP
    }
}


/// A [`SurfaceDatabase`] reading from a FreeSurfer subjects directory.
#[derive(Debug, Clone, PartialEq)]
pub struct FsSubjectsDir {
    pub subjects_dir: PathBuf,
    /// Atlas name used for ROIs without a label file, e.g. `aparc` for `lh.aparc.annot`.
    pub annot: Option<String>,
    pub mapper_samples: usize,
    pub surface: SurfaceKind,
    pub mapper_method: MapperMethod,
    pub colormap: String,
}

const HEMIS: [&str; 2] = ["lh", "rh"];

impl FsSubjectsDir {
    pub fn new<P: AsRef<Path>>(subjects_dir: P) -> FsSubjectsDir {
        FsSubjectsDir {
            subjects_dir: subjects_dir.as_ref().to_path_buf(),
            annot: None,
            mapper_samples: crate::config::DEFAULT_MAPPER_SAMPLES,
            surface: SurfaceKind::default(),
            mapper_method: MapperMethod::default(),
            colormap: String::from(DEFAULT_COLORMAP),
        }
    }

    pub fn from_config(config: &RoiConfig) -> FsSubjectsDir {
        FsSubjectsDir {
            subjects_dir: config.subjects_dir.clone(),
            annot: config.annot.clone(),
            mapper_samples: config.mapper.samples,
            surface: config.surface,
            mapper_method: config.mapper.method,
            colormap: config.colormap.clone(),
        }
    }

    fn subject_dir(&self, subject: &str) -> Result<PathBuf> {
        let dir = self.subjects_dir.join(subject);
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(CortexRoiError::UnknownSubject(String::from(subject)))
        }
    }

    fn read_hemis(&self, subject: &str, surf_name: &str) -> Result<Hemispheres<BrainMesh>> {
        let surf_dir = self.subject_dir(subject)?.join("surf");
        let lh = read_surf(surf_dir.join(format!("lh.{}", surf_name)))?.mesh;
        let rh = read_surf(surf_dir.join(format!("rh.{}", surf_name)))?.mesh;
        debug!(
            "Loaded {} surfaces of subject '{}': {} + {} vertices",
            surf_name,
            subject,
            lh.num_vertices(),
            rh.num_vertices()
        );
        Ok(Hemispheres { lh, rh })
    }

    /// Number of left hemisphere vertices, read from the white surface header only.
    fn split_index(&self, subject: &str) -> Result<usize> {
        let path = self.subject_dir(subject)?.join("surf").join("lh.white");
        let mut input = open_maybe_gz(path)?;
        let hdr = FsSurfaceHeader::from_reader(&mut input)?;
        Ok(hdr.num_vertices as usize)
    }

    /// Per-hemisphere local ROI vertices from label files, if at least one exists.
    fn label_roi(&self, label_dir: &Path, roi: &str) -> Result<Option<[Vec<usize>; 2]>> {
        let paths: Vec<PathBuf> = HEMIS.iter().map(|h| label_dir.join(format!("{}.{}.label", h, roi))).collect();
        if !paths.iter().any(|p| p.is_file()) {
            return Ok(None);
        }
        let mut verts: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
        for (dst, path) in verts.iter_mut().zip(paths.iter()) {
            if path.is_file() {
                *dst = read_label(path)?.vertex_indices();
            }
        }
        Ok(Some(verts))
    }

    /// Per-hemisphere local ROI vertices from the configured annot, if it has the region.
    fn annot_roi(&self, label_dir: &Path, roi: &str) -> Result<Option<[Vec<usize>; 2]>> {
        let atlas = match &self.annot {
            Some(a) => a,
            None => return Ok(None),
        };
        let mut verts: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
        let mut found = false;
        for (dst, hemi) in verts.iter_mut().zip(HEMIS.iter()) {
            let path = label_dir.join(format!("{}.{}.annot", hemi, atlas));
            if !path.is_file() {
                continue;
            }
            let annot = read_annot(&path)?;
            if annot.has_region(roi) {
                *dst = annot.region_vertices(roi)?;
                found = true;
            }
        }
        Ok(if found { Some(verts) } else { None })
    }
}


impl SurfaceDatabase for FsSubjectsDir {
    type Surface = BrainMesh;
    type Mapper = SampledMapper;

    fn surfaces(&self, subject: &str, kind: SurfaceKind) -> Result<Hemispheres<BrainMesh>> {
        match kind {
            SurfaceKind::White => self.read_hemis(subject, "white"),
            SurfaceKind::Pial => self.read_hemis(subject, "pial"),
            SurfaceKind::Inflated => self.read_hemis(subject, "inflated"),
            SurfaceKind::Fiducial => {
                let white = self.read_hemis(subject, "white")?;
                let pial = self.read_hemis(subject, "pial")?;
                Ok(Hemispheres {
                    lh: BrainMesh::fiducial(&white.lh, &pial.lh)?,
                    rh: BrainMesh::fiducial(&white.rh, &pial.rh)?,
                })
            }
        }
    }

    fn roi_vertices(&self, subject: &str, roi: &str) -> Result<Vec<usize>> {
        let label_dir = self.subject_dir(subject)?.join("label");
        let local = match self.label_roi(&label_dir, roi)? {
            Some(v) => v,
            None => self
                .annot_roi(&label_dir, roi)?
                .ok_or_else(|| CortexRoiError::UnknownRoi(String::from(roi)))?,
        };
        let numl = self.split_index(subject)?;
        let [lh, rh] = local;
        let mut global: Vec<usize> = Vec::with_capacity(lh.len() + rh.len());
        for v in lh {
            if v >= numl {
                return Err(CortexRoiError::VertexIndexOutOfRange(v, numl));
            }
            global.push(v);
        }
        global.extend(rh.into_iter().map(|v| v + numl));
        Ok(global)
    }

    fn transform(&self, subject: &str, xfm: &str) -> Result<Xfm> {
        let path = self.subject_dir(subject)?.join("xfms").join(format!("{}.xfm", xfm));
        if !path.is_file() {
            return Err(CortexRoiError::UnknownXfm(String::from(xfm)));
        }
        Xfm::from_file(xfm, path)
    }

    fn mapper(&self, subject: &str, xfm: &str, method: MapperMethod) -> Result<SampledMapper> {
        let transform = self.transform(subject, xfm)?;
        let white = self.read_hemis(subject, "white")?;
        let pial = self.read_hemis(subject, "pial")?;
        SampledMapper::new(&white, &pial, &transform, method, self.mapper_samples)
    }

    fn surface_kind(&self) -> SurfaceKind {
        self.surface
    }

    fn mapper_method(&self) -> MapperMethod {
        self.mapper_method
    }

    fn colormap(&self) -> &str {
        &self.colormap
    }
}

