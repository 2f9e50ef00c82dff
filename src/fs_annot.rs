//! Functions for managing FreeSurfer brain surface parcellations in annot files.
//!
//! These files assign each vertex of a brain surface mesh to exactly one brain region
//! or label. A so-called colortable contains data on the regions, including the region's
//! name, an RGB display color, and a unique identifier.

use byteordered::ByteOrdered;

use std::fmt;
use std::io::Read;
use std::path::Path;

use crate::error::{CortexRoiError, Result};
use crate::util::{open_maybe_gz, read_fixed_length_string};


#[derive(Debug, Clone, PartialEq)]
pub struct FsAnnotColortable {
    pub id: Vec<i32>,
    pub name: Vec<String>,
    pub r: Vec<i32>,
    pub g: Vec<i32>,
    pub b: Vec<i32>,
    pub a: Vec<i32>,
    pub label: Vec<i32>, // Computed from r,g,b,a. Used in annot.vertex_labels to identify the region.
}

impl FsAnnotColortable {

    /// Read a colortable in format version 2 from a reader. The reader must be positioned at the original colortable filename length.
    pub fn from_reader<S>(input: &mut S) -> Result<FsAnnotColortable>
    where
        S: Read,
    {
        let mut input = ByteOrdered::be(input);

        let num_chars_orig_filename: i32 = input.read_i32()?;
        if num_chars_orig_filename < 0 {
            return Err(CortexRoiError::UnsupportedFsAnnotFormatVersion);
        }
        let _orig_filename = read_fixed_length_string(&mut input, num_chars_orig_filename as usize)?;
        let num_entries: i32 = input.read_i32()?; // Stored a second time, this is the one to use.
        if num_entries < 0 {
            return Err(CortexRoiError::UnsupportedFsAnnotFormatVersion);
        }
        let num_entries = num_entries as usize;

        let mut ct = FsAnnotColortable {
            id: Vec::with_capacity(num_entries),
            name: Vec::with_capacity(num_entries),
            r: Vec::with_capacity(num_entries),
            g: Vec::with_capacity(num_entries),
            b: Vec::with_capacity(num_entries),
            a: Vec::with_capacity(num_entries),
            label: Vec::with_capacity(num_entries),
        };

        for _ in 0..num_entries {
            ct.id.push(input.read_i32()?);
            let num_chars_region_name: i32 = input.read_i32()?;
            if num_chars_region_name < 0 {
                return Err(CortexRoiError::UnsupportedFsAnnotFormatVersion);
            }
            ct.name.push(read_fixed_length_string(&mut input, num_chars_region_name as usize)?);
            let (r, g, b, a) = (input.read_i32()?, input.read_i32()?, input.read_i32()?, input.read_i32()?);
            ct.r.push(r);
            ct.g.push(g);
            ct.b.push(b);
            ct.a.push(a);
            ct.label.push(colortable_label(r, g, b, a));
        }

        Ok(ct)
    }
}

/// The unique region label FreeSurfer derives from the region color.
pub fn colortable_label(r: i32, g: i32, b: i32, a: i32) -> i32 {
    r + g * (1 << 8) + b * (1 << 16) + a.wrapping_mul(1 << 24)
}

impl fmt::Display for FsAnnotColortable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Colortable for {} brain regions.", self.id.len())
    }
}


/// Models a FreeSurfer brain surface parcellation from an annot file. The `vertex_labels` field
/// contains the mesh vertices in order, and assigns to each vertex a brain region using the `label`
/// field (not the `id` field!) from the `colortable`.
#[derive(Debug, Clone, PartialEq)]
pub struct FsAnnot {
    pub vertex_indices: Vec<i32>,
    pub vertex_labels: Vec<i32>,
    pub colortable: FsAnnotColortable,
}

impl FsAnnot {
    /// Read an FsAnnot instance from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<FsAnnot> {
        let mut input = open_maybe_gz(path)?;
        FsAnnot::from_reader(&mut input)
    }

    pub fn from_reader<S>(input: &mut S) -> Result<FsAnnot>
    where
        S: Read,
    {
        let mut input = ByteOrdered::be(input);

        let num_vertices: i32 = input.read_i32()?;
        if num_vertices < 0 {
            return Err(CortexRoiError::UnsupportedFsAnnotFormatVersion);
        }

        let mut vertex_indices: Vec<i32> = Vec::with_capacity(num_vertices as usize);
        let mut vertex_labels: Vec<i32> = Vec::with_capacity(num_vertices as usize);
        for _ in 0..num_vertices {
            vertex_indices.push(input.read_i32()?);
            vertex_labels.push(input.read_i32()?);
        }

        let has_colortable: i32 = input.read_i32()?;
        if has_colortable != 1 {
            return Err(CortexRoiError::UnsupportedFsAnnotFormatVersion);
        }

        // A negative value encodes the format version, only version 2 is supported.
        let colortable_version: i32 = input.read_i32()?;
        if colortable_version != -2 {
            return Err(CortexRoiError::UnsupportedFsAnnotFormatVersion);
        }
        let _max_structure_id: i32 = input.read_i32()?;

        let colortable = FsAnnotColortable::from_reader(&mut input)?;

        Ok(FsAnnot {
            vertex_indices,
            vertex_labels,
            colortable,
        })
    }

    /// Get the region names contained in the [`FsAnnot`] struct.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// let annot = cortexroi::read_annot("/path/to/subjects_dir/subject1/label/lh.aparc.annot").unwrap();
    /// annot.regions();
    /// ```
    pub fn regions(&self) -> Vec<String> {
        self.colortable.name.clone()
    }

    pub fn has_region(&self, region: &str) -> bool {
        self.colortable.name.iter().any(|x| x == region)
    }

    /// Get the indices of all vertices which are part of the given brain region.
    ///
    /// Note that it can happen that no vertices are assigned to the region, in which case the result vector is empty.
    /// A region name missing from the colortable is an [`CortexRoiError::UnknownRoi`] error.
    pub fn region_vertices(&self, region: &str) -> Result<Vec<usize>> {
        let region_idx = self
            .colortable
            .name
            .iter()
            .position(|x| x == region)
            .ok_or_else(|| CortexRoiError::UnknownRoi(String::from(region)))?;
        let region_label = self.colortable.label[region_idx];

        Ok(self
            .vertex_labels
            .iter()
            .enumerate()
            .filter(|(_, vlabel)| **vlabel == region_label)
            .map(|(idx, _)| idx)
            .collect())
    }
}


impl fmt::Display for FsAnnot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Surface parcellation assigning {} vertices to {} brain regions.", self.vertex_indices.len(), self.colortable.id.len())
    }
}


/// Read a brain parcellation from a FreeSurfer annot file.
///
/// # Examples
///
/// ```no_run
/// let annot = cortexroi::read_annot("/path/to/subjects_dir/subject1/label/lh.aparc.annot").unwrap();
/// println!("Annotation assigns the {} brain mesh vertices to {} different regions.", annot.vertex_indices.len(), annot.regions().len());
/// ```
pub fn read_annot<P: AsRef<Path>>(path: P) -> Result<FsAnnot> {
    FsAnnot::from_file(path)
}
