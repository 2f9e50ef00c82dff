//! Functions for reading FreeSurfer label files.
//!
//! A label is an ASCII file listing a subset of the vertices of one hemisphere, typically
//! an anatomical region. After a comment line and a line with the vertex count, each line holds
//! the 0-based vertex index, the x, y and z coordinates and a scalar value.


use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{CortexRoiError, Result};


/// One vertex entry of a label.
#[derive(Debug, Clone, PartialEq)]
pub struct FsLabelVertex {
    pub index: i32,
    pub coord1: f32,
    pub coord2: f32,
    pub coord3: f32,
    pub value: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FsLabel {
    pub vertexes: Vec<FsLabelVertex>,
}


impl FsLabel {
    /// The vertex indices of the label, as local indices into the hemisphere mesh.
    pub fn vertex_indices(&self) -> Vec<usize> {
        self.vertexes.iter().map(|v| v.index as usize).collect()
    }

    pub fn from_reader<R: BufRead>(input: R) -> Result<FsLabel> {
        let mut lines = input.lines();

        // The first line is a free text comment.
        if lines.next().transpose()?.is_none() {
            return Err(CortexRoiError::InvalidFsLabelFormat(String::from("empty file")));
        }

        let count_line = lines
            .next()
            .transpose()?
            .ok_or_else(|| CortexRoiError::InvalidFsLabelFormat(String::from("missing vertex count")))?;
        let num_vertexes: usize = count_line
            .trim()
            .parse()
            .map_err(|_| CortexRoiError::InvalidFsLabelFormat(format!("bad vertex count '{}'", count_line.trim())))?;

        let mut vertexes: Vec<FsLabelVertex> = Vec::with_capacity(num_vertexes);
        for line in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            vertexes.push(parse_vertex_line(&line)?);
        }

        if vertexes.len() != num_vertexes {
            return Err(CortexRoiError::InvalidFsLabelFormat(format!(
                "header announces {} vertices, found {}",
                num_vertexes,
                vertexes.len()
            )));
        }
        Ok(FsLabel { vertexes })
    }
}


fn parse_vertex_line(line: &str) -> Result<FsLabelVertex> {
    let bad_line = || CortexRoiError::InvalidFsLabelFormat(format!("bad vertex line '{}'", line));
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(bad_line());
    }
    let index: i32 = fields[0].parse().map_err(|_| bad_line())?;
    if index < 0 {
        return Err(bad_line());
    }
    let mut coords = [0f32; 4];
    for (dst, src) in coords.iter_mut().zip(fields[1..].iter()) {
        *dst = src.parse().map_err(|_| bad_line())?;
    }
    Ok(FsLabelVertex {
        index,
        coord1: coords[0],
        coord2: coords[1],
        coord3: coords[2],
        value: coords[3],
    })
}


/// Read a FreeSurfer ASCII label file, like `lh.cortex.label`.
pub fn read_label<P: AsRef<Path>>(path: P) -> Result<FsLabel> {
    let file = BufReader::new(File::open(path)?);
    FsLabel::from_reader(file)
}
