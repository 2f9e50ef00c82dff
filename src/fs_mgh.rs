//! Functions for managing FreeSurfer brain volumes in binary 'MGH' files.
//!
//! A 4D MGH volume is a natural container for voxel-space feature data: the first three
//! dimensions form the voxel grid, the fourth dimension (the frames) holds the features.

use byteordered::ByteOrdered;
use ndarray::{Array, Array2, Array4, ArrayView3, Axis, ShapeBuilder};

use std::io::Read;
use std::path::Path;

use crate::error::{CortexRoiError, Result};
use crate::util::open_maybe_gz;

pub const MGH_VERSION: i32 = 1;

pub const MGH_DATA_START: usize = 284; // The index in bytes where the data part starts in an MGH file.

const MGH_HEADER_BASE_SIZE: usize = 30; // Bytes up to and including the is_ras_good flag.
const MGH_RAS_BLOCK_SIZE: usize = 60;

/// Models the header of a FreeSurfer MGH file containing a brain volume.
#[derive(Debug, Clone, PartialEq)]
pub struct FsMghHeader {
    pub mgh_format_version: i32,
    pub dim1len: i32,
    pub dim2len: i32,
    pub dim3len: i32,
    pub dim4len: i32, // aka "num_frames"
    pub dtype: i32,
    pub dof: i32,
    pub is_ras_good: i16,
    pub delta: [f32; 3],
    pub mdc_raw: [f32; 9],
    pub p_xyz_c: [f32; 3],
}


/// Models a FreeSurfer MGH file. Exactly one of the data fields is set, depending on `header.dtype`.
#[derive(Debug, Clone, PartialEq)]
pub struct FsMgh {
    pub header: FsMghHeader,
    pub data_mri_uchar: Option<Array4<u8>>,
    pub data_mri_float: Option<Array4<f32>>,
    pub data_mri_int: Option<Array4<i32>>,
    pub data_mri_short: Option<Array4<i16>>,
}


impl Default for FsMghHeader {
    fn default() -> FsMghHeader {
        FsMghHeader {
            mgh_format_version: MGH_VERSION,
            dim1len: 0,
            dim2len: 0,
            dim3len: 0,
            dim4len: 0,
            dtype: 1,
            dof: 0,
            is_ras_good: 0,
            delta: [0.; 3],
            mdc_raw: [0.; 9],
            p_xyz_c: [0.; 3],
        }
    }
}

/// The header of an MGH/MGZ file.
impl FsMghHeader {

    /// Read an MGH header from the given byte stream.
    /// It is assumed that the input is currently at the start of the
    /// header. The input is left at the end of the header fields, not at the data start.
    pub fn from_reader<S>(input: &mut S) -> Result<FsMghHeader>
    where
        S: Read,
    {
        let mut hdr = FsMghHeader::default();

        let mut input = ByteOrdered::be(input);

        hdr.mgh_format_version = input.read_i32()?;

        if hdr.mgh_format_version != MGH_VERSION {
            return Err(CortexRoiError::InvalidFsMghFormat);
        }

        hdr.dim1len = input.read_i32()?;
        hdr.dim2len = input.read_i32()?;
        hdr.dim3len = input.read_i32()?;
        hdr.dim4len = input.read_i32()?;

        if hdr.dimensions().iter().any(|&d| d < 0) {
            return Err(CortexRoiError::InvalidFsMghFormat);
        }

        hdr.dtype = input.read_i32()?;
        hdr.dof = input.read_i32()?;

        hdr.is_ras_good = input.read_i16()?;

        if hdr.is_ras_good == 1 {
            for idx in 0..3 { hdr.delta[idx] = input.read_f32()?; }
            for idx in 0..9 { hdr.mdc_raw[idx] = input.read_f32()?; }
            for idx in 0..3 { hdr.p_xyz_c[idx] = input.read_f32()?; }
        }
        Ok(hdr)
    }

    pub fn dimensions(&self) -> [i32; 4] {
        [self.dim1len, self.dim2len, self.dim3len, self.dim4len]
    }

    /// Number of voxels in one frame.
    pub fn num_voxels(&self) -> usize {
        (self.dim1len as usize) * (self.dim2len as usize) * (self.dim3len as usize)
    }

    /// Number of bytes consumed by [`FsMghHeader::from_reader`].
    fn size_read(&self) -> usize {
        if self.is_ras_good == 1 {
            MGH_HEADER_BASE_SIZE + MGH_RAS_BLOCK_SIZE
        } else {
            MGH_HEADER_BASE_SIZE
        }
    }
}


fn column_major<T>(hdr: &FsMghHeader, values: Vec<T>) -> Result<Array4<T>> {
    let shape = (
        hdr.dim1len as usize,
        hdr.dim2len as usize,
        hdr.dim3len as usize,
        hdr.dim4len as usize,
    );
    Array::from_shape_vec(shape.f(), values).map_err(|_| CortexRoiError::InvalidFsMghFormat)
}


impl FsMgh {

    /// Read an MGH or MGZ file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<FsMgh> {
        let mut input = open_maybe_gz(path)?;
        FsMgh::from_reader(&mut input)
    }

    /// Read header and data from a stream positioned at the start of the MGH header.
    pub fn from_reader<S>(input: &mut S) -> Result<FsMgh>
    where
        S: Read,
    {
        let hdr = FsMghHeader::from_reader(input)?;

        // A GZ stream cannot seek, so the unused header part is read and dropped.
        let mut skip = vec![0u8; MGH_DATA_START - hdr.size_read()];
        input.read_exact(&mut skip)?;

        let mut input = ByteOrdered::be(input);
        let num_values = hdr.num_voxels() * hdr.dim4len as usize;

        let mut mgh = FsMgh {
            header: hdr.clone(),
            data_mri_uchar: None,
            data_mri_float: None,
            data_mri_int: None,
            data_mri_short: None,
        };

        match hdr.dtype {
            0 => { // MRI_UCHAR
                let mut values: Vec<u8> = Vec::with_capacity(num_values);
                for _ in 0..num_values { values.push(input.read_u8()?); }
                mgh.data_mri_uchar = Some(column_major(&hdr, values)?);
            }
            1 => { // MRI_INT
                let mut values: Vec<i32> = Vec::with_capacity(num_values);
                for _ in 0..num_values { values.push(input.read_i32()?); }
                mgh.data_mri_int = Some(column_major(&hdr, values)?);
            }
            3 => { // MRI_FLOAT
                let mut values: Vec<f32> = Vec::with_capacity(num_values);
                for _ in 0..num_values { values.push(input.read_f32()?); }
                mgh.data_mri_float = Some(column_major(&hdr, values)?);
            }
            4 => { // MRI_SHORT
                let mut values: Vec<i16> = Vec::with_capacity(num_values);
                for _ in 0..num_values { values.push(input.read_i16()?); }
                mgh.data_mri_short = Some(column_major(&hdr, values)?);
            }
            _ => return Err(CortexRoiError::InvalidFsMghFormat),
        }
        Ok(mgh)
    }

    /// The data as f64, whatever the stored data type.
    pub fn data_as_f64(&self) -> Result<Array4<f64>> {
        if let Some(d) = &self.data_mri_float {
            Ok(d.mapv(|v| v as f64))
        } else if let Some(d) = &self.data_mri_int {
            Ok(d.mapv(|v| v as f64))
        } else if let Some(d) = &self.data_mri_short {
            Ok(d.mapv(|v| v as f64))
        } else if let Some(d) = &self.data_mri_uchar {
            Ok(d.mapv(|v| v as f64))
        } else {
            Err(CortexRoiError::InvalidFsMghFormat)
        }
    }

    /// The volume as a feature matrix with one row per frame and one column per voxel, the voxels
    /// in row-major order over the first three dimensions. This is the column layout of [`crate::VoxelVolume`].
    pub fn to_feature_matrix(&self) -> Result<Array2<f64>> {
        let data = self.data_as_f64()?;
        let num_frames = self.header.dim4len as usize;
        let mut features = Array2::<f64>::zeros((num_frames, self.header.num_voxels()));
        for (frame, mut row) in features.outer_iter_mut().enumerate() {
            let grid: ArrayView3<f64> = data.index_axis(Axis(3), frame);
            for (dst, src) in row.iter_mut().zip(grid.iter()) {
                *dst = *src;
            }
        }
        Ok(features)
    }
}


/// Read an MGH or MGZ file.
pub fn read_mgh<P: AsRef<Path>>(path: P) -> Result<FsMgh> {
    FsMgh::from_file(path)
}
