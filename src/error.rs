use quick_error::quick_error;
use std::io::Error as IOError;

quick_error! {
    /// Error type for all error variants originated by this crate.
    #[derive(Debug)]
    pub enum CortexRoiError {
        /// No data for the subject in the database.
        UnknownSubject(subject: String) {
            display("Unknown subject '{}'", subject)
        }

        /// The ROI name is not known for the subject.
        UnknownRoi(roi: String) {
            display("Unknown ROI '{}'", roi)
        }

        UnknownXfm(xfm: String) {
            display("Unknown transform '{}'", xfm)
        }

        /// A matrix or volume does not have the shape required by the subject and transform.
        DimensionMismatch(what: String, expected: usize, actual: usize) {
            display("Dimension mismatch for {}: expected {}, got {}", what, expected, actual)
        }

        VertexIndexOutOfRange(index: usize, num_vertices: usize) {
            display("Vertex index {} out of range for {} vertices", index, num_vertices)
        }

        /// The radius proportion is negative or not a number.
        InvalidRadius(radius: f64) {
            display("Invalid radius proportion {}, must be a non-negative number", radius)
        }

        /// No data values inside the ROI.
        EmptyRoi {
            display("ROI contains no values")
        }

        InvalidFsSurfaceFormat {
            display("Invalid FreeSurfer surf file")
        }

        InvalidFsLabelFormat(details: String) {
            display("Invalid FreeSurfer label file: {}", details)
        }

        UnsupportedFsAnnotFormatVersion {
            display("Unsupported FreeSurfer annot file format version")
        }

        InvalidFsMghFormat {
            display("Invalid FreeSurfer MGH file")
        }

        InvalidXfmFormat(details: String) {
            display("Invalid transform file: {}", details)
        }

        /// Two surfaces that must share a topology do not.
        SurfaceMismatch {
            display("Surfaces do not share the same vertices and faces")
        }

        Config(details: String) {
            display("Invalid configuration: {}", details)
        }

        /// I/O Error
        Io(err: IOError) {
            from()
            source(err)
        }
    }
}

/// Alias type for results originated from this crate.
pub type Result<T> = ::std::result::Result<T, CortexRoiError>;
