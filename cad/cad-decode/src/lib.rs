//! Decoder adapter: CAD interchange files to triangle mesh sets.
//!
//! This crate turns a file identity (bytes plus filename) into the uniform
//! decode product the analysis pipeline consumes:
//!
//! - a [`cad_mesh::MeshSet`] of triangle or line-strip meshes,
//! - a [`cad_mesh::MetadataBag`] of whatever the decoder could report,
//! - a raw text prefix of the file for format-level header scanning.
//!
//! # Formats
//!
//! - **STEP/STP** - B-rep geometry tessellated via the truck CAD kernel
//! - **IGES/IGS** - fixed-80-column records; curve and surface entities are
//!   tessellated in-house (no maintained ecosystem decoder exists)
//! - **DXF** - LINE/POLYLINE/LWPOLYLINE/ARC/CIRCLE entities synthesized into
//!   line-strip meshes via the `dxf` crate
//!
//! Anything else fails with [`DecodeError::UnsupportedFormat`].
//!
//! # Example
//!
//! ```
//! use cad_decode::{DecodeError, FileFormat};
//!
//! assert_eq!(FileFormat::from_filename("part.STP"), Some(FileFormat::Step));
//! assert_eq!(FileFormat::from_filename("part.stl"), None);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod dxf_decode;
mod error;
mod iges;
mod step;

pub use error::{DecodeError, DecodeResult};

use cad_mesh::{MeshSet, MetadataBag};
use tracing::{debug, info};

/// Largest accepted input, enforced before any parsing.
pub const MAX_FILE_BYTES: usize = 50 * 1024 * 1024;

/// Size of the raw text prefix kept for header scanning.
pub const RAW_PREFIX_BYTES: usize = 8 * 1024;

/// Recognized input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileFormat {
    /// STEP (ISO 10303-21), extensions `step` and `stp`.
    Step,
    /// IGES, extensions `iges` and `igs`.
    Iges,
    /// DXF, extension `dxf`.
    Dxf,
}

impl FileFormat {
    /// Detect the format from a filename's lowercased extension.
    #[must_use]
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = filename.rsplit_once('.')?.1.to_lowercase();
        match ext.as_str() {
            "step" | "stp" => Some(Self::Step),
            "iges" | "igs" => Some(Self::Iges),
            "dxf" => Some(Self::Dxf),
            _ => None,
        }
    }
}

/// The uniform decode product.
#[derive(Debug, Clone)]
pub struct Decoded {
    /// Format the file was decoded as.
    pub format: FileFormat,
    /// Decoded meshes, every one with a non-empty position buffer.
    pub meshes: MeshSet,
    /// Metadata the decoder could extract.
    pub metadata: MetadataBag,
    /// First [`RAW_PREFIX_BYTES`] of the file as lossy text.
    pub raw_prefix: String,
}

/// Decode a CAD file into meshes and metadata.
///
/// # Errors
///
/// - [`DecodeError::UnsupportedFormat`] for an unrecognized extension
/// - [`DecodeError::FileTooLarge`] above [`MAX_FILE_BYTES`]
/// - [`DecodeError::DecodeFailure`] when the underlying parser fails
/// - [`DecodeError::EmptyGeometry`] when parsing succeeds but no vertex
///   survives
pub fn decode(bytes: &[u8], filename: &str) -> DecodeResult<Decoded> {
    let format = FileFormat::from_filename(filename).ok_or_else(|| {
        DecodeError::UnsupportedFormat {
            filename: filename.to_string(),
        }
    })?;

    if bytes.len() > MAX_FILE_BYTES {
        return Err(DecodeError::FileTooLarge {
            bytes: bytes.len(),
            limit: MAX_FILE_BYTES,
        });
    }

    debug!(?format, bytes = bytes.len(), "decoding CAD file");

    let (mut meshes, metadata) = match format {
        FileFormat::Step => step::decode_step(bytes)?,
        FileFormat::Iges => iges::decode_iges(bytes)?,
        FileFormat::Dxf => dxf_decode::decode_dxf(bytes)?,
    };

    // The contract guarantees every returned mesh has vertices.
    meshes.retain(|m| !m.positions.is_empty());

    if meshes.is_empty_geometry() {
        return Err(DecodeError::EmptyGeometry);
    }

    info!(
        ?format,
        meshes = meshes.len(),
        vertices = meshes.total_vertex_count(),
        triangles = meshes.total_triangle_count(),
        "decode complete"
    );

    Ok(Decoded {
        format,
        meshes,
        metadata,
        raw_prefix: raw_prefix(bytes),
    })
}

/// Lossily decode the first [`RAW_PREFIX_BYTES`] of the file as text.
#[must_use]
pub fn raw_prefix(bytes: &[u8]) -> String {
    let end = bytes.len().min(RAW_PREFIX_BYTES);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
