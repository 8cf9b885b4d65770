//! Entry payload decoding

use crate::zip::error::{Result, ZipError};
use flate2::read::DeflateDecoder;
use std::io::Read;

/// Compression method recorded for a zip entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionMethod {
    /// Method 0, bytes stored verbatim
    Stored,
    /// Method 8, raw deflate stream
    Deflated,
    /// Anything else, kept so the failure surfaces at read time
    Unsupported(u16),
}

impl From<u16> for CompressionMethod {
    fn from(value: u16) -> Self {
        match value {
            0 => Self::Stored,
            8 => Self::Deflated,
            other => Self::Unsupported(other),
        }
    }
}

impl CompressionMethod {
    /// Numeric method id as stored in the archive
    pub const fn id(self) -> u16 {
        match self {
            Self::Stored => 0,
            Self::Deflated => 8,
            Self::Unsupported(id) => id,
        }
    }
}

/// Decode `compressed` into `dest`, which must be exactly the entry size
///
/// Produces `SizeMismatch` when the stream yields fewer or more bytes than
/// `dest` holds.
pub fn decode_into(method: CompressionMethod, compressed: &[u8], dest: &mut [u8]) -> Result<()> {
    match method {
        CompressionMethod::Stored => {
            if compressed.len() != dest.len() {
                return Err(ZipError::SizeMismatch {
                    expected: dest.len(),
                    actual: compressed.len(),
                });
            }
            dest.copy_from_slice(compressed);
            Ok(())
        }
        CompressionMethod::Deflated => {
            let mut decoder = DeflateDecoder::new(compressed);
            let mut filled = 0;
            while filled < dest.len() {
                let read = decoder
                    .read(&mut dest[filled..])
                    .map_err(|e| ZipError::Decompression(format!("Deflate failed: {e}")))?;
                if read == 0 {
                    return Err(ZipError::SizeMismatch {
                        expected: dest.len(),
                        actual: filled,
                    });
                }
                filled += read;
            }

            // Any further output means the declared size was too small
            let mut probe = [0u8; 1];
            let extra = decoder
                .read(&mut probe)
                .map_err(|e| ZipError::Decompression(format!("Deflate failed: {e}")))?;
            if extra != 0 {
                return Err(ZipError::SizeMismatch {
                    expected: dest.len(),
                    actual: dest.len() + extra,
                });
            }
            Ok(())
        }
        CompressionMethod::Unsupported(id) => Err(ZipError::UnsupportedMethod(id)),
    }
}

/// Decode into a freshly allocated buffer of `size` bytes
pub fn decode(method: CompressionMethod, compressed: &[u8], size: usize) -> Result<Vec<u8>> {
    let mut out = vec![0u8; size];
    decode_into(method, compressed, &mut out)?;
    Ok(out)
}

/// Check decoded bytes against the CRC-32 from the central directory
pub fn verify_crc32(data: &[u8], expected: u32) -> Result<()> {
    let actual = crc32fast::hash(data);
    if actual == expected {
        Ok(())
    } else {
        Err(ZipError::CrcMismatch { expected, actual })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::DeflateEncoder;
    use std::io::Write;

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_method_ids() {
        assert_eq!(CompressionMethod::from(0), CompressionMethod::Stored);
        assert_eq!(CompressionMethod::from(8), CompressionMethod::Deflated);
        assert_eq!(CompressionMethod::from(14), CompressionMethod::Unsupported(14));
        assert_eq!(CompressionMethod::Unsupported(14).id(), 14);
    }

    #[test]
    fn test_stored() {
        assert_eq!(decode(CompressionMethod::Stored, b"abc", 3).unwrap(), b"abc");
        assert!(matches!(
            decode(CompressionMethod::Stored, b"abc", 4),
            Err(ZipError::SizeMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_deflate() {
        let data = b"the quick brown fox jumps over the lazy dog ".repeat(20);
        let compressed = deflate(&data);
        assert!(compressed.len() < data.len());
        assert_eq!(
            decode(CompressionMethod::Deflated, &compressed, data.len()).unwrap(),
            data
        );
    }

    #[test]
    fn test_deflate_size_mismatch() {
        let compressed = deflate(b"0123456789");
        assert!(matches!(
            decode(CompressionMethod::Deflated, &compressed, 11),
            Err(ZipError::SizeMismatch { .. })
        ));
        assert!(matches!(
            decode(CompressionMethod::Deflated, &compressed, 9),
            Err(ZipError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_unsupported_method() {
        assert!(matches!(
            decode(CompressionMethod::Unsupported(12), b"bz", 2),
            Err(ZipError::UnsupportedMethod(12))
        ));
    }

    #[test]
    fn test_crc() {
        let crc = crc32fast::hash(b"lump");
        assert!(verify_crc32(b"lump", crc).is_ok());
        assert!(matches!(
            verify_crc32(b"lamp", crc),
            Err(ZipError::CrcMismatch { .. })
        ));
    }
}
