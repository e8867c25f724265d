//! Compression of index documents.

use std::io::{Read, Write};

use crate::Error;

/// Magic bytes of a gzip stream.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
/// Magic bytes of a zstd frame.
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

/// The compression applied to an index document on disk.
///
/// Reading does not depend on this selection; the decompressor recognizes
/// the format by its magic bytes (see [`Compression::decompress`]).
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repodb_index::Compression;
///
/// assert_eq!(Compression::from_str("zstd")?, Compression::Zstd);
/// assert_eq!(Compression::default(), Compression::Zstd);
/// # Ok::<(), strum::ParseError>(())
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum Compression {
    /// No compression.
    None,

    /// Gzip compression.
    Gzip,

    /// Zstandard compression.
    #[default]
    Zstd,
}

impl Compression {
    /// Compresses an index document with the selected format.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoder fails.
    pub fn compress(self, data: &[u8]) -> Result<Vec<u8>, Error> {
        match self {
            Compression::None => Ok(data.to_vec()),
            Compression::Gzip => {
                let mut encoder =
                    flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
                encoder
                    .write_all(data)
                    .and_then(|()| encoder.finish())
                    .map_err(|source| Error::Compression {
                        context: "gzip compressing an index document",
                        source,
                    })
            }
            Compression::Zstd => {
                zstd::stream::encode_all(data, 0).map_err(|source| Error::Compression {
                    context: "zstd compressing an index document",
                    source,
                })
            }
        }
    }

    /// Decompresses an index document, detecting the format by its magic
    /// bytes. Data in neither known format is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if the detected decoder fails.
    pub fn decompress(data: &[u8]) -> Result<Vec<u8>, Error> {
        if data.starts_with(&GZIP_MAGIC) {
            let mut decoder = flate2::read::GzDecoder::new(data);
            let mut decompressed = Vec::new();
            decoder
                .read_to_end(&mut decompressed)
                .map_err(|source| Error::Compression {
                    context: "gzip decompressing an index document",
                    source,
                })?;
            Ok(decompressed)
        } else if data.starts_with(&ZSTD_MAGIC) {
            zstd::stream::decode_all(data).map_err(|source| Error::Compression {
                context: "zstd decompressing an index document",
                source,
            })
        } else {
            Ok(data.to_vec())
        }
    }
}
