//! Gzip-compressed snapshot codec
//!
//! Layout inside the gzip stream: the four magic bytes `BZPD`, the schema
//! version as a little-endian `u32`, then the bincode encoding of the value.

use crate::errors::{CodecOp, RecoveryHint, Result, SyncError};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{self, Read, Write};

pub const SNAPSHOT_MAGIC: &[u8; 4] = b"BZPD";

/// Encode `value` with a header declaring `version`
pub fn write_snapshot<T>(writer: &mut dyn Write, value: &T, version: u32) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let mut encoder = GzEncoder::new(writer, Compression::default());
    encoder
        .write_all(SNAPSHOT_MAGIC)
        .and_then(|()| encoder.write_all(&version.to_le_bytes()))
        .map_err(|e| SyncError::codec(CodecOp::Encode, e))?;
    bincode::serialize_into(&mut encoder, value)
        .map_err(|e| SyncError::codec(CodecOp::Encode, e))?;
    encoder
        .finish()
        .map_err(|e| SyncError::codec(CodecOp::Encode, e))?;
    Ok(())
}

/// Decode a snapshot, rejecting any header other than `expected_version`
pub fn read_snapshot<T>(reader: &mut dyn Read, expected_version: u32) -> Result<T>
where
    T: DeserializeOwned,
{
    let mut decoder = GzDecoder::new(reader);
    let mut header = [0u8; 8];
    decoder.read_exact(&mut header).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            SyncError::invalid_header("snapshot is shorter than its header")
        } else {
            SyncError::codec(CodecOp::Decode, e)
        }
    })?;

    if &header[..4] != SNAPSHOT_MAGIC {
        return Err(SyncError::invalid_header("magic bytes do not match"));
    }
    let actual = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    if actual != expected_version {
        return Err(SyncError::VersionMismatch {
            expected: expected_version,
            actual,
            recovery_hint: RecoveryHint::Resync,
        });
    }

    bincode::deserialize_from(&mut decoder).map_err(|e| SyncError::codec(CodecOp::Decode, e))
}
