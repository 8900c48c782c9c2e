//! Length-delimited build event reader
//!
//! A BEP output file is a plain concatenation of protobuf messages, each
//! preceded by its size as a base-128 varint. The reader decodes them lazily
//! and stops at the first problem, keeping everything decoded so far valid.

use crate::errors::{BepError, Result};
use crate::proto::BuildEvent;
use blazebridge_core::constants::DEFAULT_MAX_MESSAGE_BYTES;
use prost::Message;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

/// A varint never needs more than ten bytes for a 64-bit value
const MAX_VARINT_BYTES: u32 = 10;

/// Forward-only reader of varint-length-prefixed build events
#[derive(Debug)]
pub struct DelimitedEventReader<R> {
    reader: R,
    origin: PathBuf,
    offset: u64,
    max_message_bytes: usize,
    events_read: usize,
    finished: bool,
}

impl DelimitedEventReader<BufReader<File>> {
    /// Open a finished BEP output file
    pub fn open(path: &Path, max_message_bytes: usize) -> Result<Self> {
        let file = File::open(path).map_err(|e| BepError::io(path, "open BEP output", e))?;
        Ok(Self::with_limit(BufReader::new(file), max_message_bytes).with_origin(path))
    }
}

impl<R: Read> DelimitedEventReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_limit(reader, DEFAULT_MAX_MESSAGE_BYTES)
    }

    pub fn with_limit(reader: R, max_message_bytes: usize) -> Self {
        Self {
            reader,
            origin: PathBuf::from("<stream>"),
            offset: 0,
            max_message_bytes,
            events_read: 0,
            finished: false,
        }
    }

    /// Name the source in I/O errors
    pub fn with_origin(mut self, origin: impl Into<PathBuf>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Bytes consumed so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn events_read(&self) -> usize {
        self.events_read
    }

    /// Read the next event.
    ///
    /// Returns `Ok(None)` at a clean end of stream. After an error or the end
    /// of stream every further call returns `Ok(None)`.
    pub fn read_event(&mut self) -> Result<Option<BuildEvent>> {
        if self.finished {
            return Ok(None);
        }
        let result = self.read_next();
        if !matches!(result, Ok(Some(_))) {
            self.finished = true;
        }
        result
    }

    fn read_next(&mut self) -> Result<Option<BuildEvent>> {
        let start = self.offset;
        let Some(declared) = self.read_length_prefix()? else {
            return Ok(None);
        };

        let size = match usize::try_from(declared) {
            Ok(size) if size <= self.max_message_bytes => size,
            _ => {
                return Err(BepError::MessageTooLarge {
                    offset: start,
                    size: declared,
                    limit: self.max_message_bytes,
                })
            }
        };

        // Grows with the bytes actually present, not the declared size
        let mut body = Vec::new();
        let read = (&mut self.reader)
            .take(declared)
            .read_to_end(&mut body)
            .map_err(|e| BepError::io(&self.origin, "read build event", e))?;
        self.offset += read as u64;
        if read < size {
            return Err(BepError::corruption(
                start,
                format!("truncated message: expected {size} bytes, found {read}"),
            ));
        }

        let event = BuildEvent::decode(body.as_slice())
            .map_err(|source| BepError::Decode {
                offset: start,
                source,
            })?;
        self.events_read += 1;
        Ok(Some(event))
    }

    fn read_length_prefix(&mut self) -> Result<Option<u64>> {
        let start = self.offset;
        let mut value: u64 = 0;
        for index in 0..MAX_VARINT_BYTES {
            let byte = match self.read_byte()? {
                Some(byte) => byte,
                None if index == 0 => return Ok(None),
                None => {
                    return Err(BepError::corruption(start, "truncated length prefix"));
                }
            };
            if index == MAX_VARINT_BYTES - 1 && byte > 1 {
                return Err(BepError::corruption(start, "length prefix overflows 64 bits"));
            }
            value |= u64::from(byte & 0x7f) << (7 * index);
            if byte & 0x80 == 0 {
                return Ok(Some(value));
            }
        }
        Err(BepError::corruption(
            start,
            "length prefix longer than 10 bytes",
        ))
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.offset += 1;
                    return Ok(Some(byte[0]));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(BepError::io(&self.origin, "read length prefix", e)),
            }
        }
    }
}

impl<R: Read> Iterator for DelimitedEventReader<R> {
    type Item = Result<BuildEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_event().transpose()
    }
}

impl<R: Read> std::iter::FusedIterator for DelimitedEventReader<R> {}

/// Write events in the delimited format the reader expects
pub fn write_delimited<'a, W, I>(writer: &mut W, events: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a BuildEvent>,
{
    let mut buf = Vec::new();
    for event in events {
        buf.clear();
        event
            .encode_length_delimited(&mut buf)
            .map_err(io::Error::other)?;
        writer.write_all(&buf)?;
    }
    Ok(())
}
