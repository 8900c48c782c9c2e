//! The payload stored by the project data cache

use crate::errors::Result;
use std::io::{Read, Write};

/// Large, immutable, derived project metadata.
///
/// The cache never inspects the payload. It only asks it to serialize itself
/// and, after a successful write, for an optional version marker to report.
pub trait ProjectData: Sized + Send + Sync + 'static {
    fn read_from(reader: &mut dyn Read) -> Result<Self>;

    fn write_to(&self, writer: &mut dyn Write) -> Result<()>;

    /// Version of the tool or client that produced this data
    fn version_marker(&self) -> Option<u64> {
        None
    }
}
