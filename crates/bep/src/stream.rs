//! Build event sources
//!
//! Finished output files and live streams are consumed through the same
//! [`BuildEventStreamProvider`] trait so the interpreter never needs to know
//! which one it is reading.

use crate::errors::Result;
use crate::proto::BuildEvent;
use crate::reader::DelimitedEventReader;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// A source of build events.
///
/// Implementations return `Ok(None)` once the stream has ended and
/// [`BepError::Stream`](crate::BepError::Stream) when the underlying
/// transport fails.
pub trait BuildEventStreamProvider {
    fn next_event(&mut self) -> Result<Option<BuildEvent>>;

    /// Short description used in log fields
    fn describe(&self) -> String {
        "build event stream".to_string()
    }
}

impl<P: BuildEventStreamProvider + ?Sized> BuildEventStreamProvider for Box<P> {
    fn next_event(&mut self) -> Result<Option<BuildEvent>> {
        (**self).next_event()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<R: Read> BuildEventStreamProvider for DelimitedEventReader<R> {
    fn next_event(&mut self) -> Result<Option<BuildEvent>> {
        self.read_event()
    }

    fn describe(&self) -> String {
        self.origin().display().to_string()
    }
}

/// Shared flag that ends a live stream early
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Provider over any byte source that can be cancelled between events.
///
/// Cancellation is checked before each read; a read that is already blocked
/// returns only when the writer closes its end.
pub struct ReaderStreamProvider<R> {
    reader: DelimitedEventReader<R>,
    cancellation: CancellationFlag,
}

impl<R: Read> ReaderStreamProvider<R> {
    pub fn new(reader: DelimitedEventReader<R>, cancellation: CancellationFlag) -> Self {
        Self {
            reader,
            cancellation,
        }
    }

    pub fn cancellation(&self) -> &CancellationFlag {
        &self.cancellation
    }
}

impl<R: Read> BuildEventStreamProvider for ReaderStreamProvider<R> {
    fn next_event(&mut self) -> Result<Option<BuildEvent>> {
        if self.cancellation.is_cancelled() {
            debug!(
                offset = self.reader.offset(),
                events = self.reader.events_read(),
                "build event stream cancelled"
            );
            return Ok(None);
        }
        self.reader.read_event()
    }

    fn describe(&self) -> String {
        self.reader.describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::write_delimited;
    use crate::testing;

    #[test]
    fn cancelled_provider_stops_without_error() {
        let mut bytes = Vec::new();
        write_delimited(
            &mut bytes,
            &[testing::started("u"), testing::configuration("c", "k8")],
        )
        .unwrap();

        let flag = CancellationFlag::new();
        let mut provider =
            ReaderStreamProvider::new(DelimitedEventReader::new(bytes.as_slice()), flag.clone());

        assert!(provider.next_event().unwrap().is_some());
        flag.cancel();
        assert!(provider.next_event().unwrap().is_none());
        assert!(provider.cancellation().is_cancelled());
    }

    #[test]
    fn boxed_provider_delegates() {
        let mut bytes = Vec::new();
        write_delimited(&mut bytes, &[testing::started("u")]).unwrap();
        let mut provider: Box<dyn BuildEventStreamProvider> =
            Box::new(DelimitedEventReader::new(std::io::Cursor::new(bytes)));

        assert!(provider.next_event().unwrap().is_some());
        assert!(provider.next_event().unwrap().is_none());
        assert_eq!(provider.describe(), "<stream>");
    }
}
