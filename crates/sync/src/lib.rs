//! Project data caching for blazebridge sync
//!
//! [`ProjectDataManager`] keeps the most recent project data snapshot in
//! memory, loads it from the per-project cache file at most once, and writes
//! updates on a dedicated background thread.

pub mod compressed;
pub mod data_manager;
pub mod errors;
pub mod executor;
pub mod libraries;
pub mod project_data;
pub mod telemetry;

pub use data_manager::ProjectDataManager;
pub use errors::{serialization_error_message, CodecOp, RecoveryHint, Result, SyncError};
pub use executor::{SerialTaskRunner, Task, TaskOptions, TaskRunner};
pub use libraries::{
    first_available, DefaultLibraryConverter, Library, LibraryConverter, LibraryKey,
    LibraryModel, LibraryUpdate,
};
pub use project_data::ProjectData;
pub use telemetry::{EventData, EventLogger, TracingEventLogger};
