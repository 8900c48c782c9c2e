/// Constants used throughout the blazebridge codebase
// Environment variable names
pub const BLAZEBRIDGE_LOG_VAR: &str = "BLAZEBRIDGE_LOG";
pub const BLAZEBRIDGE_CONFIG_VAR: &str = "BLAZEBRIDGE_CONFIG";
pub const BLAZEBRIDGE_MAX_MESSAGE_BYTES_VAR: &str = "BLAZEBRIDGE_MAX_MESSAGE_BYTES";
pub const BLAZEBRIDGE_BEST_EFFORT_VAR: &str = "BLAZEBRIDGE_BEST_EFFORT";
pub const BLAZEBRIDGE_QUEUE_CAPACITY_VAR: &str = "BLAZEBRIDGE_QUEUE_CAPACITY";
pub const BLAZEBRIDGE_PERSISTENCE_VAR: &str = "BLAZEBRIDGE_PERSISTENCE";

// Configuration file
pub const CONFIG_FILENAME: &str = "blazebridge.json";

// Project data layout
pub const PROJECT_DATA_SUBDIRECTORY: &str = ".blaze";
pub const PROJECT_CACHE_SUBDIRECTORY: &str = "cache";
pub const PROJECT_CACHE_FILENAME: &str = "cache.dat.gz";

// BEP defaults
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 64 * 1024 * 1024;
pub const DEFAULT_TEST_OUTPUT_GROUP: &str = "test.outputs";

// Persistence defaults
pub const DEFAULT_WRITE_QUEUE_CAPACITY: usize = 64;
pub const WRITE_THREAD_NAME: &str = "project-data-writer";
