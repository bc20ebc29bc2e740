// =============================================================================
// Application Identity
// =============================================================================

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".druidq";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "druidq.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "DRUIDQ_CONFIG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "DRUIDQ_LOG";

/// Log filter when neither DRUIDQ_LOG nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "info";

// =============================================================================
// Environment Variables - Broker
// =============================================================================

pub const ENV_BROKER_URL: &str = "DRUIDQ_BROKER_URL";

/// Environment variable for the HTTP read timeout in seconds
pub const ENV_TIMEOUT_SECS: &str = "DRUIDQ_TIMEOUT_SECS";

// =============================================================================
// Environment Variables - Query Defaults
// =============================================================================

pub const ENV_GRANULARITY: &str = "DRUIDQ_GRANULARITY";

pub const ENV_TIME_ZONE: &str = "DRUIDQ_TIME_ZONE";

// =============================================================================
// Defaults
// =============================================================================

/// Broker endpoint of a local single-node cluster
pub const DEFAULT_BROKER_URL: &str = "http://localhost:8082/druid/v2/";

pub const DEFAULT_TIMEOUT_SECS: u64 = druid_query::DEFAULT_TIMEOUT_SECS;

pub const DEFAULT_GRANULARITY: &str = "all";
