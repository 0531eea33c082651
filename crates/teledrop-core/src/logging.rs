//! Structured logging schema and field name constants for teledrop.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized field names across
//! every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied (e.g. compensation best-effort failure) |
//! | INFO  | Lifecycle events (startup, sweep, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-chunk streaming progress |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated across request → coordinator → store calls.
/// Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "db", "storage", "crypto"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "coordinator", "gateway", "filesystem_backend", "s3_backend", "pool"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "create", "read", "delete", "sweep", "range_read"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Drop UUID being operated on.
pub const DROP_ID: &str = "drop_id";

/// File UUID being operated on.
pub const FILE_ID: &str = "file_id";

/// Drop slug.
pub const SLUG: &str = "slug";

/// Blob storage key.
pub const STORAGE_KEY: &str = "storage_key";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Byte size of an uploaded or downloaded blob.
pub const SIZE_BYTES: &str = "size_bytes";

/// Number of stale temp files removed by the startup sweep.
pub const SWEPT_COUNT: &str = "swept_count";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Access Evaluator decision (one of the seven in §4.3).
pub const DECISION: &str = "decision";
