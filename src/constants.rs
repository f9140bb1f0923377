//! Application-wide constants.

/// Records per batch-upsert request during the upload phase.
pub const SYNC_BATCH_SIZE: usize = 20;

/// Download window when no sync has ever completed.
pub const DEFAULT_LOOKBACK_HOURS: i64 = 24;

/// Cadence of the background sync job.
pub const PERIODIC_SYNC_INTERVAL_MINUTES: u64 = 15;

/// Base delay between retries of a failed pass; grows linearly.
pub const SYNC_BACKOFF_BASE_MINUTES: u64 = 15;

/// Cap on the linear backoff growth.
pub const MAX_BACKOFF_MULTIPLIER: u64 = 4;

/// Unique job name for the recurring background sync.
pub const PERIODIC_SYNC_WORK_NAME: &str = "periodic_sync";

/// Unique job name for a user-requested immediate sync.
pub const ONE_TIME_SYNC_WORK_NAME: &str = "one_time_sync";

/// Metadata key holding the last successful sync timestamp.
pub const LAST_SYNC_KEY: &str = "last_sync";
