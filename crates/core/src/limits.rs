//! Limits and defaults for the ingestion engine.

/// Smallest accepted identifier.
pub const MIN_IDENTIFIER: u64 = 1;

/// Largest accepted identifier (10^9 + 7).
pub const MAX_IDENTIFIER: u64 = 1_000_000_007;

/// Identifiers per batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 3;

/// Delay between consecutive batches of one ingestion (milliseconds).
///
/// Emulates the rate limit of the downstream API.
pub const DEFAULT_BATCH_INTERVAL_MS: u64 = 5_000;

/// Simulated downstream latency per identifier (milliseconds).
pub const DEFAULT_DOWNSTREAM_LATENCY_MS: u64 = 1_000;

/// Number of ingestions processed concurrently.
pub const DEFAULT_WORKER_CONCURRENCY: usize = 1;
