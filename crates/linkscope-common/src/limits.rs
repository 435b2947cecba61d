//! Centralized limits for tree construction and scope resolution.
//!
//! The upstream tree is untrusted input: these bounds keep a malformed or
//! adversarial tree from exhausting the stack or looping forever.

/// Maximum nesting depth accepted by the tree adapter.
///
/// The adapter recurses once per level, so this also bounds stack usage.
pub const MAX_TREE_DEPTH: usize = 2_000;

/// Maximum number of scope boundaries climbed while resolving one occurrence.
pub const MAX_SCOPE_CLIMB: usize = 10_000;

/// Default wall-clock cap for the runtime check, in milliseconds.
pub const DEFAULT_RUNTIME_CHECK_TIMEOUT_MS: u64 = 3_000;

/// Polling interval used while waiting on the runtime check child process.
pub const RUNTIME_CHECK_POLL_MS: u64 = 10;

/// Maximum number of bytes of interpreter output inspected for an error.
pub const MAX_RUNTIME_OUTPUT_BYTES: usize = 64 * 1024;
