/// Default bound on each branch channel created at a fan-out point
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;
/// Channel bound used for stdin/stdout/stderr adapters in the binary
pub const IO_CHANNEL_CAPACITY: usize = 256;
