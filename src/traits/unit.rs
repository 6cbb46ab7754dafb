use async_trait::async_trait;

use crate::errors::UnitFailure;
use crate::streams::{RecordSink, RecordSource};

/// A single stream-transforming capability.
///
/// `execute` consumes `input` (to exhaustion, or until the unit chooses to
/// stop), writes zero or more records to `output`, may write diagnostics to
/// `errors`, and reports a terminal status. The sinks are moved in, so once
/// `execute` returns the unit can no longer write to them; the engine
/// relies on this to half-close downstream branches.
///
/// Units hold no graph identity and can run on their own, or several times
/// concurrently.
#[async_trait]
pub trait Unit: Send + Sync {
    async fn execute(
        &self,
        input: RecordSource,
        output: RecordSink,
        errors: RecordSink,
    ) -> Result<(), UnitFailure>;

    fn name(&self) -> &'static str;
}
