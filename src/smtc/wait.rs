// Bounded waits on native async operations
use std::sync::OnceLock;
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};
use tokio::time::timeout;

use crate::error::{BridgeError, BridgeResult};
use crate::smtc::platform::PendingOperation;

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Shared runtime driving the timers. Multi-thread so that concurrent
/// callers each block on their own thread.
fn runtime() -> BridgeResult<&'static Runtime> {
    if let Some(rt) = RUNTIME.get() {
        return Ok(rt);
    }

    let rt = Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("mediatransport4j-wait")
        .enable_time()
        .build()
        .map_err(BridgeError::Runtime)?;

    // A racing initializer may have won; ours is dropped then.
    Ok(RUNTIME.get_or_init(|| rt))
}

/// Block until `op` completes or `limit` elapses.
///
/// Returns `Ok(None)` after cancelling the operation on timeout. A native
/// failure of the completed operation is returned as an error.
pub fn wait_or_cancel<O: PendingOperation>(op: O, limit: Duration) -> BridgeResult<Option<O::Output>> {
    let handle = op.clone();
    let rt = runtime()?;

    rt.block_on(async move {
        match timeout(limit, op.into_completion()).await {
            Ok(result) => result.map(Some),
            Err(_) => {
                tracing::debug!(?limit, "native operation timed out, cancelling");
                handle.cancel();
                Ok(None)
            }
        }
    })
}
