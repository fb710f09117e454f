// mediatransport4j - native side
// Module declarations
pub mod error;
mod jni_bridge;
pub mod logging;
pub mod settings;
pub mod smtc;

pub use error::{BridgeError, BridgeResult};
pub use settings::BridgeSettings;
pub use smtc::{build_snapshots, dispatch, NativePlatform, SessionAction, SessionSnapshot};
