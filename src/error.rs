// Error taxonomy for the bridge
// Timeouts are not errors: they resolve to "absent" where they happen.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// Any failure reported by the native media API
    #[error("native media API error 0x{code:08X}: {message}")]
    Native { code: i32, message: String },

    #[error("failed to start the wait runtime: {0}")]
    Runtime(std::io::Error),

    #[error("JNI call failed: {0}")]
    Jni(#[from] jni::errors::Error),

    #[error("invalid settings: {0}")]
    Settings(String),
}

pub type BridgeResult<T> = Result<T, BridgeError>;

impl BridgeError {
    pub fn native(message: impl Into<String>) -> Self {
        BridgeError::Native {
            code: 0,
            message: message.into(),
        }
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for BridgeError {
    fn from(err: windows::core::Error) -> Self {
        BridgeError::Native {
            code: err.code().0,
            message: err.message(),
        }
    }
}
