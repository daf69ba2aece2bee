use thiserror::Error;

/// Structured failure raised by a bridge backend.
///
/// Every asynchronous bridge call reports failure with a short machine
/// `code` and a human `message`; presenters render both.
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct BridgeError {
    pub code: String,
    pub message: String,
}

impl BridgeError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// A lifecycle step failure, classified by the operation that raised it.
///
/// All variants funnel into the same terminal display path; the
/// classification only records which step gave up.
#[derive(Debug, Clone, Error)]
pub enum LifecycleError {
    #[error("bridge initialization failed: {0}")]
    Init(BridgeError),
    #[error("availability query failed: {0}")]
    Availability(BridgeError),
    #[error("device selection failed: {0}")]
    Selection(BridgeError),
    #[error("GATT connect failed: {0}")]
    Connect(BridgeError),
    #[error("service or characteristic resolution failed: {0}")]
    Resolve(BridgeError),
    #[error("identifier read failed: {0}")]
    Read(BridgeError),
    #[error("LED write failed: {0}")]
    Write(BridgeError),
}

impl LifecycleError {
    pub fn bridge(&self) -> &BridgeError {
        match self {
            Self::Init(e)
            | Self::Availability(e)
            | Self::Selection(e)
            | Self::Connect(e)
            | Self::Resolve(e)
            | Self::Read(e)
            | Self::Write(e) => e,
        }
    }

    pub fn code(&self) -> &str {
        &self.bridge().code
    }

    pub fn message(&self) -> &str {
        &self.bridge().message
    }
}
