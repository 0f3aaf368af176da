use super::{ShaderHandle, ShaderStage};

/// Failure reported by a [`GraphicsDevice`](super::GraphicsDevice).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeviceError {
    #[error("{stage} shader compilation failed:\n{log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("program link failed:\n{log}")]
    Link { log: String },

    #[error("render pipeline creation failed:\n{log}")]
    Pipeline { log: String },

    #[error("no {0} bound")]
    NothingBound(&'static str),

    #[error("unknown {kind} handle {raw}")]
    InvalidHandle { kind: &'static str, raw: u32 },

    #[error("shader {0:?} has the wrong stage for this slot")]
    StageMismatch(ShaderHandle),

    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}
