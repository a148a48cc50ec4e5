use derive_more::From;
use orion_error::{ErrorCode, StructError, UvsReason};

#[derive(Debug, Clone, PartialEq, thiserror::Error, From)]
pub enum CoreReason {
    #[error("position store unavailable")]
    StoreUnavailable,
    #[error("input file error")]
    InputFile,
    #[error("malformed filename")]
    MalformedFilename,
    #[error("point sink error")]
    Sink,
    #[error("{0}")]
    Uvs(UvsReason),
}

impl ErrorCode for CoreReason {
    fn error_code(&self) -> i32 {
        match self {
            Self::StoreUnavailable => 1001,
            Self::InputFile => 1002,
            Self::MalformedFilename => 1003,
            Self::Sink => 1004,
            Self::Uvs(u) => u.error_code(),
        }
    }
}

pub type CoreError = StructError<CoreReason>;
pub type CoreResult<T> = Result<T, CoreError>;
