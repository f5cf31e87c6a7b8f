use thiserror::Error;

#[derive(Debug, Error)]
pub enum RadError {
    #[error("invalid configuration: {reason}")]
    Config { reason: String },

    #[error("request to `{url}` failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("malformed server reply: {reason}\nraw result: {raw}")]
    Protocol { reason: String, raw: String },

    #[error("cannot find package `{name}` in the IDE package list")]
    PackageNotFound { name: String },

    #[error("package index {index} is out of range (package count is {count})")]
    PackageIndexOutOfRange { index: i64, count: usize },

    #[error("package file name is not known; open the package again or reload it from an index")]
    MissingPackageInfo,

    #[error("unexpected result from `{method}`: {value}")]
    UnexpectedResult { method: String, value: String },

    #[error("runtime setup failed: {0}")]
    RuntimeJoin(String),
}

impl RadError {
    /// True for the failures that happen before any request leaves the process.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol { .. })
    }
}
