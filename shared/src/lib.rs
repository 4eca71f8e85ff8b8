// shared/src/lib.rs

use std::fmt;

/// What a failed name lookup was searching for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupTarget {
    AccountName,
    CurrencyCode,
    CategoryTitle,
}

impl LookupTarget {
    pub fn entity(&self) -> &'static str {
        match self {
            LookupTarget::AccountName | LookupTarget::CurrencyCode => "transaction account",
            LookupTarget::CategoryTitle => "category",
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            LookupTarget::AccountName => "name",
            LookupTarget::CurrencyCode => "currency",
            LookupTarget::CategoryTitle => "title",
        }
    }
}

impl fmt::Display for LookupTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.entity(), self.field())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no {} found with {}: {value}", .target.entity(), .target.field())]
    Lookup { target: LookupTarget, value: String },
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("ledger request failed with status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("transport: {0}")]
    Transport(String),
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("cache: {0}")]
    Cache(String),
    #[error("config: {0}")]
    Config(String),
}

/// Machine-readable discriminant checked at the HTTP boundary
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Lookup,
    Validation,
    Upstream,
    Transport,
    Serialization,
    Cache,
    Config,
}

impl Error {
    pub fn lookup(target: LookupTarget, value: impl Into<String>) -> Self {
        Error::Lookup {
            target,
            value: value.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Lookup { .. } => ErrorKind::Lookup,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Upstream { .. } => ErrorKind::Upstream,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::Cache(_) => ErrorKind::Cache,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    pub fn is_lookup(&self) -> bool {
        self.kind() == ErrorKind::Lookup
    }

    /// Errors the caller can fix by correcting the request
    pub fn is_client_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Lookup | ErrorKind::Validation)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod config;
