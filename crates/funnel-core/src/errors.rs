/// Core error type for the onboarding bot.
///
/// Adapter crates map their specific errors into this type so the dispatcher
/// can tell the recoverable platform outcomes (`BadRequest`) apart from real
/// faults.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] tokio_rusqlite::Error),

    #[error("export error: {0}")]
    Export(String),

    /// The platform rejected the request ("Bad Request: ..."): unknown user,
    /// message already gone, chat unreachable.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("external error: {0}")]
    External(String),
}

impl From<rust_xlsxwriter::XlsxError> for Error {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        Error::Export(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
