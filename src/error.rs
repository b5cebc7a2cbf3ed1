pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid interactive input. The message is already localised.
    #[error("{0}")]
    Input(String),

    #[error("Пустой файл")]
    EmptyFile,

    #[error("Нет данных")]
    NoData,

    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    #[error("Unknown experience code: {0}")]
    UnknownExperience(String),

    #[error("Field '{field}' is not a number: {value:?}")]
    InvalidNumber { field: String, value: String },

    #[error("Invalid date: {0:?}")]
    InvalidDate(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel export error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("PDF conversion failed: {0}")]
    Pdf(String),
}

impl Error {
    pub fn invalid_number(field: &str, value: &str) -> Self {
        Error::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Errors that end the run with a message but are not failures.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Error::Input(_) | Error::EmptyFile | Error::NoData)
    }
}
