use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("No confirmed payments to print.")]
    NoConfirmedPayments,

    #[error("Config directory not found at {0}. Run 'payments-report init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Failed to read payments from {path}: {reason}")]
    PaymentsParse { path: PathBuf, reason: String },

    #[error("Amount {0} cannot be written to the spreadsheet")]
    InvalidAmount(String),

    #[error("Failed to build spreadsheet: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("Document converter '{0}' not found. Install LibreOffice or set [converter] program in config.toml")]
    ConverterNotFound(String),

    #[error("Failed to launch document converter '{program}': {source}")]
    ConverterLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Document converter '{program}' failed ({status}): {stderr}")]
    ConversionFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("Document converter '{program}' did not finish within {secs}s")]
    ConversionTimeout { program: String, secs: u64 },

    #[error("Converted file not found: {0}")]
    ConvertedFileMissing(PathBuf),

    #[error("Attachment {0} not found")]
    AttachmentNotFound(u64),

    #[error("Attachment payload is not valid base64: {0}")]
    InvalidPayload(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    /// True for failures the user can fix by changing the selection.
    pub fn is_validation(&self) -> bool {
        matches!(self, ReportError::NoConfirmedPayments)
    }

    /// True for failures of the external document converter.
    pub fn is_conversion(&self) -> bool {
        matches!(
            self,
            ReportError::ConverterNotFound(_)
                | ReportError::ConverterLaunch { .. }
                | ReportError::ConversionFailed { .. }
                | ReportError::ConversionTimeout { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
