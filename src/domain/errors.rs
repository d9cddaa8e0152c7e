use derive_more::Display;

/// Root error type. Most failures in the chart are absorbed where they
/// happen; only ingestion and settings decoding ever travel as `Err`.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum AppError {
    #[display(fmt = "Ingestion Error: {}", _0)]
    Ingestion(IngestionError),
    #[display(fmt = "Settings Error: {}", _0)]
    Settings(SettingsError),
    #[display(fmt = "Rendering Error: {}", _0)]
    Rendering(String),
}

/// Problems found while turning CSV text into records
#[derive(Debug, Clone, PartialEq, Display)]
pub enum IngestionError {
    #[display(fmt = "input is empty")]
    EmptyInput,
    #[display(fmt = "missing required column '{}'", _0)]
    MissingColumn(String),
    #[display(fmt = "line {}: expected {} fields, found {}", line, expected, found)]
    ColumnCount { line: usize, expected: usize, found: usize },
    #[display(fmt = "line {}: unparseable date '{}'", line, value)]
    UnparseableDate { line: usize, value: String },
    #[display(fmt = "line {}: invalid number in '{}': '{}'", line, field, value)]
    InvalidNumber { line: usize, field: &'static str, value: String },
    #[display(fmt = "no valid rows ({} skipped)", skipped)]
    NoValidRows { skipped: usize },
}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum SettingsError {
    #[display(fmt = "corrupt settings blob: {}", _0)]
    Corrupt(String),
    #[display(fmt = "storage unavailable: {}", _0)]
    Storage(String),
}

impl std::error::Error for AppError {}
impl std::error::Error for IngestionError {}
impl std::error::Error for SettingsError {}

impl From<IngestionError> for AppError {
    fn from(error: IngestionError) -> Self {
        AppError::Ingestion(error)
    }
}

impl From<SettingsError> for AppError {
    fn from(error: SettingsError) -> Self {
        AppError::Settings(error)
    }
}

pub type AppResult<T> = Result<T, AppError>;
