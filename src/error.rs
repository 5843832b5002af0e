use thiserror::Error;

/// Recoverable failure while reading hand-entered schedule text.
///
/// None of these ever reach the caller of [`crate::materialize`]; they are
/// logged and replaced by a default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseWarning {
    #[error("unrecognized wall-clock time `{0}`")]
    Time(String),
    #[error("unrecognized term range `{0}`")]
    TermRange(String),
    #[error("{month}/{day} is not a valid date in {year}")]
    Date { year: i32, month: u32, day: u32 },
}

pub type Result<T> = std::result::Result<T, ParseWarning>;
