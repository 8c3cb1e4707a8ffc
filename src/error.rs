use thiserror::Error;

/// Main error type for the teletext encoder
#[derive(Error, Debug)]
pub enum TxtError {
    /// A dialogue event carried malformed style markup or an unparseable line
    #[error("ASS parse error: {0}")]
    Parse(#[from] ParseError),

    /// A standard I/O error (configuration file handling)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The event is not of the styled-text kind this encoder accepts
    #[error("Unsupported input type: {0}")]
    UnsupportedInput(String),

    /// A grid cell reached the packer in an invalid state; this indicates a
    /// composer bug and aborts the current event only
    #[error("Invalid cell state at row {row}, column {col}: {detail}")]
    InvalidCellState { row: u8, col: usize, detail: String },

    /// Encoder configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// ASS markup and dialogue-line parsing errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// An override block was opened with `{` but never closed
    #[error("Unterminated override tag at byte {pos}")]
    UnterminatedTag { pos: usize },

    /// A recognized tag carried an argument that could not be parsed
    #[error("Malformed override tag: \\{tag}")]
    MalformedTag { tag: String },

    /// A style reset tag named a style absent from the script header
    #[error("Undefined style referenced: {name}")]
    UndefinedStyle { name: String },

    /// A dialogue line did not match the scripted or packet field layout
    #[error("Bad dialogue line: {detail}")]
    BadDialogueLine { detail: String },

    /// A dialogue timestamp was not in H:MM:SS.CC form
    #[error("Bad timestamp: {value}")]
    BadTimestamp { value: String },

    /// The script header lacked a section the splitter requires
    #[error("Script header missing section: {section}")]
    MissingHeaderSection { section: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, TxtError>;
