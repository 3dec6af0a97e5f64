use thiserror::Error;

pub type VgenResult<T> = Result<T, VgenError>;

#[derive(Debug, Error)]
pub enum VgenError {
    /// File IO error
    #[error("IO exception: {0}")]
    Io(#[from] std::io::Error),
    /// Parsing error (CSV, Verilog, values)
    #[error("Line {line}: {txt}")]
    Parse { line: usize, txt: String },
    /// Descriptor lacks a key required by the requested artifact
    #[error("Row {row} ({name}): missing required key '{key}'")]
    MissingKey { row: usize, name: String, key: String },
    /// Duplicated descriptor name
    #[error("Descriptor {0} duplicated !")]
    Duplicated(String),
    /// Descriptor values incompatible with the register/pad layout
    #[error("Invalid layout: {0}")]
    Layout(String),
    /// Descriptor table claims something absent from the source
    #[error("Found descriptors in {table} not in {hdl}: {names:?}")]
    Consistency { table: String, hdl: String, names: Vec<String> },
    /// Template does not contain an expected tag
    #[error("Template {template}: tag '{tag}' not found")]
    Template { template: String, tag: String },
    /// Pad signal wider than one bit
    #[error("Signal {name} is {nbits} bits wide, pads must be single-bit")]
    Width { name: String, nbits: u32 },
    /// Invalid configuration file
    #[error("Configuration error: {0}")]
    Config(String),
}

impl VgenError {

    pub fn parse(line: usize, txt: impl Into<String>) -> Self {
        VgenError::Parse { line, txt: txt.into() }
    }

    pub fn template(template: &str, tag: &str) -> Self {
        VgenError::Template { template: template.to_owned(), tag: tag.to_owned() }
    }
}

impl From<toml::de::Error> for VgenError {
    fn from(cause: toml::de::Error) -> VgenError {
        VgenError::Config(cause.to_string())
    }
}
