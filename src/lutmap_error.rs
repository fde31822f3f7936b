// SPDX-License-Identifier: Apache-2.0

#[derive(Debug)]
pub enum LutMapError {
    /// Mapping or enumeration parameters that the passes cannot honor.
    InvalidParams(String),
    /// A truth table could not be built from the given description.
    InvalidTruthTable(String),
    /// Configuration text could not be parsed.
    Config(serde_json::Error),
}

impl std::fmt::Display for LutMapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LutMapError::InvalidParams(msg) => write!(f, "lutmap error: invalid params: {}", msg),
            LutMapError::InvalidTruthTable(msg) => {
                write!(f, "lutmap error: invalid truth table: {}", msg)
            }
            LutMapError::Config(e) => write!(f, "lutmap error: config: {}", e),
        }
    }
}

impl std::error::Error for LutMapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LutMapError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LutMapError {
    fn from(e: serde_json::Error) -> Self {
        LutMapError::Config(e)
    }
}
