use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    InvalidAmount { input: String },
    InvalidPhoneNumber { input: String },
    UnknownCountry { key: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::InvalidAmount { input } => write!(f, "invalid decimal amount: {input}"),
            Self::InvalidPhoneNumber { input } => write!(f, "invalid phone number: {input}"),
            Self::UnknownCountry { key } => write!(f, "unknown country: {key}"),
        }
    }
}

impl std::error::Error for ValidationError {}
