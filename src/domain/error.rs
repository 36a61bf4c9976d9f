//! Domain error types.

/// Top-level error type for pricetl.
#[derive(Debug, thiserror::Error)]
pub enum EtlError {
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("malformed input: {path}")]
    MalformedInput { path: String },

    #[error("no numeric value found{}", context_suffix(.context))]
    NoNumericValue { context: Option<String> },

    #[error("store error: {reason}")]
    Store { reason: String },

    #[error("store query error: {reason}")]
    StoreQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn context_suffix(context: &Option<String>) -> String {
    match context {
        Some(c) => format!(" for {c}"),
        None => String::new(),
    }
}

impl EtlError {
    pub fn malformed(path: impl Into<String>) -> Self {
        EtlError::MalformedInput { path: path.into() }
    }

    /// Attach an instrument code to a bare `NoNumericValue`; other errors pass through.
    pub fn for_instrument(self, code: &str) -> Self {
        match self {
            EtlError::NoNumericValue { context: None } => EtlError::NoNumericValue {
                context: Some(code.to_string()),
            },
            other => other,
        }
    }
}

impl From<&EtlError> for std::process::ExitCode {
    fn from(err: &EtlError) -> Self {
        let code: u8 = match err {
            EtlError::Io(_) | EtlError::Json(_) => 1,
            EtlError::ConfigParse { .. }
            | EtlError::ConfigMissing { .. }
            | EtlError::ConfigInvalid { .. } => 2,
            EtlError::Store { .. } | EtlError::StoreQuery { .. } => 3,
            EtlError::Fetch { .. } => 4,
            EtlError::MalformedInput { .. } => 5,
            EtlError::NoNumericValue { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
