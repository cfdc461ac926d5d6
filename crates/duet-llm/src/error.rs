#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Missing GEMINI_API_KEY environment variable.")]
    MissingCredential,

    /// Provider answered with a non-success status.
    #[error("Gemini request failed with status {status}.")]
    Upstream { status: u16, detail: String },

    /// Provider could not be reached or the body could not be read.
    #[error("Gemini request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Could not parse Gemini response.")]
    Parse { raw: String },

    #[error("Gemini response missing prompt.")]
    MissingPrompt { raw: String },
}

impl GenerateError {
    /// Raw provider text attached for diagnosis, when there is one.
    pub fn raw(&self) -> Option<&str> {
        match self {
            GenerateError::Parse { raw } | GenerateError::MissingPrompt { raw } => Some(raw),
            _ => None,
        }
    }
}
