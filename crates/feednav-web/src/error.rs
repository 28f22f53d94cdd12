#![forbid(unsafe_code)]

/// Reasons the navigator could not be installed on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupError {
    /// No global `window` (not running in a browser main thread).
    NoWindow,
    /// The window has no `document`.
    NoDocument,
    /// The document has no `<body>` yet.
    NoBody,
    /// A browser call rejected; `detail` is the stringified JS error.
    Dom { op: &'static str, detail: String },
}

impl core::fmt::Display for StartupError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoWindow => write!(f, "no global window"),
            Self::NoDocument => write!(f, "window has no document"),
            Self::NoBody => write!(f, "document has no body"),
            Self::Dom { op, detail } => write!(f, "{op} failed: {detail}"),
        }
    }
}

impl std::error::Error for StartupError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_failing_call() {
        let err = StartupError::Dom {
            op: "addEventListener(keydown)",
            detail: "TypeError".to_string(),
        };
        assert_eq!(err.to_string(), "addEventListener(keydown) failed: TypeError");
        assert_eq!(StartupError::NoBody.to_string(), "document has no body");
    }
}
