use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("IO error: {}: {}", path.display(), source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {}: {}", path.display(), message)]
    Parse { path: PathBuf, message: String },

    #[error("Cannot resolve '{}' from {}: {}", specifier, importer.display(), reason)]
    Resolution {
        specifier: String,
        importer: PathBuf,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Build error: {0}")]
    Build(String),
}

impl BundleError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn resolution(
        specifier: impl Into<String>,
        importer: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Resolution {
            specifier: specifier.into(),
            importer: importer.into(),
            reason: reason.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Format error with enhanced context display
    pub fn format_detailed(&self) -> String {
        match self {
            BundleError::Io { path, source } => {
                format!("❌ IO Error: {}\n📁 File: {}", source, path.display())
            }
            BundleError::Parse { path, message } => {
                let mut output = format!("❌ Parse Error: {}", first_line(message));
                output.push_str(&format!("\n📁 File: {}", path.display()));
                if message.lines().count() > 1 {
                    output.push_str(&format!("\n📝 Diagnostic:\n{}", indent(message)));
                }
                output
            }
            BundleError::Resolution {
                specifier,
                importer,
                reason,
            } => format!(
                "❌ Resolution Error: cannot resolve '{}'\n📁 Imported from: {}\n💡 {}",
                specifier,
                importer.display(),
                reason
            ),
            _ => format!("❌ {}", self),
        }
    }
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or(message)
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("   │ {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, BundleError>;

impl From<serde_json::Error> for BundleError {
    fn from(err: serde_json::Error) -> Self {
        BundleError::Build(format!("JSON error: {}", err))
    }
}
