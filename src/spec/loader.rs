use crate::spec::schema::{PatchSpec, ValidationError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum SpecError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

impl SpecError {
    fn with_path(self, path: &Path) -> Self {
        let path = path.to_path_buf();
        match self {
            SpecError::Toml { path: None, source } => SpecError::Toml {
                path: Some(path),
                source,
            },
            SpecError::Validation { path: None, source } => SpecError::Validation {
                path: Some(path),
                source,
            },
            other => other,
        }
    }
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecError::Io { path, source } => {
                write!(
                    f,
                    "failed to read patch spec from {}: {}",
                    path.display(),
                    source
                )
            }
            SpecError::Toml { path, source } => match path {
                Some(path) => write!(
                    f,
                    "failed to parse patch spec TOML ({}): {}",
                    path.display(),
                    source
                ),
                None => write!(f, "failed to parse patch spec TOML: {}", source),
            },
            SpecError::Validation { path, source } => match path {
                Some(path) => write!(f, "invalid patch spec ({}): {}", path.display(), source),
                None => write!(f, "invalid patch spec: {}", source),
            },
        }
    }
}

impl std::error::Error for SpecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SpecError::Io { source, .. } => Some(source),
            SpecError::Toml { source, .. } => Some(source),
            SpecError::Validation { source, .. } => Some(source),
        }
    }
}

pub fn load_from_str(input: &str) -> Result<PatchSpec, SpecError> {
    let spec: PatchSpec = toml_edit::de::from_str(input)
        .map_err(|source| SpecError::Toml { path: None, source })?;
    spec.validate()
        .map_err(|source| SpecError::Validation { path: None, source })?;
    Ok(spec)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<PatchSpec, SpecError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| SpecError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.with_path(path))
}
