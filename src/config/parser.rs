//! Parameter file loading.
//!
//! Typed deployment properties are read from a YAML file; context strings
//! come from the command line. Both are gathered here once, at the entry
//! point, and handed to the resolver as a [`RawParameters`] value.

use crate::error::{CiStackError, ConfigError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::params::{ContextParams, DeploymentProps, RawParameters};

/// Loader for deployment parameters.
#[derive(Debug, Default)]
pub struct ParamsParser {
    /// Base path for resolving `.env` and relative paths.
    base_path: Option<PathBuf>,
}

impl ParamsParser {
    /// Creates a new parameters parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads typed properties from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<DeploymentProps> {
        let path = path.as_ref();
        info!("Loading deployment parameters from: {}", path.display());

        if !path.exists() {
            return Err(CiStackError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            CiStackError::Config(ConfigError::parse(
                format!("Failed to read file: {e}"),
                Some(path.display().to_string()),
            ))
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses typed properties from a YAML string.
    ///
    /// An empty document yields empty properties.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<DeploymentProps> {
        debug!("Parsing YAML parameters");

        if content.trim().is_empty() {
            return Ok(DeploymentProps::default());
        }

        let props: DeploymentProps = serde_yaml::from_str(content).map_err(|e| {
            CiStackError::Config(ConfigError::parse(
                format!("YAML parse error: {e}"),
                source.map(|p| p.display().to_string()),
            ))
        })?;

        Ok(props)
    }

    /// Gathers both parameter sources.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is invalid or a context entry is malformed.
    pub fn load<S: AsRef<str>>(
        &self,
        params_file: Option<&Path>,
        context: &[S],
    ) -> Result<RawParameters> {
        let props = match params_file {
            Some(path) => self.load_file(path)?,
            None => {
                debug!("No parameters file given; using context only");
                DeploymentProps::default()
            }
        };

        let context = ContextParams::parse(context)?;
        Ok(RawParameters::new(props, context))
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                CiStackError::Config(ConfigError::parse(
                    format!("Failed to load .env file: {e}"),
                    Some(env_path.display().to_string()),
                ))
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Template written by `ci-stack init`.
pub const PARAMS_TEMPLATE: &str = include_str!("../../templates/ci-stack.params.yaml");

/// Template `.env` written by `ci-stack init`.
pub const ENV_TEMPLATE: &str = include_str!("../../templates/.env.example");

/// Default parameter file names to search for.
pub const DEFAULT_PARAMS_FILES: &[&str] = &[
    "ci-stack.params.yaml",
    "ci-stack.params.yml",
    "params.yaml",
    "params.yml",
];

/// Finds a parameters file in the given directory or its parents.
///
/// Returns `None` when there is none; context-only runs are valid.
#[must_use]
pub fn find_params_file(start_dir: impl AsRef<Path>) -> Option<PathBuf> {
    let mut current = start_dir.as_ref().to_path_buf();

    loop {
        for filename in DEFAULT_PARAMS_FILES {
            let candidate = current.join(filename);
            if candidate.exists() {
                info!("Found parameters file: {}", candidate.display());
                return Some(candidate);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}
