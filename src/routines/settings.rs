use crate::routines::evaluation::newton::Linearization;
use anyhow::{bail, Result};
use config::Config as eConfig;
use serde::Deserialize;
use serde_derive::Serialize;

/// Contains all settings for ldacore
#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Settings {
    /// Convergence criteria for the Newton-Raphson loop
    pub convergence: Convergence,
    /// Advanced options, mostly hyperparameters, for the solver
    pub advanced: Advanced,
    /// Configuration for logging
    pub log: Log,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            convergence: Convergence::default(),
            advanced: Advanced::default(),
            log: Log::default(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Settings::default()
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        self.convergence.validate()?;
        Ok(())
    }
}

/// This struct contains the convergence criteria for the solver
#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Convergence {
    /// Maximum number of Newton-Raphson iterations per call
    pub max_iterations: usize,
    /// Minimum Euclidean norm of the update
    ///
    /// An update with a smaller norm stops the iteration without being applied.
    pub change_threshold: f64,
}

impl Default for Convergence {
    fn default() -> Self {
        Convergence {
            max_iterations: 100,
            change_threshold: 1e-5,
        }
    }
}

impl Convergence {
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            bail!("max_iterations must be at least 1");
        }
        if !self.change_threshold.is_finite() || self.change_threshold <= 0.0 {
            bail!(format!(
                "change_threshold must be positive and finite, got {}",
                self.change_threshold
            ));
        }
        Ok(())
    }
}

/// This struct contains advanced options and hyperparameters
#[derive(Debug, Deserialize, Clone, Serialize, Default)]
#[serde(deny_unknown_fields, default)]
pub struct Advanced {
    /// Expansion point policy for the per-iteration linearization
    ///
    /// See [Linearization] for the available policies. The default
    /// re-linearizes at the latest estimate.
    pub linearization: Linearization,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Log {
    /// The maximum log level to display
    ///
    /// The log level is defined as a string, and can be one of the following:
    /// - `trace`
    /// - `debug`
    /// - `info`
    /// - `warn`
    /// - `error`
    pub level: String,
    /// Optional file to copy the log to
    pub file: Option<String>,
    /// Whether to write logs
    ///
    /// If set to `false`, a global subscriber will not be set by ldacore.
    /// This can be useful when the user wants to use a custom subscriber for a
    /// third-party library, or perform benchmarks.
    pub write: bool,
}

impl Default for Log {
    fn default() -> Self {
        Log {
            level: String::from("info"),
            file: None,
            write: true,
        }
    }
}

/// Parses the settings from a TOML configuration file
///
/// This function parses the settings from a TOML configuration file, and
/// validates the entries.
///
/// Entries in the TOML file may be overridden by environment variables. The
/// environment variables must be prefixed with `LDACORE_`, and the TOML entry
/// must be in uppercase. A single underscore, `_`, is used as the separator
/// for nested entries.
pub fn read(path: impl Into<String>) -> Result<Settings> {
    let settings_path = path.into();

    let parsed = eConfig::builder()
        .add_source(config::File::with_name(&settings_path).format(config::FileFormat::Toml))
        .add_source(config::Environment::with_prefix("LDACORE").separator("_"))
        .build()?;

    let settings: Settings = parsed.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
