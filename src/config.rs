// src/config.rs

//! Defines the configuration structures for `bf16-vectors`.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! gives the stock testbench setup: 100 samples over [-10, 10] written to
//! `testbench_results/rtl_testbench_inputs.txt`.

// Serde is used for deserializing the configuration from a file.
// `Serialize` is also derived for convenience, so the effective configuration
// can be exported if needed.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::VectorError;
use crate::range::SampleRange;

pub const DEFAULT_INPUT_PATH: &str = "testbench_results/rtl_testbench_inputs.txt";
pub const DEFAULT_CASES_PATH: &str = "testbench_results/rtl_testbench_cases.txt";

/// Root of the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)] // Apply default values for the entire struct if a field is missing.
pub struct Config {
    /// Stimulus generation settings.
    pub generate: GenerateConfig,
    /// Test-case file settings.
    pub cases: CasesConfig,
    /// Output comparison settings.
    pub compare: CompareConfig,
}

/// Where and over which range stimulus vectors are generated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerateConfig {
    pub output: PathBuf,
    pub start: f32,
    pub stop: f32,
    pub count: usize,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        GenerateConfig {
            output: PathBuf::from(DEFAULT_INPUT_PATH),
            start: -10.0,
            stop: 10.0,
            count: 100,
        }
    }
}

impl GenerateConfig {
    pub fn range(&self) -> Result<SampleRange, VectorError> {
        SampleRange::new(self.start, self.stop, self.count)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CasesConfig {
    pub output: PathBuf,
}

impl Default for CasesConfig {
    fn default() -> Self {
        CasesConfig {
            output: PathBuf::from(DEFAULT_CASES_PATH),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompareConfig {
    /// Largest accepted absolute error between simulator output and reference.
    pub tolerance: f32,
}

impl Default for CompareConfig {
    fn default() -> Self {
        CompareConfig {
            // One bf16 ulp at 1.0.
            tolerance: 1.0 / 128.0,
        }
    }
}

impl Config {
    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, VectorError> {
        let text = fs::read_to_string(path).map_err(|e| VectorError::io(path, e))?;
        serde_json::from_str(&text).map_err(|source| VectorError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `load` when a path is given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, VectorError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
