//! Result log
//!
//! One pretty-printed JSON file per `(method, qubits, latent)` key inside an
//! explicit results directory. Logging the same key again overwrites the
//! earlier record.

use std::fs;
use std::path::{Path, PathBuf};

use qae_core::RunReport;
use tracing::info;

use crate::error::{ExperimentError, Result};

#[derive(Debug, Clone)]
pub struct ResultLog {
    dir: PathBuf,
}

impl ResultLog {
    /// Opens (and creates if needed) the results directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `{method}_q{qubits}_l{latent}.json`
    pub fn file_name(report: &RunReport) -> String {
        format!("{}_q{}_l{}.json", report.method, report.qubits, report.latent)
    }

    /// Writes `report`, returning the file path.
    ///
    /// The method name must stay a plain file-name component: empty names and
    /// names containing `/`, `\` or `..` are rejected.
    pub fn log_result(&self, report: &RunReport) -> Result<PathBuf> {
        let method = report.method.as_str();
        if method.is_empty() || method.contains(['/', '\\']) || method.contains("..") {
            return Err(ExperimentError::InvalidInput(format!(
                "method name {method:?} is not a plain file name"
            )));
        }
        let path = self.dir.join(Self::file_name(report));
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&path, json)?;
        info!(
            method = %report.method,
            qubits = report.qubits,
            latent = report.latent,
            fidelity = report.fidelity,
            path = %path.display(),
            "result logged"
        );
        Ok(path)
    }

    /// Every `.json` record in the directory, sorted by key.
    pub fn summary(&self) -> Result<Vec<RunReport>> {
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                let text = fs::read_to_string(&path)?;
                records.push(serde_json::from_str::<RunReport>(&text)?);
            }
        }
        records.sort_by(|a, b| a.key().cmp(&b.key()));
        Ok(records)
    }
}
