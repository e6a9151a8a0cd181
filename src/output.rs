//! Output
//!
//! Serializes discovered descriptors for the import stage.

use crate::resource::ResourceDescriptor;
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Serialization format of the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Everything discovered in one run
#[derive(Debug, Clone, Serialize)]
pub struct ImportManifest {
    pub project: String,
    pub regions: Vec<String>,
    /// RFC 3339 timestamp of the run
    pub generated_at: String,
    pub resources: Vec<ResourceDescriptor>,
}

impl ImportManifest {
    pub fn new(project: &str, regions: &[String], resources: Vec<ResourceDescriptor>) -> Self {
        Self {
            project: project.to_string(),
            regions: regions.to_vec(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            resources,
        }
    }

    /// Render the manifest in `format`
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => {
                let mut out =
                    serde_json::to_string_pretty(self).context("Failed to serialize JSON")?;
                out.push('\n');
                Ok(out)
            },
            OutputFormat::Yaml => serde_yaml::to_string(self).context("Failed to serialize YAML"),
        }
    }

    /// Write the rendered manifest to `path`, or stdout when `None`
    pub fn write(&self, format: OutputFormat, path: Option<&Path>) -> Result<()> {
        let rendered = self.render(format)?;

        match path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, rendered)
                    .with_context(|| format!("Failed to write {:?}", path))?;
                tracing::info!("Wrote {} resources to {:?}", self.resources.len(), path);
            },
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(rendered.as_bytes())
                    .context("Failed to write to stdout")?;
                stdout.flush()?;
            },
        }

        Ok(())
    }
}
