//! Long-lived entry point owning the tool paths and the scratch directory.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use kexp_config::KexpConfig;
use kexp_core::{ToolPaths, log_info, paths};
use kexp_tools::{ProcessRunner, SystemRunner};
use tokio::sync::Mutex;

use crate::error::DriverError;
use crate::pipeline::{BuildOptions, BuildOutcome, Pipeline};
use crate::sink::BuildSink;

/// Runs builds against one scratch directory, one at a time.
///
/// A build requested while another is running is rejected with
/// [`DriverError::BuildInProgress`] instead of queued.
pub struct Explorer {
    paths: ToolPaths,
    options: BuildOptions,
    runner: Arc<dyn ProcessRunner>,
    in_flight: Mutex<()>,
}

impl Explorer {
    pub fn new(paths: ToolPaths, options: BuildOptions, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            paths,
            options,
            runner,
            in_flight: Mutex::new(()),
        }
    }

    /// Discover tools and prepare the scratch directory from configuration.
    ///
    /// `scratch_override` wins over `[build] scratch_dir`.
    pub fn from_config(
        config: &KexpConfig,
        scratch_override: Option<&Path>,
    ) -> Result<Self, DriverError> {
        let explicit = scratch_override.or(config.build.scratch_dir.as_deref());
        let scratch_dir = paths::scratch_dir(explicit)?;
        let tool_paths = ToolPaths::discover(&config.toolchain, scratch_dir)?;
        let runner = SystemRunner::with_timeout(config.build.timeout_secs.map(Duration::from_secs));

        log_info!(
            "explorer",
            scratch = %tool_paths.scratch_dir.display(),
            optimize = config.build.optimize,
            "Explorer ready"
        );
        Ok(Self::new(
            tool_paths,
            BuildOptions::from_config(config),
            Arc::new(runner),
        ))
    }

    pub fn paths(&self) -> &ToolPaths {
        &self.paths
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Run the full pipeline for `source`, reporting through `sink`.
    pub async fn build(
        &self,
        source: &str,
        sink: &dyn BuildSink,
    ) -> Result<BuildOutcome, DriverError> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| DriverError::BuildInProgress)?;

        Pipeline::new(&self.paths, &self.options, self.runner.as_ref(), sink)
            .run(source)
            .await
    }
}
