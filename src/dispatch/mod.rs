//! Walking the topology and running collector hooks.
//!
//! The [`Dispatcher`] visits every volume in report order and every brick
//! in volume order, skipping what is not local, validating the backing
//! daemons, and invoking one hook per local brick. Hook stdout is gathered
//! by the [`OutputAggregator`] into the final line sequence.
//!
//! Hooks run strictly one at a time, each fully awaited before the next
//! starts. The shared output buffer is only attributable while writes
//! cannot interleave; a concurrent variant would have to collect per-hook
//! output separately and merge it in dispatch order.

mod hooks;
mod locality;
mod output;
mod process;
mod smb;

pub use hooks::{
    HookContext,
    HookJob,
    HookResolver,
};
pub use locality::LocalityFilter;
pub use output::OutputAggregator;
pub use process::ProcessValidator;
pub use smb::SmbExports;

use crate::topology::Topology;
use eyre::{
    Context as _,
    Result,
};
use gluster_stats_config::Config;

/// Pid value hooks receive when no live pid was recorded.
pub const UNKNOWN_PID: &str = "0";

pub struct Dispatcher {
    locality: LocalityFilter,
    validator: ProcessValidator,
    resolver: HookResolver,
    exports: Option<SmbExports>,
    process_stopped_volumes: bool,
}

impl Dispatcher {
    pub fn new(config: &Config) -> Result<Self> {
        let hostname = match config.hostname.clone() {
            Some(hostname) => hostname,
            None => hostname::get()
                .map(|host| host.to_string_lossy().into_owned())
                .context("Failed to determine the local hostname")?,
        };
        info!(%hostname, collector = %config.collector, "Dispatching as this host");

        Ok(Self::with_components(
            LocalityFilter::new(hostname),
            ProcessValidator::new(config.brick_daemon.clone(), config.nfs_pid_file.clone()),
            HookResolver::new(config.confdir.clone(), config.collector.clone()),
            config.smb_conf.as_deref().map(SmbExports::load),
            config.process_stopped_volumes,
        ))
    }

    /// Fully injected variant; tests use it to point every probe at
    /// fixtures.
    pub fn with_components(
        locality: LocalityFilter,
        validator: ProcessValidator,
        resolver: HookResolver,
        exports: Option<SmbExports>,
        process_stopped_volumes: bool,
    ) -> Self {
        Self {
            locality,
            validator,
            resolver,
            exports,
            process_stopped_volumes,
        }
    }

    /// Runs the hooks for every local brick and returns their combined
    /// stdout as one ordered sequence of non-empty lines.
    ///
    /// Validation and launch failures are absorbed: they are logged,
    /// recorded on the volume where hooks can see them, and never stop the
    /// remaining bricks or volumes.
    pub async fn run(&self, topology: &mut Topology) -> Result<Vec<String>> {
        let output = OutputAggregator::new()?;

        for volume in topology.volumes_mut() {
            if !volume.started() && !self.process_stopped_volumes {
                debug!(volume = %volume.name, status = %volume.status, "Skipping volume that is not started");
                continue;
            }

            volume.nfs_pid = Some(UNKNOWN_PID.to_string());
            volume.glusterfsd_pid = Some(UNKNOWN_PID.to_string());

            if let Some(exports) = &self.exports {
                volume.smb_enabled = exports.exported(&volume.name);
            }

            let bricks = volume.bricks.clone();
            for brick in &bricks {
                if !self.locality.is_local(brick) {
                    trace!(volume = %volume.name, %brick, "Skipping brick hosted elsewhere");
                    continue;
                }

                if volume.nfs_enabled {
                    self.validator.check_nfs(volume);
                }
                if volume.smb_enabled {
                    self.validator.check_smb(volume);
                }
                self.validator.check_brick_daemon(volume, brick);

                let executable = self.resolver.resolve(&volume.kind);
                let context = HookContext::for_brick(volume, brick);
                match HookJob::new(executable, context).run(output.stdout()?).await {
                    Ok(status) if !status.success() => {
                        warn!(volume = %volume.name, %brick, %status, "Hook reported failure");
                    }
                    Ok(_) => {}
                    Err(err) => {
                        warn!(volume = %volume.name, %brick, "Skipping brick, hook did not launch: {err:#}");
                    }
                }
            }
        }

        output.lines()
    }
}
