use crate::topology::{
    Brick,
    Volume,
};
use eyre::{
    Context as _,
    Result,
};
use std::{
    path::PathBuf,
    process::{
        ExitStatus,
        Stdio,
    },
};
use tokio::process::Command;

/// Maps a volume type to the collector hook executable for it.
#[derive(Clone, Debug)]
pub struct HookResolver {
    confdir: PathBuf,
    collector: String,
}

impl HookResolver {
    pub fn new(confdir: PathBuf, collector: String) -> Self {
        Self { confdir, collector }
    }

    /// `<confdir>/<collector>.d/<kind>`, unless a site override exists at
    /// `<confdir>/<collector>.custom.d/<kind>`. The returned path is not
    /// checked further; a missing or unrunnable hook surfaces at launch.
    pub fn resolve(&self, kind: &str) -> PathBuf {
        let custom = self.confdir.join(format!("{}.custom.d", self.collector)).join(kind);
        if custom.exists() {
            debug!(hook = %custom.display(), "Using the site override hook");
            return custom;
        }
        self.confdir.join(format!("{}.d", self.collector)).join(kind)
    }
}

/// Everything one hook invocation learns through its environment. Built
/// fresh per brick, so nothing can leak over from an earlier invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HookContext {
    pub volname: String,
    pub voltype: String,
    pub brick: String,
    pub brick_mountpoint: String,
    pub nfs_pid: String,
    pub glusterfsd_pid: String,
    pub error: Option<String>,
}

impl HookContext {
    pub fn for_brick(volume: &Volume, brick: &Brick) -> Self {
        Self {
            volname: volume.name.clone(),
            voltype: volume.kind.clone(),
            brick: brick.to_string(),
            brick_mountpoint: brick.path().unwrap_or_default().to_string(),
            nfs_pid: volume.nfs_pid.clone().unwrap_or_else(|| super::UNKNOWN_PID.to_string()),
            glusterfsd_pid: volume
                .glusterfsd_pid
                .clone()
                .unwrap_or_else(|| super::UNKNOWN_PID.to_string()),
            error: volume.error.clone(),
        }
    }

    /// The `GLUSTER_*` environment contract. `GLUSTER_ERROR` appears only
    /// when a validation error was recorded.
    pub fn env(&self) -> Vec<(&'static str, String)> {
        let mut env = vec![
            ("GLUSTER_VOLNAME", self.volname.clone()),
            ("GLUSTER_VOLTYPE", self.voltype.clone()),
            ("GLUSTER_BRICK", self.brick.clone()),
            ("GLUSTER_BRICK_MP", self.brick_mountpoint.clone()),
            ("GLUSTER_NFS_PID", self.nfs_pid.clone()),
            ("GLUSTER_GLUSTERFSD_PID", self.glusterfsd_pid.clone()),
        ];
        if let Some(error) = &self.error {
            env.push(("GLUSTER_ERROR", error.clone()));
        }
        env
    }
}

/// One hook invocation: the resolved executable plus the context it runs
/// under. Jobs are run one at a time and fully awaited so the shared
/// output buffer stays in brick-then-volume order.
#[derive(Debug)]
pub struct HookJob {
    executable: PathBuf,
    context: HookContext,
}

impl HookJob {
    pub fn new(executable: PathBuf, context: HookContext) -> Self {
        Self { executable, context }
    }

    /// Spawns the hook with no arguments and waits for it to finish. The
    /// child inherits our environment with the `GLUSTER_*` contract layered
    /// on top; its stdout goes to the handle given here.
    pub async fn run(&self, stdout: Stdio) -> Result<ExitStatus> {
        let mut child = Command::new(&self.executable)
            .envs(self.context.env())
            .stdout(stdout)
            .spawn()
            .with_context(|| format!("Failed to launch hook {}", self.executable.display()))?;
        let status = child
            .wait()
            .await
            .with_context(|| format!("Failed to wait for hook {}", self.executable.display()))?;
        debug!(hook = %self.executable.display(), %status, "Hook finished");
        Ok(status)
    }
}
