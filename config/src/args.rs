use clap::Parser;
use std::path::PathBuf;

/// GlusterFS per-volume stats gatherer
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a config file (yaml). When given, the file must exist;
    /// otherwise `config.yaml` in the config directory is used if present.
    #[clap(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Command printing the volume topology report.
    #[clap(long = "volume-info-command", value_name = "CMD")]
    pub volume_info_command: Option<String>,

    /// Base directory of the collector hooks (`<confdir>/<collector>.d/<type>`).
    #[clap(long, value_name = "DIR", env = "GLUSTER_STATS_CONFDIR")]
    pub confdir: Option<PathBuf>,

    /// Collector identity selecting the hook directory pair.
    #[clap(long, value_name = "NAME")]
    pub collector: Option<String>,

    /// Also dispatch hooks for volumes that are not started.
    #[clap(long = "process-stopped-volumes", action)]
    pub process_stopped_volumes: Option<bool>,

    /// Hostname to treat as local instead of asking the kernel.
    #[clap(long, value_name = "HOST")]
    pub hostname: Option<String>,

    /// Pid file of the gluster NFS server.
    #[clap(long = "nfs-pid-file", value_name = "FILE")]
    pub nfs_pid_file: Option<PathBuf>,

    /// Process name expected to serve bricks.
    #[clap(long = "brick-daemon", value_name = "NAME")]
    pub brick_daemon: Option<String>,

    /// smb.conf-style file consulted for `glusterfs:volume` exports.
    /// SMB detection is skipped when unset.
    #[clap(long = "smb-conf", value_name = "FILE")]
    pub smb_conf: Option<PathBuf>,

    /// Log debug detail to stderr.
    #[clap(long, short, action)]
    pub verbose: bool,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(cmd) = &self.volume_info_command {
                cache.insert("volume_info_command".to_string(), cmd.clone().into());
            }
            if let Some(dir) = &self.confdir {
                cache.insert("confdir".to_string(), dir.display().to_string().into());
            }
            if let Some(name) = &self.collector {
                cache.insert("collector".to_string(), name.clone().into());
            }
            if let Some(process_stopped) = self.process_stopped_volumes {
                cache.insert("process_stopped_volumes".to_string(), process_stopped.into());
            }
            if let Some(host) = &self.hostname {
                cache.insert("hostname".to_string(), host.clone().into());
            }
            if let Some(file) = &self.nfs_pid_file {
                cache.insert("nfs_pid_file".to_string(), file.display().to_string().into());
            }
            if let Some(name) = &self.brick_daemon {
                cache.insert("brick_daemon".to_string(), name.clone().into());
            }
            if let Some(file) = &self.smb_conf {
                cache.insert("smb_conf".to_string(), file.display().to_string().into());
            }
            Ok(cache)
        }
    }
}
