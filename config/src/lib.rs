//! Configuration for the gluster stats gatherer.
//!
//! Settings are layered from three sources, later ones winning: the defaults
//! baked into the binary, an optional `config.yaml` in the configuration
//! directory (or the file named by `--config`), and command-line flags.

#[macro_use]
extern crate tracing;

mod args;

pub use args::Args;
use lazy_static::lazy_static;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    collections::HashMap,
    env,
    path::PathBuf,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub volume_info_command: String,
    pub confdir: PathBuf,
    pub collector: String,
    pub process_stopped_volumes: bool,
    /// Hostname considered local. When unset the kernel's is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    pub nfs_pid_file: PathBuf,
    pub brick_daemon: String,
    /// smb.conf-style file listing exported volumes. SMB detection is
    /// skipped when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smb_conf: Option<PathBuf>,
}

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

impl Default for Config {
    fn default() -> Self {
        serde_yml::from_str(DEFAULT_CONFIG).expect("Failed to parse default config")
    }
}

impl config::Source for Config {
    fn clone_into_box(&self) -> Box<dyn config::Source + Send + Sync> {
        Box::new((*self).clone())
    }

    fn collect(&self) -> Result<config::Map<String, config::Value>, config::ConfigError> {
        let mut cache = HashMap::<String, config::Value>::new();
        cache.insert(
            "volume_info_command".to_string(),
            self.volume_info_command.clone().into(),
        );
        cache.insert("confdir".to_string(), self.confdir.display().to_string().into());
        cache.insert("collector".to_string(), self.collector.clone().into());
        cache.insert(
            "process_stopped_volumes".to_string(),
            self.process_stopped_volumes.into(),
        );
        if let Some(host) = &self.hostname {
            cache.insert("hostname".to_string(), host.clone().into());
        }
        cache.insert(
            "nfs_pid_file".to_string(),
            self.nfs_pid_file.display().to_string().into(),
        );
        cache.insert("brick_daemon".to_string(), self.brick_daemon.clone().into());
        if let Some(file) = &self.smb_conf {
            cache.insert("smb_conf".to_string(), file.display().to_string().into());
        }
        Ok(cache)
    }
}

impl Config {
    pub fn new(args: Args) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder().add_source(Config::default());

        // An explicit --config must exist; the well-known one is optional.
        let file = match &args.config {
            Some(path) => config::File::from(path.clone())
                .format(config::FileFormat::Yaml)
                .required(true),
            None => config::File::from(get_config_dir().join("config.yaml"))
                .format(config::FileFormat::Yaml)
                .required(false),
        };
        builder = builder.add_source(file);

        builder = builder.add_source(args);

        let cfg: Self = builder.build()?.try_deserialize()?;
        debug!(?cfg, "Resolved configuration");

        Ok(cfg)
    }
}

lazy_static! {
    static ref CONFIG_FOLDER: Option<PathBuf> = env::var("GLUSTER_STATS_GATHERER_CONFIG")
        .ok()
        .map(PathBuf::from);
}

pub fn get_config_dir() -> PathBuf {
    if let Some(dir) = CONFIG_FOLDER.clone() {
        dir
    } else {
        PathBuf::from("/etc/gluster-stats-gatherer")
    }
}
