use std::{
    collections::HashSet,
    path::Path,
};

/// Volumes exported over SMB through the samba-gluster VFS plugin.
///
/// A share backed by gluster carries a `glusterfs:volume = <name>`
/// directive in its smb.conf section; any volume named that way counts as
/// exported. The registry is read once per run.
#[derive(Clone, Debug, Default)]
pub struct SmbExports {
    volumes: HashSet<String>,
}

impl SmbExports {
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(err) => {
                warn!(path = %path.display(), %err, "Cannot read the smb configuration, treating all volumes as not exported");
                Self::default()
            }
        }
    }

    fn parse(content: &str) -> Self {
        let volumes = content
            .lines()
            .filter_map(|line| {
                let (key, value) = line.split_once('=')?;
                (key.trim() == "glusterfs:volume").then(|| value.trim().to_string())
            })
            .collect();
        Self { volumes }
    }

    pub fn exported(&self, volume: &str) -> bool {
        self.volumes.contains(volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use temp_dir::TempDir;

    const SMB_CONF: &str = "\
[global]
    workgroup = LAB
    security = user

[tank-share]
    vfs objects = glusterfs
    glusterfs:volume = tank
    path = /

[plain-share]
    path = /srv/plain
";

    #[test]
    fn volumes_named_by_the_vfs_directive_are_exported() {
        let exports = SmbExports::parse(SMB_CONF);
        assert!(exports.exported("tank"));
        assert!(!exports.exported("plain-share"));
        assert!(!exports.exported("LAB"));
    }

    #[test]
    fn missing_file_exports_nothing() {
        let dir = TempDir::new().unwrap();
        let exports = SmbExports::load(&dir.path().join("no-smb.conf"));
        assert!(!exports.exported("tank"));
    }

    #[test]
    fn file_on_disk_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("smb.conf");
        std::fs::write(&path, SMB_CONF).unwrap();
        assert!(SmbExports::load(&path).exported("tank"));
    }
}
