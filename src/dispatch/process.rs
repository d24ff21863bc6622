use crate::topology::{
    Brick,
    Volume,
};
use std::{
    fs,
    path::PathBuf,
};

/// Confirms that the daemons backing a local brick are actually running.
///
/// Findings are written onto the volume itself: pids on success, an
/// explanatory `error` on failure. A failed check never aborts the run;
/// the error travels to the hook through its invocation context instead.
#[derive(Clone, Debug)]
pub struct ProcessValidator {
    proc_root: PathBuf,
    brick_daemon: String,
    nfs_pid_file: PathBuf,
}

impl ProcessValidator {
    pub fn new(brick_daemon: String, nfs_pid_file: PathBuf) -> Self {
        Self::with_proc_root(PathBuf::from("/proc"), brick_daemon, nfs_pid_file)
    }

    /// Everything is read relative to `proc_root`, so tests can point the
    /// validator at a fixture tree instead of the real `/proc`.
    pub fn with_proc_root(proc_root: PathBuf, brick_daemon: String, nfs_pid_file: PathBuf) -> Self {
        Self {
            proc_root,
            brick_daemon,
            nfs_pid_file,
        }
    }

    /// Looks for a brick-daemon process whose command line mentions the
    /// brick's path and records its pid, or an error naming brick and
    /// volume when none does.
    pub fn check_brick_daemon(&self, volume: &mut Volume, brick: &Brick) {
        match self.find_brick_daemon_pid(brick) {
            Some(pid) => {
                debug!(volume = %volume.name, %brick, %pid, "Brick daemon is running");
                volume.glusterfsd_pid = Some(pid);
            }
            None => {
                warn!(volume = %volume.name, %brick, daemon = %self.brick_daemon, "No running brick daemon");
                volume.glusterfsd_pid = Some(super::UNKNOWN_PID.to_string());
                volume.error = Some(format!(
                    "no {} process found for brick {} of volume {}",
                    self.brick_daemon, brick, volume.name
                ));
            }
        }
    }

    fn find_brick_daemon_pid(&self, brick: &Brick) -> Option<String> {
        let path = brick.path()?;
        for pid in self.pids() {
            let proc_dir = self.proc_root.join(&pid);
            let comm = fs::read_to_string(proc_dir.join("comm")).unwrap_or_default();
            if comm.trim_end() != self.brick_daemon {
                continue;
            }
            // cmdline is NUL-separated.
            let cmdline = fs::read(proc_dir.join("cmdline")).unwrap_or_default();
            let serves_brick = cmdline
                .split(|byte| *byte == 0)
                .map(String::from_utf8_lossy)
                .any(|argument| argument.contains(path));
            if serves_brick {
                return Some(pid);
            }
        }
        None
    }

    fn pids(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.proc_root) else {
            warn!(proc_root = %self.proc_root.display(), "Cannot enumerate processes");
            return Vec::new();
        };
        entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.chars().all(|c| c.is_ascii_digit()))
            .collect()
    }

    /// The NFS server is one per node; its pid comes from the configured
    /// pid file and must name a live process directory.
    pub fn check_nfs(&self, volume: &mut Volume) {
        let pid = match fs::read_to_string(&self.nfs_pid_file) {
            Ok(content) => content.trim().to_string(),
            Err(err) => {
                warn!(volume = %volume.name, pid_file = %self.nfs_pid_file.display(), %err, "Cannot read the NFS pid file");
                volume.nfs_pid = Some(super::UNKNOWN_PID.to_string());
                volume.error = Some(format!(
                    "volume {} has NFS enabled but the pid file {} is unreadable",
                    volume.name,
                    self.nfs_pid_file.display()
                ));
                return;
            }
        };
        // Anything but digits would make the join below land on the wrong
        // directory (the proc root itself for an empty value).
        if pid.is_empty() || !pid.chars().all(|c| c.is_ascii_digit()) {
            warn!(volume = %volume.name, pid_file = %self.nfs_pid_file.display(), content = %pid, "NFS pid file does not contain a pid");
            volume.nfs_pid = Some(super::UNKNOWN_PID.to_string());
            volume.error = Some(format!(
                "volume {} has NFS enabled but the pid file {} does not contain a pid",
                volume.name,
                self.nfs_pid_file.display()
            ));
            return;
        }
        if self.proc_root.join(&pid).is_dir() {
            debug!(volume = %volume.name, %pid, "NFS server is running");
            volume.nfs_pid = Some(pid);
        } else {
            warn!(volume = %volume.name, %pid, "NFS pid file names a process that is not running");
            volume.nfs_pid = Some(super::UNKNOWN_PID.to_string());
            volume.error = Some(format!(
                "volume {} has NFS enabled but pid {} from {} is not running",
                volume.name,
                pid,
                self.nfs_pid_file.display()
            ));
        }
    }

    /// Always passes. Export detection works (see [`super::SmbExports`]),
    /// but nothing verifies the smbd side yet.
    // TODO: check for a live smbd once SMB-exported volumes are validated
    // end to end.
    pub fn check_smb(&self, _volume: &mut Volume) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use temp_dir::TempDir;

    fn add_process(root: &TempDir, pid: &str, comm: &str, cmdline: &[&str]) {
        let dir = root.path().join(pid);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("comm"), format!("{comm}\n")).unwrap();
        let mut bytes = Vec::new();
        for argument in cmdline {
            bytes.extend_from_slice(argument.as_bytes());
            bytes.push(0);
        }
        fs::write(dir.join("cmdline"), bytes).unwrap();
    }

    fn validator(proc_root: &TempDir, nfs_pid_file: PathBuf) -> ProcessValidator {
        ProcessValidator::with_proc_root(proc_root.path().to_path_buf(), "glusterfsd".to_string(), nfs_pid_file)
    }

    #[test]
    fn matching_daemon_records_its_pid() {
        let proc_root = TempDir::new().unwrap();
        add_process(&proc_root, "1", "systemd", &["/sbin/init"]);
        add_process(
            &proc_root,
            "4242",
            "glusterfsd",
            &["/usr/sbin/glusterfsd", "-s", "node-1", "--brick-name", "/export/b1"],
        );
        let mut volume = Volume::new("vol".to_string());
        let validator = validator(&proc_root, proc_root.path().join("absent"));

        validator.check_brick_daemon(&mut volume, &Brick::from("node-1:/export/b1"));
        assert_eq!(volume.glusterfsd_pid.as_deref(), Some("4242"));
        assert_eq!(volume.error, None);
    }

    #[test]
    fn daemon_with_a_different_brick_path_does_not_count() {
        let proc_root = TempDir::new().unwrap();
        add_process(
            &proc_root,
            "4242",
            "glusterfsd",
            &["/usr/sbin/glusterfsd", "--brick-name", "/export/other"],
        );
        let mut volume = Volume::new("vol".to_string());
        let validator = validator(&proc_root, proc_root.path().join("absent"));

        validator.check_brick_daemon(&mut volume, &Brick::from("node-1:/export/b1"));
        assert_eq!(volume.glusterfsd_pid.as_deref(), Some(crate::dispatch::UNKNOWN_PID));
        let error = volume.error.unwrap();
        assert!(error.contains("node-1:/export/b1"));
        assert!(error.contains("vol"));
    }

    #[test]
    fn same_path_under_another_process_name_does_not_count() {
        let proc_root = TempDir::new().unwrap();
        add_process(&proc_root, "77", "rsync", &["rsync", "/export/b1"]);
        let mut volume = Volume::new("vol".to_string());
        let validator = validator(&proc_root, proc_root.path().join("absent"));

        validator.check_brick_daemon(&mut volume, &Brick::from("node-1:/export/b1"));
        assert!(volume.error.is_some());
    }

    #[test]
    fn nfs_pid_with_a_live_process_is_recorded() {
        let proc_root = TempDir::new().unwrap();
        add_process(&proc_root, "915", "glusterfs", &["/usr/sbin/glusterfs", "-s", "localhost"]);
        let pid_file = proc_root.path().join("nfs.pid");
        fs::write(&pid_file, "915\n").unwrap();
        let mut volume = Volume::new("vol".to_string());

        validator(&proc_root, pid_file).check_nfs(&mut volume);
        assert_eq!(volume.nfs_pid.as_deref(), Some("915"));
        assert_eq!(volume.error, None);
    }

    #[test]
    fn stale_nfs_pid_sets_an_error() {
        let proc_root = TempDir::new().unwrap();
        let pid_file = proc_root.path().join("nfs.pid");
        fs::write(&pid_file, "915\n").unwrap();
        let mut volume = Volume::new("vol".to_string());

        validator(&proc_root, pid_file).check_nfs(&mut volume);
        assert_eq!(volume.nfs_pid.as_deref(), Some(crate::dispatch::UNKNOWN_PID));
        assert!(volume.error.unwrap().contains("915"));
    }

    #[test]
    fn empty_nfs_pid_file_sets_an_error() {
        let proc_root = TempDir::new().unwrap();
        let pid_file = proc_root.path().join("nfs.pid");
        fs::write(&pid_file, "\n").unwrap();
        let mut volume = Volume::new("vol".to_string());

        validator(&proc_root, pid_file).check_nfs(&mut volume);
        assert_eq!(volume.nfs_pid.as_deref(), Some(crate::dispatch::UNKNOWN_PID));
        assert!(volume.error.unwrap().contains("does not contain a pid"));
    }

    #[test]
    fn nfs_pid_file_with_a_path_sets_an_error() {
        let proc_root = TempDir::new().unwrap();
        let pid_file = proc_root.path().join("nfs.pid");
        fs::write(&pid_file, "/\n").unwrap();
        let mut volume = Volume::new("vol".to_string());

        validator(&proc_root, pid_file).check_nfs(&mut volume);
        assert_eq!(volume.nfs_pid.as_deref(), Some(crate::dispatch::UNKNOWN_PID));
        assert!(volume.error.is_some());
    }

    #[test]
    fn missing_nfs_pid_file_sets_an_error() {
        let proc_root = TempDir::new().unwrap();
        let mut volume = Volume::new("vol".to_string());

        validator(&proc_root, proc_root.path().join("never-written")).check_nfs(&mut volume);
        assert!(volume.error.unwrap().contains("never-written"));
    }

    #[test]
    fn smb_check_is_a_no_op() {
        let proc_root = TempDir::new().unwrap();
        let mut volume = Volume::new("vol".to_string());
        validator(&proc_root, proc_root.path().join("absent")).check_smb(&mut volume);
        assert_eq!(volume.error, None);
    }
}
