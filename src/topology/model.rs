use derive_more::Display;
use indexmap::IndexMap;

/// One storage endpoint of a volume, kept as the raw `host:path` string
/// from the report. Host and path are derived on demand by splitting on
/// the FIRST `:`, since brick paths may themselves contain colons.
#[derive(Clone, Debug, PartialEq, Eq, Display)]
#[display("{_0}")]
pub struct Brick(pub String);

impl Brick {
    pub fn host(&self) -> Option<&str> {
        self.0.split_once(':').map(|(host, _)| host)
    }

    pub fn path(&self) -> Option<&str> {
        self.0.split_once(':').map(|(_, path)| path)
    }
}

impl From<&str> for Brick {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// One volume section of the report. `kind`, `status` and the flags come
/// from parsing; `error` and the pid fields are written during dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Volume {
    pub name: String,
    /// Lowercased volume type, e.g. "distribute" or "distribute-replicate".
    pub kind: String,
    /// Lowercased status, e.g. "started".
    pub status: String,
    pub nfs_enabled: bool,
    pub smb_enabled: bool,
    /// Bricks in report order; the ordinal of a brick is its index + 1.
    pub bricks: Vec<Brick>,
    /// Count claimed by the report, for diagnostics only. The parsed
    /// `bricks` list is authoritative.
    pub reported_brick_count: Option<usize>,
    pub error: Option<String>,
    pub nfs_pid: Option<String>,
    pub glusterfsd_pid: Option<String>,
}

impl Volume {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            kind: String::new(),
            status: String::new(),
            nfs_enabled: true,
            smb_enabled: false,
            bricks: Vec::new(),
            reported_brick_count: None,
            error: None,
            nfs_pid: None,
            glusterfsd_pid: None,
        }
    }

    pub fn started(&self) -> bool {
        self.status == "started"
    }
}

/// All volumes of one report snapshot, iterable in report order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Topology {
    volumes: IndexMap<String, Volume>,
}

impl Topology {
    pub fn volume_count(&self) -> usize {
        self.volumes.len()
    }

    pub fn brick_count(&self) -> usize {
        self.volumes.values().map(|volume| volume.bricks.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Volume> {
        self.volumes.get(name)
    }

    pub fn volumes(&self) -> impl Iterator<Item = &Volume> {
        self.volumes.values()
    }

    pub fn volumes_mut(&mut self) -> impl Iterator<Item = &mut Volume> {
        self.volumes.values_mut()
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.volumes.contains_key(name)
    }

    /// Opens a new volume section; subsequent fields land on it until the
    /// next section starts.
    pub(crate) fn open(&mut self, name: String) {
        self.volumes.insert(name.clone(), Volume::new(name));
    }

    pub(crate) fn current_mut(&mut self) -> Option<&mut Volume> {
        let last = self.volumes.len().checked_sub(1)?;
        self.volumes.get_index_mut(last).map(|(_, volume)| volume)
    }
}
