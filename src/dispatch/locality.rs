use crate::topology::Brick;
use std::path::Path;

/// Decides whether a brick endpoint is hosted by this node.
#[derive(Clone, Debug)]
pub struct LocalityFilter {
    hostname: String,
}

impl LocalityFilter {
    pub fn new(hostname: String) -> Self {
        Self { hostname }
    }

    /// A brick is local when its host names this machine, outright or by
    /// short name, AND its path exists as a directory here. A matching
    /// hostname with a missing path is not local.
    ///
    /// Known limitation: short-name matching conflates same-named hosts in
    /// different domains. Mismatched brick paths usually disambiguate, but
    /// not always.
    pub fn is_local(&self, brick: &Brick) -> bool {
        let (Some(host), Some(path)) = (brick.host(), brick.path()) else {
            return false;
        };
        self.host_matches(host) && Path::new(path).is_dir()
    }

    fn host_matches(&self, remote: &str) -> bool {
        remote == self.hostname || short(remote) == short(&self.hostname)
    }
}

fn short(host: &str) -> &str {
    host.split_once('.').map_or(host, |(name, _)| name)
}
