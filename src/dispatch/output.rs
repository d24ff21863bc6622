use eyre::{
    Context as _,
    Result,
};
use std::{
    fs::{
        File,
        OpenOptions,
    },
    process::Stdio,
};
use temp_dir::TempDir;

const OUTPUT_FILE: &str = "hook-output";

/// The shared buffer every hook writes its stdout into.
///
/// Backed by an append-mode file in a scoped temp directory: each
/// invocation gets a duplicated handle, so writes land in invocation
/// order no matter which hook made them. Dropping the aggregator removes
/// the directory on every exit path.
#[derive(Debug)]
pub struct OutputAggregator {
    temp_dir: TempDir,
    file: File,
}

impl OutputAggregator {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::with_prefix("gluster-stats-gatherer").context("Failed to create the hook output directory")?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(temp_dir.child(OUTPUT_FILE))
            .context("Failed to open the hook output buffer")?;
        Ok(Self { temp_dir, file })
    }

    /// A fresh stdout handle for one hook invocation.
    pub fn stdout(&self) -> Result<Stdio> {
        let handle = self.file.try_clone().context("Failed to duplicate the hook output handle")?;
        Ok(Stdio::from(handle))
    }

    /// Everything the hooks wrote, in write order, with line terminators
    /// stripped and empty lines dropped.
    pub fn lines(&self) -> Result<Vec<String>> {
        let content =
            std::fs::read_to_string(self.temp_dir.child(OUTPUT_FILE)).context("Failed to read the hook output buffer")?;
        Ok(content
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write as _;

    #[test]
    fn lines_come_back_in_write_order() {
        let aggregator = OutputAggregator::new().unwrap();
        let mut first = aggregator.file.try_clone().unwrap();
        let mut second = aggregator.file.try_clone().unwrap();
        writeln!(first, "vol1 reads 10").unwrap();
        writeln!(second, "vol1 writes 3").unwrap();
        writeln!(first, "vol2 reads 0").unwrap();

        assert_eq!(
            aggregator.lines().unwrap(),
            ["vol1 reads 10", "vol1 writes 3", "vol2 reads 0"]
        );
    }

    #[test]
    fn terminators_are_stripped_and_empty_lines_dropped() {
        let aggregator = OutputAggregator::new().unwrap();
        let mut handle = aggregator.file.try_clone().unwrap();
        write!(handle, "crlf line\r\n\r\n\nplain line\n").unwrap();

        assert_eq!(aggregator.lines().unwrap(), ["crlf line", "plain line"]);
    }

    #[test]
    fn no_output_yields_an_empty_sequence() {
        let aggregator = OutputAggregator::new().unwrap();
        assert_eq!(aggregator.lines().unwrap(), Vec::<String>::new());
    }
}
