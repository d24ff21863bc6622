//! Line-oriented parsing of the volume-info report.
//!
//! Every line is first classified into a [`ReportLine`] by [`classify`],
//! then applied to the model by [`parse`]. Keeping classification a pure
//! function makes each line rule testable on its own.

use super::{
    model::{
        Brick,
        Topology,
    },
    ParseError,
};

/// One classified line of the report.
///
/// Keys are normalized before matching by stripping ALL whitespace, so the
/// report's `Volume Name` and `Number of Bricks` match their compact forms.
/// Values are trimmed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReportLine {
    /// Whitespace-only line, separates sections.
    Blank,
    /// `Volume Name` opens a new volume section.
    NewVolume(String),
    /// Structural furniture (`Bricks`, `Options Reconfigured`,
    /// `Transport-type`) with no model effect.
    Ignored,
    /// `Number of Bricks`, possibly in the composite `I x J = N` form.
    BrickCount(String),
    /// Any other key containing `Brick`, e.g. `Brick1`. The value is the
    /// next brick of the current volume; the key's numeric suffix is not
    /// trusted.
    BrickEntry(String),
    /// `Type`.
    TypeField(String),
    /// `Status`.
    StatusField(String),
    /// `nfs.disable`.
    NfsFlag(String),
    /// Unknown key with a value. Logged, otherwise without effect.
    UnknownTolerated { key: String, value: String },
    /// Unknown key with an EMPTY value. An unfamiliar key carrying nothing
    /// signals an upstream format change, so this aborts the run.
    UnknownFatal { key: String },
    /// Non-empty line with no `:` separator at all. Also fatal.
    Unparseable,
}

pub fn classify(line: &str) -> ReportLine {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ReportLine::Blank;
    }
    let Some((raw_key, raw_value)) = trimmed.split_once(':') else {
        return ReportLine::Unparseable;
    };
    let key: String = raw_key.split_whitespace().collect();
    let value = raw_value.trim().to_string();
    match key.as_str() {
        "VolumeName" => ReportLine::NewVolume(value),
        "Bricks" | "OptionsReconfigured" | "Transport-type" => ReportLine::Ignored,
        "NumberofBricks" => ReportLine::BrickCount(value),
        "Type" => ReportLine::TypeField(value),
        "Status" => ReportLine::StatusField(value),
        "nfs.disable" => ReportLine::NfsFlag(value),
        _ if key.contains("Brick") => ReportLine::BrickEntry(value),
        _ if !value.is_empty() => ReportLine::UnknownTolerated { key, value },
        _ => ReportLine::UnknownFatal { key },
    }
}

/// Parses a whole report into a [`Topology`].
///
/// Conservative by contract: any line [`classify`] marks fatal, a volume
/// field before the first section, or a duplicate volume name aborts with
/// a [`ParseError`] and discards everything parsed so far.
pub fn parse(report: &str) -> Result<Topology, ParseError> {
    let mut topology = Topology::default();

    for (index, raw) in report.lines().enumerate() {
        let line = index + 1;
        match classify(raw) {
            ReportLine::Blank | ReportLine::Ignored => {}
            ReportLine::NewVolume(name) => {
                if topology.contains(&name) {
                    return Err(ParseError::DuplicateVolume { line, name });
                }
                debug!(volume = %name, "Opening volume section");
                topology.open(name);
            }
            ReportLine::BrickCount(value) => {
                let volume = current(&mut topology, line, raw)?;
                volume.reported_brick_count = parse_brick_count(&value);
                if volume.reported_brick_count.is_none() {
                    warn!(volume = %volume.name, %value, "Brick count is not numeric, ignoring it");
                }
            }
            ReportLine::BrickEntry(value) => {
                let volume = current(&mut topology, line, raw)?;
                if value.is_empty() {
                    warn!(volume = %volume.name, line, "Brick line has no value, skipping it");
                } else {
                    volume.bricks.push(Brick(value));
                }
            }
            ReportLine::TypeField(value) => {
                current(&mut topology, line, raw)?.kind = value.to_lowercase();
            }
            ReportLine::StatusField(value) => {
                current(&mut topology, line, raw)?.status = value.to_lowercase();
            }
            ReportLine::NfsFlag(value) => {
                let volume = current(&mut topology, line, raw)?;
                if value == "on" {
                    volume.nfs_enabled = false;
                }
            }
            ReportLine::UnknownTolerated { key, value } => {
                warn!(%key, %value, line, "Unrecognized report key, continuing");
            }
            ReportLine::UnknownFatal { key } => {
                return Err(ParseError::UnknownKey { line, key });
            }
            ReportLine::Unparseable => {
                return Err(ParseError::MissingSeparator {
                    line,
                    content: raw.trim().to_string(),
                });
            }
        }
    }

    for volume in topology.volumes() {
        if let Some(reported) = volume.reported_brick_count {
            if reported != volume.bricks.len() {
                warn!(
                    volume = %volume.name,
                    reported,
                    parsed = volume.bricks.len(),
                    "Report claims a different brick count than it lists"
                );
            }
        }
    }

    info!(
        volumes = topology.volume_count(),
        bricks = topology.brick_count(),
        "Parsed the volume report"
    );
    Ok(topology)
}

fn current<'a>(topology: &'a mut Topology, line: usize, raw: &str) -> Result<&'a mut super::Volume, ParseError> {
    topology.current_mut().ok_or_else(|| ParseError::FieldBeforeVolume {
        line,
        content: raw.trim().to_string(),
    })
}

/// `"2 x 2 = 4"` reduces to `4`; a plain `"3"` stays `3`. Anything that
/// does not end in a number yields `None`.
fn parse_brick_count(value: &str) -> Option<usize> {
    let count = match value.rsplit_once('=') {
        Some((_, after)) => after.trim(),
        None => value,
    };
    count.parse().ok()
}
