use std::io::{self, BufRead, Write};

use log::{debug, info, warn};
use nmea::sentences::FixType;
use nmea::{Nmea, SentenceType};

use crate::error::Result;
use crate::lap_counter::LapCounter;
use crate::position::GeoFix;

/// What to do with a fix the projector rejects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FeedPolicy {
    /// Log the fix and carry on.
    #[default]
    Drop,
    /// Stop the feed with the projection error.
    Halt,
}

/// Counters for one run of [`run_feed`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeedSummary {
    /// Non-empty lines read
    pub sentences: usize,
    /// Fixes turned into a lap status
    pub fixes: usize,
    /// Fixes dropped as invalid
    pub rejected: usize,
    /// Lap count after the last fix
    pub laps: u32,
}

/// Pull a fix out of the parser state after a GGA sentence.
fn gga_fix(nmea: &Nmea) -> Option<GeoFix> {
    if matches!(nmea.fix_type, None | Some(FixType::Invalid)) {
        return None;
    }

    match (nmea.latitude, nmea.longitude) {
        (Some(lat), Some(lon)) => Some(GeoFix::new(
            lat,
            lon,
            nmea.altitude.map(f64::from).unwrap_or(0.0),
        )),
        _ => None,
    }
}

/// Read NMEA sentences from `reader`, one per line, and write one JSON
/// lap status per GGA fix to `output`.
///
/// Sentences are handled strictly in arrival order. Runs until the reader
/// hits end of input. Lines that are not valid UTF-8 are skipped; any other
/// read error ends the feed.
pub fn run_feed<R: BufRead, W: Write>(
    reader: R,
    counter: &mut LapCounter,
    mut output: W,
    policy: FeedPolicy,
) -> Result<FeedSummary> {
    let mut nmea = Nmea::default();
    let mut summary = FeedSummary::default();

    for line in reader.lines() {
        let content = match line {
            Ok(content) => content,
            // garbled bytes are consumed, so the next read moves on
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!("Skipping unreadable line: {}", e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let trimmed = content.trim();
        if trimmed.is_empty() {
            continue;
        }
        summary.sentences += 1;

        match nmea.parse(trimmed) {
            Ok(SentenceType::GGA) => {}
            Ok(_) => continue,
            Err(e) => {
                debug!("Skipping sentence '{}': {}", trimmed, e);
                continue;
            }
        }

        let Some(fix) = gga_fix(&nmea) else {
            debug!("GGA without a usable fix: {}", trimmed);
            continue;
        };

        let status = match counter.handle_fix(&fix) {
            Ok(status) => status,
            Err(e) if policy == FeedPolicy::Drop => {
                warn!("Dropping fix {}: {}", fix, e);
                summary.rejected += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        serde_json::to_writer(&mut output, &status)?;
        writeln!(output)?;
        output.flush()?;

        summary.fixes += 1;
        summary.laps = counter.tracker().get_lap_count();
    }

    info!(
        "End of input: {} sentences, {} fixes, {} rejected, {} laps",
        summary.sentences, summary.fixes, summary.rejected, summary.laps
    );

    Ok(summary)
}
