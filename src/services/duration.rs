use serde::{Deserialize, Serialize};

use crate::models::{Episode, PlayableItem, Track};

/// Anything with a whole-second running time
pub trait Playable {
    fn duration_secs(&self) -> u32;
}

impl Playable for Track {
    fn duration_secs(&self) -> u32 {
        self.duration
    }
}

impl Playable for Episode {
    fn duration_secs(&self) -> u32 {
        self.duration
    }
}

impl Playable for PlayableItem {
    fn duration_secs(&self) -> u32 {
        self.duration
    }
}

/// How a total running time is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationFormat {
    /// `"1h03m"`: hours and zero-padded minutes, seconds dropped. `"0m"` when empty.
    Compact,
    /// `"1h3m4s"`: leading zero units dropped. `"0s"` when empty.
    Verbose,
}

/// Exact sum plus its rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalDuration {
    pub seconds: u64,
    pub formatted: String,
}

/// Sums the running time of every item. Never rounds.
pub fn total_seconds<'a, P, I>(items: I) -> u64
where
    P: Playable + 'a,
    I: IntoIterator<Item = &'a P>,
{
    items
        .into_iter()
        .map(|item| u64::from(item.duration_secs()))
        .sum()
}

pub fn aggregate<'a, P, I>(items: I, format: DurationFormat) -> TotalDuration
where
    P: Playable + 'a,
    I: IntoIterator<Item = &'a P>,
{
    let seconds = total_seconds(items);
    TotalDuration {
        seconds,
        formatted: format_duration(seconds, format),
    }
}

pub fn format_duration(seconds: u64, format: DurationFormat) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    match format {
        DurationFormat::Compact if hours > 0 => format!("{}h{:02}m", hours, minutes),
        DurationFormat::Compact => format!("{}m", minutes),
        DurationFormat::Verbose if hours > 0 => format!("{}h{}m{}s", hours, minutes, secs),
        DurationFormat::Verbose if minutes > 0 => format!("{}m{}s", minutes, secs),
        DurationFormat::Verbose => format!("{}s", secs),
    }
}
