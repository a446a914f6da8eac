//! Core domain types shared across the parser, store, and stats engines

use serde::{Deserialize, Serialize};

/// Number of submission groups retained per user (see trim_to_latest)
pub const RETAINED_SUBMISSIONS: usize = 4;

/// Whether a snapshot was taken before or after the play session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingLabel {
    Before,
    After,
}

impl TimingLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimingLabel::Before => "before",
            TimingLabel::After => "after",
        }
    }
}

/// Which statistics table a screenshot belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatFamily {
    Batting,
    Pitching,
}

impl StatFamily {
    /// Snapshot table backing this family
    pub fn table(&self) -> &'static str {
        match self {
            StatFamily::Batting => "ranked_bat_stats",
            StatFamily::Pitching => "ranked_pitch_stats",
        }
    }

    /// Number of numeric fields in one sealed row (player name excluded)
    pub fn numeric_arity(&self) -> usize {
        match self {
            StatFamily::Batting => 9,
            StatFamily::Pitching => 8,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatFamily::Batting => "batting",
            StatFamily::Pitching => "pitching",
        }
    }
}

impl std::str::FromStr for StatFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "batting" => Ok(StatFamily::Batting),
            "pitching" => Ok(StatFamily::Pitching),
            other => Err(format!("Unknown stat family: {}", other)),
        }
    }
}

/// One player's cumulative batting statistics in one snapshot.
///
/// Field order matches the sealed row layout: the stolen-base pair sits
/// last so the trailing rate correction applies to the final field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattingLine {
    pub player_name: String,
    pub ab: i64,
    pub h: i64,
    pub bb: i64,
    pub slg: f64,
    pub bbk: f64,
    pub hr: i64,
    pub so: i64,
    pub sb: i64,
    pub sb_pct: i64,
}

/// One player's cumulative pitching statistics in one snapshot.
///
/// `outs` carries innings pitched already converted to thirds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitchingLine {
    pub player_name: String,
    pub outs: i64,
    pub r: i64,
    pub h: i64,
    pub bb: i64,
    pub slg: f64,
    pub hr: i64,
    pub so: i64,
    pub g: i64,
}

/// Case-normalize a player name the way the roster data does:
/// lowercase, spaces removed.
pub fn normalize_player_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}
