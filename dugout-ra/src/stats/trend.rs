//! Trend aggregator: one derived metric charted across retained snapshots
//!
//! Works over the cumulative counting stats recorded at each submission
//! timestamp, not deltas against a baseline. Players missing from a group
//! keep a null placeholder so every series stays index-aligned with the
//! timestamp axis.

use super::{pct, ratio, round1, round3};
use crate::types::BattingLine;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Selectable trend metrics over cumulative batting stats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendMetric {
    Avg,
    Obp,
    Slg,
    Ops,
    BbRate,
    HrRate,
    KRate,
    SbRate,
}

impl TrendMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendMetric::Avg => "avg",
            TrendMetric::Obp => "obp",
            TrendMetric::Slg => "slg",
            TrendMetric::Ops => "ops",
            TrendMetric::BbRate => "bb_rate",
            TrendMetric::HrRate => "hr_rate",
            TrendMetric::KRate => "k_rate",
            TrendMetric::SbRate => "sb_rate",
        }
    }

    /// Compute this metric from one cumulative stat line.
    ///
    /// Division by zero yields 0 for the point, never an aborted series.
    pub fn compute(&self, line: &BattingLine) -> f64 {
        let ab = line.ab as f64;
        let h = line.h as f64;
        let bb = line.bb as f64;
        match self {
            TrendMetric::Avg => round3(ratio(h, ab)),
            TrendMetric::Obp => round3(ratio(h + bb, ab + bb)),
            TrendMetric::Slg => round3(line.slg),
            TrendMetric::Ops => round3(ratio(h + bb, ab + bb) + line.slg),
            TrendMetric::BbRate => round1(pct(bb, ab + bb)),
            TrendMetric::HrRate => round1(pct(line.hr as f64, ab)),
            TrendMetric::KRate => round1(pct(line.so as f64, ab)),
            TrendMetric::SbRate => {
                if line.sb > 0 && line.sb_pct > 0 {
                    round1(line.sb as f64 / line.sb_pct as f64 * 100.0)
                } else {
                    0.0
                }
            }
        }
    }
}

impl FromStr for TrendMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "avg" => Ok(TrendMetric::Avg),
            "obp" => Ok(TrendMetric::Obp),
            "slg" => Ok(TrendMetric::Slg),
            "ops" => Ok(TrendMetric::Ops),
            "bb_rate" => Ok(TrendMetric::BbRate),
            "hr_rate" => Ok(TrendMetric::HrRate),
            "k_rate" => Ok(TrendMetric::KRate),
            "sb_rate" => Ok(TrendMetric::SbRate),
            other => Err(format!("Unknown trend metric: {}", other)),
        }
    }
}

/// Per-player metric series over the retained submission timestamps
#[derive(Debug, Clone, Serialize)]
pub struct TrendSeries {
    pub metric: String,
    /// Submission timestamps, oldest first
    pub timestamps: Vec<String>,
    /// Player name to one value per timestamp; null where the player was
    /// absent from that submission
    pub players: BTreeMap<String, Vec<Option<f64>>>,
}

/// Build the series from snapshot groups ordered oldest first.
pub fn build_trend(metric: TrendMetric, groups: &[(String, Vec<BattingLine>)]) -> TrendSeries {
    let timestamps: Vec<String> = groups.iter().map(|(ts, _)| ts.clone()).collect();
    let mut players: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();

    for (idx, (_, lines)) in groups.iter().enumerate() {
        for line in lines {
            let series = players
                .entry(line.player_name.clone())
                .or_insert_with(|| vec![None; groups.len()]);
            series[idx] = Some(metric.compute(line));
        }
    }

    TrendSeries {
        metric: metric.as_str().to_string(),
        timestamps,
        players,
    }
}
