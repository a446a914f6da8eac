//! Differential engine: before/after deltas and derived rate statistics
//!
//! Counting stats subtract directly. Slugging is itself a rate, so its
//! delta is recomputed over the delta window from the total-base products
//! rather than subtracted.

use super::{pct, ratio, round1, round2, round3};
use crate::types::{BattingLine, PitchingLine};
use serde::Serialize;
use serde_json::{json, Value};

/// Batting output column labels, fixed presentation order
pub const BATTING_COLUMNS: [&str; 15] = [
    "Player Name", "AB", "H", "AVG", "OBP", "SLG", "OPS", "BB", "BB%", "HR", "HR%", "K", "K%",
    "SB", "SB%",
];

/// Pitching output column labels, fixed presentation order
pub const PITCHING_COLUMNS: [&str; 16] = [
    "Player Name", "G", "IP", "AVG IP/G", "ERA", "AVG", "OBP", "SLG", "OPS", "BB", "BB%", "HR",
    "HR%", "K", "K%", "WHIP",
];

/// Derived batting differential for one player. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct BattingDifferential {
    pub player_name: String,
    pub ab: i64,
    pub h: i64,
    pub bb: i64,
    pub hr: i64,
    pub so: i64,
    pub sb: i64,
    pub avg: f64,
    pub obp: f64,
    pub slg: f64,
    pub ops: f64,
    pub bb_rate: f64,
    pub hr_rate: f64,
    pub k_rate: f64,
    pub sb_rate: f64,
}

/// Derived pitching differential for one player. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct PitchingDifferential {
    pub player_name: String,
    pub g: i64,
    pub ip: f64,
    pub ip_per_g: f64,
    pub era: f64,
    pub avg: f64,
    pub obp: f64,
    pub slg: f64,
    pub ops: f64,
    pub bb: i64,
    pub bb_rate: f64,
    pub hr: i64,
    pub hr_rate: f64,
    pub so: i64,
    pub k_rate: f64,
    pub whip: f64,
}

/// Compute the batting differential between two snapshots of one player.
pub fn batting_differential(before: &BattingLine, after: &BattingLine) -> BattingDifferential {
    let ab = after.ab - before.ab;
    let h = after.h - before.h;
    let bb = after.bb - before.bb;
    let hr = after.hr - before.hr;
    let so = after.so - before.so;
    let sb = after.sb - before.sb;
    let sb_att = after.sb_pct - before.sb_pct;

    let slg = slugging_delta(before.slg, before.ab, after.slg, after.ab);
    let obp = round3(ratio((h + bb) as f64, (ab + bb) as f64));

    // Attempt-rate semantics are only trusted when both operands moved
    let sb_rate = if sb > 0 && sb_att > 0 {
        round1(sb as f64 / sb_att as f64 * 100.0)
    } else {
        0.0
    };

    BattingDifferential {
        player_name: after.player_name.clone(),
        ab,
        h,
        bb,
        hr,
        so,
        sb,
        avg: round3(ratio(h as f64, ab as f64)),
        obp,
        slg,
        ops: round3(obp + slg),
        bb_rate: round1(pct(bb as f64, (ab + bb) as f64)),
        hr_rate: round1(pct(hr as f64, ab as f64)),
        k_rate: round1(pct(so as f64, ab as f64)),
        sb_rate,
    }
}

/// Compute the pitching differential between two snapshots of one player.
///
/// Pitching tables carry no at-bat column; hits plus outs stands in as
/// the at-bat denominator for the opposing-batter rates.
pub fn pitching_differential(before: &PitchingLine, after: &PitchingLine) -> PitchingDifferential {
    let outs = after.outs - before.outs;
    let r = after.r - before.r;
    let h = after.h - before.h;
    let bb = after.bb - before.bb;
    let hr = after.hr - before.hr;
    let so = after.so - before.so;
    let g = after.g - before.g;

    let ab = h + outs;
    let slg = slugging_delta(
        before.slg,
        before.h + before.outs,
        after.slg,
        after.h + after.outs,
    );
    let obp = round3(ratio((h + bb) as f64, (ab + bb) as f64));

    let ip = innings_pitched(outs);
    let era = if outs > 0 {
        round2(r as f64 / outs as f64 * 27.0)
    } else {
        0.0
    };
    let whip = if outs > 0 {
        round3((bb + h) as f64 / outs as f64 * 3.0)
    } else {
        0.0
    };

    PitchingDifferential {
        player_name: after.player_name.clone(),
        g,
        ip,
        ip_per_g: round3(ratio(ip, g as f64)),
        era,
        avg: round3(ratio(h as f64, ab as f64)),
        obp,
        slg,
        ops: round3(obp + slg),
        bb,
        bb_rate: round1(pct(bb as f64, (ab + bb) as f64)),
        hr,
        hr_rate: round1(pct(hr as f64, ab as f64)),
        so,
        k_rate: round1(pct(so as f64, ab as f64)),
        whip,
    }
}

/// Recompute a slugging delta over the delta window:
/// `(after.slg * after_ab - before.slg * before_ab) / (after_ab - before_ab)`,
/// guarded to 0 when the window is empty.
fn slugging_delta(before_slg: f64, before_ab: i64, after_slg: f64, after_ab: i64) -> f64 {
    let den = (after_ab - before_ab) as f64;
    if den == 0.0 {
        return 0.0;
    }
    round3((after_slg * after_ab as f64 - before_slg * before_ab as f64) / den)
}

/// Innings pitched in the thirds display convention: 17 outs reads 5.2
fn innings_pitched(outs: i64) -> f64 {
    if outs <= 0 {
        return 0.0;
    }
    (outs / 3) as f64 + (outs % 3) as f64 / 10.0
}

/// Sort batting output descending by OPS; ties keep input order.
pub fn sort_batting(records: &mut [BattingDifferential]) {
    records.sort_by(|a, b| b.ops.partial_cmp(&a.ops).unwrap_or(std::cmp::Ordering::Equal));
}

/// Sort pitching output ascending by ERA; ties keep input order.
pub fn sort_pitching(records: &mut [PitchingDifferential]) {
    records.sort_by(|a, b| a.era.partial_cmp(&b.era).unwrap_or(std::cmp::Ordering::Equal));
}

/// Presentation row in `BATTING_COLUMNS` order
pub fn batting_row(d: &BattingDifferential) -> Vec<Value> {
    vec![
        json!(d.player_name),
        json!(d.ab),
        json!(d.h),
        json!(d.avg),
        json!(d.obp),
        json!(d.slg),
        json!(d.ops),
        json!(d.bb),
        json!(d.bb_rate),
        json!(d.hr),
        json!(d.hr_rate),
        json!(d.so),
        json!(d.k_rate),
        json!(d.sb),
        json!(d.sb_rate),
    ]
}

/// Presentation row in `PITCHING_COLUMNS` order
pub fn pitching_row(d: &PitchingDifferential) -> Vec<Value> {
    vec![
        json!(d.player_name),
        json!(d.g),
        json!(d.ip),
        json!(d.ip_per_g),
        json!(d.era),
        json!(d.avg),
        json!(d.obp),
        json!(d.slg),
        json!(d.ops),
        json!(d.bb),
        json!(d.bb_rate),
        json!(d.hr),
        json!(d.hr_rate),
        json!(d.so),
        json!(d.k_rate),
        json!(d.whip),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bat(name: &str, ab: i64, h: i64, bb: i64, slg: f64) -> BattingLine {
        BattingLine {
            player_name: name.to_string(),
            ab,
            h,
            bb,
            slg,
            bbk: 0.0,
            hr: 0,
            so: 0,
            sb: 0,
            sb_pct: 0,
        }
    }

    fn pitch(name: &str, outs: i64, r: i64, h: i64, bb: i64, g: i64) -> PitchingLine {
        PitchingLine {
            player_name: name.to_string(),
            outs,
            r,
            h,
            bb,
            slg: 0.0,
            hr: 0,
            so: 0,
            g,
        }
    }

    #[test]
    fn test_batting_average_over_delta_window() {
        let before = bat("trout", 10, 3, 0, 0.500);
        let after = bat("trout", 14, 5, 0, 0.571);
        let d = batting_differential(&before, &after);
        assert_eq!(d.ab, 4);
        assert_eq!(d.h, 2);
        assert_eq!(d.avg, 0.500);
    }

    #[test]
    fn test_zero_delta_at_bats_guards_all_rates() {
        let before = bat("trout", 10, 3, 2, 0.500);
        let after = bat("trout", 10, 3, 2, 0.500);
        let d = batting_differential(&before, &after);
        assert_eq!(d.avg, 0.0);
        assert_eq!(d.obp, 0.0);
        assert_eq!(d.hr_rate, 0.0);
        assert_eq!(d.k_rate, 0.0);
        assert_eq!(d.slg, 0.0);
        assert_eq!(d.ops, 0.0);
    }

    #[test]
    fn test_slugging_delta_recomputed_not_subtracted() {
        let before = bat("trout", 10, 3, 0, 0.500);
        let after = bat("trout", 14, 5, 0, 0.600);
        let d = batting_differential(&before, &after);
        // (0.600*14 - 0.500*10) / 4
        assert_eq!(d.slg, 0.85);
        assert_eq!(d.ops, round3(d.obp + d.slg));
    }

    #[test]
    fn test_stolen_base_rate_requires_both_positive() {
        let mut before = bat("trout", 10, 3, 0, 0.5);
        let mut after = bat("trout", 14, 5, 0, 0.5);
        after.sb = 2;
        after.sb_pct = 4;
        before.sb = 0;
        before.sb_pct = 0;
        let d = batting_differential(&before, &after);
        assert_eq!(d.sb_rate, 50.0);

        // Zero attempts: guarded to 0 even with positive steals reported
        after.sb_pct = 0;
        let d = batting_differential(&before, &after);
        assert_eq!(d.sb_rate, 0.0);
    }

    #[test]
    fn test_era_from_runs_and_outs() {
        let before = pitch("ohtani", 0, 0, 0, 0, 0);
        let after = pitch("ohtani", 27, 3, 0, 0, 1);
        let d = pitching_differential(&before, &after);
        assert_eq!(d.era, 3.0);
        assert_eq!(d.ip, 9.0);
    }

    #[test]
    fn test_zero_outs_guards_pitching_rates() {
        let before = pitch("ohtani", 12, 2, 3, 1, 1);
        let after = pitch("ohtani", 12, 2, 3, 1, 1);
        let d = pitching_differential(&before, &after);
        assert_eq!(d.era, 0.0);
        assert_eq!(d.whip, 0.0);
        assert_eq!(d.ip, 0.0);
    }

    #[test]
    fn test_innings_pitched_thirds_convention() {
        assert_eq!(innings_pitched(17), 5.2);
        assert_eq!(innings_pitched(18), 6.0);
        assert_eq!(innings_pitched(1), 0.1);
        assert_eq!(innings_pitched(0), 0.0);
    }

    #[test]
    fn test_whip_per_three_outs() {
        let before = pitch("ohtani", 0, 0, 0, 0, 0);
        let after = pitch("ohtani", 27, 3, 6, 3, 1);
        let d = pitching_differential(&before, &after);
        // (3 + 6) / 27 * 3
        assert_eq!(d.whip, 1.0);
    }

    #[test]
    fn test_batting_sort_descending_ops_stable() {
        let base = bat("a", 0, 0, 0, 0.0);
        let mk = |name: &str, ops: f64| BattingDifferential {
            player_name: name.to_string(),
            ops,
            ..batting_differential(&base, &base)
        };
        let mut records = vec![mk("low", 0.5), mk("high", 1.2), mk("mid-a", 0.8), mk("mid-b", 0.8)];
        sort_batting(&mut records);
        let order: Vec<&str> = records.iter().map(|r| r.player_name.as_str()).collect();
        assert_eq!(order, vec!["high", "mid-a", "mid-b", "low"]);
    }

    #[test]
    fn test_pitching_sort_ascending_era() {
        let base = pitch("x", 0, 0, 0, 0, 0);
        let mk = |name: &str, era: f64| PitchingDifferential {
            player_name: name.to_string(),
            era,
            ..pitching_differential(&base, &base)
        };
        let mut records = vec![mk("worse", 4.5), mk("ace", 1.9), mk("mid", 3.2)];
        sort_pitching(&mut records);
        let order: Vec<&str> = records.iter().map(|r| r.player_name.as_str()).collect();
        assert_eq!(order, vec!["ace", "mid", "worse"]);
    }

    #[test]
    fn test_row_layout_matches_columns() {
        let before = bat("trout", 10, 3, 0, 0.5);
        let after = bat("trout", 14, 5, 0, 0.571);
        let row = batting_row(&batting_differential(&before, &after));
        assert_eq!(row.len(), BATTING_COLUMNS.len());
        assert_eq!(row[0], "trout");

        let row = pitching_row(&pitching_differential(
            &pitch("ohtani", 0, 0, 0, 0, 0),
            &pitch("ohtani", 27, 3, 0, 0, 1),
        ));
        assert_eq!(row.len(), PITCHING_COLUMNS.len());
    }
}
