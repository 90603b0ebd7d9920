//! ASCII stacked bars for terminal output.
//!
//! Fixed width, one glyph per segment, deterministic for a given report.
//!
//! Parties are drawn in seat/share order with the undecided buckets last,
//! each with its own fill glyph and a legend underneath. The per-constituency
//! chart draws one bar per resolved constituency with a shared legend.

use std::collections::BTreeMap;

use crate::domain::PartyId;
use crate::report::Report;

const NAME_WIDTH: usize = 36;
const GLYPHS: &[char] = &['#', '=', '*', '+', '%', '@', '&', 'o', 'x', '~'];
const INCONCLUSIVE_GLYPH: char = '?';
const PENDING_GLYPH: char = '.';

/// One labelled bar segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub label: String,
    pub value: f64,
    pub glyph: char,
}

/// Seats by party as a single stacked bar.
pub fn render_seat_bar(report: &Report, width: usize) -> String {
    let seats = &report.seats;
    let mut segments: Vec<Segment> = seats
        .ranked()
        .into_iter()
        .enumerate()
        .map(|(i, (party, count))| Segment {
            label: format!("{party} ({count})"),
            value: count as f64,
            glyph: GLYPHS[i % GLYPHS.len()],
        })
        .collect();
    if seats.inconclusive > 0 {
        segments.push(Segment {
            label: format!("Inconclusive ({})", seats.inconclusive),
            value: seats.inconclusive as f64,
            glyph: INCONCLUSIVE_GLYPH,
        });
    }
    if seats.pending > 0 {
        segments.push(Segment {
            label: format!("Pending ({})", seats.pending),
            value: seats.pending as f64,
            glyph: PENDING_GLYPH,
        });
    }
    render_stacked_bar(&format!("Seats by Party (all {} seats)", seats.total()), &segments, width)
}

/// National vote share as a single stacked bar (0-100%).
pub fn render_vote_bar(report: &Report, width: usize) -> String {
    let segments: Vec<Segment> = report
        .national_vote
        .ranked()
        .into_iter()
        .enumerate()
        .map(|(i, (party, share))| Segment {
            label: format!("{party} ({share:.0}%)"),
            value: share,
            glyph: GLYPHS[i % GLYPHS.len()],
        })
        .collect();
    render_stacked_bar("Popular Vote", &segments, width)
}

/// Sample shares per constituency, one row each.
///
/// Only resolved constituencies are drawn; a walkover is a full bar for its
/// party. Parties keep one glyph across rows, ordered by seats contested and
/// then national share.
pub fn render_constituency_shares(report: &Report, width: usize) -> String {
    let width = width.max(10);
    let mut out = String::from("Sample Count by Constituency\n");

    let rows: Vec<(&str, u32, Vec<(&PartyId, f64)>)> = report
        .constituencies
        .iter()
        .filter_map(|c| {
            let outcome = c.outcome()?;
            let shares: Vec<(&PartyId, f64)> = if outcome.intervals.is_empty() {
                vec![(outcome.decision.winner()?, 1.0)]
            } else {
                outcome.intervals.iter().map(|pi| (&pi.party, pi.proportion)).collect()
            };
            Some((c.name.as_str(), c.seats, shares))
        })
        .collect();
    if rows.is_empty() {
        out.push_str("(no resolved constituencies)\n");
        return out;
    }

    let mut contested: BTreeMap<&PartyId, u64> = BTreeMap::new();
    for (_, seats, shares) in &rows {
        for (party, _) in shares {
            *contested.entry(*party).or_insert(0) += u64::from(*seats);
        }
    }
    let mut parties: Vec<&PartyId> = contested.keys().copied().collect();
    parties.sort_by(|a, b| {
        let share = |p: &PartyId| report.national_vote.shares.get(p).copied().unwrap_or(0.0);
        contested[b]
            .cmp(&contested[a])
            .then_with(|| share(*b).partial_cmp(&share(*a)).unwrap_or(std::cmp::Ordering::Equal))
            .then_with(|| a.cmp(b))
    });
    let glyph = |party: &PartyId| {
        let i = parties.iter().position(|p| *p == party).unwrap_or(0);
        GLYPHS[i % GLYPHS.len()]
    };

    let name_width = rows
        .iter()
        .map(|(name, _, _)| name.chars().count())
        .max()
        .unwrap_or(0)
        .min(NAME_WIDTH);
    for (name, _, shares) in &rows {
        let segments: Vec<Segment> = shares
            .iter()
            .map(|(party, share)| Segment {
                label: party.to_string(),
                value: *share,
                glyph: glyph(*party),
            })
            .collect();
        let name: String = name.chars().take(name_width).collect();
        out.push_str(&format!("{name:<name_width$} {}\n", fill_bar(&segments, width)));
    }

    let legend: Vec<String> = parties.iter().map(|p| format!("{} {p}", glyph(*p))).collect();
    out.push_str(&legend.join("  "));
    out.push('\n');
    out
}

/// Render a titled stacked bar of exactly `width` cells plus a legend.
///
/// Cells are apportioned by largest remainder so the bar always fills the
/// width exactly when the total is positive.
pub fn render_stacked_bar(title: &str, segments: &[Segment], width: usize) -> String {
    let width = width.max(10);
    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    out.push_str(&fill_bar(segments, width));
    out.push('\n');

    if segments.iter().map(|s| s.value.max(0.0)).sum::<f64>() > 0.0 {
        let legend: Vec<String> = segments.iter().map(|s| format!("{} {}", s.glyph, s.label)).collect();
        out.push_str(&legend.join("  "));
        out.push('\n');
    }
    out
}

/// `|...|` with exactly `width` cells; blank when there is nothing to draw.
fn fill_bar(segments: &[Segment], width: usize) -> String {
    let total: f64 = segments.iter().map(|s| s.value.max(0.0)).sum();
    if !(total > 0.0) {
        return format!("|{}|", " ".repeat(width));
    }

    let cells = apportion(segments.iter().map(|s| s.value.max(0.0) / total), width);
    let mut bar = String::from("|");
    for (segment, n) in segments.iter().zip(&cells) {
        bar.extend(std::iter::repeat_n(segment.glyph, *n));
    }
    bar.push('|');
    bar
}

fn apportion(fractions: impl Iterator<Item = f64>, width: usize) -> Vec<usize> {
    let exact: Vec<f64> = fractions.map(|f| f * width as f64).collect();
    let mut cells: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();
    let assigned: usize = cells.iter().sum();

    let mut order: Vec<usize> = (0..exact.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal).then(a.cmp(&b))
    });
    for &i in order.iter().take(width.saturating_sub(assigned)) {
        cells[i] += 1;
    }
    cells
}
