//! Conflict resolution: merge raw spans into a non-overlapping set

use super::models::Span;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Merge raw spans into a sorted, non-overlapping span set
///
/// Spans are ordered by start, then higher score, then longer length, then
/// earlier registration. When two spans overlap, the one with the strictly
/// higher score wins; on equal scores the one earlier in that order wins.
///
/// Candidates are admitted from strongest to weakest and a candidate is kept
/// when it overlaps no kept span. A span that loses to a span which is itself
/// displaced is therefore re-admitted wherever it no longer conflicts, so
/// every discarded span overlaps a kept span scoring at least as high.
pub fn resolve(mut spans: Vec<Span>) -> Vec<Span> {
    spans.sort_by(compare);

    let mut by_strength: Vec<usize> = (0..spans.len()).collect();
    by_strength.sort_by(|&a, &b| {
        spans[b]
            .score
            .total_cmp(&spans[a].score)
            .then_with(|| a.cmp(&b))
    });

    // Kept spans keyed by start; disjoint, so starts are unique
    let mut kept: BTreeMap<usize, usize> = BTreeMap::new();
    for index in by_strength {
        let span = &spans[index];
        let before = kept
            .range(..=span.start)
            .next_back()
            .is_some_and(|(_, &k)| spans[k].end > span.start);
        let after = kept
            .range(span.start..)
            .next()
            .is_some_and(|(&start, _)| start < span.end);
        if !before && !after {
            kept.insert(span.start, index);
        }
    }

    let mut slots: Vec<Option<Span>> = spans.into_iter().map(Some).collect();
    let resolved: Vec<Span> = kept
        .into_values()
        .filter_map(|index| slots[index].take())
        .collect();

    debug_assert!(resolved.windows(2).all(|w| w[0].end <= w[1].start));
    resolved
}

fn compare(a: &Span, b: &Span) -> Ordering {
    a.start
        .cmp(&b.start)
        .then_with(|| b.score.total_cmp(&a.score))
        .then_with(|| b.len().cmp(&a.len()))
        .then_with(|| a.registration_order.cmp(&b.registration_order))
}
