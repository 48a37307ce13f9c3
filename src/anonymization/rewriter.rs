//! Rewriter: applies operator rules to a resolved span set

use super::models::Span;
use super::operators::OperatorTable;
use crate::domain::{Result, VeilError};
use rand::RngCore;

/// Output of a rewrite
#[derive(Debug, Clone, PartialEq)]
pub struct Rewritten {
    /// Rewritten text
    pub text: String,
    /// Spans in output-text byte offsets, one per input span, same order
    pub spans: Vec<Span>,
}

/// Rewrite `text` under a sorted, non-overlapping span set
///
/// Every span's entity type must have a rule in `table`; otherwise nothing is
/// rewritten and `MissingOperatorRule` is returned. Replacements are produced
/// left to right (so generators see the RNG in text order) and spliced right
/// to left so earlier offsets stay valid.
pub fn rewrite(
    text: &str,
    spans: &[Span],
    table: &OperatorTable,
    rng: &mut dyn RngCore,
) -> Result<Rewritten> {
    table.ensure_covers(spans.iter().map(|s| &s.entity_type))?;
    check_spans(text, spans)?;

    let mut replacements = Vec::with_capacity(spans.len());
    for span in spans {
        let rule = table
            .get(&span.entity_type)
            .ok_or_else(|| VeilError::MissingOperatorRule {
                entity_type: span.entity_type.to_string(),
            })?;
        replacements.push(rule.apply(&text[span.start..span.end], rng));
    }

    let mut output = text.to_string();
    for (span, replacement) in spans.iter().zip(&replacements).rev() {
        output.replace_range(span.start..span.end, replacement);
    }

    let mut shift: isize = 0;
    let mut out_spans = Vec::with_capacity(spans.len());
    for (span, replacement) in spans.iter().zip(&replacements) {
        let start = (span.start as isize + shift) as usize;
        let end = start + replacement.len();
        shift += replacement.len() as isize - span.len() as isize;

        let mut moved = span.clone();
        moved.start = start;
        moved.end = end;
        out_spans.push(moved);
    }

    Ok(Rewritten {
        text: output,
        spans: out_spans,
    })
}

/// Spans must be in bounds, on char boundaries, sorted and non-overlapping
fn check_spans(text: &str, spans: &[Span]) -> Result<()> {
    let mut previous_end = 0;
    for span in spans {
        if span.start < previous_end
            || span.start > span.end
            || span.end > text.len()
            || !text.is_char_boundary(span.start)
            || !text.is_char_boundary(span.end)
        {
            return Err(VeilError::Validation(format!(
                "span {}..{} ({}) is not part of a resolved span set",
                span.start, span.end, span.entity_type
            )));
        }
        previous_end = span.end;
    }
    Ok(())
}
