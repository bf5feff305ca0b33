//! Interval reconciler.
//!
//! Folds newly inserted overrides into a bus's existing set and returns the
//! canonical representation: pairwise non-overlapping ranges, no two
//! adjacent ranges sharing a status, nothing that ended before `today`.
//!
//! # Folding one range `N` into the working list
//!
//! The working list is kept sorted by start date. Each entry `E` that
//! shares a date with `N` is handled by how the two line up:
//!
//! | Case                                  | Same status            | Different status                   |
//! |---------------------------------------|------------------------|------------------------------------|
//! | `N` envelopes `E`                     | drop `E`, keep looking | drop `E`, keep looking             |
//! | `N` covers the start of `E`           | `E.start = N.start`    | insert `N` before, `E.start = N.end + 1` |
//! | `N` covers the end of `E`             | absorb `E` into `N`    | `E.end = N.start - 1`              |
//! | `N` strictly inside `E`               | nothing to do          | split `E` around `N`               |
//!
//! Start-covering and interior cases consume `N`; the others keep scanning
//! because one `N` may straddle several entries. An unconsumed `N` is
//! appended once the scan completes.

use chrono::NaiveDate;

use super::{OverrideStatus, ScheduleError, ScheduleOverride};
use crate::domain::foundation::BusId;

/// Working representation of one range while folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: NaiveDate,
    end: NaiveDate,
    status: OverrideStatus,
}

impl Span {
    fn from_override(o: &ScheduleOverride) -> Self {
        Self {
            start: o.start_date(),
            end: o.end_date(),
            status: o.status(),
        }
    }

    fn overlaps(&self, other: &Span) -> bool {
        self.start <= other.end && self.end >= other.start
    }
}

/// Reconciles `insertions` into `existing`, in the order supplied.
///
/// Existing entries are folded first, so a set loaded from storage that is
/// not yet canonical comes out canonical. Entries ending before `today`
/// are dropped.
///
/// # Errors
///
/// - `InvalidRange` if an input range has `start > end`, or a truncation
///   would leave an entry ending before it starts
/// - `MixedBuses` if the inputs name more than one bus
/// - `Overlap` if the result is not pairwise disjoint (a reconciler bug)
pub fn reconcile(
    existing: &[ScheduleOverride],
    insertions: &[ScheduleOverride],
    today: NaiveDate,
) -> Result<Vec<ScheduleOverride>, ScheduleError> {
    let Some(bus_id) = existing.iter().chain(insertions).map(|o| o.bus_id()).next() else {
        return Ok(Vec::new());
    };

    let mut working: Vec<Span> = Vec::with_capacity(existing.len() + insertions.len());
    for o in existing.iter().chain(insertions) {
        if o.bus_id() != bus_id {
            return Err(ScheduleError::MixedBuses {
                expected: bus_id,
                found: o.bus_id(),
            });
        }
        if o.start_date() > o.end_date() {
            return Err(ScheduleError::invalid_range(o.start_date(), o.end_date()));
        }
        fold_in(&mut working, Span::from_override(o))?;
    }

    working.retain(|span| span.end >= today);
    let canonical = normalize(working)?;

    canonical
        .into_iter()
        .map(|span| ScheduleOverride::new(bus_id, span.start, span.end, span.status))
        .collect()
}

/// Convenience wrapper for the single-bus case where the caller already
/// knows the bus; returns an empty set for empty input.
pub fn reconcile_for_bus(
    bus_id: BusId,
    existing: &[ScheduleOverride],
    insertions: &[ScheduleOverride],
    today: NaiveDate,
) -> Result<Vec<ScheduleOverride>, ScheduleError> {
    if let Some(stray) = existing
        .iter()
        .chain(insertions)
        .find(|o| o.bus_id() != bus_id)
    {
        return Err(ScheduleError::MixedBuses {
            expected: bus_id,
            found: stray.bus_id(),
        });
    }
    reconcile(existing, insertions, today)
}

fn fold_in(working: &mut Vec<Span>, mut new: Span) -> Result<(), ScheduleError> {
    working.sort_by_key(|span| span.start);

    let mut j = 0;
    while j < working.len() {
        let entry = working[j];
        if !new.overlaps(&entry) {
            j += 1;
            continue;
        }

        if new.start <= entry.start {
            if new.end >= entry.end {
                // Envelopes: re-test the same index against what slid into it.
                working.remove(j);
                continue;
            }
            if new.status == entry.status {
                working[j].start = new.start;
            } else {
                working[j].start = day_after(new.end)?;
                working.insert(j, new);
            }
            return Ok(());
        }

        // From here on entry.start < new.start <= entry.end.
        if new.end >= entry.end {
            if new.status == entry.status {
                new.start = new.start.min(entry.start);
                working.remove(j);
            } else {
                match truncated(entry.start, day_before(new.start)?, entry.status)? {
                    Some(span) => {
                        working[j] = span;
                        j += 1;
                    }
                    None => {
                        working.remove(j);
                    }
                }
            }
            continue;
        }

        // Strictly inside entry.
        if new.status != entry.status {
            let mut replacement = Vec::with_capacity(3);
            if let Some(head) = truncated(entry.start, day_before(new.start)?, entry.status)? {
                replacement.push(head);
            }
            replacement.push(new);
            if let Some(tail) = truncated(day_after(new.end)?, entry.end, entry.status)? {
                replacement.push(tail);
            }
            working.splice(j..=j, replacement);
        }
        return Ok(());
    }

    working.push(new);
    Ok(())
}

/// Builds a span after a truncation. A span that became empty (end is the
/// day before start) is dropped; anything shorter is an invariant breach.
fn truncated(
    start: NaiveDate,
    end: NaiveDate,
    status: OverrideStatus,
) -> Result<Option<Span>, ScheduleError> {
    if start <= end {
        return Ok(Some(Span { start, end, status }));
    }
    if end.succ_opt() == Some(start) {
        return Ok(None);
    }
    Err(ScheduleError::invalid_range(start, end))
}

/// Sorts, merges adjacent equal-status spans and checks disjointness.
fn normalize(mut spans: Vec<Span>) -> Result<Vec<Span>, ScheduleError> {
    spans.sort_by_key(|span| span.start);

    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        if let Some(last) = merged.last_mut() {
            if last.end >= span.start {
                return Err(ScheduleError::Overlap {
                    first_end: last.end,
                    second_start: span.start,
                });
            }
            if last.status == span.status && last.end.succ_opt() == Some(span.start) {
                last.end = span.end;
                continue;
            }
        }
        merged.push(span);
    }
    Ok(merged)
}

fn day_after(date: NaiveDate) -> Result<NaiveDate, ScheduleError> {
    date.succ_opt().ok_or(ScheduleError::DateOutOfRange(date))
}

fn day_before(date: NaiveDate) -> Result<NaiveDate, ScheduleError> {
    date.pred_opt().ok_or(ScheduleError::DateOutOfRange(date))
}
