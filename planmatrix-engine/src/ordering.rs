//! Section order resolution and row sorting.
//!
//! Two order sources coexist and never overwrite each other: a client-local
//! section order hint, and the storage collaborator's per-section
//! characteristic order, which arrives already applied as source order.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::data::{CharacteristicRecord, Plan};
use crate::matrix::Row;

/// Distinct, trimmed, non-blank section names in first-encounter order.
#[must_use]
pub fn known_sections(plans: &[Plan]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut sections = Vec::new();
    for record in plans.iter().flat_map(|plan| &plan.characteristics) {
        let name = record.section.trim();
        if !name.is_empty() && seen.insert(name) {
            sections.push(name.to_string());
        }
    }
    sections
}

/// Resolve the display order of sections.
///
/// Without a preference, sections sort alphabetically. With one, preferred
/// sections that still exist come first, then every other known section in
/// alphabetical order.
#[must_use]
pub fn resolve_section_order(known: &[String], preference: Option<&[String]>) -> Vec<String> {
    let mut remaining: Vec<String> = {
        let mut seen: HashSet<&str> = HashSet::new();
        known
            .iter()
            .filter(|s| seen.insert(s.as_str()))
            .cloned()
            .collect()
    };
    remaining.sort();

    let Some(preference) = preference else {
        return remaining;
    };

    let mut resolved = Vec::with_capacity(remaining.len());
    for section in preference {
        if let Some(pos) = remaining.iter().position(|s| s == section) {
            resolved.push(remaining.remove(pos));
        }
    }
    resolved.extend(remaining);
    resolved
}

fn section_rank(order: &[String], section: &str) -> Option<usize> {
    order.iter().position(|s| s == section)
}

fn compare_known_first(a: Option<usize>, b: Option<usize>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort rows for display.
///
/// Header rows precede all other rows and follow `section_order`. Other rows
/// sort by section position, unknown sections last and alphabetically among
/// themselves; within a section the incoming order is kept.
#[must_use]
pub fn sort_rows(mut rows: Vec<Row>, section_order: &[String]) -> Vec<Row> {
    rows.sort_by(|a, b| {
        b.is_section_header
            .cmp(&a.is_section_header)
            .then_with(|| {
                let rank_a = section_rank(section_order, &a.section);
                let rank_b = section_rank(section_order, &b.section);
                let by_rank = compare_known_first(rank_a, rank_b);
                if a.is_section_header || rank_a.is_some() || rank_b.is_some() {
                    by_rank
                } else {
                    a.section.cmp(&b.section)
                }
            })
    });
    rows
}

/// Apply a drag-and-drop section move: `dragged` takes `target`'s position.
///
/// Returns the order unchanged when either name is unknown or they are equal.
#[must_use]
pub fn move_section(order: &[String], dragged: &str, target: &str) -> Vec<String> {
    let mut next = order.to_vec();
    if dragged == target {
        return next;
    }
    let (Some(from), Some(to)) = (
        order.iter().position(|s| s == dragged),
        order.iter().position(|s| s == target),
    ) else {
        return next;
    };
    let moved = next.remove(from);
    next.insert(to, moved);
    next
}

/// Reorder `items` so that names listed in `requested` come first, in that
/// order, followed by the remaining items in their original order.
///
/// Requested names with no matching item are ignored; each item appears once.
pub fn apply_characteristic_order<T, F>(items: Vec<T>, requested: &[String], name_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut pool: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(pool.len());
    for name in requested {
        let hit = pool
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|item| name_of(item) == name));
        if let Some(item) = hit.and_then(|pos| pool[pos].take()) {
            ordered.push(item);
        }
    }
    ordered.extend(pool.into_iter().flatten());
    ordered
}

/// Reorder the records of `section` within one plan, keeping the slots the
/// section occupies among the records of other sections.
pub fn reorder_section_records(plan: &mut Plan, section: &str, names: &[String]) {
    let slots: Vec<usize> = plan
        .characteristics
        .iter()
        .enumerate()
        .filter(|(_, record)| record.section == section)
        .map(|(index, _)| index)
        .collect();
    let records: Vec<CharacteristicRecord> = slots
        .iter()
        .map(|&index| std::mem::take(&mut plan.characteristics[index]))
        .collect();
    let reordered = apply_characteristic_order(records, names, |r| r.characteristic.as_str());
    for (slot, record) in slots.into_iter().zip(reordered) {
        plan.characteristics[slot] = record;
    }
}
