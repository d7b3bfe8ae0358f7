//! Range application and canonicalization of style overrides
//!
//! Applying a partial style to a character range splits the ids it touches
//! into inside/outside halves and then canonicalizes the whole table:
//! base-equal entries collapse to id 0, structurally identical entries merge
//! to the earliest id, unreferenced entries are pruned, and trailing
//! base-style runs are truncated from the id array. The table size is
//! therefore bounded by the number of distinct stylistic runs, not by the
//! number of edits.

use crate::style::StyleOverride;
use crate::text_data::{StyleId, TextData, BASE_STYLE_ID};
use std::collections::HashMap;

/// Apply a partial style to `[start, end)` character offsets.
///
/// A range covering the whole buffer mutates the base style directly and
/// strips the touched fields from every override entry so the new base value
/// shows through everywhere.
pub fn apply_style(data: &mut TextData, start: usize, end: usize, partial: &StyleOverride) {
    let len = data.char_len();
    let start = start.min(len);
    let end = end.min(len);

    if partial.is_empty() {
        return;
    }

    if (start == 0 && end == len) || len == 0 {
        data.style = data.style.with_override(partial);
        for over in data.style_overrides.values_mut() {
            strip_fields(over, partial);
        }
        canonicalize(data);
        return;
    }

    if start >= end {
        return;
    }

    // The id array must cover the range so inside/outside halves can split
    while data.character_style_ids.len() < end {
        data.character_style_ids.push(BASE_STYLE_ID);
    }

    // One new id per distinct pre-existing id inside the range
    let mut remap: HashMap<StyleId, StyleId> = HashMap::new();
    let mut next_id = next_style_id(data);
    for i in start..end {
        let old_id = data.character_style_ids[i];
        let new_id = *remap.entry(old_id).or_insert_with(|| {
            let existing = match data.style_overrides.get(&old_id) {
                Some(over) => over.clone(),
                None => {
                    if old_id != BASE_STYLE_ID {
                        tracing::warn!(id = old_id, "dangling style id, treating as base");
                    }
                    StyleOverride::new()
                }
            };
            let merged = existing.merged_with(partial);
            let id = next_id;
            next_id += 1;
            data.style_overrides.insert(id, merged);
            id
        });
        data.character_style_ids[i] = new_id;
    }

    canonicalize(data);
}

/// The distinct style ids referenced by `[start, end)`, in first-seen order.
/// An empty range reports the id at `start` (or base at the buffer end).
pub fn ids_in_range(data: &TextData, start: usize, end: usize) -> Vec<StyleId> {
    let len = data.char_len();
    let start = start.min(len);
    let end = end.min(len);
    if start >= end {
        let id = data
            .character_style_ids
            .get(start)
            .copied()
            .unwrap_or(BASE_STYLE_ID);
        return vec![id];
    }
    let mut seen = Vec::new();
    for i in start..end {
        let id = data
            .character_style_ids
            .get(i)
            .copied()
            .unwrap_or(BASE_STYLE_ID);
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

/// Smallest id strictly greater than every table key (and never 0)
fn next_style_id(data: &TextData) -> StyleId {
    data.style_overrides
        .keys()
        .next_back()
        .map(|&id| id + 1)
        .unwrap_or(1)
        .max(1)
}

/// Canonicalization passes (run after every mutation of the table):
/// drop base-equal fields and empty entries, merge structurally identical
/// entries left-to-right to the earliest id, prune unreferenced entries,
/// trim trailing base-style ids.
pub fn canonicalize(data: &mut TextData) {
    // (a) subtract base; empty entries remap to 0
    let base = data.style.clone();
    let mut empty_ids = Vec::new();
    for (&id, over) in data.style_overrides.iter_mut() {
        *over = over.subtract_base(&base);
        if over.is_empty() {
            empty_ids.push(id);
        }
    }
    for id in &empty_ids {
        data.style_overrides.remove(id);
    }
    for slot in data.character_style_ids.iter_mut() {
        if empty_ids.contains(slot) {
            *slot = BASE_STYLE_ID;
        }
    }

    // (b) merge structurally identical entries to the earliest id in
    // left-to-right character order
    let mut canonical_for: HashMap<StyleId, StyleId> = HashMap::new();
    let mut earliest_for_value: Vec<(StyleOverride, StyleId)> = Vec::new();
    for &id in data.character_style_ids.iter() {
        if id == BASE_STYLE_ID || canonical_for.contains_key(&id) {
            continue;
        }
        let over = match data.style_overrides.get(&id) {
            Some(over) => over.clone(),
            None => {
                canonical_for.insert(id, BASE_STYLE_ID);
                continue;
            }
        };
        let canonical = earliest_for_value
            .iter()
            .find(|(value, _)| *value == over)
            .map(|&(_, earliest)| earliest);
        match canonical {
            Some(earliest) => {
                canonical_for.insert(id, earliest);
            }
            None => {
                earliest_for_value.push((over, id));
                canonical_for.insert(id, id);
            }
        }
    }
    for slot in data.character_style_ids.iter_mut() {
        if let Some(&canonical) = canonical_for.get(slot) {
            *slot = canonical;
        }
    }

    // (c) prune unreferenced entries
    let referenced: Vec<StyleId> = data
        .character_style_ids
        .iter()
        .copied()
        .filter(|&id| id != BASE_STYLE_ID)
        .collect();
    data.style_overrides.retain(|id, _| referenced.contains(id));

    // (d) trim trailing base-style ids
    while data.character_style_ids.last() == Some(&BASE_STYLE_ID) {
        data.character_style_ids.pop();
    }
}

fn strip_fields(over: &mut StyleOverride, touched: &StyleOverride) {
    if touched.font_name.is_some() {
        over.font_name = None;
        over.font_variations = None;
    }
    if touched.font_variations.is_some() {
        over.font_variations = None;
    }
    if touched.font_size.is_some() {
        over.font_size = None;
    }
    if touched.text_decoration.is_some() {
        over.text_decoration = None;
    }
    if touched.hyperlink.is_some() {
        over.hyperlink = None;
    }
    if touched.fill_paints.is_some() {
        over.fill_paints = None;
    }
    if touched.font_ligatures.is_some() {
        over.font_ligatures = None;
    }
    if touched.font_position.is_some() {
        over.font_position = None;
    }
    if touched.font_numeric_fraction.is_some() {
        over.font_numeric_fraction = None;
    }
    if touched.line_height.is_some() {
        over.line_height = None;
    }
    if touched.letter_spacing.is_some() {
        over.letter_spacing = None;
    }
    if touched.text_case.is_some() {
        over.text_case = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{TextDecoration, TextStyle};
    use proptest::prelude::*;

    fn size_override(size: f32) -> StyleOverride {
        let mut over = StyleOverride::new();
        over.font_size = Some(size);
        over
    }

    #[test]
    fn full_range_hits_base_style() {
        let mut data = TextData::new("hello", TextStyle::default());
        apply_style(&mut data, 0, 5, &size_override(20.0));
        assert_eq!(data.style.font_size, 20.0);
        assert!(data.style_overrides.is_empty());
        assert!(data.character_style_ids.is_empty());
    }

    #[test]
    fn partial_after_full_leaves_one_entry() {
        let mut data = TextData::new("hello", TextStyle::default());
        apply_style(&mut data, 0, 5, &size_override(20.0));
        apply_style(&mut data, 0, 2, &size_override(24.0));

        assert_eq!(data.style.font_size, 20.0);
        assert_eq!(data.style_overrides.len(), 1);
        let (&id, over) = data.style_overrides.iter().next().unwrap();
        assert_eq!(over.font_size, Some(24.0));
        assert_eq!(data.character_style_ids, vec![id, id]);
    }

    #[test]
    fn identical_runs_merge_to_earliest_id() {
        let mut data = TextData::new("abcdef", TextStyle::default());
        apply_style(&mut data, 0, 2, &size_override(30.0));
        apply_style(&mut data, 4, 6, &size_override(30.0));

        assert_eq!(data.style_overrides.len(), 1);
        let ids = &data.character_style_ids;
        assert_eq!(ids[0], ids[4]);
        assert_eq!(ids[0], ids[5]);
        assert_eq!(ids[2], BASE_STYLE_ID);
    }

    #[test]
    fn reverting_to_base_prunes_entry() {
        let mut data = TextData::new("abc", TextStyle::default());
        apply_style(&mut data, 0, 2, &size_override(30.0));
        assert_eq!(data.style_overrides.len(), 1);

        let base_size = data.style.font_size;
        apply_style(&mut data, 0, 2, &size_override(base_size));
        assert!(data.style_overrides.is_empty());
        assert!(data.character_style_ids.is_empty());
    }

    #[test]
    fn overlapping_edits_split_ids() {
        let mut data = TextData::new("abcdef", TextStyle::default());
        apply_style(&mut data, 0, 4, &size_override(30.0));
        let mut deco = StyleOverride::new();
        deco.text_decoration = Some(TextDecoration::Underline);
        apply_style(&mut data, 2, 6, &deco);

        // [0,2) size only, [2,4) size+underline, [4,6) underline only
        assert_eq!(data.style_overrides.len(), 3);
        let resolved = data.style_at(2);
        assert_eq!(resolved.font_size, 30.0);
        assert_eq!(resolved.text_decoration, TextDecoration::Underline);
        let left = data.style_at(0);
        assert_eq!(left.text_decoration, TextDecoration::None);
    }

    #[test]
    fn dangling_id_degrades_to_base() {
        let mut data = TextData::new("abc", TextStyle::default());
        data.character_style_ids = vec![42, 0, 0];
        apply_style(&mut data, 0, 2, &size_override(30.0));
        let resolved = data.style_at(0);
        assert_eq!(resolved.font_size, 30.0);
    }

    proptest! {
        #[test]
        fn canonicalization_is_idempotent(
            ranges in proptest::collection::vec((0usize..10, 0usize..10, 10u32..40), 0..6)
        ) {
            let mut data = TextData::new("abcdefghij", TextStyle::default());
            for (a, b, size) in ranges {
                let (start, end) = if a <= b { (a, b) } else { (b, a) };
                apply_style(&mut data, start, end, &size_override(size as f32));
            }
            let once = data.clone();
            canonicalize(&mut data);
            prop_assert_eq!(&once.character_style_ids, &data.character_style_ids);
            prop_assert_eq!(&once.style_overrides, &data.style_overrides);
        }

        #[test]
        fn no_dangling_ids_after_edits(
            ranges in proptest::collection::vec((0usize..10, 0usize..10, 10u32..40), 0..8)
        ) {
            let mut data = TextData::new("abcdefghij", TextStyle::default());
            for (a, b, size) in ranges {
                let (start, end) = if a <= b { (a, b) } else { (b, a) };
                apply_style(&mut data, start, end, &size_override(size as f32));
            }
            prop_assert!(data.character_style_ids.len() <= data.char_len());
            for &id in &data.character_style_ids {
                if id != BASE_STYLE_ID {
                    prop_assert!(data.style_overrides.contains_key(&id));
                }
            }
        }
    }
}
