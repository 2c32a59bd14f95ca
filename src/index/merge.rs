//! Segment merging.
//!
//! Merging concatenates segments into one, dropping deleted documents and
//! renumbering the survivors contiguously in their original order. The
//! merged segment is fully written before the caller swaps the manifest, so
//! an interrupted merge leaves the index on its previous commit point with
//! nothing but an orphaned file to clean up.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::error::Result;
use crate::index::posting::PostingList;
use crate::index::segment::{self, SegmentData, SegmentInfo};
use crate::storage::Storage;

/// Merge the given segments into a single new one.
///
/// Returns `None` when no live documents remain, in which case the caller
/// publishes an empty manifest instead.
pub fn merge_segments(
    storage: &dyn Storage,
    infos: &[SegmentInfo],
) -> Result<Option<SegmentInfo>> {
    let mut merged = SegmentData::default();
    let mut merged_terms: BTreeMap<String, BTreeMap<String, PostingList>> = BTreeMap::new();
    let mut next_id: u32 = 0;

    for info in infos {
        let data = segment::read_segment(storage, info)?;
        let live = segment::read_live_docs(storage, info)?;

        // Old local id -> new local id, for the live documents only.
        let mut remap: Vec<Option<u32>> = vec![None; data.doc_count as usize];
        for old_id in 0..data.doc_count {
            if live.is_live(old_id) {
                remap[old_id as usize] = Some(next_id);
                next_id += 1;
            }
        }

        for (field, dict) in &data.terms {
            let merged_dict = merged_terms.entry(field.clone()).or_default();
            for (term, list) in dict {
                let merged_list = merged_dict.entry(term.clone()).or_default();
                for posting in &list.postings {
                    if let Some(new_id) = remap[posting.doc_id as usize] {
                        let mut posting = posting.clone();
                        posting.doc_id = new_id;
                        merged_list.postings.push(posting);
                    }
                }
            }
        }

        for old_id in 0..data.doc_count as usize {
            if remap[old_id].is_none() {
                continue;
            }
            merged.stored.push(data.stored[old_id].clone());

            for (field, lens) in &data.field_lengths {
                let col = merged.field_lengths.entry(field.clone()).or_default();
                col.resize(merged.stored.len() - 1, 0);
                col.push(lens[old_id]);
            }
            for (field, vals) in &data.numeric_doc_values {
                let col = merged.numeric_doc_values.entry(field.clone()).or_default();
                col.resize(merged.stored.len() - 1, None);
                col.push(vals[old_id]);
            }
            for (field, vals) in &data.sorted_doc_values {
                let col = merged.sorted_doc_values.entry(field.clone()).or_default();
                col.resize(merged.stored.len() - 1, None);
                col.push(vals[old_id].clone());
            }
            for (field, vals) in &data.facet_doc_values {
                let col = merged.facet_doc_values.entry(field.clone()).or_default();
                col.resize(merged.stored.len() - 1, Vec::new());
                col.push(vals[old_id].clone());
            }
        }
    }

    if next_id == 0 {
        return Ok(None);
    }

    // Drop terms whose postings all pointed at deleted documents.
    for dict in merged_terms.values_mut() {
        dict.retain(|_, list| !list.postings.is_empty());
    }
    merged_terms.retain(|_, dict| !dict.is_empty());

    merged.doc_count = next_id;
    merged.terms = merged_terms;
    for col in merged.field_lengths.values_mut() {
        col.resize(next_id as usize, 0);
    }
    for col in merged.numeric_doc_values.values_mut() {
        col.resize(next_id as usize, None);
    }
    for col in merged.sorted_doc_values.values_mut() {
        col.resize(next_id as usize, None);
    }
    for col in merged.facet_doc_values.values_mut() {
        col.resize(next_id as usize, Vec::new());
    }

    let info = SegmentInfo {
        id: Uuid::new_v4().to_string(),
        doc_count: next_id,
    };
    segment::write_segment(storage, &info, &merged)?;
    Ok(Some(info))
}
