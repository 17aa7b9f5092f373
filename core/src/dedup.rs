use crate::document::DocId;
use crate::engine::SearchEngine;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Stable digest of a document's distinct terms, independent of their frequencies.
///
/// Terms come in ascending order and can't contain NUL, so a NUL separator keeps
/// the encoding unambiguous.
pub fn fingerprint<'a, I>(sorted_terms: I) -> blake3::Hash
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hasher = blake3::Hasher::new();
    for term in sorted_terms {
        hasher.update(term.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

/// Remove every document whose term set equals that of a document with a lower id.
///
/// Returns the removed ids in ascending order. Running it again removes nothing.
pub fn remove_duplicates(engine: &mut SearchEngine) -> Vec<DocId> {
    let mut first_seen: HashMap<blake3::Hash, DocId> = HashMap::new();
    let mut duplicates = Vec::new();

    for (id, doc) in engine.iter() {
        match first_seen.entry(fingerprint(doc.terms())) {
            Entry::Occupied(original) => {
                tracing::info!(doc_id = id, original = *original.get(), "found duplicate document");
                duplicates.push(id);
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }
    }

    for &id in &duplicates {
        engine.remove_document(id);
    }
    duplicates
}
