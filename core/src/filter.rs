//! Document predicates applied to ranked candidates.
//!
//! Any `Fn(DocId, DocumentStatus, i32) -> bool` is a filter, and so is a bare
//! [`DocumentStatus`], which keeps only documents with that status.

use crate::document::{DocId, DocumentStatus};

pub trait DocumentFilter {
    fn accepts(&self, id: DocId, status: DocumentStatus, rating: i32) -> bool;
}

impl<F> DocumentFilter for F
where
    F: Fn(DocId, DocumentStatus, i32) -> bool,
{
    fn accepts(&self, id: DocId, status: DocumentStatus, rating: i32) -> bool {
        self(id, status, rating)
    }
}

impl DocumentFilter for DocumentStatus {
    fn accepts(&self, _id: DocId, status: DocumentStatus, _rating: i32) -> bool {
        *self == status
    }
}

/// Keep documents whose status equals `status`.
pub fn with_status(status: DocumentStatus) -> impl DocumentFilter + Copy + Send + Sync {
    status
}

/// The default filter: only ACTIVE documents.
pub fn active() -> impl DocumentFilter + Copy + Send + Sync {
    with_status(DocumentStatus::Active)
}
