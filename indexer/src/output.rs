use anyhow::Result;
use search_core::{DocId, Document, MatchedDocument};
use serde::Serialize;
use std::io::Write;

use crate::paginate::paginate;

pub fn write_document<W: Write>(out: &mut W, doc: &Document) -> Result<()> {
    writeln!(out, "{doc}")?;
    Ok(())
}

/// `{ document_id = 1, status = ACTIVE, words = cat city}`
pub fn write_match<W: Write>(out: &mut W, id: DocId, matched: &MatchedDocument) -> Result<()> {
    let words: String = matched.terms.iter().map(|w| format!(" {w}")).collect();
    writeln!(out, "{{ document_id = {id}, status = {}, words ={words}}}", matched.status)?;
    Ok(())
}

/// Print `docs` in pages of `page_size`, separated by a page break line.
pub fn write_pages<W: Write>(out: &mut W, docs: &[Document], page_size: usize) -> Result<()> {
    let pages = paginate(docs, page_size)?;
    let total = pages.len();
    for (i, page) in pages.into_iter().enumerate() {
        for doc in page {
            write_document(out, doc)?;
        }
        if i + 1 < total {
            writeln!(out, "Page break")?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
pub struct QueryOutput<'a> {
    pub query: &'a str,
    pub results: &'a [Document],
}

#[derive(Serialize)]
pub struct MatchOutput<'a> {
    pub query: &'a str,
    pub document_id: DocId,
    #[serde(flatten)]
    pub matched: &'a MatchedDocument,
}

/// One JSON object per line.
pub fn write_json_line<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
