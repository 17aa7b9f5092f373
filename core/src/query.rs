use crate::error::{Result, SearchError};
use crate::tokenizer::{validate_term, StopWords};
use std::collections::BTreeSet;

/// Parsed query. Terms borrow from the raw query text.
///
/// `plus` and `minus` are disjoint: a term given both ways is only kept as a
/// minus term, which excludes exactly the same documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query<'a> {
    pub plus: BTreeSet<&'a str>,
    pub minus: BTreeSet<&'a str>,
}

impl<'a> Query<'a> {
    pub fn is_empty(&self) -> bool {
        self.plus.is_empty() && self.minus.is_empty()
    }
}

/// Parse `raw` into plus and minus terms.
///
/// A term starting with `-` is a minus term. `-` on its own and `--term` are rejected,
/// as is any term carrying a control character.
pub fn parse_query<'a>(raw: &'a str, stop_words: &StopWords) -> Result<Query<'a>> {
    let mut query = Query::default();
    for word in stop_words.tokenize_no_stop(raw) {
        validate_term(word)?;
        match word.strip_prefix('-') {
            Some(rest) => {
                if rest.is_empty() || rest.starts_with('-') {
                    return Err(SearchError::invalid(format!(
                        "minus term {word:?} can't be '-' or start with '--'"
                    )));
                }
                query.minus.insert(rest);
            }
            None => {
                query.plus.insert(word);
            }
        }
    }
    let minus = &query.minus;
    query.plus.retain(|t| !minus.contains(t));
    Ok(query)
}
