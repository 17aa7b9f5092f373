use crate::error::{Result, SearchError};
use lazy_static::lazy_static;
use std::collections::HashSet;

lazy_static! {
    static ref ENGLISH: StopWords = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cannot","could",
            "did","do","does","doing","down","during",
            "each","few","for","from","further",
            "had","has","have","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","it","its","itself",
            "me","more","most","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","should","so","some","such",
            "than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","very",
            "was","we","were","what","when","where","which","while","who","whom","why","with","would",
            "you","your","yours","yourself","yourselves"
        ];
        StopWords { words: words.iter().map(|w| w.to_string()).collect() }
    };
}

/// Split text on runs of spaces. Never yields empty terms.
pub fn split_into_words(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.split(' ').filter(|w| !w.is_empty())
}

/// A term must be non-empty and free of ASCII control characters and spaces (0..=32).
pub fn validate_term(term: &str) -> Result<()> {
    if term.is_empty() {
        return Err(SearchError::invalid("term can't be empty"));
    }
    if term.bytes().any(|b| b <= 32) {
        return Err(SearchError::invalid(format!(
            "term {term:?} contains a control character (ASCII 0-32)"
        )));
    }
    Ok(())
}

/// Immutable set of terms excluded from both indexing and querying.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = HashSet::new();
        for word in words {
            let word = word.as_ref();
            validate_term(word)?;
            set.insert(word.to_string());
        }
        Ok(Self { words: set })
    }

    /// Build from a space separated list, e.g. `"and in the"`.
    pub fn parse(text: &str) -> Result<Self> {
        Self::new(split_into_words(text))
    }

    /// A common English stop-word list.
    pub fn english() -> Self {
        ENGLISH.clone()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.words.contains(term)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.words.iter().map(String::as_str)
    }

    /// Split `text` and drop every stop word, keeping order and repeats.
    pub fn tokenize_no_stop<'a>(&self, text: &'a str) -> Vec<&'a str> {
        split_into_words(text).filter(|w| !self.contains(w)).collect()
    }
}
