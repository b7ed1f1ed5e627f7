use crate::error::{Error, Result, WordContext};
use crate::tokenizer::{is_valid_word, split_into_words, strip_minus};
use crate::ExecutionMode;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashSet};

/// Words dropped from both documents and queries. Fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// Every stop word must itself be a valid word.
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = HashSet::new();
        for word in words {
            let word = word.as_ref();
            if !is_valid_word(word) {
                return Err(Error::invalid_word(word, WordContext::StopWords));
            }
            set.insert(word.to_string());
        }
        Ok(Self { words: set })
    }

    /// Stop words given as one space separated string.
    pub fn from_text(text: &str) -> Result<Self> {
        Self::new(split_into_words(text))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Parsed query. Terms borrow from the raw query text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query<'q> {
    pub plus: BTreeSet<&'q str>,
    pub minus: BTreeSet<&'q str>,
}

#[derive(Debug, Clone, Copy)]
struct QueryWord<'q> {
    data: &'q str,
    is_minus: bool,
    is_stop: bool,
}

fn parse_query_word<'q>(token: &'q str, stop_words: &StopWords) -> Result<QueryWord<'q>> {
    let (data, is_minus) = strip_minus(token);
    if !is_valid_word(data) {
        return Err(Error::invalid_word(token, WordContext::Query));
    }
    Ok(QueryWord { data, is_minus, is_stop: stop_words.contains(data) })
}

/// Split a query into plus and minus terms. Any invalid word fails the whole
/// parse; nothing partial is returned.
///
/// In parallel mode words are classified concurrently and merged afterwards.
pub fn parse_query<'q>(text: &'q str, stop_words: &StopWords, mode: ExecutionMode) -> Result<Query<'q>> {
    let tokens = split_into_words(text);
    let words: Vec<Result<QueryWord<'q>>> = if mode.is_parallel() {
        mode.install(|| tokens.par_iter().map(|&t| parse_query_word(t, stop_words)).collect())
    } else {
        tokens.iter().map(|&t| parse_query_word(t, stop_words)).collect()
    };

    let mut query = Query::default();
    for word in words {
        let word = word?;
        if word.is_stop {
            continue;
        }
        if word.is_minus {
            query.minus.insert(word.data);
        } else {
            query.plus.insert(word.data);
        }
    }
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(text: &str) -> StopWords {
        StopWords::from_text(text).unwrap()
    }

    #[test]
    fn splits_plus_and_minus() {
        let sw = stop("and with");
        let q = parse_query("funny pet and -rat pet -nasty", &sw, ExecutionMode::Sequential).unwrap();
        assert_eq!(q.plus.into_iter().collect::<Vec<_>>(), vec!["funny", "pet"]);
        assert_eq!(q.minus.into_iter().collect::<Vec<_>>(), vec!["nasty", "rat"]);
    }

    #[test]
    fn minus_stop_word_is_dropped() {
        let sw = stop("in");
        let q = parse_query("cat -in", &sw, ExecutionMode::Sequential).unwrap();
        assert!(q.minus.is_empty());
        assert_eq!(q.plus.len(), 1);
    }

    #[test]
    fn term_may_be_plus_and_minus() {
        let q = parse_query("cat -cat", &StopWords::default(), ExecutionMode::Sequential).unwrap();
        assert!(q.plus.contains("cat"));
        assert!(q.minus.contains("cat"));
    }

    #[test]
    fn invalid_words_fail_atomically() {
        let sw = StopWords::default();
        for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel(4)] {
            for bad in ["cat --dog", "cat -", "ca\u{1}t dog", "a b c d e f g -"] {
                let err = parse_query(bad, &sw, mode).unwrap_err();
                assert!(matches!(err, Error::InvalidWord { context: WordContext::Query, .. }));
            }
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let sw = stop("the a");
        let text = "the quick -brown fox a -lazy dog quick fox -the";
        let seq = parse_query(text, &sw, ExecutionMode::Sequential).unwrap();
        let par = parse_query(text, &sw, ExecutionMode::Parallel(3)).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn invalid_stop_words_rejected() {
        assert!(StopWords::new(["ok", "-bad"]).is_err());
        assert!(StopWords::new(["b\u{7}ell"]).is_err());
        assert_eq!(stop("in the in").len(), 2);
    }
}
