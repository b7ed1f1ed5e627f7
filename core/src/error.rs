use crate::DocId;

/// Errors raised by indexing and query parsing. Every check runs before the
/// index is touched, so a failed call leaves it unchanged.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid document id {id}: {reason}")]
    InvalidDocumentId { id: DocId, reason: &'static str },

    #[error("word \"{word}\" in {context} has an invalid entry")]
    InvalidWord { word: String, context: WordContext },
}

/// Where an invalid word was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordContext {
    StopWords,
    Document,
    Query,
}

impl std::fmt::Display for WordContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WordContext::StopWords => "stop words",
            WordContext::Document => "document",
            WordContext::Query => "query",
        };
        f.write_str(s)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_word(word: &str, context: WordContext) -> Self {
        Error::InvalidWord { word: word.to_string(), context }
    }
}
