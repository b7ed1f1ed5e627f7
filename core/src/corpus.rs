//! Loading documents from JSON and JSONL files.
//!
//! A record looks like `{"id": 3, "text": "big dog", "status": "banned", "ratings": [1, 2]}`.
//! `status` defaults to `actual` and `ratings` to an empty list.

use crate::{DocId, DocumentStatus, SearchEngine};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDoc {
    pub id: DocId,
    pub text: String,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub ratings: Vec<i32>,
}

/// Read every `.json` / `.jsonl` file under `path` (a file or a directory).
/// Directory entries are visited in file name order.
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<InputDoc>> {
    let path = path.as_ref();
    let mut files: Vec<PathBuf> = Vec::new();
    if path.is_dir() {
        for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else {
        files.push(path.to_path_buf());
    }

    let mut docs = Vec::new();
    for file in files {
        let before = docs.len();
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut docs)?;
        } else {
            read_json(&file, &mut docs)?;
        }
        tracing::debug!(file = %file.display(), docs = docs.len() - before, "read corpus file");
    }
    Ok(docs)
}

fn read_jsonl(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: InputDoc =
            serde_json::from_str(&line).with_context(|| format!("{}:{}: bad record", file.display(), n + 1))?;
        docs.push(doc);
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                docs.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => docs.push(serde_json::from_value(json)?),
        _ => anyhow::bail!("{}: expected a document or an array of documents", file.display()),
    }
    Ok(())
}

/// Add every record to `engine`, stopping at the first rejected document.
pub fn index_corpus(engine: &mut SearchEngine, docs: &[InputDoc]) -> Result<()> {
    for doc in docs {
        engine
            .add_document(doc.id, &doc.text, doc.status, &doc.ratings)
            .with_context(|| format!("indexing document {}", doc.id))?;
    }
    tracing::info!(num_docs = engine.document_count(), num_terms = engine.term_count(), "indexed corpus");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn loads_json_and_jsonl() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("a.jsonl"),
            "{\"id\": 1, \"text\": \"white cat\"}\n\n{\"id\": 2, \"text\": \"black dog\", \"status\": \"banned\", \"ratings\": [4, 5]}\n",
        )
        .unwrap();
        fs::write(dir.path().join("b.json"), "[{\"id\": 3, \"text\": \"grey parrot\", \"ratings\": [-1]}]").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let docs = load_corpus(dir.path()).unwrap();
        assert_eq!(docs.iter().map(|d| d.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(docs[1].status, DocumentStatus::Banned);
        assert_eq!(docs[0].ratings, Vec::<i32>::new());

        let mut engine = SearchEngine::new();
        index_corpus(&mut engine, &docs).unwrap();
        assert_eq!(engine.document_count(), 3);
    }

    #[test]
    fn bad_record_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        fs::write(&path, "{\"id\": \"x\"}\n").unwrap();
        assert!(load_corpus(&path).is_err());
    }

    #[test]
    fn rejected_document_stops_indexing() {
        let docs = vec![
            InputDoc { id: 1, text: "fine".into(), status: DocumentStatus::Actual, ratings: vec![] },
            InputDoc { id: 1, text: "duplicate id".into(), status: DocumentStatus::Actual, ratings: vec![] },
        ];
        let mut engine = SearchEngine::new();
        assert!(index_corpus(&mut engine, &docs).is_err());
        assert_eq!(engine.document_count(), 1);
    }
}
