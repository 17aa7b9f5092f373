use anyhow::{Context, Result};
use search_core::{DocId, DocumentStatus};
use serde::Deserialize;
use walkdir::WalkDir;

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InputDoc {
    pub id: DocId,
    #[serde(alias = "body")]
    pub text: String,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub ratings: Vec<i32>,
}

/// Read documents from a JSON/JSONL file or every such file under a directory.
///
/// A `.json` file holds one document object or an array of them; a `.jsonl` file
/// holds one object per line. Directory entries are visited in path order.
pub fn load_documents(input: &Path) -> Result<Vec<InputDoc>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        anyhow::bail!("input {} does not exist", input.display());
    }

    let mut docs = Vec::new();
    for file in files {
        let before = docs.len();
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut docs)?;
        } else {
            read_json(&file, &mut docs)?;
        }
        tracing::debug!(file = %file.display(), documents = docs.len() - before, "read input file");
    }
    Ok(docs)
}

fn read_jsonl(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: InputDoc = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), lineno + 1))?;
        docs.push(doc);
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    let json: serde_json::Value = serde_json::from_reader(reader)
        .with_context(|| format!("parsing {}", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                docs.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => docs.push(serde_json::from_value(json)?),
        _ => tracing::warn!(file = %file.display(), "expected a document object or array, skipped"),
    }
    Ok(())
}

/// One query per non-blank line.
pub fn read_queries(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect())
}
