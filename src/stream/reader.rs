use crate::record::Row;
use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Read every row from a JSON array or a stream of JSON objects.
///
/// Arrays are parsed with simd-json. Anything else is read as whitespace-separated
/// objects, which covers NDJSON and a single (possibly pretty-printed) object.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<Row>> {
    let mut content = Vec::new();
    BufReader::new(reader)
        .read_to_end(&mut content)
        .context("Failed to read input")?;

    let first = content.iter().copied().find(|b| !b.is_ascii_whitespace());
    let values: Vec<Value> = match first {
        None => return Ok(Vec::new()),
        Some(b'[') => {
            simd_json::serde::from_slice(&mut content).context("Failed to parse JSON array")?
        }
        Some(_) => serde_json::Deserializer::from_slice(&content)
            .into_iter::<Value>()
            .collect::<Result<Vec<Value>, _>>()
            .context("Failed to parse JSON rows")?,
    };

    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| match value {
            Value::Object(row) => Ok(row),
            _ => Err(anyhow!("row {} is not a JSON object", i + 1)),
        })
        .collect()
}

pub fn read_rows_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Row>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;
    read_rows(file).with_context(|| format!("Failed to read rows from {}", path.display()))
}

/// Expand an input file pattern such as `data/*.jsonl` into a sorted list of files
pub fn expand_inputs(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut files = glob::glob(pattern)
        .with_context(|| format!("Invalid input file pattern: {}", pattern))?
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to expand input file pattern")?;
    files.retain(|path| path.is_file());
    files.sort();

    if files.is_empty() {
        bail!("No files found matching the input file specification: {}", pattern);
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_read_ndjson() {
        let input = "{\"id\": 1, \"name\": \"Alice\"}\n\n{\"id\": 2, \"name\": \"Bob\"}\n";
        let rows = read_rows(input.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["name"], json!("Bob"));
    }

    #[test]
    fn test_read_array_keeps_column_order() {
        let input = r#" [{"zeta": "1", "alpha": "2", "mid": null}, {"zeta": "3"}]"#;
        let rows = read_rows(input.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        let columns: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(columns, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_read_pretty_single_object() {
        let input = "{\n  \"id\": 1,\n  \"name\": \"Alice\"\n}\n";
        let rows = read_rows(input.as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], json!(1));
    }

    #[test]
    fn test_read_empty_input() {
        assert!(read_rows("  \n".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_non_object_row_rejected() {
        let err = read_rows("{\"id\": 1}\n[1, 2]\n".as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "row 2 is not a JSON object");
    }

    #[test]
    fn test_malformed_row_rejected() {
        assert!(read_rows("{\"id\": 1}\n{\"id\": \n".as_bytes()).is_err());
    }

    #[test]
    fn test_expand_inputs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.jsonl", "a.jsonl", "notes.txt"] {
            let mut file = File::create(dir.path().join(name)).unwrap();
            writeln!(file, "{{}}").unwrap();
        }

        let pattern = format!("{}/*.jsonl", dir.path().display());
        let files = expand_inputs(&pattern).unwrap();

        assert_eq!(files, vec![dir.path().join("a.jsonl"), dir.path().join("b.jsonl")]);
    }

    #[test]
    fn test_expand_inputs_no_match() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.csv", dir.path().display());

        let err = expand_inputs(&pattern).unwrap_err();
        assert!(err.to_string().starts_with("No files found"));
    }
}
