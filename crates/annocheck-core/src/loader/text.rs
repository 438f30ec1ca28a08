//! Tabular text-annotation loader (CSV with a header row)

use crate::error::{Error, Result};
use crate::model::{Label, TextAnnotation};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, instrument};

/// Column names accepted for each required field, in order of preference
const MESSAGE_ID_COLUMNS: &[&str] = &["message_id", "id"];
const TEXT_COLUMNS: &[&str] = &["text"];
const INTENT_COLUMNS: &[&str] = &["intent"];
const CONFIDENCE_COLUMNS: &[&str] = &["confidence"];

/// Positions of the required columns in the header row
#[derive(Debug)]
struct TextColumns {
    message_id: usize,
    text: usize,
    intent: usize,
    confidence: usize,
}

impl TextColumns {
    fn locate(headers: &csv::StringRecord, path: &Path) -> Result<Self> {
        let find = |names: &[&str]| -> Result<usize> {
            names
                .iter()
                .find_map(|name| {
                    headers.iter().position(|header| {
                        header.trim_start_matches('\u{feff}').trim().eq_ignore_ascii_case(name)
                    })
                })
                .ok_or_else(|| Error::schema(path, names[0]))
        };

        Ok(Self {
            message_id: find(MESSAGE_ID_COLUMNS)?,
            text: find(TEXT_COLUMNS)?,
            intent: find(INTENT_COLUMNS)?,
            confidence: find(CONFIDENCE_COLUMNS)?,
        })
    }
}

/// Load text annotations from a CSV file
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_text_annotations(path: &Path) -> Result<Vec<TextAnnotation>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let records = read_text_annotations(file, path)?;
    debug!(records = records.len(), "Loaded text annotations");
    Ok(records)
}

/// Parse text annotations from any reader; `path` is only used in errors
pub fn read_text_annotations<R: Read>(input: R, path: &Path) -> Result<Vec<TextAnnotation>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .clone();
    let columns = TextColumns::locate(&headers, path)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| csv_error(path, e))?;
        let line = row
            .position()
            .map(|p| format!("line {}", p.line()))
            .unwrap_or_else(|| format!("row {}", records.len() + 1));

        let field = |index: usize| row.get(index).unwrap_or_default();

        let message_id = field(columns.message_id).trim();
        if message_id.is_empty() {
            return Err(Error::parse(path, line, "message_id must not be empty"));
        }

        records.push(TextAnnotation {
            message_id: message_id.to_string(),
            text: field(columns.text).to_string(),
            intent: Label::parse(field(columns.intent)),
            confidence: Label::parse(field(columns.confidence)),
        });
    }

    Ok(records)
}

fn csv_error(path: &Path, error: csv::Error) -> Error {
    let location = error
        .position()
        .map(|p| format!("line {}", p.line()))
        .unwrap_or_else(|| "header".to_string());

    if error.is_io_error() {
        if let csv::ErrorKind::Io(source) = error.into_kind() {
            return Error::io(path, source);
        }
        return Error::parse(path, location, "I/O error while reading CSV");
    }

    Error::parse(path, location, error.to_string())
}
