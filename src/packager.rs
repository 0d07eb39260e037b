//! Submission packaging: flatten the nested report document (including file
//! attachments at arbitrary depth) into an ordered set of named transport
//! fields.
//!
//! The path grammar is the one bit-exact contract this service owns: arrays
//! expand element-by-element with the index appended (`secondary_sdgs.0`),
//! records expand key-by-key, scalars become string fields at their path,
//! and a file value becomes a raw binary part under its current path. The
//! walk is a visitor over the closed node set {scalar, file, array, record}
//! and terminates on every shape the document model can produce — the model
//! is tree-shaped by construction, so no cycle guard is needed.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::Value;

use crate::domain::ReportDocument;

/// One flattened transport field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
  Text(String),
  File { filename: String, mime: String, bytes: Vec<u8> },
}

/// Flatten a whole document into `(path, value)` pairs ready for a multipart
/// form. Null leaves (e.g. an unset `report_id`) are skipped entirely.
pub fn flatten_document(doc: &ReportDocument) -> Result<Vec<(String, FieldValue)>, String> {
  let value =
    serde_json::to_value(doc).map_err(|e| format!("Document serialization failed: {e}"))?;
  let mut out = Vec::new();
  flatten_value("", &value, &mut out)?;
  Ok(out)
}

fn flatten_value(
  path: &str,
  value: &Value,
  out: &mut Vec<(String, FieldValue)>,
) -> Result<(), String> {
  match value {
    Value::Null => Ok(()),
    Value::Object(map) if is_file_shape(map) => {
      let filename = str_key(map, "filename");
      let mime = str_key(map, "mime");
      let bytes = BASE64
        .decode(str_key(map, "data_base64"))
        .map_err(|e| format!("Attachment at \"{path}\" is not valid base64: {e}"))?;
      out.push((path.to_string(), FieldValue::File { filename, mime, bytes }));
      Ok(())
    }
    Value::Object(map) => {
      for (key, child) in map {
        flatten_value(&join(path, key), child, out)?;
      }
      Ok(())
    }
    Value::Array(items) => {
      for (i, child) in items.iter().enumerate() {
        flatten_value(&join(path, &i.to_string()), child, out)?;
      }
      Ok(())
    }
    Value::String(s) => {
      out.push((path.to_string(), FieldValue::Text(s.clone())));
      Ok(())
    }
    Value::Bool(b) => {
      out.push((path.to_string(), FieldValue::Text(b.to_string())));
      Ok(())
    }
    Value::Number(n) => {
      out.push((path.to_string(), FieldValue::Text(n.to_string())));
      Ok(())
    }
  }
}

fn join(prefix: &str, key: &str) -> String {
  if prefix.is_empty() {
    key.to_string()
  } else {
    format!("{prefix}.{key}")
  }
}

/// A file node is exactly the serialized `FileAttachment` shape: the three
/// string keys and nothing else.
fn is_file_shape(map: &serde_json::Map<String, Value>) -> bool {
  map.len() == 3
    && ["filename", "mime", "data_base64"]
      .iter()
      .all(|k| map.get(*k).is_some_and(Value::is_string))
}

fn str_key(map: &serde_json::Map<String, Value>, key: &str) -> String {
  map.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}
