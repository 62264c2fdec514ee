//! Flattening of "latest benchmarks" payloads.
//!
//! The payload is a list of categories, each carrying a `documents` list of
//! `{id, pardot-id, filename}` objects.

use crate::error::{HarvestError, Result};
use crate::utils::id_string;
use serde_json::Value;
use std::collections::HashMap;

/// Credential and filename for one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    /// Source `pardot-id`, appended to the PDF base URL
    pub credential_id: String,
    pub filename: String,
}

/// Maps document id to its info, in first-seen order.
///
/// A document id repeated within one payload keeps its first position and
/// takes the last value.
pub fn extract_document_info(payload: &Value) -> Result<Vec<(String, DocumentInfo)>> {
    let categories = payload
        .as_array()
        .ok_or_else(|| HarvestError::Documents("expected a list of categories".into()))?;

    let mut documents: Vec<(String, DocumentInfo)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for category in categories {
        let entries = category
            .get("documents")
            .and_then(Value::as_array)
            .ok_or_else(|| HarvestError::Documents("category without `documents` list".into()))?;

        for entry in entries {
            let id = entry
                .get("id")
                .and_then(id_string)
                .ok_or_else(|| missing("id"))?;
            let info = DocumentInfo {
                credential_id: string_field(entry, "pardot-id")?,
                filename: string_field(entry, "filename")?,
            };

            match positions.get(&id) {
                Some(&pos) => documents[pos].1 = info,
                None => {
                    positions.insert(id.clone(), documents.len());
                    documents.push((id, info));
                }
            }
        }
    }

    Ok(documents)
}

fn string_field(entry: &Value, key: &str) -> Result<String> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| missing(key))
}

fn missing(key: &str) -> HarvestError {
    HarvestError::Documents(format!("document without `{key}`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flattens_all_categories() {
        let payload = json!([
            {"documents": [
                {"id": "d1", "pardot-id": "/x1", "filename": "one.pdf"},
                {"id": "d2", "pardot-id": "/x2", "filename": "two.pdf"}
            ]},
            {"documents": [
                {"id": 3, "pardot-id": "/x3", "filename": "three.pdf"}
            ]}
        ]);

        let docs = extract_document_info(&payload).unwrap();
        let ids: Vec<_> = docs.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["d1", "d2", "3"]);
        assert_eq!(
            docs[0].1,
            DocumentInfo {
                credential_id: "/x1".into(),
                filename: "one.pdf".into()
            }
        );
    }

    #[test]
    fn test_repeated_id_overwrites_in_place() {
        let payload = json!([{"documents": [
            {"id": "d1", "pardot-id": "/old", "filename": "old.pdf"},
            {"id": "d2", "pardot-id": "/x2", "filename": "two.pdf"},
            {"id": "d1", "pardot-id": "/new", "filename": "new.pdf"}
        ]}]);

        let docs = extract_document_info(&payload).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].0, "d1");
        assert_eq!(docs[0].1.credential_id, "/new");
    }

    #[test]
    fn test_empty_listing() {
        assert!(extract_document_info(&json!([])).unwrap().is_empty());
        assert!(
            extract_document_info(&json!([{"documents": []}]))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let payload = json!([{"documents": [{"id": "d1", "filename": "one.pdf"}]}]);
        let err = extract_document_info(&payload).unwrap_err();
        assert!(err.to_string().contains("pardot-id"));

        let payload = json!([{"items": []}]);
        assert!(matches!(
            extract_document_info(&payload),
            Err(HarvestError::Documents(_))
        ));
    }

    #[test]
    fn test_non_list_payload_is_an_error() {
        assert!(extract_document_info(&json!({"documents": []})).is_err());
    }
}
