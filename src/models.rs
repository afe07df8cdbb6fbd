use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Subject name to subject, in the order the server listed them.
pub type SubjectMap = IndexMap<String, Subject>;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Subject {
    #[serde(default)]
    pub classes: IndexMap<String, ClassData>,
}

impl Subject {
    pub fn class_names(&self) -> Vec<String> {
        self.classes.keys().cloned().collect()
    }
}

/// The client only needs class names; the record itself stays opaque.
pub type ClassData = serde_json::Value;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct IndexListing {
    #[serde(default)]
    pub has_index: bool,
    #[serde(default)]
    pub structure: Vec<IndexEntry>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct IndexEntry {
    #[serde(default, deserialize_with = "string_or_number")]
    pub number: Option<String>,
    #[serde(default)]
    pub title: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Note {
    pub id: u64,
    pub original_name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub ai_analysis: Option<AiAnalysis>,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub index_key: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AiAnalysis {
    #[serde(default, deserialize_with = "one_or_many")]
    pub key_topics: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub important_equations: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub highlights: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub test_questions: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub related_links: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct UploadOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub note_id: Option<u64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

// The analyser occasionally emits a bare string where a list is expected.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(item)) => vec![item],
        Some(OneOrMany::Many(items)) => items,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(serde_json::Number),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StringOrNumber>::deserialize(deserializer)? {
        None => None,
        Some(StringOrNumber::Text(text)) => Some(text),
        Some(StringOrNumber::Number(number)) => Some(number.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_map_keeps_server_order() {
        let raw = r#"{
            "Physics": {"classes": {"Mechanics": {"note_count": 2}, "Optics": {}}},
            "Algebra": {"classes": {}},
            "Chemistry": {}
        }"#;
        let map: SubjectMap = serde_json::from_str(raw).unwrap();
        let names: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(names, ["Physics", "Algebra", "Chemistry"]);
        assert_eq!(map["Physics"].class_names(), ["Mechanics", "Optics"]);
        assert_eq!(map["Physics"].classes["Mechanics"]["note_count"], 2);
        assert!(map["Chemistry"].classes.is_empty());
    }

    #[test]
    fn index_entry_accepts_numeric_numbers() {
        let listing: IndexListing = serde_json::from_str(
            r#"{"has_index": true, "structure": [{"number": 3, "title": "Waves"}, {"title": "Appendix"}]}"#,
        )
        .unwrap();
        assert_eq!(listing.structure[0].number.as_deref(), Some("3"));
        assert_eq!(listing.structure[1].number, None);
    }

    #[test]
    fn missing_index_fields_default_to_empty() {
        let listing: IndexListing = serde_json::from_str("{}").unwrap();
        assert!(!listing.has_index);
        assert!(listing.structure.is_empty());
    }

    #[test]
    fn note_analysis_tolerates_single_strings_and_nulls() {
        let note: Note = serde_json::from_str(
            r#"{
                "id": 7,
                "original_name": "lecture.md",
                "content": "F = ma",
                "filename": "20240101_lecture.md",
                "ai_analysis": {"key_topics": "Forces", "highlights": null, "error": "quota"}
            }"#,
        )
        .unwrap();
        let analysis = note.ai_analysis.unwrap();
        assert_eq!(analysis.key_topics, ["Forces"]);
        assert!(analysis.highlights.is_empty());
        assert_eq!(analysis.error.as_deref(), Some("quota"));
    }

    #[test]
    fn upload_outcome_defaults_to_failure() {
        let outcome: UploadOutcome = serde_json::from_str(r#"{"error": "No file selected"}"#).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("No file selected"));
    }
}
