//! Documents and field values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single field value.
///
/// A field name can carry several values in one document; each value keeps
/// its own indexing options. Doc-value variants are column data used for
/// sorting and faceting rather than inverted-index terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Analyzed text. `stored` controls retrieval of the original value;
    /// `positions` controls whether term positions are recorded (required
    /// for phrase queries on the field).
    Text {
        value: String,
        stored: bool,
        positions: bool,
    },
    /// Retrievable value that produces no terms at all.
    StoredOnly(String),
    /// Numeric column value for sorting.
    NumericDocValue(f64),
    /// String column value for sorting.
    SortedDocValue(String),
    /// Facet dimension value; a document may carry several per field.
    FacetValue(String),
}

impl FieldValue {
    /// The stored text of this value, if it is retrievable.
    pub fn stored_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text { value, stored: true, .. } => Some(value),
            FieldValue::StoredOnly(value) => Some(value),
            _ => None,
        }
    }

    /// The text to analyze for indexing, if any.
    pub fn indexed_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// An ordered collection of named field values.
///
/// Field names map to one or more values. Iteration order is stable
/// (lexicographic by field name) so stored documents round-trip
/// deterministically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    fields: BTreeMap<String, Vec<FieldValue>>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Document {
            fields: BTreeMap::new(),
        }
    }

    /// Start building a document.
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }

    /// Append a value to a field.
    pub fn add_field(&mut self, name: &str, value: FieldValue) {
        self.fields.entry(name.to_string()).or_default().push(value);
    }

    /// All values of a field, empty when the field is absent.
    pub fn field_values(&self, name: &str) -> &[FieldValue] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first stored text of a field, if any value is retrievable.
    pub fn get_stored(&self, name: &str) -> Option<&str> {
        self.field_values(name).iter().find_map(FieldValue::stored_text)
    }

    /// Whether the document has any value for the field.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterate over all (field name, values) pairs.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[FieldValue])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of distinct field names.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Fluent builder for [`Document`].
///
/// # Examples
///
/// ```
/// use yari::document::Document;
///
/// let doc = Document::builder()
///     .add_text("body", "the quick brown fox")
///     .add_stored("email", "kitty@gmail.com")
///     .add_facet("city", "Bangalore")
///     .add_sorted_value("id_sort", "9")
///     .build();
///
/// assert!(doc.has_field("body"));
/// assert_eq!(doc.get_stored("email"), Some("kitty@gmail.com"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    doc: Document,
}

impl DocumentBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        DocumentBuilder {
            doc: Document::new(),
        }
    }

    /// Add analyzed, stored text with positions.
    pub fn add_text(mut self, name: &str, value: &str) -> Self {
        self.doc.add_field(
            name,
            FieldValue::Text {
                value: value.to_string(),
                stored: true,
                positions: true,
            },
        );
        self
    }

    /// Add analyzed text that is not retrievable.
    pub fn add_unstored_text(mut self, name: &str, value: &str) -> Self {
        self.doc.add_field(
            name,
            FieldValue::Text {
                value: value.to_string(),
                stored: false,
                positions: true,
            },
        );
        self
    }

    /// Add analyzed, stored text without term positions. Term queries work;
    /// phrase queries on the field do not.
    pub fn add_text_no_positions(mut self, name: &str, value: &str) -> Self {
        self.doc.add_field(
            name,
            FieldValue::Text {
                value: value.to_string(),
                stored: true,
                positions: false,
            },
        );
        self
    }

    /// Add a value that is only retrievable, never searched.
    pub fn add_stored(mut self, name: &str, value: &str) -> Self {
        self.doc.add_field(name, FieldValue::StoredOnly(value.to_string()));
        self
    }

    /// Add a numeric sort column value.
    pub fn add_numeric_value(mut self, name: &str, value: f64) -> Self {
        self.doc.add_field(name, FieldValue::NumericDocValue(value));
        self
    }

    /// Add a string sort column value.
    pub fn add_sorted_value(mut self, name: &str, value: &str) -> Self {
        self.doc.add_field(name, FieldValue::SortedDocValue(value.to_string()));
        self
    }

    /// Add a facet dimension value. Repeat to make the field multi-valued.
    pub fn add_facet(mut self, name: &str, value: &str) -> Self {
        self.doc.add_field(name, FieldValue::FacetValue(value.to_string()));
        self
    }

    /// Finish building.
    pub fn build(self) -> Document {
        self.doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_valued_fields() {
        let doc = Document::builder()
            .add_facet("city", "Bangalore")
            .add_facet("city", "Metz")
            .build();

        assert_eq!(doc.field_values("city").len(), 2);
    }

    #[test]
    fn test_stored_text_retrieval() {
        let doc = Document::builder()
            .add_text("body", "hello world")
            .add_unstored_text("hidden", "secret")
            .build();

        assert_eq!(doc.get_stored("body"), Some("hello world"));
        assert_eq!(doc.get_stored("hidden"), None);
    }

    #[test]
    fn test_absent_field_is_empty() {
        let doc = Document::new();
        assert!(doc.field_values("missing").is_empty());
        assert!(!doc.has_field("missing"));
    }

    #[test]
    fn test_serde_round_trip() {
        let doc = Document::builder()
            .add_text("body", "hello")
            .add_numeric_value("rank", 4.5)
            .build();

        let bytes = bincode::serialize(&doc).unwrap();
        let restored: Document = bincode::deserialize(&bytes).unwrap();
        assert_eq!(doc, restored);
    }
}
