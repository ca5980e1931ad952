use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A single cell of a result row
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Date(NaiveDate),
    Text(String),
    Integer(i64),
    Float(f64),
    Null,
}

impl Scalar {
    /// Returns the value as a float if it is numeric
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Integer(value) => Some(*value as f64),
            Scalar::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value as a string slice if it is text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Date(date) => serializer.collect_str(&date.format("%Y-%m-%d")),
            Scalar::Text(text) => serializer.serialize_str(text),
            Scalar::Integer(value) => serializer.serialize_i64(*value),
            Scalar::Float(value) => serializer.serialize_f64(*value),
            Scalar::Null => serializer.serialize_none(),
        }
    }
}

/// A result row: column names mapped to cells, in projection order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Scalar)>,
}

impl Record {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, column: impl Into<String>, value: Scalar) {
        self.fields.push((column.into(), value));
    }

    pub fn get(&self, column: &str) -> Option<&Scalar> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Column names in projection order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_in_projection_order() {
        let mut record = Record::with_capacity(5);
        record.push("revenue", Scalar::Float(12.5));
        record.push("date", Scalar::Date(NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()));
        record.push("channel", Scalar::Text("adcolony".to_string()));
        record.push("installs", Scalar::Integer(7));
        record.push("CPI", Scalar::Null);

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"revenue":12.5,"date":"2023-01-02","channel":"adcolony","installs":7,"CPI":null}"#
        );
    }

    #[test]
    fn test_record_lookup() {
        let mut record = Record::default();
        assert!(record.is_empty());
        record.push("clicks", Scalar::Integer(3));

        assert_eq!(record.len(), 1);
        assert_eq!(record.get("clicks").and_then(Scalar::as_f64), Some(3.0));
        assert!(record.get("spend").is_none());
        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["clicks"]);
    }
}
