use serde::de::Error as SerdeError;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::convert::Infallible;
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MappingError(String);

impl Display for MappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl StdError for MappingError {}

/// The header row of a sheet, remembering the column index of each header.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Mapping {
    headers: Vec<Header>,
    header_map: HashMap<Header, usize>,
}

impl Mapping {
    /// Create a new `Mapping` from a list of header strings. Surrounding whitespace is removed from
    /// each header. Empty headers are allowed, but apart from them every header must be unique.
    pub fn new<S, I>(headers: I) -> Result<Self, MappingError>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let headers: Vec<Header> = headers
            .into_iter()
            .map(|s| Header::from(s.into().trim()))
            .collect();

        let mut header_map: HashMap<Header, usize> = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            if header_map.insert(header.clone(), idx).is_some() {
                return Err(MappingError(format!(
                    "Encountered a duplicate header '{}'",
                    header.as_ref()
                )));
            }
        }

        Ok(Self {
            headers,
            header_map,
        })
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn header_index(&self, header: impl Into<Header>) -> Option<usize> {
        let h = header.into();
        self.header_map.get(&h).cloned()
    }
}

impl Serialize for Mapping {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.headers.len()))?;
        for header in &self.headers {
            seq.serialize_element(header.as_ref())?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Mapping {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items: Vec<String> = Vec::deserialize(deserializer)?;
        let mapping = Mapping::new(items).map_err(D::Error::custom)?;
        Ok(mapping)
    }
}

/// Represents a header in a sheet, for example, `UnitValue`
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Header(String);

impl Header {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for Header {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl<S: Into<String>> From<S> for Header {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl FromStr for Header {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_indexes() {
        let mapping = Mapping::new(["Date", " Item ", "Quantity"]).unwrap();
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.header_index("Item"), Some(1));
        assert_eq!(mapping.header_index("Customer"), None);
        assert_eq!(mapping.headers()[1].as_ref(), "Item");
    }

    #[test]
    fn test_mapping_duplicate() {
        let err = Mapping::new(["Item", "Item"]).unwrap_err();
        assert!(err.to_string().contains("duplicate header 'Item'"));
    }

    #[test]
    fn test_mapping_allows_blank_headers() {
        let mapping = Mapping::new(["", "Item", ""]).unwrap();
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.header_index("Item"), Some(1));
    }

    #[test]
    fn test_mapping_serde() {
        let mapping = Mapping::new(["Activity", "Element"]).unwrap();
        let json = serde_json::to_string(&mapping).unwrap();
        assert_eq!(json, r#"["Activity","Element"]"#);
        let back: Mapping = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mapping);
    }
}
