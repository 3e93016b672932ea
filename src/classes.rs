use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Ordered class-index → label table matching the classifier's output layout.
///
/// On disk this is a JSON object keyed by stringified indices:
/// `{"0": "Apple___Apple_scab", "1": "Apple___healthy", ...}`.
/// Indices must be exactly `0..N-1`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMapping {
    labels: Vec<String>,
}

impl ClassMapping {
    pub fn from_labels<I, S>(labels: I) -> ClassMapping
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ClassMapping { labels: labels.into_iter().map(Into::into).collect() }
    }

    /// Builds a mapping from string keys, enforcing the contiguous-index
    /// invariant.
    pub fn from_index_map(raw: BTreeMap<String, String>) -> Result<ClassMapping> {
        if raw.is_empty() {
            return Err(Error::InvalidClasses("mapping is empty".into()));
        }
        let n = raw.len();
        let mut slots: Vec<Option<String>> = vec![None; n];
        for (key, label) in raw {
            let index: usize = key
                .trim()
                .parse()
                .map_err(|_| Error::InvalidClasses(format!("key '{}' is not a class index", key)))?;
            let slot = slots
                .get_mut(index)
                .ok_or_else(|| Error::InvalidClasses(format!("index {} is outside 0..{}", index, n)))?;
            if slot.is_some() {
                return Err(Error::InvalidClasses(format!("index {} appears twice", index)));
            }
            *slot = Some(label);
        }
        // Every slot is filled: N distinct keys, each in 0..N.
        Ok(ClassMapping { labels: slots.into_iter().flatten().collect() })
    }

    pub fn load_json(path: &Path) -> Result<ClassMapping> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let raw: BTreeMap<String, String> = serde_json::from_reader(reader)?;
        ClassMapping::from_index_map(raw)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let raw: BTreeMap<String, &str> = self
            .labels
            .iter()
            .enumerate()
            .map(|(i, l)| (i.to_string(), l.as_str()))
            .collect();
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &raw)?;
        Ok(())
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Label for `index`, or a synthetic `"Class {index}"` when the mapping is
    /// shorter than the classifier output.
    pub fn label_or_placeholder(&self, index: usize) -> String {
        match self.label(index) {
            Some(l) => l.to_owned(),
            None    => format!("Class {}", index),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn orders_by_numeric_index_not_key_text() {
        let labels: Vec<String> = (0..12).map(|i| format!("L{}", i)).collect();
        let map = labels.iter().enumerate().map(|(i, l)| (i.to_string(), l.clone())).collect();
        let mapping = ClassMapping::from_index_map(map).unwrap();
        assert_eq!(mapping.labels(), &labels[..]);
        assert_eq!(mapping.label(10), Some("L10"));
    }

    #[test]
    fn gaps_and_bad_keys_are_rejected() {
        assert!(ClassMapping::from_index_map(raw(&[("0", "a"), ("2", "b")])).is_err());
        assert!(ClassMapping::from_index_map(raw(&[("0", "a"), ("one", "b")])).is_err());
        assert!(ClassMapping::from_index_map(raw(&[("0", "a"), ("00", "b")])).is_err());
        assert!(ClassMapping::from_index_map(BTreeMap::new()).is_err());
    }

    #[test]
    fn out_of_range_index_names_the_valid_range() {
        let err = ClassMapping::from_index_map(raw(&[("0", "a"), ("1", "b"), ("5", "c")])).unwrap_err();
        assert!(err.to_string().contains("index 5 is outside 0..3"), "{}", err);
    }

    #[test]
    fn placeholder_for_missing_index() {
        let mapping = ClassMapping::from_labels(["Tomato___healthy"]);
        assert_eq!(mapping.label_or_placeholder(0), "Tomato___healthy");
        assert_eq!(mapping.label_or_placeholder(3), "Class 3");
    }

    #[test]
    fn json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes.json");
        let mapping = ClassMapping::from_labels(["Corn___Common_rust", "Corn___healthy"]);
        mapping.save_json(&path).unwrap();
        assert_eq!(ClassMapping::load_json(&path).unwrap(), mapping);
    }
}
