use std::collections::BTreeSet;

/// Character names seen while classifying, used for name completion.
///
/// Owned by a single editing session; nothing here is global.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterNames {
    names: BTreeSet<String>,
}

impl CharacterNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.record(name.as_ref());
        }
        registry
    }

    /// Returns true if the name was not known yet.
    pub fn record(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.names.insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name.trim())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Known names starting with `prefix`, ignoring case, sorted.
    /// A name identical to the prefix is not suggested.
    pub fn suggest(&self, prefix: &str) -> Vec<&str> {
        let prefix = prefix.trim().to_uppercase();
        if prefix.is_empty() {
            return Vec::new();
        }
        self.names
            .iter()
            .filter(|name| {
                let upper = name.to_uppercase();
                upper.starts_with(&prefix) && upper != prefix
            })
            .map(String::as_str)
            .collect()
    }
}
