/// Well-known ADIF field names used by the pipeline.
pub mod field {
    pub const CALL: &str = "CALL";
    pub const GRIDSQUARE: &str = "GRIDSQUARE";
}

/// One ADIF record: ordered fields keyed by upper-case name, plus the
/// verbatim line it was read from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdifRecord {
    fields: Vec<(String, String)>,
    raw: String,
}

impl AdifRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_raw(raw: &str) -> Self {
        Self {
            fields: Vec::new(),
            raw: raw.to_string(),
        }
    }

    /// The text this record was parsed from. Empty for records built in code.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Look up a field by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a field, keeping its original position when it already exists.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_ascii_uppercase();
        let value = value.into();

        match self.fields.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Fields in record order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn call(&self) -> Option<&str> {
        self.get(field::CALL)
    }

    pub fn gridsquare(&self) -> Option<&str> {
        self.get(field::GRIDSQUARE)
    }
}
