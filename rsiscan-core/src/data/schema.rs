use crate::domain::record::FIELD_COUNT;

/// Column names a raw export must carry, in the order the defaults list them.
pub const REQUIRED_COLUMNS: [&str; FIELD_COUNT] = ["DATE", "OPEN", "HIGH", "LOW", "CLOSE", "VOLUME"];

/// Field values that mark a missing observation.
pub const PLACEHOLDERS: [&str; 2] = ["NA", "-"];

/// Required-column set plus placeholder values, fixed for the whole run.
///
/// Built once from configuration and handed to the Cleaner; never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    required: Vec<String>,
    placeholders: Vec<String>,
}

impl ColumnSchema {
    /// Build a schema from explicit column names and placeholder values.
    pub fn new<C, P>(required: C, placeholders: P) -> Result<Self, SchemaError>
    where
        C: IntoIterator,
        C::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        let required: Vec<String> = required.into_iter().map(Into::into).collect();
        let placeholders: Vec<String> = placeholders.into_iter().map(Into::into).collect();

        if required.len() != FIELD_COUNT {
            return Err(SchemaError::WrongWidth {
                found: required.len(),
            });
        }
        for (i, name) in required.iter().enumerate() {
            if name.is_empty() {
                return Err(SchemaError::EmptyName { position: i });
            }
            if required[..i].contains(name) {
                return Err(SchemaError::DuplicateColumn(name.clone()));
            }
        }

        Ok(Self {
            required,
            placeholders,
        })
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|c| c == name)
    }

    pub fn is_placeholder(&self, value: &str) -> bool {
        self.placeholders.iter().any(|p| p == value)
    }

    /// Positions of required columns in `header`, left to right.
    ///
    /// Input order is preserved; a duplicated header name matches twice.
    pub fn project<'a, I>(&self, header: I) -> Vec<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        header
            .into_iter()
            .enumerate()
            .filter(|(_, name)| self.is_required(name))
            .map(|(i, _)| i)
            .collect()
    }

    /// Required columns absent from `header`.
    pub fn missing<'a, I>(&self, header: I) -> Vec<&str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: Vec<&str> = header.into_iter().collect();
        self.required
            .iter()
            .map(String::as_str)
            .filter(|c| !present.contains(c))
            .collect()
    }
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            required: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            placeholders: PLACEHOLDERS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("expected {} required columns, got {found}", FIELD_COUNT)]
    WrongWidth { found: usize },

    #[error("required column {position} has an empty name")]
    EmptyName { position: usize },

    #[error("required column listed twice: {0}")]
    DuplicateColumn(String),
}
