use crate::error::{EnrichError, Result};

/// A query with a `{<column>}` placeholder, e.g. `"Get the email of {Company}"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    template: String,
    column: String,
}

impl QueryTemplate {
    pub fn new(template: impl Into<String>, column: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if template.trim().is_empty() {
            return Err(EnrichError::EmptyTemplate);
        }
        Ok(QueryTemplate { template, column: column.into() })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn placeholder(&self) -> String {
        format!("{{{}}}", self.column)
    }

    /// Whether rendering will change the template at all.
    pub fn has_placeholder(&self) -> bool {
        self.template.contains(&self.placeholder())
    }

    /// Replaces every occurrence of the placeholder with `entity`.
    pub fn render(&self, entity: &str) -> String {
        self.template.replace(&self.placeholder(), entity)
    }
}
