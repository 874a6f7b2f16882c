//! Bundled example documents: one starter per template plus gallery-only examples by role.
//!
//! The catalog is compiled into the binary and validated once at startup.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::builder::model::{ModelError, ResumeDocument, ResumeState, StyleConfig, TemplateId};

const BUNDLED_CATALOG: &str = include_str!("../../data/catalog.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no example document for template {0}")]
    MissingTemplate(u8),

    #[error("template {0} has more than one example document")]
    DuplicateTemplate(u8),

    #[error("domain '{0}' appears more than once")]
    DuplicateDomain(String),

    #[error("example '{domain}' is invalid: {source}")]
    InvalidDocument {
        domain: String,
        #[source]
        source: ModelError,
    },
}

/// A named example document. `template` is set for the four template starters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Example {
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateId>,
    pub document: ResumeDocument,
}

#[derive(Deserialize)]
struct CatalogFile {
    blank: ResumeDocument,
    examples: Vec<Example>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    blank: ResumeDocument,
    examples: Vec<Example>,
}

impl Catalog {
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;

        let mut domains = HashSet::new();
        for example in &file.examples {
            if !domains.insert(example.domain.to_lowercase()) {
                return Err(CatalogError::DuplicateDomain(example.domain.clone()));
            }
            example
                .document
                .validate()
                .map_err(|source| CatalogError::InvalidDocument {
                    domain: example.domain.clone(),
                    source,
                })?;
        }

        for template in TemplateId::ALL {
            let count = file
                .examples
                .iter()
                .filter(|e| e.template == Some(template))
                .count();
            match count {
                0 => return Err(CatalogError::MissingTemplate(template.number())),
                1 => {}
                _ => return Err(CatalogError::DuplicateTemplate(template.number())),
            }
        }

        Ok(Self {
            blank: file.blank,
            examples: file.examples,
        })
    }

    /// The empty starter document.
    pub fn blank(&self) -> &ResumeDocument {
        &self.blank
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn template_example(&self, template: TemplateId) -> Option<&ResumeDocument> {
        self.examples
            .iter()
            .find(|e| e.template == Some(template))
            .map(|e| &e.document)
    }

    /// Case-insensitive lookup by domain name (e.g. "Data Scientist").
    pub fn by_domain(&self, domain: &str) -> Option<&Example> {
        let wanted = domain.trim();
        self.examples
            .iter()
            .find(|e| e.domain.eq_ignore_ascii_case(wanted))
    }

    /// Template an example is shown with. Gallery-only examples use the classic layout.
    pub fn template_for(&self, example: &Example) -> TemplateId {
        example.template.unwrap_or(TemplateId::Classic)
    }

    /// Starting state for a new session: the template-1 starter with the user's email.
    pub fn default_state(&self, email: Option<&str>) -> ResumeState {
        let style = StyleConfig::default();
        let mut data = self
            .template_example(style.template_id)
            .unwrap_or(&self.blank)
            .clone();
        if let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) {
            data.personal.email = email.to_string();
        }
        ResumeState { data, style }
    }

    /// State for starting from a gallery example, keeping the rest of `style`.
    pub fn seed_from(&self, example: &Example, style: StyleConfig) -> ResumeState {
        ResumeState {
            data: example.document.clone(),
            style: StyleConfig {
                template_id: self.template_for(example),
                ..style
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog_loads() {
        let catalog = Catalog::bundled().expect("bundled catalog must be valid");
        assert_eq!(catalog.examples().len(), 7);
        for template in TemplateId::ALL {
            assert!(catalog.template_example(template).is_some());
        }
    }

    #[test]
    fn test_template_examples_match_their_roles() {
        let catalog = Catalog::bundled().unwrap();
        let pm = catalog.template_example(TemplateId::Sidebar).unwrap();
        assert_eq!(pm.personal.full_name, "Alexandra Chen");
        let swe = catalog.template_example(TemplateId::Classic).unwrap();
        assert_eq!(swe.personal.full_name, "Benjamin Carter");
        assert!(swe.personal.profile_photo.is_none());
    }

    #[test]
    fn test_by_domain_is_case_insensitive() {
        let catalog = Catalog::bundled().unwrap();
        let example = catalog.by_domain("devops engineer").unwrap();
        assert_eq!(example.document.personal.full_name, "Eva Martinez");
        assert_eq!(catalog.template_for(example), TemplateId::Classic);
        assert!(catalog.by_domain("Astronaut").is_none());
    }

    #[test]
    fn test_default_state_uses_user_email() {
        let catalog = Catalog::bundled().unwrap();
        let state = catalog.default_state(Some("jane@example.com"));
        assert_eq!(state.style, StyleConfig::default());
        assert_eq!(state.data.personal.email, "jane@example.com");
        assert_eq!(state.data.personal.full_name, "Alexandra Chen");

        let anonymous = catalog.default_state(None);
        assert_eq!(anonymous.data.personal.email, "alex.chen@example.com");
    }

    #[test]
    fn test_seed_from_keeps_color_and_font() {
        let catalog = Catalog::bundled().unwrap();
        let example = catalog.by_domain("UX/UI Designer").unwrap();
        let style = StyleConfig {
            color: crate::builder::model::ColorToken::Red,
            ..StyleConfig::default()
        };
        let state = catalog.seed_from(example, style);
        assert_eq!(state.style.template_id, TemplateId::Creative);
        assert_eq!(state.style.color, crate::builder::model::ColorToken::Red);
        assert_eq!(state.data, example.document);
    }

    #[test]
    fn test_missing_template_is_rejected() {
        let json = r#"{"blank": {}, "examples": [
            {"domain": "A", "template": 1, "document": {}},
            {"domain": "B", "template": 2, "document": {}},
            {"domain": "C", "template": 3, "document": {}}
        ]}"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::MissingTemplate(4))
        ));
    }

    #[test]
    fn test_duplicate_domain_is_rejected() {
        let json = r#"{"blank": {}, "examples": [
            {"domain": "A", "template": 1, "document": {}},
            {"domain": "a", "template": 2, "document": {}}
        ]}"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::DuplicateDomain(_))
        ));
    }
}
