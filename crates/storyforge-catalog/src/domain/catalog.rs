//! The template catalog.
//!
//! The catalog ships inside the binary as YAML and is parsed once at
//! start-up. After loading it is never mutated.

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;

use super::templates::{Template, TemplateId};

const BUILTIN_CATALOG: &str = include_str!("../../templates/catalog.yaml");

/// Reasons a catalog source is refused.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The source is not valid catalog YAML.
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The same id appears twice.
    #[error("template {0} is defined more than once")]
    DuplicateTemplate(TemplateId),

    /// An id of the closed set has no entry.
    #[error("template {0} is missing from the catalog")]
    MissingTemplate(TemplateId),
}

/// The loaded, immutable set of templates.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
    version_hash: String,
}

impl TemplateCatalog {
    /// Loads the catalog compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the embedded source is malformed.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml(BUILTIN_CATALOG)
    }

    /// Parses a catalog from YAML source.
    ///
    /// Every [`TemplateId`] must appear exactly once.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed YAML or unknown fields,
    /// `DuplicateTemplate` / `MissingTemplate` when the id set is wrong.
    pub fn from_yaml(source: &str) -> Result<Self, CatalogError> {
        let templates: Vec<Template> = serde_yaml::from_str(source)?;

        for (position, template) in templates.iter().enumerate() {
            if templates[..position].iter().any(|t| t.id == template.id) {
                return Err(CatalogError::DuplicateTemplate(template.id));
            }
        }
        if let Some(missing) = TemplateId::ALL
            .into_iter()
            .find(|id| !templates.iter().any(|t| t.id == *id))
        {
            return Err(CatalogError::MissingTemplate(missing));
        }

        let version_hash = format!("{:x}", Sha256::digest(source.as_bytes()));
        info!(templates = templates.len(), %version_hash, "template catalog loaded");

        Ok(Self {
            templates,
            version_hash,
        })
    }

    /// Looks a template up by id.
    #[must_use]
    pub fn get_template_by_id(&self, id: TemplateId) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Looks a template up by its wire id. Unknown ids are `None`.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Template> {
        TemplateId::parse(id).and_then(|id| self.get_template_by_id(id))
    }

    /// All templates in catalog order.
    #[must_use]
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// SHA-256 of the catalog source, hex encoded.
    #[must_use]
    pub fn version_hash(&self) -> &str {
        &self.version_hash
    }
}

#[cfg(test)]
mod tests {
    use storyforge_story::domain::state::{ElementKind, StylePreset};

    use super::*;

    #[test]
    fn test_builtin_catalog_has_every_template_once() {
        let catalog = TemplateCatalog::builtin().unwrap();

        assert_eq!(catalog.templates().len(), TemplateId::ALL.len());
        for id in TemplateId::ALL {
            assert_eq!(catalog.get_template_by_id(id).unwrap().id, id);
        }
    }

    #[test]
    fn test_builtin_templates_offer_every_option_pool() {
        let catalog = TemplateCatalog::builtin().unwrap();

        for template in catalog.templates() {
            for kind in ElementKind::ALL {
                assert!(
                    !template.options(kind).is_empty(),
                    "{} has no {kind:?} options",
                    template.id
                );
            }
            assert_eq!(template.prompts.len(), 3, "{} prompts", template.id);
        }
    }

    #[test]
    fn test_fantasy_template_content() {
        let catalog = TemplateCatalog::builtin().unwrap();

        let fantasy = catalog.get_template_by_id(TemplateId::Fantasy).unwrap();

        assert_eq!(fantasy.label, "Fantasy");
        assert_eq!(fantasy.patch.style_preset, Some(StylePreset::Fantasy));
        assert_eq!(
            &fantasy.options(ElementKind::Characters)[..2],
            ["Ari, a reluctant mage".to_owned(), "Seren, a lanternbound spirit".to_owned()]
        );
    }

    #[test]
    fn test_find_parses_wire_ids() {
        let catalog = TemplateCatalog::builtin().unwrap();

        assert_eq!(catalog.find("sci-fi").unwrap().id, TemplateId::SciFi);
        assert!(catalog.find("cyberpunk").is_none());
    }

    #[test]
    fn test_version_hash_is_stable_hex_sha256() {
        let first = TemplateCatalog::builtin().unwrap();
        let second = TemplateCatalog::builtin().unwrap();

        assert_eq!(first.version_hash(), second.version_hash());
        assert_eq!(first.version_hash().len(), 64);
        assert!(first.version_hash().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_from_yaml_rejects_duplicate_ids() {
        let source = format!("{BUILTIN_CATALOG}\n{}", fantasy_entry());

        let result = TemplateCatalog::from_yaml(&source);

        assert!(matches!(
            result,
            Err(CatalogError::DuplicateTemplate(TemplateId::Fantasy))
        ));
    }

    #[test]
    fn test_from_yaml_rejects_missing_ids() {
        let result = TemplateCatalog::from_yaml(&fantasy_entry());

        assert!(matches!(
            result,
            Err(CatalogError::MissingTemplate(TemplateId::Whimsical))
        ));
    }

    #[test]
    fn test_from_yaml_rejects_unknown_template_ids() {
        let source = "- id: horror\n  label: Horror\n  emoji: x\n  description: d\n  patch: {}\n";

        assert!(matches!(
            TemplateCatalog::from_yaml(source),
            Err(CatalogError::Parse(_))
        ));
    }

    fn fantasy_entry() -> String {
        "- id: fantasy\n  label: Fantasy\n  emoji: x\n  description: d\n  patch:\n    stylePreset: fantasy\n"
            .to_owned()
    }
}
