//! Query handlers for the Template Catalog context.
//!
//! The catalog is immutable, so these read straight from it and return
//! read-only view DTOs.

use serde::Serialize;
use storyforge_core::error::DomainError;

use crate::domain::catalog::TemplateCatalog;
use crate::domain::prompts;
use crate::domain::templates::{Template, TemplateExamples, TemplateId, TemplatePatch};

const THEME_PREVIEW_LEN: usize = 3;

/// One card of the template picker.
#[derive(Debug, Serialize)]
pub struct TemplateSummaryView {
    pub id: TemplateId,
    pub label: String,
    pub emoji: String,
    pub description: String,
    /// First few themes of the template.
    pub themes: Vec<String>,
}

/// The template picker.
#[derive(Debug, Serialize)]
pub struct TemplateListView {
    /// Changes whenever the catalog content changes.
    pub catalog_hash: String,
    pub templates: Vec<TemplateSummaryView>,
}

/// Full read-only view of one template.
#[derive(Debug, Serialize)]
pub struct TemplateDetailView {
    pub id: TemplateId,
    pub label: String,
    pub emoji: String,
    pub description: String,
    pub patch: TemplatePatch,
    pub examples: TemplateExamples,
    pub prompts: Vec<String>,
}

impl From<&Template> for TemplateSummaryView {
    fn from(template: &Template) -> Self {
        let themes = template
            .patch
            .themes
            .iter()
            .flatten()
            .take(THEME_PREVIEW_LEN)
            .cloned()
            .collect();
        Self {
            id: template.id,
            label: template.label.clone(),
            emoji: template.emoji.clone(),
            description: template.description.clone(),
            themes,
        }
    }
}

/// Lists every template in picker order.
#[must_use]
pub fn list_templates(catalog: &TemplateCatalog) -> TemplateListView {
    TemplateListView {
        catalog_hash: catalog.version_hash().to_owned(),
        templates: catalog
            .templates()
            .iter()
            .map(TemplateSummaryView::from)
            .collect(),
    }
}

/// Retrieves one template by its wire id.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the id is not in the catalog.
pub fn get_template(catalog: &TemplateCatalog, id: &str) -> Result<TemplateDetailView, DomainError> {
    let template = catalog
        .find(id)
        .ok_or_else(|| DomainError::NotFound(format!("template {id}")))?;
    Ok(TemplateDetailView {
        id: template.id,
        label: template.label.clone(),
        emoji: template.emoji.clone(),
        description: template.description.clone(),
        patch: template.patch.clone(),
        examples: template.examples.clone(),
        prompts: prompts::genre_prompts(Some(template)),
    })
}
