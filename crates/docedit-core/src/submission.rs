//! Edit-form submission payload

use serde::Serialize;
use tracing::info;

use crate::error::ValidationError;
use crate::fields::FormFields;
use crate::selection::SelectionSet;

/// Submit button label while the post is in flight
pub const SUBMIT_BUSY_LABEL: &str = "Updating...";

/// Hidden inputs the server reads the joined values from
pub const HIDDEN_PUBLISH_MONTH: &str = "publishMonthField";
pub const HIDDEN_PUBLISH_YEAR: &str = "publishYearField";
pub const HIDDEN_TAG_NAMES: &str = "tagNamesField";
pub const HIDDEN_CLASSIFICATION_NAMES: &str = "classificationNamesField";

/// What the edit endpoint receives
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpdate {
    pub title: String,
    pub product_code: String,
    pub edition: String,
    pub publish_month: String,
    pub publish_year: String,
    pub no_of_pages: String,
    pub notes: String,
    pub tag_names: String,
    pub classification_names: String,
    /// Name of the replacement file posted alongside, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl DocumentUpdate {
    /// Validate required fields in form order and assemble the payload
    pub fn build(
        fields: &FormFields,
        tags: &SelectionSet,
        classifications: &SelectionSet,
        file_name: Option<&str>,
    ) -> Result<Self, ValidationError> {
        if let Some(missing) = fields.first_missing_required() {
            return Err(ValidationError::MissingRequired(missing));
        }
        Ok(Self {
            title: fields.title.clone(),
            product_code: fields.product_code.clone(),
            edition: fields.edition.clone(),
            publish_month: fields.publish_month.clone(),
            publish_year: fields.publish_year.clone(),
            no_of_pages: fields.no_of_pages.clone(),
            notes: fields.notes.clone(),
            tag_names: tags.joined(),
            classification_names: classifications.joined(),
            file_name: file_name.map(str::to_string),
        })
    }

    /// Text parts of the multipart body, by form field name
    pub fn form_entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("title", self.title.as_str()),
            ("productCode", self.product_code.as_str()),
            ("edition", self.edition.as_str()),
            ("publishMonth", self.publish_month.as_str()),
            ("publishYear", self.publish_year.as_str()),
            ("noOfPages", self.no_of_pages.as_str()),
            ("notes", self.notes.as_str()),
            ("tagNames", self.tag_names.as_str()),
            ("classificationNames", self.classification_names.as_str()),
        ]
    }
}

/// Hidden input a form field's value is mirrored into before posting
pub fn hidden_field_id(name: &str) -> Option<&'static str> {
    match name {
        "publishMonth" => Some(HIDDEN_PUBLISH_MONTH),
        "publishYear" => Some(HIDDEN_PUBLISH_YEAR),
        "tagNames" => Some(HIDDEN_TAG_NAMES),
        "classificationNames" => Some(HIDDEN_CLASSIFICATION_NAMES),
        _ => None,
    }
}

/// A validated submission and where it goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPlan {
    pub action: String,
    pub update: DocumentUpdate,
}

impl SubmissionPlan {
    pub fn new(action: String, update: DocumentUpdate) -> Self {
        info!(%action, replaces_file = update.file_name.is_some(), "submitting document update");
        Self { action, update }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldId;
    use pretty_assertions::assert_eq;

    fn fields() -> FormFields {
        FormFields {
            title: "Manual".into(),
            product_code: "M-1".into(),
            publish_month: "04".into(),
            publish_year: "2023".into(),
            no_of_pages: "12".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_joins_selections() {
        let tags: SelectionSet = ["draft", "hr"].into_iter().collect();
        let classes: SelectionSet = ["Internal"].into_iter().collect();
        let update = DocumentUpdate::build(&fields(), &tags, &classes, Some("new.pdf")).unwrap();
        assert_eq!(update.tag_names, "draft,hr");
        assert_eq!(update.classification_names, "Internal");
        assert_eq!(update.file_name.as_deref(), Some("new.pdf"));
        let hidden: Vec<_> = update
            .form_entries()
            .into_iter()
            .filter_map(|(name, value)| hidden_field_id(name).map(|id| (id, value)))
            .collect();
        assert_eq!(
            hidden,
            vec![
                ("publishMonthField", "04"),
                ("publishYearField", "2023"),
                ("tagNamesField", "draft,hr"),
                ("classificationNamesField", "Internal"),
            ]
        );
    }

    #[test]
    fn test_build_reports_first_missing_in_form_order() {
        let mut f = fields();
        f.title.clear();
        f.no_of_pages.clear();
        let err = DocumentUpdate::build(&f, &SelectionSet::new(), &SelectionSet::new(), None)
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingRequired(FieldId::Title));
        assert_eq!(err.to_string(), "Document Title is required.");
    }

    #[test]
    fn test_form_entries_cover_every_text_part() {
        let update =
            DocumentUpdate::build(&fields(), &SelectionSet::new(), &SelectionSet::new(), None)
                .unwrap();
        let names: Vec<_> = update.form_entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            names,
            vec![
                "title",
                "productCode",
                "edition",
                "publishMonth",
                "publishYear",
                "noOfPages",
                "notes",
                "tagNames",
                "classificationNames"
            ]
        );
    }
}
