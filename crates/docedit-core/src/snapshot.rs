//! Load-time baseline and dirty-state check

use serde::Serialize;
use tracing::debug;

use crate::fields::FormFields;

/// Values captured once when the page finished initializing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    pub fields: FormFields,
    pub tags: Vec<String>,
    pub classifications: Vec<String>,
    pub file_name: String,
}

impl FormSnapshot {
    pub fn capture(
        fields: &FormFields,
        tags: &[String],
        classifications: &[String],
        file_name: &str,
    ) -> Self {
        let snapshot = Self {
            fields: fields.clone(),
            tags: tags.to_vec(),
            classifications: classifications.to_vec(),
            file_name: file_name.to_string(),
        };
        debug!(?snapshot, "captured form snapshot");
        snapshot
    }

    /// Whether the current state deviates from the baseline. Selections are
    /// compared in order.
    pub fn differs(
        &self,
        fields: &FormFields,
        tags: &[String],
        classifications: &[String],
        file_replaced: bool,
    ) -> bool {
        file_replaced
            || self.fields != *fields
            || self.tags != tags
            || self.classifications != classifications
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldId;

    fn baseline() -> FormSnapshot {
        let fields = FormFields {
            title: "A".into(),
            no_of_pages: "10".into(),
            ..Default::default()
        };
        FormSnapshot::capture(&fields, &["x".into()], &[], "a.pdf")
    }

    #[test]
    fn test_identical_state_is_clean() {
        let snap = baseline();
        assert!(!snap.differs(&snap.fields, &snap.tags, &snap.classifications, false));
    }

    #[test]
    fn test_each_field_edit_is_dirty() {
        let snap = baseline();
        for field in FieldId::ALL {
            let mut fields = snap.fields.clone();
            fields.set(field, format!("{}-edited", fields.get(field)));
            assert!(snap.differs(&fields, &snap.tags, &[], false), "{:?}", field);
        }
    }

    #[test]
    fn test_selection_order_matters() {
        let fields = FormFields::default();
        let snap = FormSnapshot::capture(&fields, &["a".into(), "b".into()], &[], "");
        assert!(snap.differs(&fields, &["b".into(), "a".into()], &[], false));
    }

    #[test]
    fn test_file_replacement_is_dirty() {
        let snap = baseline();
        assert!(snap.differs(&snap.fields, &snap.tags, &[], true));
    }
}
