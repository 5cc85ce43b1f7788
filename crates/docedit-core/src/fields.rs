//! Editable document metadata fields

use serde::{Deserialize, Serialize};

/// A tracked metadata input on the edit form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldId {
    Title,
    ProductCode,
    Edition,
    PublishMonth,
    PublishYear,
    NoOfPages,
    Notes,
}

impl FieldId {
    pub const ALL: [FieldId; 7] = [
        FieldId::Title,
        FieldId::ProductCode,
        FieldId::Edition,
        FieldId::PublishMonth,
        FieldId::PublishYear,
        FieldId::NoOfPages,
        FieldId::Notes,
    ];

    /// Fields that must be non-blank to leave the metadata step or submit,
    /// in the order they are checked
    pub const REQUIRED: [FieldId; 4] = [
        FieldId::Title,
        FieldId::ProductCode,
        FieldId::PublishYear,
        FieldId::NoOfPages,
    ];

    /// Name used for the input element and the form parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldId::Title => "title",
            FieldId::ProductCode => "productCode",
            FieldId::Edition => "edition",
            FieldId::PublishMonth => "publishMonth",
            FieldId::PublishYear => "publishYear",
            FieldId::NoOfPages => "noOfPages",
            FieldId::Notes => "notes",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldId::Title => "Document Title",
            FieldId::ProductCode => "Product Code",
            FieldId::Edition => "Edition",
            FieldId::PublishMonth => "Publication Month",
            FieldId::PublishYear => "Publication Year",
            FieldId::NoOfPages => "Number of Pages",
            FieldId::Notes => "Notes",
        }
    }

    pub fn required_message(&self) -> String {
        format!("{} is required.", self.label())
    }
}

/// Current values of every tracked input, exactly as the user typed them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormFields {
    pub title: String,
    pub product_code: String,
    pub edition: String,
    pub publish_month: String,
    pub publish_year: String,
    pub no_of_pages: String,
    pub notes: String,
}

impl FormFields {
    pub fn get(&self, field: FieldId) -> &str {
        match field {
            FieldId::Title => &self.title,
            FieldId::ProductCode => &self.product_code,
            FieldId::Edition => &self.edition,
            FieldId::PublishMonth => &self.publish_month,
            FieldId::PublishYear => &self.publish_year,
            FieldId::NoOfPages => &self.no_of_pages,
            FieldId::Notes => &self.notes,
        }
    }

    pub fn set(&mut self, field: FieldId, value: impl Into<String>) {
        let slot = match field {
            FieldId::Title => &mut self.title,
            FieldId::ProductCode => &mut self.product_code,
            FieldId::Edition => &mut self.edition,
            FieldId::PublishMonth => &mut self.publish_month,
            FieldId::PublishYear => &mut self.publish_year,
            FieldId::NoOfPages => &mut self.no_of_pages,
            FieldId::Notes => &mut self.notes,
        };
        *slot = value.into();
    }

    /// First required field that is blank after trimming
    pub fn first_missing_required(&self) -> Option<FieldId> {
        FieldId::REQUIRED
            .into_iter()
            .find(|field| self.get(*field).trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_names() {
        for field in FieldId::ALL {
            assert_eq!(FieldId::parse(field.as_str()), Some(field));
        }
        assert_eq!(FieldId::parse("fileName"), None);
    }

    #[test]
    fn test_serde_name_matches_as_str() {
        let json = serde_json::to_string(&FieldId::NoOfPages).unwrap();
        assert_eq!(json, "\"noOfPages\"");
    }

    #[test]
    fn test_first_missing_required_follows_check_order() {
        let mut fields = FormFields {
            title: "  ".into(),
            publish_year: String::new(),
            ..Default::default()
        };
        assert_eq!(fields.first_missing_required(), Some(FieldId::Title));

        fields.set(FieldId::Title, "Manual");
        fields.set(FieldId::ProductCode, "P-1");
        assert_eq!(fields.first_missing_required(), Some(FieldId::PublishYear));

        fields.set(FieldId::PublishYear, "2024");
        fields.set(FieldId::NoOfPages, "12");
        assert_eq!(fields.first_missing_required(), None);
    }

    #[test]
    fn test_optional_fields_are_never_required() {
        let fields = FormFields {
            title: "t".into(),
            product_code: "p".into(),
            publish_year: "2020".into(),
            no_of_pages: "3".into(),
            ..Default::default()
        };
        assert!(fields.edition.is_empty() && fields.notes.is_empty());
        assert_eq!(fields.first_missing_required(), None);
    }
}
