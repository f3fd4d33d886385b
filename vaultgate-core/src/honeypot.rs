//! Honeypot field detection for automated-submission filtering.
//!
//! The form decoys are fields a human never sees (hidden by the SPA's CSS)
//! but that naive bots fill in. A request whose body carries a non-empty
//! value in any decoy field is treated as automated. The HTTP layer must
//! answer such requests with a successful-looking 200 so the bot learns
//! nothing about the detection.

use serde_json::Value;

/// Decoy field names checked on mutating requests.
const DEFAULT_FIELDS: &[&str] = &[
    "website",
    "url",
    "homepage",
    "company",
    "company_name",
    "organization",
    "fax",
    "fax_number",
    "phone2",
    "telephone",
    "address2",
    "address_line_3",
    "zip2",
    "country_code2",
    "email2",
    "email_confirm",
    "confirm_email",
    "username2",
    "nickname",
    "middle_name_confirm",
    "comment",
    "comments",
    "message2",
    "subject2",
    "extra_field",
    "honeypot",
    "hp_field",
    "bot_check",
];

/// Detector over a fixed set of decoy field names.
pub struct HoneypotDetector {
    fields: Vec<String>,
}

impl Default for HoneypotDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl HoneypotDetector {
    /// Detector with the standard decoy field set.
    pub fn new() -> Self {
        Self {
            fields: DEFAULT_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Detector with a custom decoy field set.
    pub fn with_fields(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn field_names(&self) -> &[String] {
        &self.fields
    }

    /// True iff any decoy field is present in the body with a non-empty
    /// trimmed value. Empty strings and nulls do not trigger: legitimate
    /// browsers submit hidden fields blank.
    pub fn triggered(&self, body: &Value) -> bool {
        let Some(object) = body.as_object() else {
            return false;
        };

        self.fields.iter().any(|field| {
            object.get(field).is_some_and(|value| match value {
                Value::Null => false,
                Value::String(s) => !s.trim().is_empty(),
                _ => true,
            })
        })
    }
}
