//! Mapping of SSO group attributes to a `Group`.
//!
//! Attribute extraction from the identity provider's assertion happens
//! upstream; this module only consumes the resulting name/value pairs.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::datetime;

/// Read access to attributes extracted from an SSO assertion.
pub trait AttributeSource {
    fn attribute(&self, name: &str) -> Option<&str>;
}

impl AttributeSource for HashMap<String, String> {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl AttributeSource for BTreeMap<String, String> {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// Customer group (organization) the signed-in user belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub uid: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub has_credit_card: bool,
    /// Unix epoch when the assertion carries no parseable date.
    #[serde(with = "crate::datetime")]
    pub free_trial_end_at: DateTime<Utc>,
    pub company_name: Option<String>,
    pub currency: Option<String>,
    /// Olson time zone name, e.g. `Australia/Sydney`.
    pub timezone: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
}

impl Group {
    pub fn from_attributes(att: &impl AttributeSource) -> Self {
        let text = |name: &str| att.attribute(name).map(str::to_string);

        Self {
            uid: text("group_uid"),
            name: text("group_name"),
            email: text("group_email"),
            has_credit_card: att.attribute("group_has_credit_card") == Some("true"),
            free_trial_end_at: free_trial_end(att.attribute("group_end_free_trial")),
            company_name: text("company_name"),
            currency: text("group_currency"),
            timezone: text("group_timezone"),
            country: text("group_country"),
            city: text("group_city"),
        }
    }

    /// Provider-neutral description of the group.
    pub fn to_hash(&self) -> Value {
        json!({
            "provider": "maestrano",
            "uid": self.uid,
            "info": {
                "free_trial_end_at": datetime::format(&self.free_trial_end_at),
                "company_name": self.company_name,
                "country": self.country,
            },
            "extra": null,
        })
    }
}

// Unparseable dates put the trial in the past.
fn free_trial_end(raw: Option<&str>) -> DateTime<Utc> {
    match raw.and_then(datetime::parse) {
        Some(date) => date,
        None => {
            warn!(value = raw.unwrap_or_default(), "invalid group_end_free_trial, using epoch");
            DateTime::<Utc>::UNIX_EPOCH
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn attributes() -> HashMap<String, String> {
        [
            ("group_uid", "cld-1"),
            ("group_name", "Acme Group"),
            ("group_email", "ops@acme.test"),
            ("group_has_credit_card", "true"),
            ("group_end_free_trial", "2014-05-21T00:32:35+0000"),
            ("company_name", "Acme"),
            ("group_currency", "AUD"),
            ("group_timezone", "Australia/Sydney"),
            ("group_country", "AU"),
            ("group_city", "Sydney"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn maps_every_attribute() {
        let group = Group::from_attributes(&attributes());
        assert_eq!(group.uid.as_deref(), Some("cld-1"));
        assert_eq!(group.name.as_deref(), Some("Acme Group"));
        assert_eq!(group.email.as_deref(), Some("ops@acme.test"));
        assert!(group.has_credit_card);
        assert_eq!(
            group.free_trial_end_at,
            Utc.with_ymd_and_hms(2014, 5, 21, 0, 32, 35).unwrap()
        );
        assert_eq!(group.company_name.as_deref(), Some("Acme"));
        assert_eq!(group.currency.as_deref(), Some("AUD"));
        assert_eq!(group.timezone.as_deref(), Some("Australia/Sydney"));
        assert_eq!(group.country.as_deref(), Some("AU"));
        assert_eq!(group.city.as_deref(), Some("Sydney"));
    }

    #[test]
    fn credit_card_flag_requires_exact_true() {
        let mut att = attributes();
        att.insert("group_has_credit_card".to_string(), "TRUE".to_string());
        assert!(!Group::from_attributes(&att).has_credit_card);
        att.remove("group_has_credit_card");
        assert!(!Group::from_attributes(&att).has_credit_card);
    }

    #[test]
    fn bad_free_trial_date_defaults_to_epoch() {
        let mut att = attributes();
        att.insert("group_end_free_trial".to_string(), "not a date".to_string());
        assert_eq!(Group::from_attributes(&att).free_trial_end_at, DateTime::<Utc>::UNIX_EPOCH);

        att.remove("group_end_free_trial");
        assert_eq!(Group::from_attributes(&att).free_trial_end_at, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn to_hash_shape() {
        let hash = Group::from_attributes(&attributes()).to_hash();
        assert_eq!(
            hash,
            json!({
                "provider": "maestrano",
                "uid": "cld-1",
                "info": {
                    "free_trial_end_at": "2014-05-21T00:32:35Z",
                    "company_name": "Acme",
                    "country": "AU",
                },
                "extra": null,
            })
        );
    }

    #[test]
    fn missing_attributes_are_null_in_hash() {
        let group = Group::from_attributes(&BTreeMap::<String, String>::new());
        let hash = group.to_hash();
        assert!(hash["uid"].is_null());
        assert_eq!(hash["info"]["free_trial_end_at"], "1970-01-01T00:00:00Z");
    }
}
