//! Delivery address models.

use serde::{Deserialize, Serialize};

use tradecart_core::{AccountId, AddressId};

/// A delivery address.
///
/// `account_id = None` marks an address that was used for a single
/// checkout without being saved to the account's address book. Draft
/// orders point at an all-empty placeholder row until checkout.
#[derive(Debug, Clone, Serialize)]
pub struct Address {
    pub id: AddressId,
    pub account_id: Option<AccountId>,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub street1: String,
    pub street2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub email: String,
    pub phone: String,
}

/// Address fields supplied at checkout (or when adding to the book).
#[derive(Debug, Clone, Deserialize)]
pub struct NewAddress {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub company: String,
    pub street1: String,
    #[serde(default)]
    pub street2: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub zip: String,
    pub country: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl NewAddress {
    /// Names of required fields that are empty after trimming.
    ///
    /// Validation happens before any persistence call; an empty required
    /// field fails the whole operation.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let required = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("street1", &self.street1),
            ("city", &self.city),
            ("zip", &self.zip),
            ("country", &self.country),
        ];
        required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }
}

/// Partial update for a saved address.
///
/// Only fields present in the payload are applied; absent fields keep
/// their stored value (the repository's update COALESCEs each column).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub street1: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl AddressPatch {
    /// Whether the patch changes anything at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.company.is_none()
            && self.street1.is_none()
            && self.street2.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip.is_none()
            && self.country.is_none()
            && self.email.is_none()
            && self.phone.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_address() -> NewAddress {
        NewAddress {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            company: String::new(),
            street1: "1 Analytical Way".to_owned(),
            street2: String::new(),
            city: "London".to_owned(),
            state: String::new(),
            zip: "SW1".to_owned(),
            country: "GB".to_owned(),
            email: String::new(),
            phone: String::new(),
        }
    }

    #[test]
    fn test_missing_fields() {
        assert!(full_address().missing_fields().is_empty());

        let mut incomplete = full_address();
        incomplete.city = "   ".to_owned();
        incomplete.country = String::new();
        assert_eq!(incomplete.missing_fields(), vec!["city", "country"]);
    }

    #[test]
    fn test_empty_patch() {
        assert!(AddressPatch::default().is_empty());
        let patch = AddressPatch {
            city: Some("Cambridge".to_owned()),
            ..AddressPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
