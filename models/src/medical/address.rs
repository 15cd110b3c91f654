// models/src/medical/address.rs
use serde::{Deserialize, Serialize};

pub const DEFAULT_COUNTRY: &str = "South Africa";

/// Street address as captured by the profile forms. Empty strings mean "not filled in".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub street: String,
    pub suburb: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub country: String,
}

impl Default for Address {
    fn default() -> Self {
        Address {
            street: String::new(),
            suburb: String::new(),
            city: String::new(),
            province: String::new(),
            postal_code: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }
}

impl Address {
    pub fn is_blank(&self) -> bool {
        [&self.street, &self.suburb, &self.city, &self.province, &self.postal_code]
            .iter()
            .all(|part| part.trim().is_empty())
    }

    pub fn one_line(&self) -> String {
        [&self.street, &self.suburb, &self.city, &self.province, &self.postal_code]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_country_and_skip_blank_parts() {
        let address: Address =
            serde_json::from_str(r#"{"street": "12 Long St", "city": "Cape Town", "postalCode": "8001"}"#).unwrap();
        assert_eq!(address.country, DEFAULT_COUNTRY);
        assert_eq!(address.one_line(), "12 Long St, Cape Town, 8001");
        assert!(Address::default().is_blank());
    }
}
