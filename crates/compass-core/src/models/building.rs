use serde::{Deserialize, Serialize};

/// A campus building shown on the map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    #[serde(rename = "Name")]
    pub name: String,
    /// Street address, geocoded by the map layer
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Is_Active")]
    pub is_active: bool,
}

impl Building {
    pub fn new(name: impl Into<String>, address: impl Into<String>, is_active: bool) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeedRecord;
    use serde_json::json;

    #[test]
    fn test_building_from_payload() {
        let payload = json!({
            "Name": "Perry Hall",
            "Address": "163 S Willard St, Burlington, VT",
            "Is_Active": true
        });
        let building = Building::from_payload(&payload).unwrap();
        assert_eq!(building.name, "Perry Hall");
        assert!(building.is_active);
    }

    #[test]
    fn test_default_building_is_inactive() {
        assert!(!Building::default().is_active);
    }
}
