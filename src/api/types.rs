// Hero API response types.
// Defines structs for deserializing the hero REST API responses.

use serde::{Deserialize, Serialize};

use crate::paging::PagedItem;

/// A hero as served by the remote API and cached locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    pub id: u32,
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub power: u32,
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub family: Vec<String>,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub nature_types: Vec<String>,
}

impl PagedItem for Hero {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }
}

/// Envelope wrapping every list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub success: bool,
    pub message: Option<String>,
    pub prev_page: Option<u32>,
    pub next_page: Option<u32>,
    #[serde(default)]
    pub heroes: Vec<Hero>,
    pub last_updated: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_response() {
        let json = r#"{
            "success": true,
            "message": "ok",
            "prevPage": null,
            "nextPage": 2,
            "heroes": [{
                "id": 1,
                "name": "Sasuke",
                "image": "/images/sasuke.jpg",
                "about": "Last surviving member of the Uchiha clan.",
                "rating": 5.0,
                "power": 98,
                "month": "July",
                "day": "23rd",
                "family": ["Fugaku", "Mikoto", "Itachi"],
                "abilities": ["Sharingan", "Rinnegan"],
                "natureTypes": ["Lightning", "Fire"]
            }],
            "lastUpdated": 1640000000000
        }"#;

        let response: ApiResponse = serde_json::from_str(json).unwrap();
        assert!(response.success);
        assert_eq!(response.next_page, Some(2));
        assert_eq!(response.heroes.len(), 1);
        assert_eq!(response.heroes[0].nature_types, vec!["Lightning", "Fire"]);
        assert_eq!(response.heroes[0].id(), 1);
    }

    #[test]
    fn test_missing_optional_fields() {
        let json = r#"{"success": false, "message": "Invalid page"}"#;
        let response: ApiResponse = serde_json::from_str(json).unwrap();
        assert!(!response.success);
        assert!(response.heroes.is_empty());
        assert!(response.next_page.is_none());
    }
}
