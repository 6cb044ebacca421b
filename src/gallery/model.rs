//! Gallery Records
//!
//! Wire shapes of the collection API and the flattened, display-ready
//! [`GalleryItem`] projected from them.

use reqwest::Url;
use serde::Deserialize;

/// Remote object identifier.
pub type ObjectId = u64;

/// Title used when a record has none.
pub const UNTITLED: &str = "Untitled";

/// Response of the keyword search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    /// Total hits reported by the server.
    #[serde(default)]
    pub total: u64,
    /// Matching ids; the API sends `null` for no hits.
    #[serde(rename = "objectIDs", default)]
    pub object_ids: Option<Vec<ObjectId>>,
}

impl SearchResponse {
    /// Ids in server order.
    pub fn into_ids(self) -> Vec<ObjectId> {
        self.object_ids.unwrap_or_default()
    }
}

/// Full record from the object detail endpoint.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRecord {
    #[serde(rename = "objectID")]
    pub object_id: ObjectId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist_display_name: Option<String>,
    #[serde(default)]
    pub object_date: Option<String>,
    #[serde(default)]
    pub primary_image: Option<String>,
    #[serde(default)]
    pub primary_image_small: Option<String>,
    #[serde(rename = "objectURL", default)]
    pub object_url: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub object_name: Option<String>,
    #[serde(default)]
    pub credit_line: Option<String>,
}

impl ObjectRecord {
    /// Preferred image reference: the small rendition, then the full one.
    pub fn image_ref(&self) -> Option<&str> {
        non_empty(&self.primary_image_small).or_else(|| non_empty(&self.primary_image))
    }

    /// Whether the record can be shown at all.
    pub fn has_image(&self) -> bool {
        self.image_ref().is_some()
    }
}

/// Display-ready gallery entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    /// Remote id.
    pub id: ObjectId,
    /// Title, or [`UNTITLED`].
    pub title: String,
    /// Artist display name.
    pub artist: Option<String>,
    /// Free-form date text.
    pub date: Option<String>,
    /// Materials.
    pub medium: Option<String>,
    /// Owning department.
    pub department: Option<String>,
    /// Credit line, falling back to the object name.
    pub description: Option<String>,
    /// Small image, falling back to the full image.
    pub image_url: Option<Url>,
    /// Public page for the object.
    pub detail_url: Option<Url>,
}

impl GalleryItem {
    /// Project a raw record. Empty strings count as absent.
    pub fn from_record(record: &ObjectRecord) -> Self {
        let description = non_empty(&record.credit_line)
            .or_else(|| non_empty(&record.object_name))
            .map(str::to_string);

        Self {
            id: record.object_id,
            title: record.title.clone().unwrap_or_else(|| UNTITLED.to_string()),
            artist: owned(&record.artist_display_name),
            date: owned(&record.object_date),
            medium: owned(&record.medium),
            department: owned(&record.department),
            description,
            image_url: record.image_ref().and_then(|s| Url::parse(s).ok()),
            detail_url: non_empty(&record.object_url).and_then(|s| Url::parse(s).ok()),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn owned(value: &Option<String>) -> Option<String> {
    non_empty(value).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_null_ids_is_empty() {
        let response: SearchResponse = serde_json::from_str(r#"{"total":0,"objectIDs":null}"#).unwrap();
        assert!(response.into_ids().is_empty());
    }

    #[test]
    fn test_decode_detail_record() {
        let json = r#"{
            "objectID": 436532,
            "title": "The Jester",
            "artistDisplayName": "",
            "primaryImage": "https://images.example/full.jpg",
            "primaryImageSmall": "",
            "objectURL": "https://www.example.org/art/436532",
            "objectName": "Painting",
            "creditLine": ""
        }"#;
        let record: ObjectRecord = serde_json::from_str(json).unwrap();
        let item = GalleryItem::from_record(&record);

        assert_eq!(item.id, 436532);
        assert_eq!(item.title, "The Jester");
        assert_eq!(item.artist, None);
        assert_eq!(item.description.as_deref(), Some("Painting"));
        assert_eq!(item.image_url.unwrap().as_str(), "https://images.example/full.jpg");
        assert!(item.detail_url.is_some());
    }

    #[test]
    fn test_missing_title_defaults() {
        let record = ObjectRecord {
            object_id: 1,
            primary_image_small: Some("https://images.example/s.jpg".into()),
            credit_line: Some("Gift".into()),
            ..Default::default()
        };
        let item = GalleryItem::from_record(&record);
        assert_eq!(item.title, UNTITLED);
        assert_eq!(item.description.as_deref(), Some("Gift"));
    }

    #[test]
    fn test_empty_images_are_unusable() {
        let record = ObjectRecord {
            object_id: 2,
            primary_image: Some(String::new()),
            ..Default::default()
        };
        assert!(!record.has_image());
    }
}
