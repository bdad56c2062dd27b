use mart_gallery::{renumber, GalleryImage};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

use super::catalog::{Condition, StockStatus};
use crate::format::create_slug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Category {
    #[validate(custom(function = "non_blank", message = "category.main is required"))]
    pub main: String,
    #[validate(custom(function = "non_blank", message = "category.sub is required"))]
    pub sub: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    #[validate(custom(function = "non_blank", message = "seller.name is required"))]
    pub name: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[validate(email(message = "seller.contactEmail must be a valid email"))]
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

/// Forms send unfilled optional fields as `""`.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    pub key: String,
    pub value: String,
}

impl Specification {
    fn is_blank(&self) -> bool {
        self.key.trim().is_empty() || self.value.trim().is_empty()
    }
}

/// A stored product, as read back from the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub slug: String,
    pub name: String,
    pub category: Category,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    pub seller: Seller,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub gallery: Vec<GalleryImage>,
    #[serde(default)]
    pub specs: Vec<Specification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_fee_estimate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_notes: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

impl Product {
    pub fn from_value(value: Value) -> anyhow::Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Gallery sorted by `order`, main image first.
    pub fn ordered_gallery(&self) -> Vec<GalleryImage> {
        let mut gallery = self.gallery.clone();
        gallery.sort_by_key(|g| g.order);
        gallery
    }

    pub fn main_image(&self) -> &str {
        self.gallery
            .iter()
            .min_by_key(|g| g.order)
            .map(|g| g.url.as_str())
            .unwrap_or(&self.image_url)
    }
}

/// Body of `POST /products`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(custom(function = "non_blank", message = "name is required"))]
    pub name: String,

    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,

    #[validate(nested)]
    pub category: Category,

    #[serde(default)]
    pub description: String,

    #[validate(nested)]
    pub seller: Seller,

    #[validate(
        length(min = 1, message = "Please upload at least one image"),
        custom(function = "uploaded_images")
    )]
    #[serde(default)]
    pub gallery: Vec<GalleryImage>,

    #[serde(default)]
    pub specs: Vec<Specification>,

    #[validate(
        required(message = "Please select product location"),
        custom(function = "non_blank", message = "Please select product location")
    )]
    pub product_location: Option<String>,

    #[serde(default)]
    pub stock_status: StockStatus,

    #[serde(default)]
    pub condition: Condition,

    #[validate(range(min = 0.0, message = "deliveryFeeEstimate must not be negative"))]
    pub delivery_fee_estimate: Option<f64>,

    pub delivery_notes: Option<String>,
}

impl NewProduct {
    /// The record to store: slug, main image and timestamps are derived
    /// here, never taken from the client.
    pub fn into_record(self, created_at: String) -> Product {
        let mut gallery = self.gallery;
        gallery.sort_by_key(|g| g.order);
        renumber(&mut gallery);

        let name = self.name.trim().to_string();
        let image_url = gallery.first().map(|g| g.url.clone()).unwrap_or_default();

        Product {
            id: String::new(),
            slug: create_slug(&name),
            name,
            category: self.category,
            price: self.price,
            description: self.description,
            seller: Seller {
                contact_phone: non_empty(self.seller.contact_phone),
                contact_email: non_empty(self.seller.contact_email),
                ..self.seller
            },
            image_url,
            gallery,
            specs: self.specs.into_iter().filter(|s| !s.is_blank()).collect(),
            product_location: non_empty(self.product_location),
            stock_status: Some(self.stock_status.value().to_string()),
            condition: Some(self.condition.value().to_string()),
            delivery_fee_estimate: self.delivery_fee_estimate,
            delivery_notes: non_empty(self.delivery_notes),
            created_at,
        }
    }
}

/// Body of `PATCH /products/{id}`; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PatchProduct {
    #[validate(custom(function = "non_blank", message = "name must not be empty"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[validate(range(min = 0.0, message = "price must not be negative"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    #[validate(nested)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[validate(nested)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller: Option<Seller>,

    #[validate(
        length(min = 1, message = "Please upload at least one image"),
        custom(function = "uploaded_images")
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gallery: Option<Vec<GalleryImage>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub specs: Option<Vec<Specification>>,

    #[validate(custom(function = "non_blank", message = "Please select product location"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_status: Option<StockStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,

    #[validate(range(min = 0.0, message = "deliveryFeeEstimate must not be negative"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_fee_estimate: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_notes: Option<String>,
}

impl PatchProduct {
    /// Drops blank specs so the merged record never stores them.
    pub fn normalized(mut self) -> Self {
        if let Some(specs) = self.specs.take() {
            self.specs = Some(specs.into_iter().filter(|s| !s.is_blank()).collect());
        }
        self.name = self.name.map(|n| n.trim().to_string());
        self
    }
}

/// Re-derives `imageUrl` and dense gallery order on a stored record.
pub fn normalize_gallery(record: &mut Value) {
    let Some(obj) = record.as_object_mut() else {
        return;
    };
    let Some(gallery) = obj
        .get("gallery")
        .cloned()
        .and_then(|g| serde_json::from_value::<Vec<GalleryImage>>(g).ok())
    else {
        return;
    };

    let mut gallery = gallery;
    gallery.sort_by_key(|g| g.order);
    renumber(&mut gallery);

    if let Some(main) = gallery.first() {
        obj.insert("imageUrl".to_string(), Value::String(main.url.clone()));
    }
    if let Ok(v) = serde_json::to_value(&gallery) {
        obj.insert("gallery".to_string(), v);
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn uploaded_images(gallery: &[GalleryImage]) -> Result<(), ValidationError> {
    if gallery
        .iter()
        .any(|g| g.url.trim().is_empty() || g.path.trim().is_empty())
    {
        let mut err = ValidationError::new("gallery");
        err.message = Some("every image must finish uploading before saving".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "name": "  Honda Generator EU70iS ",
            "price": 5500,
            "category": {"main": "Machines", "sub": "Generators"},
            "seller": {"name": "PowerGen Solutions", "verified": true, "contactEmail": ""},
            "gallery": [
                {"url": "/media/b.jpg", "path": "products/p/2_b.jpg", "order": 4},
                {"url": "/media/a.jpg", "path": "products/p/1_a.jpg", "order": 1}
            ],
            "specs": [{"key": "Max Output", "value": "7000W"}, {"key": "", "value": ""}],
            "productLocation": "greater-accra"
        })
    }

    #[test]
    fn into_record_derives_server_fields() {
        let input: NewProduct = serde_json::from_value(valid()).unwrap();
        let record = input.into_record("2024-05-01T00:00:00Z".into());

        assert_eq!(record.slug, "honda-generator-eu70is");
        assert_eq!(record.name, "Honda Generator EU70iS");
        assert_eq!(record.image_url, "/media/a.jpg");
        assert_eq!(record.gallery.iter().map(|g| g.order).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(record.specs.len(), 1);
        assert_eq!(record.seller.contact_email, None);
        assert_eq!(record.stock_status.as_deref(), Some("in-stock"));
        assert_eq!(record.condition.as_deref(), Some("new"));
    }

    #[test]
    fn blank_contact_email_is_absent_not_invalid() {
        let input: NewProduct = serde_json::from_value(valid()).unwrap();
        assert_eq!(input.seller.contact_email, None);
        assert!(input.validate().is_ok());

        let mut data = valid();
        data["seller"]["contactEmail"] = json!("not-an-email");
        let input: NewProduct = serde_json::from_value(data).unwrap();
        let errs = input.validate().unwrap_err();
        assert!(errs.errors().contains_key("seller"));
    }

    #[test]
    fn product_location_and_images_are_required() {
        let mut data = valid();
        data["gallery"] = json!([]);
        data.as_object_mut().unwrap().remove("productLocation");
        let input: NewProduct = serde_json::from_value(data).unwrap();

        let errs = input.validate().unwrap_err();
        let fields = errs.field_errors();
        assert!(fields.contains_key("gallery"));
        assert!(fields.contains_key("product_location"));
    }

    #[test]
    fn gallery_entries_still_uploading_are_rejected() {
        let mut data = valid();
        data["gallery"] = json!([{"url": "local-preview://x/a.jpg", "path": "", "order": 0}]);
        let input: NewProduct = serde_json::from_value(data).unwrap();
        assert!(input.validate().unwrap_err().field_errors().contains_key("gallery"));
    }

    #[test]
    fn normalize_gallery_renumbers_and_picks_the_main_image() {
        let mut record = json!({
            "imageUrl": "stale",
            "gallery": [
                {"url": "second", "path": "p2", "order": 7},
                {"url": "first", "path": "p1", "order": 3}
            ]
        });
        normalize_gallery(&mut record);
        assert_eq!(record["imageUrl"], "first");
        assert_eq!(record["gallery"][1]["order"], 1);
    }
}
