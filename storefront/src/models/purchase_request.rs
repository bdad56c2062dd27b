use serde::{Deserialize, Serialize};
use validator::Validate;

use super::product::non_blank;

/// Body of `POST /purchase-requests`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchaseRequest {
    #[validate(custom(function = "non_blank", message = "productId is required"))]
    pub product_id: String,

    pub product_name: Option<String>,

    #[validate(custom(function = "non_blank", message = "Please enter your name"))]
    pub customer_name: String,

    #[validate(custom(function = "non_blank", message = "Please enter your phone number"))]
    pub phone_number: String,

    #[validate(custom(function = "non_blank", message = "Please enter your delivery location"))]
    pub location: String,

    pub notes: Option<String>,
}

/// How `suggestedResponse` was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Template,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    #[serde(default)]
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub customer_name: String,
    pub phone_number: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub suggested_response: String,
    pub response_source: ResponseSource,
    pub created_at: String,
}
