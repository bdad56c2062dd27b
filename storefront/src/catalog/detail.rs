use mart_gallery::GalleryImage;
use serde::Serialize;

use crate::format::{format_phone_number, format_price};
use crate::models::{condition_display, region_label, stock_status_display, LabelledOption, Product};

/// Everything a product page shows, already formatted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub product: Product,
    pub main_image: String,
    pub gallery: Vec<GalleryImage>,
    pub formatted_price: String,
    pub stock_status: LabelledOption,
    pub condition: LabelledOption,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_delivery_fee: Option<String>,
}

impl From<Product> for ProductDetail {
    fn from(product: Product) -> Self {
        Self {
            main_image: product.main_image().to_string(),
            gallery: product.ordered_gallery(),
            formatted_price: format_price(product.price),
            stock_status: stock_status_display(product.stock_status.as_deref()),
            condition: condition_display(product.condition.as_deref()),
            location: product
                .product_location
                .as_deref()
                .map(|l| region_label(l).to_string()),
            seller_phone: product
                .seller
                .contact_phone
                .as_deref()
                .map(format_phone_number),
            formatted_delivery_fee: product.delivery_fee_estimate.map(format_price),
            product,
        }
    }
}
