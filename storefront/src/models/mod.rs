pub mod catalog;
pub mod product;
pub mod purchase_request;

pub use catalog::{
    condition_display, region_label, stock_status_display, CategoryGroup, Condition,
    LabelledOption, Region, StockStatus, CATEGORIES, GHANA_REGIONS,
};
pub use product::{normalize_gallery, Category, NewProduct, PatchProduct, Product, Seller, Specification};
pub use purchase_request::{NewPurchaseRequest, PurchaseRequest, ResponseSource};
