pub mod purchase_requests_hooks;
pub mod purchase_requests_service;
pub mod purchase_requests_shared;
pub mod reply_template;

pub use purchase_requests_service::PurchaseRequestsService;
pub use reply_template::{ReplyDetails, ReplyTemplate};
