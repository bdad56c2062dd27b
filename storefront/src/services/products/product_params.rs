use crate::services::StoreParams;

/// Query parameters understood by `GET /products`.
#[derive(Debug, Clone, Default)]
pub struct ProductParams {
    /// Main category, matched exactly.
    pub category: Option<String>,
    /// Sub-category, filtered after the store query.
    pub sub: Option<String>,
    pub slug: Option<String>,
    /// Case-insensitive text search.
    pub q: Option<String>,
    pub limit: Option<usize>,
}

impl From<&StoreParams> for ProductParams {
    fn from(params: &StoreParams) -> Self {
        let owned = |key: &str| params.query_str(key).map(str::to_string);
        Self {
            category: owned("category"),
            sub: owned("sub"),
            slug: owned("slug"),
            q: owned("q"),
            limit: params.query_str("limit").and_then(|v| v.parse().ok()),
        }
    }
}
