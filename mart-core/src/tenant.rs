//! Tenant scoping for every service call.

/// Identifier of the storefront a record belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Context carried with every service call and hook.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant_id: TenantId,
}

impl TenantContext {
    pub const DEFAULT: &'static str = "default";

    pub fn new<S: Into<String>>(tenant: S) -> Self {
        Self {
            tenant_id: TenantId(tenant.into()),
        }
    }

    /// Tenant used when a caller does not name one.
    pub fn fallback() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl Default for TenantContext {
    fn default() -> Self {
        Self::fallback()
    }
}
