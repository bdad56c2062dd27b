use std::sync::Arc;

use mart_core::MartApp;

/// Router state for service routes.
pub struct MartAxumState<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub app: Arc<MartApp<R, P>>,
    pub service: Arc<str>,
}

impl<R, P> Clone for MartAxumState<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            app: Arc::clone(&self.app),
            service: Arc::clone(&self.service),
        }
    }
}
