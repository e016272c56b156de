use std::sync::Arc;

use crate::contact::store::ContactStore;
use crate::pages::Pages;
use crate::prediction::advisory::AdvisorySource;
use crate::prediction::model::DiseaseModel;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Everything here is built once in `main` and read-only afterwards. Optional
/// handles are `None` when their configuration is missing.
#[derive(Clone)]
pub struct AppState {
    pub pages: Arc<Pages>,
    /// Classifier + label encoder. `None` if the artifacts failed to load.
    pub model: Option<Arc<DiseaseModel>>,
    /// AI advisory backend. `None` without `GEMINI_API_KEY`.
    pub advisor: Option<Arc<dyn AdvisorySource>>,
    /// Contact persistence. `None` without Supabase or Postgres settings.
    pub contact_store: Option<Arc<dyn ContactStore>>,
}
