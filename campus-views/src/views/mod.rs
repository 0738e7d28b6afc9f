//! Entity views
//!
//! Every view owns an [`ApiClient`] handle and its local state. Mounting
//! performs the view's reads; write operations validate the form, send one
//! request and report the outcome through the client's notifier. Operations
//! borrow the view mutably, so dropping a view drops whatever it was
//! awaiting and no response can land on a view that is gone.

pub mod auth;
pub mod batch;
pub mod course;
pub mod student;
pub mod subject;
pub mod teacher;

use crate::error::{ViewError, ViewResult};
use crate::navigation::Navigation;
use campus_api::{ApiClient, ApiRequest, Notice};
use campus_core::{CampusError, CampusResult, EntityId};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Whether a form view creates a new record or edits an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(EntityId),
}

/// A backend collection with list and detail endpoints
pub trait Resource: DeserializeOwned + Default + Send + Sync {
    const LABEL: &'static str;
    const COLLECTION: &'static str;
    const LIST: Navigation;
    const DELETE_PROMPT: &'static str;
    const DELETED: &'static str;
    const DELETE_FAILED: &'static str;

    fn detail_path(id: EntityId) -> String;

    fn id(&self) -> EntityId;
}

pub(crate) async fn fetch<T: DeserializeOwned>(api: &ApiClient, path: &str) -> CampusResult<T> {
    api.get(path).await?.data()
}

pub(crate) fn notify_success(api: &ApiClient, message: &str) {
    api.notifier().notify(Notice::success(message));
}

/// Read failures are logged only; the view keeps its previous state
pub(crate) fn load_failed(view: &str, error: CampusError) -> ViewError {
    warn!(view = view, error = %error, "Failed to load view data");
    ViewError::Api(error)
}

/// Notify a failed write, preferring the backend's message for `fields`
pub(crate) fn write_failed(
    api: &ApiClient,
    error: CampusError,
    fields: &[&str],
    fallback: &str,
) -> ViewError {
    let message = error
        .field_errors()
        .and_then(|errors| errors.first_of(fields))
        .unwrap_or_else(|| fallback.to_string());
    error.log();
    api.notifier().notify(Notice::error(message));
    ViewError::Api(error)
}

pub(crate) fn confirm(api: &ApiClient, prompt: &str) -> ViewResult<()> {
    if api.notifier().confirm(prompt) {
        Ok(())
    } else {
        debug!(prompt = prompt, "Confirmation declined");
        Err(ViewError::Cancelled)
    }
}

/// Delete a record after confirmation, notifying either outcome
pub(crate) async fn delete_resource<R: Resource>(api: &ApiClient, id: EntityId) -> ViewResult<()> {
    confirm(api, R::DELETE_PROMPT)?;
    if let Err(error) = api.delete(&R::detail_path(id)).await {
        return Err(write_failed(api, error, &[], R::DELETE_FAILED));
    }
    notify_success(api, R::DELETED);
    Ok(())
}

/// Collection view with optional query filters
pub struct ListView<R: Resource> {
    api: ApiClient,
    filters: Vec<(String, String)>,
    pub items: Vec<R>,
}

impl<R: Resource> ListView<R> {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            filters: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Add a query filter; empty values are not sent
    pub fn filter(mut self, key: &str, value: impl Into<String>) -> Self {
        self.filters.push((key.to_string(), value.into()));
        self
    }

    pub async fn mount(&mut self) -> ViewResult<()> {
        let request = self
            .filters
            .iter()
            .fold(ApiRequest::get(R::COLLECTION), |request, (key, value)| {
                request.query(key, value.clone())
            });

        match self.api.send(request).await.and_then(|r| r.data::<Vec<R>>()) {
            Ok(items) => {
                self.items = items;
                Ok(())
            }
            Err(error) => Err(load_failed(R::LABEL, error)),
        }
    }

    /// Delete one entry and re-fetch the collection
    pub async fn delete(&mut self, id: EntityId) -> ViewResult<()> {
        delete_resource::<R>(&self.api, id).await?;
        self.mount().await
    }
}

/// Single-record view
pub struct DetailView<R: Resource> {
    api: ApiClient,
    id: EntityId,
    pub record: R,
}

impl<R: Resource> DetailView<R> {
    pub fn new(api: ApiClient, id: EntityId) -> Self {
        Self {
            api,
            id,
            record: R::default(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub async fn mount(&mut self) -> ViewResult<()> {
        match fetch(&self.api, &R::detail_path(self.id)).await {
            Ok(record) => {
                self.record = record;
                Ok(())
            }
            Err(error) => Err(load_failed(R::LABEL, error)),
        }
    }

    pub async fn delete(&mut self) -> ViewResult<Navigation> {
        delete_resource::<R>(&self.api, self.id).await?;
        Ok(R::LIST)
    }

    /// Role-aware "back" target
    pub async fn back(&self) -> ViewResult<Navigation> {
        let session = self.api.session().load().await?;
        Ok(Navigation::back_for(session.role, R::LIST))
    }
}
