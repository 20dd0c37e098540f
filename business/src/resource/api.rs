//! Resource API client helpers.
//!
//! This module performs network IO against `/{resource}` collections. The
//! controller only sees the [`ResourceApi`] trait, so tests can swap the HTTP
//! implementation for an in-memory one.
//!
//! Every request carries the session's bearer token. A `401` invalidates the
//! [`AuthSession`] before the error is handed back to the caller.

use std::marker::PhantomData;

use async_trait::async_trait;
use log::{info, warn};
use serde_json::Value;

use super::{EntityId, FieldChanges, Page, PageQuery, Resource};
use crate::auth::AuthSession;
use crate::config::BusinessConfig;
use crate::error::{ApiError, ApiResult};
use crate::export::ExportQuery;
use crate::http::{Client, Method, RequestBuilder, Response};

/// Shared transport state: where the API lives and who is calling it.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: BusinessConfig,
    auth: AuthSession,
}

impl ApiClient {
    pub fn new(config: BusinessConfig, auth: AuthSession) -> Self {
        Self { config, auth }
    }

    pub fn config(&self) -> &BusinessConfig {
        &self.config
    }

    pub fn auth(&self) -> &AuthSession {
        &self.auth
    }

    /// Builds a request for `path` below the API root, with the bearer token
    /// attached when signed in.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = Client::request(method, self.config.endpoint(path));
        match self.auth.token() {
            Some(token) => request.bearer_auth(&token),
            None => request,
        }
    }

    /// Sends `request` and classifies any non-2xx status.
    pub async fn execute(&self, request: RequestBuilder) -> ApiResult<Response> {
        let method = request.method();
        let response = request.send().await.map_err(|e| {
            warn!("{method} request failed: {e}");
            ApiError::Network(e.message)
        })?;

        if let Err(err) = ApiError::check(&response) {
            warn!("{method} returned {}: {err}", response.status);
            if err.is_session_fatal() {
                self.auth.expire();
            }
            return Err(err);
        }
        Ok(response)
    }

    async fn json(&self, request: RequestBuilder) -> ApiResult<Value> {
        let response = self.execute(request).await?;
        response
            .json()
            .map_err(|e| ApiError::Shape(format!("response is not JSON: {e}")))
    }
}

/// Raw export payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// CRUD operations the table controller needs from a collection.
#[async_trait]
pub trait ResourceApi<T: Resource>: Send + Sync {
    async fn list(&self, query: &PageQuery) -> ApiResult<Page<T>>;

    async fn create(&self, draft: &T::Draft) -> ApiResult<T>;

    /// Sends only `changes`; the server answers with the full entity.
    async fn update(&self, id: EntityId, changes: &FieldChanges) -> ApiResult<T>;

    async fn delete(&self, id: EntityId) -> ApiResult<()>;
}

/// [`ResourceApi`] over the REST endpoints at `T::PATH`.
#[derive(Debug, Clone)]
pub struct HttpResourceApi<T> {
    client: ApiClient,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Resource> HttpResourceApi<T> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _marker: PhantomData,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn item_path(id: EntityId) -> String {
        format!("{}/{id}", T::PATH)
    }

    /// GET `/{resource}?page=&size=&search=&format=`, returning the file as-is.
    pub async fn export(&self, query: &ExportQuery) -> ApiResult<ExportFile> {
        info!("Exporting {} as {}", T::NOUN, query.format);
        let request = self
            .client
            .request(Method::Get, T::PATH)
            .query("page", query.page)
            .query("size", query.size)
            .query("search", &query.search)
            .query("format", query.format);

        let response = self.client.execute(request).await?;
        let content_type = response
            .header("content-type")
            .unwrap_or(query.format.content_type())
            .to_owned();

        Ok(ExportFile {
            bytes: response.body,
            content_type,
        })
    }
}

#[async_trait]
impl<T: Resource> ResourceApi<T> for HttpResourceApi<T> {
    async fn list(&self, query: &PageQuery) -> ApiResult<Page<T>> {
        let request = self
            .client
            .request(Method::Get, T::PATH)
            .query("page", query.page)
            .query("size", query.size)
            .query("search", &query.search);

        let body = self.client.json(request).await?;
        Page::from_wire(body, query)
    }

    async fn create(&self, draft: &T::Draft) -> ApiResult<T> {
        let request = self
            .client
            .request(Method::Post, T::PATH)
            .json(draft)
            .map_err(|e| ApiError::Shape(format!("failed to serialize {}: {e}", T::NAME)))?;

        unwrap_entity(self.client.json(request).await?)
    }

    async fn update(&self, id: EntityId, changes: &FieldChanges) -> ApiResult<T> {
        let request = self
            .client
            .request(Method::Put, &Self::item_path(id))
            .json(changes)
            .map_err(|e| ApiError::Shape(format!("failed to serialize changes: {e}")))?;

        unwrap_entity(self.client.json(request).await?)
    }

    async fn delete(&self, id: EntityId) -> ApiResult<()> {
        let request = self.client.request(Method::Delete, &Self::item_path(id));
        self.client.execute(request).await.map(|_| ())
    }
}

/// Accepts both a bare entity and one wrapped as `{ "data": entity }`.
pub(crate) fn unwrap_entity<T: Resource>(value: Value) -> ApiResult<T> {
    let value = match value {
        Value::Object(mut object) if !object.contains_key("id") && object.contains_key("data") => {
            object.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(value)
        .map_err(|e| ApiError::Shape(format!("{} response: {e}", T::NAME)))
}
