//! Dropdown data for foreign-key columns.
//!
//! While a row is edited its foreign keys render as selects (role, worker,
//! department, company). Some option endpoints are filtered server-side (only
//! unassigned workers, for example), which would hide the row's own current
//! value. Every load therefore passes the current id as `include_id`, and the
//! controller additionally pins the current option into the set if the server
//! still left it out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ustr::Ustr;

use super::{ApiClient, EntityId};
use crate::error::{ApiError, ApiResult};
use crate::http::Method;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub id: EntityId,
    pub label: String,
}

impl SelectOption {
    pub fn new(id: EntityId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// A foreign key of the edited row together with its current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionScope {
    /// Option source key, e.g. `roles`.
    pub key: Ustr,
    /// Field of the entity the options feed, e.g. `role_id`.
    pub field: &'static str,
    pub current: Option<SelectOption>,
}

impl OptionScope {
    pub fn new(key: &str, field: &'static str, current: Option<SelectOption>) -> Self {
        Self {
            key: Ustr::from(key),
            field,
            current,
        }
    }

    pub fn current_id(&self) -> Option<EntityId> {
        self.current.as_ref().map(|option| option.id)
    }
}

/// Cached options for one key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuxiliaryOptionSet {
    pub key: Ustr,
    /// Id the set was loaded to include.
    pub scope_id: Option<EntityId>,
    pub options: Vec<SelectOption>,
    pub loading: bool,
    pub error: Option<String>,
}

impl AuxiliaryOptionSet {
    pub fn new(key: Ustr) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.options.iter().any(|option| option.id == id)
    }

    /// Puts `current` first unless the set already offers it.
    pub(crate) fn pin(&mut self, current: Option<&SelectOption>) {
        if let Some(current) = current
            && !self.contains(current.id)
        {
            self.options.insert(0, current.clone());
        }
    }
}

/// Loads the options offered for one foreign key.
#[async_trait]
pub trait OptionSource: Send + Sync {
    fn key(&self) -> Ustr;

    /// Fetches the options, making sure `include` is among them when set.
    async fn load(&self, include: Option<EntityId>) -> ApiResult<Vec<SelectOption>>;
}

/// [`OptionSource`] backed by `GET /{path}?include_id=..`.
///
/// The response may be a bare array or `{ "items": [...] }`. Labels are built
/// by joining the first non-empty `label_fields` found on each record.
#[derive(Debug, Clone)]
pub struct HttpOptionSource {
    client: ApiClient,
    key: Ustr,
    path: &'static str,
    label_fields: &'static [&'static str],
    extra_query: Vec<(&'static str, String)>,
}

impl HttpOptionSource {
    pub fn new(
        client: ApiClient,
        key: &str,
        path: &'static str,
        label_fields: &'static [&'static str],
    ) -> Self {
        Self {
            client,
            key: Ustr::from(key),
            path,
            label_fields,
            extra_query: Vec::new(),
        }
    }

    pub fn with_query(mut self, name: &'static str, value: impl ToString) -> Self {
        self.extra_query.push((name, value.to_string()));
        self
    }

    fn label_of(&self, record: &Value) -> Option<String> {
        let parts: Vec<String> = self
            .label_fields
            .iter()
            .filter_map(|field| match record.get(*field)? {
                Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
                Value::Number(number) => Some(number.to_string()),
                _ => None,
            })
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }

    fn parse(&self, body: Value) -> ApiResult<Vec<SelectOption>> {
        let records = match body {
            Value::Array(records) => records,
            Value::Object(mut object) => match object.remove("items") {
                Some(Value::Array(records)) => records,
                _ => {
                    return Err(ApiError::Shape(format!(
                        "{} options: `items` is missing or not a sequence",
                        self.key
                    )));
                }
            },
            _ => {
                return Err(ApiError::Shape(format!(
                    "{} options: expected a sequence",
                    self.key
                )));
            }
        };

        records
            .iter()
            .map(|record| {
                let id = record.get("id").and_then(Value::as_i64).ok_or_else(|| {
                    ApiError::Shape(format!("{} option without integer id", self.key))
                })?;
                let label = self.label_of(record).unwrap_or_else(|| format!("#{id}"));
                Ok(SelectOption { id, label })
            })
            .collect()
    }
}

#[async_trait]
impl OptionSource for HttpOptionSource {
    fn key(&self) -> Ustr {
        self.key
    }

    async fn load(&self, include: Option<EntityId>) -> ApiResult<Vec<SelectOption>> {
        let mut request = self.client.request(Method::Get, self.path);
        for (name, value) in &self.extra_query {
            request = request.query(*name, value);
        }
        if let Some(id) = include {
            request = request.query("include_id", id);
        }

        let response = self.client.execute(request).await?;
        let body: Value = response
            .json()
            .map_err(|e| ApiError::Shape(format!("{} options: {e}", self.key)))?;
        self.parse(body)
    }
}
