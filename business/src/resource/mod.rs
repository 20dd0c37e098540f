//! Generic paginated resource tables.
//!
//! One [`ResourceController`] drives any REST collection whose entity type
//! implements [`Resource`]. Entity modules only describe their shape (path,
//! editable fields, foreign keys); fetching, paging, searching, inline editing
//! and reconciliation all live here.
//!
//! - [`Page`] / [`PageQuery`]: one slice of a collection plus its bookkeeping
//! - [`ResourceApi`] / [`HttpResourceApi`]: list/create/update/delete transport
//! - [`OptionSource`] / [`HttpOptionSource`]: dropdown data for foreign keys
//! - [`RowEditSession`]: the working copy of the row being edited
//! - [`ResourceController`]: the table state machine

pub mod api;
pub mod controller;
pub mod notification;
pub mod options;
pub mod page;
pub mod session;

use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub use api::{ApiClient, ExportFile, HttpResourceApi, ResourceApi};
pub use controller::{ControllerError, CreateForm, DeleteConfirmation, ResourceController, RowState};
pub use notification::{Notification, NotificationLevel};
pub use options::{AuxiliaryOptionSet, HttpOptionSource, OptionScope, OptionSource, SelectOption};
pub use page::{Page, PageQuery, total_pages};
pub use session::{EditPhase, FieldError, RowEditSession};

/// Server-assigned primary key.
pub type EntityId = i64;

/// Changed fields sent with an update, keyed by their JSON name.
pub type FieldChanges = Map<String, Value>;

/// A record type the admin API exposes as a REST collection.
pub trait Resource:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Collection path below the API root, e.g. `users`.
    const PATH: &'static str;

    /// Singular name used in notifications, e.g. `user`.
    const NAME: &'static str;

    /// Plural name used in empty-state text, e.g. `users`.
    const NOUN: &'static str;

    /// JSON names of the fields the inline editor may change.
    const EDITABLE_FIELDS: &'static [&'static str];

    /// Payload posted when creating a new record.
    type Draft: Clone + Debug + Default + Serialize + Send + Sync + 'static;

    fn id(&self) -> EntityId;

    /// Short human-readable label (confirmation prompts, logs).
    fn label(&self) -> String;

    /// Foreign keys whose dropdowns must offer the current value while this
    /// record is being edited.
    fn option_scopes(&self) -> Vec<OptionScope> {
        Vec::new()
    }

    /// Client-side display order applied to every loaded page.
    fn arrange(_items: &mut [Self]) {}
}
