//! Business layer of the roster admin front-end.
//!
//! Everything here is UI-agnostic: configuration, the HTTP transport, the
//! auth session and one generic [`ResourceController`] per admin table.
//!
//! ```ignore
//! let config = BusinessConfig::from_env()?;
//! let auth = AuthSession::new();
//! let client = ApiClient::new(config, auth.clone());
//!
//! let mut users = entities::users(&client);
//! users.load_page("", 1)?;
//! // every frame:
//! users.sync();
//! ```

pub mod auth;
pub mod config;
pub mod entities;
pub mod error;
pub mod export;
pub mod http;
pub mod resource;
pub mod sort;

pub use auth::{AuthError, AuthEvent, AuthSession, Claims};
pub use config::{BusinessConfig, DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_DEBOUNCE};
pub use error::{ApiError, ApiResult};
pub use export::{ExportFormat, ExportQuery};
pub use resource::{
    ApiClient, ControllerError, EntityId, HttpResourceApi, Notification, NotificationLevel,
    Resource, ResourceApi, ResourceController, RowState,
};
