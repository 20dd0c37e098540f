use serde::{Deserialize, Serialize};

use crate::resource::{EntityId, OptionScope, Resource, SelectOption};

/// Application account, optionally bound to a worker record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(default)]
    pub role_id: Option<EntityId>,
    #[serde(default)]
    pub role_name: Option<String>,
    #[serde(default)]
    pub worker_id: Option<EntityId>,
    #[serde(default)]
    pub worker_name: Option<String>,
}

fn active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDraft {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<EntityId>,
    pub is_active: bool,
}

impl Default for UserDraft {
    fn default() -> Self {
        Self {
            username: String::new(),
            email: None,
            password: String::new(),
            role_id: None,
            worker_id: None,
            is_active: true,
        }
    }
}

impl Resource for User {
    const PATH: &'static str = "users";
    const NAME: &'static str = "user";
    const NOUN: &'static str = "users";
    const EDITABLE_FIELDS: &'static [&'static str] =
        &["username", "email", "role_id", "worker_id", "is_active"];

    type Draft = UserDraft;

    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> String {
        self.username.clone()
    }

    fn option_scopes(&self) -> Vec<OptionScope> {
        vec![
            OptionScope::new(
                "roles",
                "role_id",
                current(self.role_id, self.role_name.as_deref()),
            ),
            OptionScope::new(
                "workers",
                "worker_id",
                current(self.worker_id, self.worker_name.as_deref()),
            ),
        ]
    }
}

/// The option a foreign key currently points at, labelled by the joined name
/// the list endpoint returns alongside it.
pub(crate) fn current(id: Option<EntityId>, name: Option<&str>) -> Option<SelectOption> {
    id.map(|id| {
        let label = name
            .filter(|name| !name.trim().is_empty())
            .map_or_else(|| format!("#{id}"), str::to_owned);
        SelectOption::new(id, label)
    })
}
