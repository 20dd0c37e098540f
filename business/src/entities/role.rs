use serde::{Deserialize, Serialize};

use crate::resource::{EntityId, Resource};

/// Named bundle of permissions assigned to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permission_ids: Vec<EntityId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub permission_ids: Vec<EntityId>,
}

impl Resource for Role {
    const PATH: &'static str = "roles";
    const NAME: &'static str = "role";
    const NOUN: &'static str = "roles";
    const EDITABLE_FIELDS: &'static [&'static str] = &["name", "description", "permission_ids"];

    type Draft = RoleDraft;

    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}
