use serde::{Deserialize, Serialize};

use crate::resource::{EntityId, Resource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermissionDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Resource for Permission {
    const PATH: &'static str = "permissions";
    const NAME: &'static str = "permission";
    const NOUN: &'static str = "permissions";
    const EDITABLE_FIELDS: &'static [&'static str] = &["name", "description"];

    type Draft = PermissionDraft;

    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}
