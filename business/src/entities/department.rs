use serde::{Deserialize, Serialize};

use super::user::current;
use crate::resource::{EntityId, OptionScope, Resource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub company_id: Option<EntityId>,
    #[serde(default)]
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DepartmentDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<EntityId>,
}

impl Resource for Department {
    const PATH: &'static str = "departments";
    const NAME: &'static str = "department";
    const NOUN: &'static str = "departments";
    const EDITABLE_FIELDS: &'static [&'static str] = &["name", "company_id"];

    type Draft = DepartmentDraft;

    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn option_scopes(&self) -> Vec<OptionScope> {
        vec![OptionScope::new(
            "companies",
            "company_id",
            current(self.company_id, self.company_name.as_deref()),
        )]
    }
}
