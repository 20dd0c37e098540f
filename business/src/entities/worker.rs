use serde::{Deserialize, Serialize};

use super::user::current;
use crate::resource::{EntityId, OptionScope, Resource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: EntityId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub employee_number: Option<String>,
    #[serde(default)]
    pub department_id: Option<EntityId>,
    #[serde(default)]
    pub department_name: Option<String>,
    #[serde(default)]
    pub company_id: Option<EntityId>,
    #[serde(default)]
    pub company_name: Option<String>,
}

impl Worker {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkerDraft {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<EntityId>,
}

impl Resource for Worker {
    const PATH: &'static str = "workers";
    const NAME: &'static str = "worker";
    const NOUN: &'static str = "workers";
    const EDITABLE_FIELDS: &'static [&'static str] = &[
        "first_name",
        "last_name",
        "employee_number",
        "department_id",
        "company_id",
    ];

    type Draft = WorkerDraft;

    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> String {
        self.full_name()
    }

    fn option_scopes(&self) -> Vec<OptionScope> {
        vec![
            OptionScope::new(
                "departments",
                "department_id",
                current(self.department_id, self.department_name.as_deref()),
            ),
            OptionScope::new(
                "companies",
                "company_id",
                current(self.company_id, self.company_name.as_deref()),
            ),
        ]
    }
}
