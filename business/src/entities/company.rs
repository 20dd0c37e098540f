use serde::{Deserialize, Serialize};

use crate::resource::{EntityId, Resource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompanyDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Resource for Company {
    const PATH: &'static str = "companies";
    const NAME: &'static str = "company";
    const NOUN: &'static str = "companies";
    const EDITABLE_FIELDS: &'static [&'static str] = &["name", "tax_id", "address"];

    type Draft = CompanyDraft;

    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}
