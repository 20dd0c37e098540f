use serde::{Deserialize, Serialize};

use crate::resource::{EntityId, Resource};
use crate::sort::sort_license_types;

/// Driving licence category (B, C+E, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseType {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LicenseTypeDraft {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Resource for LicenseType {
    const PATH: &'static str = "license-types";
    const NAME: &'static str = "license type";
    const NOUN: &'static str = "license types";
    const EDITABLE_FIELDS: &'static [&'static str] = &["type", "description"];

    type Draft = LicenseTypeDraft;

    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> String {
        self.kind.clone()
    }

    fn arrange(items: &mut [Self]) {
        sort_license_types(items);
    }
}
