use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::user::current;
use crate::resource::{EntityId, OptionScope, Resource};
use crate::sort::sort_driver_cards;

/// Tachograph driver card issued to a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverCard {
    pub id: EntityId,
    pub card_number: String,
    #[serde(default)]
    pub worker_id: Option<EntityId>,
    #[serde(default)]
    pub worker_name: Option<String>,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_active: bool,
}

impl DriverCard {
    /// True once `today` is past the expiry date.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry < today)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DriverCardDraft {
    pub card_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    pub is_active: bool,
}

impl Resource for DriverCard {
    const PATH: &'static str = "driver-cards";
    const NAME: &'static str = "driver card";
    const NOUN: &'static str = "driver cards";
    const EDITABLE_FIELDS: &'static [&'static str] = &[
        "card_number",
        "worker_id",
        "issue_date",
        "expiry_date",
        "is_active",
    ];

    type Draft = DriverCardDraft;

    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> String {
        self.card_number.clone()
    }

    fn option_scopes(&self) -> Vec<OptionScope> {
        vec![OptionScope::new(
            "workers",
            "worker_id",
            current(self.worker_id, self.worker_name.as_deref()),
        )]
    }

    fn arrange(items: &mut [Self]) {
        sort_driver_cards(items);
    }
}
