//! Inline edit session for a single table row.
//!
//! The session owns two copies of the entity: the snapshot taken when editing
//! started and the working copy the inputs write to. Only the working copy is
//! ever mutated, and only through [`RowEditSession::update_field`], which
//! round-trips through JSON so every write is type-checked against the
//! entity's own `Deserialize` impl.

use serde_json::Value;
use thiserror::Error;

use super::{EntityId, FieldChanges, Resource};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("`id` cannot be changed")]
    Immutable,
    #[error("field `{0}` is not editable")]
    NotEditable(String),
    #[error("invalid value for `{field}`: {message}")]
    InvalidValue { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPhase {
    /// Inputs are live.
    Editing,
    /// The working copy has been sent and the response is pending.
    Saving,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowEditSession<T: Resource> {
    entity_id: EntityId,
    working_copy: T,
    original_snapshot: T,
    phase: EditPhase,
    last_error: Option<String>,
}

impl<T: Resource> RowEditSession<T> {
    pub fn new(entity: &T) -> Self {
        Self {
            entity_id: entity.id(),
            working_copy: entity.clone(),
            original_snapshot: entity.clone(),
            phase: EditPhase::Editing,
            last_error: None,
        }
    }

    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    pub fn working_copy(&self) -> &T {
        &self.working_copy
    }

    pub fn original_snapshot(&self) -> &T {
        &self.original_snapshot
    }

    pub fn phase(&self) -> EditPhase {
        self.phase
    }

    /// Message of the last failed save, kept until the next attempt.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub(crate) fn mark_saving(&mut self) {
        self.phase = EditPhase::Saving;
        self.last_error = None;
    }

    pub(crate) fn mark_failed(&mut self, message: String) {
        self.phase = EditPhase::Editing;
        self.last_error = Some(message);
    }

    /// Writes `value` into `field` of the working copy.
    pub fn update_field(&mut self, field: &str, value: Value) -> Result<(), FieldError> {
        if field == "id" {
            return Err(FieldError::Immutable);
        }
        if !T::EDITABLE_FIELDS.contains(&field) {
            return Err(FieldError::NotEditable(field.to_owned()));
        }

        let invalid = |e: serde_json::Error| FieldError::InvalidValue {
            field: field.to_owned(),
            message: e.to_string(),
        };

        let mut object = match serde_json::to_value(&self.working_copy).map_err(invalid)? {
            Value::Object(object) => object,
            _ => {
                return Err(FieldError::InvalidValue {
                    field: field.to_owned(),
                    message: "entity does not serialize to an object".to_owned(),
                });
            }
        };
        object.insert(field.to_owned(), value);

        let updated: T = serde_json::from_value(Value::Object(object)).map_err(invalid)?;
        debug_assert_eq!(updated.id(), self.entity_id, "working copy id changed");
        self.working_copy = updated;
        Ok(())
    }

    /// Editable fields whose working value differs from the snapshot.
    pub fn changed_fields(&self) -> FieldChanges {
        let (Ok(Value::Object(working)), Ok(Value::Object(original))) = (
            serde_json::to_value(&self.working_copy),
            serde_json::to_value(&self.original_snapshot),
        ) else {
            return FieldChanges::new();
        };

        T::EDITABLE_FIELDS
            .iter()
            .filter_map(|field| {
                let value = working.get(*field)?;
                (original.get(*field) != Some(value)).then(|| ((*field).to_owned(), value.clone()))
            })
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        self.working_copy != self.original_snapshot
    }
}
