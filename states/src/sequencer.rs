//! Latest-only request sequencing.
//!
//! A [`LatestOnly`] hands out monotonically increasing [`TaskId`]s per channel
//! and answers whether a given id is still the most recently issued one. A
//! result is only worth applying if its id is current; anything older was
//! superseded while it was in flight.

use std::collections::HashMap;

use ustr::Ustr;

use crate::TaskId;

#[derive(Debug, Default)]
pub struct LatestOnly {
    issued: HashMap<Ustr, u64>,
}

impl LatestOnly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new id on `channel`, superseding every earlier one.
    pub fn issue(&mut self, channel: impl Into<Ustr>) -> TaskId {
        let channel = channel.into();
        let generation = self.issued.entry(channel).or_insert(0);
        *generation += 1;
        TaskId::new(channel, *generation)
    }

    /// Returns true if `id` is the latest id issued on its channel.
    pub fn is_current(&self, id: TaskId) -> bool {
        self.issued.get(&id.channel()).copied() == Some(id.generation())
    }

    /// Supersedes whatever is in flight on `channel` without issuing a new task.
    pub fn invalidate(&mut self, channel: impl Into<Ustr>) {
        let generation = self.issued.entry(channel.into()).or_insert(0);
        *generation += 1;
    }

    /// The generation most recently issued on `channel` (0 if none).
    pub fn latest(&self, channel: impl Into<Ustr>) -> u64 {
        self.issued.get(&channel.into()).copied().unwrap_or(0)
    }
}
