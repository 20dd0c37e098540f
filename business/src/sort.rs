//! Client-side display order for lists the server returns unsorted.
//!
//! Both sorts are stable: rows with equal keys keep the order they arrived in.

use std::cmp::Reverse;

use crate::entities::{DriverCard, LicenseType};

/// By type, ascending.
pub fn sort_license_types(items: &mut [LicenseType]) {
    items.sort_by(|a, b| a.kind.cmp(&b.kind));
}

/// Active cards first, then most recently issued first.
pub fn sort_driver_cards(items: &mut [DriverCard]) {
    items.sort_by_key(|card| (Reverse(card.is_active), Reverse(card.issue_date)));
}
