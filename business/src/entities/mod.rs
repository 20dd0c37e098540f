//! Entity catalogue of the admin API.
//!
//! Each entity is thin configuration over [`ResourceController`]: its
//! [`Resource`] impl names the collection and editable fields, and the
//! constructors below wire in the dropdown sources its foreign keys need.

mod company;
mod department;
mod driver_card;
mod license_type;
mod permission;
mod role;
mod user;
mod worker;

pub use company::{Company, CompanyDraft};
pub use department::{Department, DepartmentDraft};
pub use driver_card::{DriverCard, DriverCardDraft};
pub use license_type::{LicenseType, LicenseTypeDraft};
pub use permission::{Permission, PermissionDraft};
pub use role::{Role, RoleDraft};
pub use user::{User, UserDraft};
pub use worker::{Worker, WorkerDraft};

use crate::resource::{ApiClient, HttpOptionSource, HttpResourceApi, Resource, ResourceController};

/// Page size requested from paginated collections used as dropdowns.
pub const OPTION_LIST_SIZE: u32 = 100;

fn controller<T: Resource>(client: &ApiClient) -> ResourceController<T> {
    ResourceController::new(HttpResourceApi::<T>::new(client.clone()), client.config())
        .with_auth(client.auth().clone())
}

pub fn roles_source(client: &ApiClient) -> HttpOptionSource {
    HttpOptionSource::new(client.clone(), "roles", Role::PATH, &["name"])
        .with_query("size", OPTION_LIST_SIZE)
}

/// Workers not yet bound to a user account. The server adds `include_id`
/// back in even though it is assigned.
pub fn unassigned_workers_source(client: &ApiClient) -> HttpOptionSource {
    HttpOptionSource::new(
        client.clone(),
        "workers",
        "workers/unassigned",
        &["first_name", "last_name"],
    )
}

pub fn workers_source(client: &ApiClient) -> HttpOptionSource {
    HttpOptionSource::new(
        client.clone(),
        "workers",
        Worker::PATH,
        &["first_name", "last_name"],
    )
    .with_query("size", OPTION_LIST_SIZE)
}

pub fn departments_source(client: &ApiClient) -> HttpOptionSource {
    HttpOptionSource::new(client.clone(), "departments", Department::PATH, &["name"])
        .with_query("size", OPTION_LIST_SIZE)
}

pub fn companies_source(client: &ApiClient) -> HttpOptionSource {
    HttpOptionSource::new(client.clone(), "companies", Company::PATH, &["name"])
        .with_query("size", OPTION_LIST_SIZE)
}

pub fn users(client: &ApiClient) -> ResourceController<User> {
    controller(client)
        .with_option_source(roles_source(client))
        .with_option_source(unassigned_workers_source(client))
}

pub fn workers(client: &ApiClient) -> ResourceController<Worker> {
    controller(client)
        .with_option_source(departments_source(client))
        .with_option_source(companies_source(client))
}

pub fn roles(client: &ApiClient) -> ResourceController<Role> {
    controller(client)
}

pub fn permissions(client: &ApiClient) -> ResourceController<Permission> {
    controller(client)
}

pub fn companies(client: &ApiClient) -> ResourceController<Company> {
    controller(client)
}

pub fn departments(client: &ApiClient) -> ResourceController<Department> {
    controller(client).with_option_source(companies_source(client))
}

pub fn license_types(client: &ApiClient) -> ResourceController<LicenseType> {
    controller(client)
}

pub fn driver_cards(client: &ApiClient) -> ResourceController<DriverCard> {
    controller(client).with_option_source(workers_source(client))
}
