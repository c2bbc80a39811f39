//! Permission checking and access control.
//!
//! Handlers declare their requirement with the typed
//! [`RequiresPermission`] extractor:
//!
//! ```ignore
//! async fn list_lots(
//!     _perm: RequiresPermission<resource::Lots, operation::ReadOwn>,
//!     ...
//! ) -> Result<...> { ... }
//! ```
//!
//! Extraction authenticates the caller and rejects with 403 when none of
//! their roles grant the (resource, operation) pair. Admins pass every
//! check.

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    api::models::users::{CurrentUser, Role},
    errors::Error,
    types::{Operation, Permission, Resource},
    AppState,
};

/// Marker types naming protected resources
pub mod resource {
    pub struct Users;
    pub struct Lots;
    pub struct Reservations;
    pub struct Rates;
    pub struct Credits;
    pub struct TopUps;
    pub struct Dashboard;
}

/// Marker types naming operations on resources
pub mod operation {
    pub struct CreateAll;
    pub struct CreateOwn;
    pub struct ReadAll;
    pub struct ReadOwn;
    pub struct UpdateAll;
    pub struct UpdateOwn;
    pub struct DeleteAll;
}

/// Maps a resource marker type to its [`Resource`] value
pub trait ResourceMarker: Send + Sync {
    const RESOURCE: Resource;
}

/// Maps an operation marker type to its [`Operation`] value
pub trait OperationMarker: Send + Sync {
    const OPERATION: Operation;
}

macro_rules! resource_marker {
    ($($name:ident),* $(,)?) => {
        $(impl ResourceMarker for resource::$name {
            const RESOURCE: Resource = Resource::$name;
        })*
    };
}

macro_rules! operation_marker {
    ($($name:ident),* $(,)?) => {
        $(impl OperationMarker for operation::$name {
            const OPERATION: Operation = Operation::$name;
        })*
    };
}

resource_marker!(Users, Lots, Reservations, Rates, Credits, TopUps, Dashboard);
operation_marker!(CreateAll, CreateOwn, ReadAll, ReadOwn, UpdateAll, UpdateOwn, DeleteAll);

/// Whether a single role grants the (resource, operation) pair
fn role_allows(role: &Role, resource: Resource, operation: Operation) -> bool {
    use Operation::*;
    use Resource::*;

    match role {
        // Every account can manage its own bookings, money and profile,
        // and browse the lot inventory and rates
        Role::StandardUser => matches!(
            (resource, operation),
            (Users, ReadOwn | UpdateOwn)
                | (Lots, ReadOwn)
                | (Reservations, CreateOwn | ReadOwn)
                | (Rates, ReadOwn)
                | (Credits, ReadOwn)
                | (TopUps, CreateOwn | ReadOwn)
        ),
        // Lot managers run the physical inventory and the reservation book
        Role::LotManager => matches!(
            (resource, operation),
            (Lots, CreateAll | ReadAll | UpdateAll | DeleteAll)
                | (Reservations, ReadAll | UpdateAll | DeleteAll)
                | (Dashboard, ReadAll)
        ),
        // Billing managers review top-ups and steer pricing
        Role::BillingManager => matches!(
            (resource, operation),
            (Credits, ReadAll | CreateAll)
                | (TopUps, ReadAll | UpdateAll)
                | (Rates, CreateAll | ReadAll)
        ),
    }
}

/// Whether the user may perform `operation` on `resource`.
/// An `*All` grant also covers the matching `*Own` operation.
pub fn user_can(user: &CurrentUser, resource: Resource, operation: Operation) -> bool {
    if user.is_admin {
        return true;
    }

    let widened = match operation {
        Operation::CreateOwn => Some(Operation::CreateAll),
        Operation::ReadOwn => Some(Operation::ReadAll),
        Operation::UpdateOwn => Some(Operation::UpdateAll),
        _ => None,
    };

    user.roles.iter().any(|role| {
        role_allows(role, resource, operation) || widened.is_some_and(|op| role_allows(role, resource, op))
    })
}

/// Typed permission requirement, checked at extraction time.
///
/// Carries the authenticated user so handlers needing it do not have to
/// extract [`CurrentUser`] twice.
pub struct RequiresPermission<R, O> {
    pub user: CurrentUser,
    _marker: PhantomData<(R, O)>,
}

impl<R, O> FromRequestParts<AppState> for RequiresPermission<R, O>
where
    R: ResourceMarker,
    O: OperationMarker,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Error> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if !user_can(&user, R::RESOURCE, O::OPERATION) {
            return Err(Error::InsufficientPermissions {
                required: Permission::Allow(R::RESOURCE, O::OPERATION),
                action: O::OPERATION,
                resource: format!("{:?}", R::RESOURCE),
            });
        }

        Ok(Self {
            user,
            _marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user_with(roles: Vec<Role>, is_admin: bool) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            username: "perm".to_string(),
            email: "perm@example.com".to_string(),
            is_admin,
            roles,
            display_name: None,
        }
    }

    #[test]
    fn admin_passes_every_check() {
        let admin = user_with(vec![], true);
        assert!(user_can(&admin, Resource::Users, Operation::DeleteAll));
        assert!(user_can(&admin, Resource::Dashboard, Operation::ReadAll));
    }

    #[test]
    fn standard_user_is_scoped_to_own_resources() {
        let user = user_with(vec![Role::StandardUser], false);
        assert!(user_can(&user, Resource::Reservations, Operation::CreateOwn));
        assert!(user_can(&user, Resource::Credits, Operation::ReadOwn));
        assert!(user_can(&user, Resource::TopUps, Operation::CreateOwn));

        assert!(!user_can(&user, Resource::Reservations, Operation::ReadAll));
        assert!(!user_can(&user, Resource::Reservations, Operation::UpdateAll));
        assert!(!user_can(&user, Resource::Lots, Operation::CreateAll));
        assert!(!user_can(&user, Resource::Dashboard, Operation::ReadAll));
    }

    // Reservations are immutable to their reserver once booked; ending one
    // early is reserved to staff with the UpdateAll grant
    #[test]
    fn standard_user_cannot_update_reservations_even_their_own() {
        let user = user_with(vec![Role::StandardUser], false);
        assert!(!user_can(&user, Resource::Reservations, Operation::UpdateOwn));

        let manager = user_with(vec![Role::StandardUser, Role::LotManager], false);
        assert!(user_can(&manager, Resource::Reservations, Operation::UpdateOwn));
        assert!(user_can(&manager, Resource::Reservations, Operation::UpdateAll));
    }

    #[test]
    fn lot_manager_runs_lots_and_reservations() {
        let manager = user_with(vec![Role::StandardUser, Role::LotManager], false);
        assert!(user_can(&manager, Resource::Lots, Operation::CreateAll));
        assert!(user_can(&manager, Resource::Reservations, Operation::UpdateAll));
        assert!(user_can(&manager, Resource::Reservations, Operation::DeleteAll));
        assert!(user_can(&manager, Resource::Dashboard, Operation::ReadAll));

        assert!(!user_can(&manager, Resource::TopUps, Operation::UpdateAll));
        assert!(!user_can(&manager, Resource::Rates, Operation::CreateAll));
    }

    #[test]
    fn billing_manager_reviews_money() {
        let billing = user_with(vec![Role::StandardUser, Role::BillingManager], false);
        assert!(user_can(&billing, Resource::TopUps, Operation::UpdateAll));
        assert!(user_can(&billing, Resource::Credits, Operation::CreateAll));
        assert!(user_can(&billing, Resource::Rates, Operation::CreateAll));

        assert!(!user_can(&billing, Resource::Lots, Operation::UpdateAll));
        assert!(!user_can(&billing, Resource::Users, Operation::DeleteAll));
    }

    #[test]
    fn all_grant_covers_own_operation() {
        let billing = user_with(vec![Role::BillingManager], false);
        // ReadAll on credits implies reading your own balance
        assert!(user_can(&billing, Resource::Credits, Operation::ReadOwn));
    }
}
