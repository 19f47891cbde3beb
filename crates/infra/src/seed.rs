//! Default roles for fresh installations and the in-memory backend.

use folio_auth::{HttpMethod, PermissionMatrix, Resource, RoleName, RoleRecord};
use folio_core::{AppError, AppResult, RoleId};

/// Default permission matrix per role.
///
/// Production deployments edit the stored matrices; nothing here is implied
/// at decision time.
pub fn default_role_permissions(role: RoleName) -> PermissionMatrix {
    let all = [Resource::USERS, Resource::PAGES, Resource::NAVIGATION_MENU];

    match role {
        RoleName::Admin => all.iter().fold(PermissionMatrix::new(), |m, resource| {
            HttpMethod::ALL
                .into_iter()
                .fold(m, |m, method| m.grant(resource, method))
        }),
        RoleName::Manager => {
            let m = PermissionMatrix::new().grant(&Resource::USERS, HttpMethod::Get);
            [Resource::PAGES, Resource::NAVIGATION_MENU]
                .iter()
                .fold(m, |m, resource| {
                    HttpMethod::ALL
                        .into_iter()
                        .fold(m, |m, method| m.grant(resource, method))
                })
        }
        RoleName::Editor => PermissionMatrix::new()
            .grant(&Resource::PAGES, HttpMethod::Get)
            .grant(&Resource::PAGES, HttpMethod::Post)
            .grant(&Resource::PAGES, HttpMethod::Patch),
    }
}

/// Stored form of the three default roles (ids 1..=3).
pub fn default_roles() -> AppResult<Vec<RoleRecord>> {
    [RoleName::Admin, RoleName::Manager, RoleName::Editor]
        .into_iter()
        .zip(1..)
        .map(|(name, id)| {
            Ok(RoleRecord {
                id: RoleId::new(id),
                name: name.as_str().to_string(),
                permissions: default_role_permissions(name)
                    .to_text()
                    .map_err(AppError::internal)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_holds_every_grant_explicitly() {
        let m = default_role_permissions(RoleName::Admin);
        for resource in [Resource::USERS, Resource::PAGES, Resource::NAVIGATION_MENU] {
            for method in HttpMethod::ALL {
                assert!(m.allows(&resource, method), "{resource} {method}");
            }
        }
    }

    #[test]
    fn editor_cannot_delete_or_manage_users() {
        let m = default_role_permissions(RoleName::Editor);
        assert!(m.allows(&Resource::PAGES, HttpMethod::Post));
        assert!(!m.allows(&Resource::PAGES, HttpMethod::Delete));
        assert!(!m.allows(&Resource::USERS, HttpMethod::Get));
    }

    #[test]
    fn default_roles_are_stored_as_parseable_text() {
        let roles = default_roles().unwrap();
        assert_eq!(roles.len(), 3);
        assert_eq!(roles[2].name, "editor");
        assert_eq!(roles[2].id, RoleId::new(3));
        for role in roles {
            PermissionMatrix::parse(&role.permissions).unwrap();
        }
    }
}
