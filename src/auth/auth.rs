use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorForbidden,
    error::ErrorUnauthorized,
};
use futures::future::{Ready, ready};

use crate::{model::role::Role, models::Claims};

/// Caller identity, put into the request extensions by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    pub name: Option<String>,
    pub role: Role,
}

impl AuthUser {
    pub fn from_claims(claims: Claims) -> Option<Self> {
        let role = Role::from_claim(&claims.role)?;
        Some(Self {
            user_id: claims.sub,
            name: claims.name,
            role,
        })
    }

    /// Only ADMIN and ROOT profiles manage the employee directory.
    pub fn require_manager(&self) -> actix_web::Result<()> {
        if self.role.is_manager() {
            Ok(())
        } else {
            Err(ErrorForbidden("Admin only"))
        }
    }
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(ErrorUnauthorized("Missing token"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: &str) -> Claims {
        Claims {
            sub: "u1".into(),
            name: None,
            role: role.into(),
            exp: 0,
        }
    }

    #[test]
    fn profiles_map_to_roles() {
        assert_eq!(AuthUser::from_claims(claims("ROOT")).unwrap().role, Role::Root);
        assert_eq!(AuthUser::from_claims(claims("fun")).unwrap().role, Role::Employee);
        assert!(AuthUser::from_claims(claims("HR")).is_none());
    }

    #[test]
    fn only_managers_pass_the_manager_check() {
        assert!(AuthUser::from_claims(claims("ADMIN")).unwrap().require_manager().is_ok());
        assert!(AuthUser::from_claims(claims("FUN")).unwrap().require_manager().is_err());
    }
}
