use strum_macros::EnumString;

/// Profile carried in the identity service's token.
#[derive(Debug, Copy, Clone, Eq, PartialEq, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Role {
    #[strum(serialize = "ADMIN")]
    Admin,
    #[strum(serialize = "ROOT")]
    Root,
    #[strum(serialize = "FUN")]
    Employee,
}

impl Role {
    pub fn from_claim(claim: &str) -> Option<Self> {
        claim.parse().ok()
    }

    pub fn is_manager(self) -> bool {
        matches!(self, Role::Admin | Role::Root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_identity_profiles() {
        assert_eq!(Role::from_claim("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::from_claim("root"), Some(Role::Root));
        assert_eq!(Role::from_claim("FUN"), Some(Role::Employee));
        assert_eq!(Role::from_claim("guest"), None);
        assert!(!Role::Employee.is_manager());
    }
}
