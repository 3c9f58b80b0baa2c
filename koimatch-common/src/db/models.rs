//! Database models

use serde::{Deserialize, Serialize};

/// Onboarding progress for free-text-driven registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationStep {
    /// Waiting for the user to send their display name
    AwaitingName,
    /// Name recorded, waiting for the birthday
    AwaitingBirthday,
    /// Registration complete; free-text input no longer drives onboarding
    Complete,
}

impl RegistrationStep {
    /// Decode the step ordinal stored in the database.
    /// Unknown ordinals are treated as step 0 so a corrupted row
    /// restarts onboarding instead of wedging the user.
    pub fn from_i64(value: i64) -> Self {
        match value {
            1 => RegistrationStep::AwaitingBirthday,
            2 => RegistrationStep::Complete,
            _ => RegistrationStep::AwaitingName,
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            RegistrationStep::AwaitingName => 0,
            RegistrationStep::AwaitingBirthday => 1,
            RegistrationStep::Complete => 2,
        }
    }
}

/// A registered (or registering) user, keyed by the stable external
/// messaging-platform identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// External identity, stable and unique
    pub id: String,
    /// Display name; empty until the name step completes
    pub name: String,
    /// Birthday as `YYYY-MM-DD` text; compared by equality, never parsed
    pub birthday: String,
    pub step: RegistrationStep,
    /// Most recently declared crush target (both present or both absent)
    pub crush_name: Option<String>,
    pub crush_birthday: Option<String>,
    /// Set exactly while a mutual match is active
    pub matched_with_user_id: Option<String>,
}

impl User {
    /// A brand new user at the start of chat onboarding
    pub fn new(id: impl Into<String>) -> Self {
        User {
            id: id.into(),
            name: String::new(),
            birthday: String::new(),
            step: RegistrationStep::AwaitingName,
            crush_name: None,
            crush_birthday: None,
            matched_with_user_id: None,
        }
    }

    /// Whether this user's own identity equals the given (name, birthday)
    /// pair. Exact string equality - no normalization.
    pub fn identity_is(&self, name: &str, birthday: &str) -> bool {
        self.name == name && self.birthday == birthday
    }

    pub fn is_matched(&self) -> bool {
        self.matched_with_user_id.is_some()
    }
}

/// A crush declaration. One row per declarer - re-declaring overwrites
/// in place, it never accumulates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub from_user_id: String,
    /// Declared target identity, compared by exact string equality
    pub to_name: String,
    pub to_birthday: String,
    /// True exactly when the mutual condition held at last resolution
    pub matched: bool,
}

impl Like {
    /// Whether this declaration points at the given (name, birthday) pair
    pub fn points_at(&self, name: &str, birthday: &str) -> bool {
        self.to_name == name && self.to_birthday == birthday
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_ordinal_round_trip() {
        for step in [
            RegistrationStep::AwaitingName,
            RegistrationStep::AwaitingBirthday,
            RegistrationStep::Complete,
        ] {
            assert_eq!(RegistrationStep::from_i64(step.as_i64()), step);
        }
    }

    #[test]
    fn unknown_step_ordinal_restarts_onboarding() {
        assert_eq!(
            RegistrationStep::from_i64(99),
            RegistrationStep::AwaitingName
        );
        assert_eq!(
            RegistrationStep::from_i64(-1),
            RegistrationStep::AwaitingName
        );
    }

    #[test]
    fn identity_comparison_is_exact() {
        let mut user = User::new("U1");
        user.name = "タナカハナコ".to_string();
        user.birthday = "1995-05-05".to_string();

        assert!(user.identity_is("タナカハナコ", "1995-05-05"));
        // No whitespace or script normalization
        assert!(!user.identity_is("タナカハナコ ", "1995-05-05"));
        assert!(!user.identity_is("たなかはなこ", "1995-05-05"));
    }
}
