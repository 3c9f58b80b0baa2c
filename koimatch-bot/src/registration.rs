//! Registration state machine
//!
//! Walks a user through chat onboarding: name, then birthday. Malformed
//! input is a normal branch - it produces a guidance reply and leaves the
//! user unmodified - never an error. Only storage failures are errors.
//!
//! A once-complete user is immutable to this machine; profile edits go
//! through the structured registration endpoint instead.

use koimatch_common::db::{RegistrationStep, User};
use koimatch_common::notify::{NotificationKind, Notifier};
use koimatch_common::validate::{is_valid_birthday, NAME_MAX_CHARS};
use koimatch_common::Result;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::warn;

use crate::db::users;

/// Guidance replies sent back over the chat channel. Rendering beyond
/// these fixed texts (rich messages, localization) is external.
pub mod replies {
    /// Step 0 re-prompt for empty or over-length input
    pub const NAME_PROMPT: &str = "お名前をカタカナで入力してください（2〜20文字）";
    /// Step 1 prompt, sent after the name is accepted
    pub const BIRTHDAY_PROMPT: &str =
        "誕生日を YYYY-MM-DD の形式で入力してください（例: 2000-01-15）";
    /// Step 1 re-prompt for input that does not match the date pattern
    pub const BIRTHDAY_REPROMPT: &str =
        "誕生日の形式が正しくありません。YYYY-MM-DD の形式で入力してください（例: 2000-01-15）";
    /// Sent when registration completes
    pub const COMPLETE: &str = "登録が完了しました！気になる相手を登録してみましょう";
    /// Step 2 users are outside this machine's scope
    pub const ALREADY_REGISTERED: &str = "登録は完了しています。相手の登録はメニューから行えます";
}

/// Result of feeding one inbound text to the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advanced {
    /// Reply text for the inbound message
    pub reply: String,
    /// Mutated user to persist; `None` means the input was rejected
    /// (or the user is already complete) and nothing changed
    pub user: Option<User>,
    /// True exactly when this input moved the user to step 2
    pub completed: bool,
}

impl Advanced {
    fn rejected(reply: &str) -> Self {
        Advanced {
            reply: reply.to_string(),
            user: None,
            completed: false,
        }
    }
}

/// Advance the state machine by one inbound text.
///
/// Pure transition: the caller persists the returned user. Input is
/// trimmed before evaluation; the stored name and birthday are the
/// trimmed text.
pub fn advance(user: &User, text: &str) -> Advanced {
    let input = text.trim();

    match user.step {
        RegistrationStep::AwaitingName => {
            if input.is_empty() || input.chars().count() > NAME_MAX_CHARS {
                return Advanced::rejected(replies::NAME_PROMPT);
            }

            let mut updated = user.clone();
            updated.name = input.to_string();
            updated.step = RegistrationStep::AwaitingBirthday;
            Advanced {
                reply: format!("{}さんですね！{}", input, replies::BIRTHDAY_PROMPT),
                user: Some(updated),
                completed: false,
            }
        }
        RegistrationStep::AwaitingBirthday => {
            if !is_valid_birthday(input) {
                return Advanced::rejected(replies::BIRTHDAY_REPROMPT);
            }

            let mut updated = user.clone();
            updated.birthday = input.to_string();
            updated.step = RegistrationStep::Complete;
            Advanced {
                reply: replies::COMPLETE.to_string(),
                user: Some(updated),
                completed: true,
            }
        }
        RegistrationStep::Complete => Advanced::rejected(replies::ALREADY_REGISTERED),
    }
}

/// Handle one inbound chat message for a user.
///
/// Creates the user lazily at step 0 on first contact, so the first
/// message a new user sends is consumed as their name input. Returns
/// the reply text to send back over the chat channel.
pub async fn handle_message(
    pool: &SqlitePool,
    notifier: &dyn Notifier,
    user_id: &str,
    text: &str,
) -> Result<String> {
    let user = match users::find_by_id(pool, user_id).await? {
        Some(user) => user,
        None => {
            let user = User::new(user_id);
            users::create(pool, &user).await?;
            user
        }
    };

    let advanced = advance(&user, text);

    if let Some(updated) = &advanced.user {
        users::update_profile(pool, user_id, &updated.name, &updated.birthday, updated.step)
            .await?;
    }

    if advanced.completed {
        // Best-effort single attempt; delivery failure never fails the message
        if let Err(e) = notifier
            .notify(user_id, NotificationKind::RegistrationFollowup, json!({}))
            .await
        {
            warn!("Failed to deliver registration followup to {}: {}", user_id, e);
        }
    }

    Ok(advanced.reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_at(step: RegistrationStep) -> User {
        let mut user = User::new("U1");
        if step != RegistrationStep::AwaitingName {
            user.name = "タナカハナコ".to_string();
        }
        if step == RegistrationStep::Complete {
            user.birthday = "1995-05-05".to_string();
        }
        user.step = step;
        user
    }

    #[test]
    fn empty_input_at_name_step_is_rejected_without_mutation() {
        let user = user_at(RegistrationStep::AwaitingName);

        for input in ["", "   ", "\n\t"] {
            let advanced = advance(&user, input);
            assert_eq!(advanced.reply, replies::NAME_PROMPT);
            assert!(advanced.user.is_none());
            assert!(!advanced.completed);
        }
    }

    #[test]
    fn over_length_name_is_rejected() {
        let user = user_at(RegistrationStep::AwaitingName);
        let advanced = advance(&user, &"ア".repeat(21));
        assert_eq!(advanced.reply, replies::NAME_PROMPT);
        assert!(advanced.user.is_none());
    }

    #[test]
    fn name_input_advances_to_birthday_step() {
        let user = user_at(RegistrationStep::AwaitingName);
        let advanced = advance(&user, " タナカハナコ ");

        let updated = advanced.user.expect("name accepted");
        assert_eq!(updated.name, "タナカハナコ");
        assert_eq!(updated.step, RegistrationStep::AwaitingBirthday);
        assert!(!advanced.completed);
        assert!(advanced.reply.contains("タナカハナコ"));
    }

    #[test]
    fn slash_date_is_rejected_at_birthday_step() {
        let user = user_at(RegistrationStep::AwaitingBirthday);
        let advanced = advance(&user, "2000/01/15");

        assert_eq!(advanced.reply, replies::BIRTHDAY_REPROMPT);
        assert!(advanced.user.is_none());
        assert!(!advanced.completed);
    }

    #[test]
    fn dashed_date_completes_registration() {
        let user = user_at(RegistrationStep::AwaitingBirthday);
        let advanced = advance(&user, "2000-01-15");

        let updated = advanced.user.expect("birthday accepted");
        assert_eq!(updated.birthday, "2000-01-15");
        assert_eq!(updated.step, RegistrationStep::Complete);
        assert!(advanced.completed);
        assert_eq!(advanced.reply, replies::COMPLETE);
    }

    #[test]
    fn complete_user_is_immutable_to_the_machine() {
        let user = user_at(RegistrationStep::Complete);
        let advanced = advance(&user, "2001-01-01");

        assert_eq!(advanced.reply, replies::ALREADY_REGISTERED);
        assert!(advanced.user.is_none());
        assert!(!advanced.completed);
    }
}
