//! Matching resolver
//!
//! Resolves crush declarations against the shared store: upsert the
//! declarer's single like row, look up the declared target, check
//! whether the target's own declaration points back, and if so record
//! the match on both sides exactly once.
//!
//! The upsert-check-mark sequence runs inside one SQLite transaction
//! and, within this process, under the resolver mutex. Two users racing
//! to complete the same pair therefore resolve one at a time: the
//! second declaration observes the first declarer's row and completes
//! the mutual condition, so the match forms - and notifies - under
//! exactly one of the two calls.

use std::sync::Arc;

use koimatch_common::db::{RegistrationStep, User};
use koimatch_common::notify::{NotificationKind, Notifier};
use koimatch_common::{validate, Error, Result};
use serde_json::{json, Value};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::db::{likes, users};

/// The three legitimate outcomes of resolving a declaration. The two
/// non-matching outcomes are not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// No registered user has the declared (name, birthday) identity
    TargetNotRegistered,
    /// The target exists but their declaration does not point back
    NotReciprocated,
    /// Mutual condition held; both sides recorded
    Matched {
        partner_id: String,
        partner_name: String,
    },
}

/// Result of [`MatchEngine::declare_crush`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclareOutcome {
    pub outcome: MatchOutcome,
    /// True when no prior like row existed before this declaration.
    /// Drives notification wording only.
    pub first_declaration: bool,
}

/// A notification selected during resolution, dispatched only after the
/// transaction commits
struct PendingNotification {
    user_id: String,
    kind: NotificationKind,
    params: Value,
}

/// Mutual-interest resolver operating against the shared store.
///
/// All mutation of `users.matched_with_user_id` and `likes.matched`
/// happens here, inside a transaction, serialized by `resolve_lock`.
pub struct MatchEngine {
    pool: SqlitePool,
    notifier: Arc<dyn Notifier>,
    resolve_lock: Mutex<()>,
}

impl MatchEngine {
    pub fn new(pool: SqlitePool, notifier: Arc<dyn Notifier>) -> Self {
        MatchEngine {
            pool,
            notifier,
            resolve_lock: Mutex::new(()),
        }
    }

    /// Record a crush declaration and resolve whether it completes a
    /// mutual match.
    ///
    /// Rejects self-declarations before any storage mutation. A matched
    /// user re-declaring their current partner is a no-op success; a
    /// matched user declaring someone else is first unmatched from
    /// their current partner, then resolved normally.
    pub async fn declare_crush(
        &self,
        declarer_id: &str,
        to_name: &str,
        to_birthday: &str,
    ) -> Result<DeclareOutcome> {
        let _guard = self.resolve_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let declarer = users::find_by_id(&mut *tx, declarer_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("user {}", declarer_id)))?;

        if declarer.step != RegistrationStep::Complete {
            return Err(Error::InvalidInput(
                "registration must be complete before declaring a crush".to_string(),
            ));
        }

        // Self-declaration guard, before the upsert: a user can never
        // even hold an active self-pointing declaration
        if declarer.identity_is(to_name, to_birthday) {
            return Err(Error::SelfDeclaration);
        }

        let prior = likes::find_by_declarer(&mut *tx, declarer_id).await?;
        let first_declaration = prior.is_none();
        let mut pending = Vec::new();

        if let Some(partner_id) = declarer.matched_with_user_id.clone() {
            let redeclares_current_match = prior
                .as_ref()
                .map(|like| like.matched && like.points_at(to_name, to_birthday))
                .unwrap_or(false);

            if redeclares_current_match {
                // Idempotent: already matched on this exact target.
                // No writes, no repeat notifications.
                let partner_name = users::find_by_id(&mut *tx, &partner_id)
                    .await?
                    .map(|partner| partner.name)
                    .unwrap_or_default();

                return Ok(DeclareOutcome {
                    outcome: MatchOutcome::Matched {
                        partner_id,
                        partner_name,
                    },
                    first_declaration: false,
                });
            }

            // Changing the declaration dissolves the current match first
            pending.extend(unmatch_in_tx(&mut tx, &declarer, &partner_id).await?);
        }

        likes::upsert(&mut *tx, declarer_id, to_name, to_birthday).await?;
        users::set_crush(&mut *tx, declarer_id, to_name, to_birthday).await?;

        let outcome = match users::find_by_name_and_birthday(&mut *tx, to_name, to_birthday).await? {
            None => MatchOutcome::TargetNotRegistered,
            Some(target) => {
                let reciprocal = likes::find_by_declarer(&mut *tx, &target.id)
                    .await?
                    .map(|like| like.points_at(&declarer.name, &declarer.birthday))
                    .unwrap_or(false);

                if reciprocal {
                    likes::set_matched(&mut *tx, declarer_id, true).await?;
                    likes::set_matched(&mut *tx, &target.id, true).await?;
                    users::set_matched_with(&mut *tx, declarer_id, Some(&target.id)).await?;
                    users::set_matched_with(&mut *tx, &target.id, Some(declarer_id)).await?;

                    pending.push(PendingNotification {
                        user_id: declarer_id.to_string(),
                        kind: NotificationKind::MatchFound,
                        params: json!({ "partner_name": target.name.clone() }),
                    });
                    pending.push(PendingNotification {
                        user_id: target.id.clone(),
                        kind: NotificationKind::MatchFound,
                        params: json!({ "partner_name": declarer.name.clone() }),
                    });

                    MatchOutcome::Matched {
                        partner_id: target.id,
                        partner_name: target.name,
                    }
                } else {
                    MatchOutcome::NotReciprocated
                }
            }
        };

        if !matches!(outcome, MatchOutcome::Matched { .. }) {
            let kind = if first_declaration {
                NotificationKind::CrushAcceptedFirstTime
            } else {
                NotificationKind::CrushAcceptedUpdate
            };
            pending.push(PendingNotification {
                user_id: declarer_id.to_string(),
                kind,
                params: json!({ "to_name": to_name }),
            });
        }

        tx.commit().await?;

        if let MatchOutcome::Matched { partner_id, .. } = &outcome {
            info!("Mutual match formed: {} <-> {}", declarer_id, partner_id);
        }

        self.dispatch(pending).await;

        Ok(DeclareOutcome {
            outcome,
            first_declaration,
        })
    }

    /// Create or update a user through the structured registration path.
    ///
    /// Enforces the katakana name rule and the birthday pattern. If the
    /// edit changes the identity of a currently-matched user, both sides
    /// of that match are dissolved first.
    pub async fn register_self(&self, user_id: &str, name: &str, birthday: &str) -> Result<()> {
        if !validate::is_valid_kana_name(name) {
            return Err(Error::InvalidInput(
                "name must be 2-20 full-width katakana characters".to_string(),
            ));
        }
        if !validate::is_valid_birthday(birthday) {
            return Err(Error::InvalidInput(
                "birthday must match YYYY-MM-DD".to_string(),
            ));
        }

        let _guard = self.resolve_lock.lock().await;
        let mut tx = self.pool.begin().await?;
        let mut pending = Vec::new();

        match users::find_by_id(&mut *tx, user_id).await? {
            Some(existing) => {
                let identity_changed = !existing.identity_is(name, birthday);
                if identity_changed {
                    if let Some(partner_id) = existing.matched_with_user_id.clone() {
                        pending.extend(unmatch_in_tx(&mut tx, &existing, &partner_id).await?);
                    }
                }
                users::update_profile(&mut *tx, user_id, name, birthday, RegistrationStep::Complete)
                    .await?;
            }
            None => {
                let user = User {
                    id: user_id.to_string(),
                    name: name.to_string(),
                    birthday: birthday.to_string(),
                    step: RegistrationStep::Complete,
                    crush_name: None,
                    crush_birthday: None,
                    matched_with_user_id: None,
                };
                users::create(&mut *tx, &user).await?;
            }
        }

        tx.commit().await?;
        self.dispatch(pending).await;

        Ok(())
    }

    /// Dissolve the editor's current match, if any. Returns whether a
    /// match existed.
    pub async fn unmatch(&self, editor_id: &str) -> Result<bool> {
        let _guard = self.resolve_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let editor = users::find_by_id(&mut *tx, editor_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("user {}", editor_id)))?;

        let Some(partner_id) = editor.matched_with_user_id.clone() else {
            return Ok(false);
        };

        let pending = unmatch_in_tx(&mut tx, &editor, &partner_id).await?;
        tx.commit().await?;
        self.dispatch(pending).await;

        Ok(true)
    }

    /// Deliver selected notifications after commit. Single best-effort
    /// attempt each; failures are logged and never affect match state.
    async fn dispatch(&self, pending: Vec<PendingNotification>) {
        for notification in pending {
            if let Err(e) = self
                .notifier
                .notify(&notification.user_id, notification.kind, notification.params)
                .await
            {
                warn!(
                    "Failed to deliver {:?} notification to {}: {}",
                    notification.kind, notification.user_id, e
                );
            }
        }
    }
}

/// Clear a match on both sides within the caller's transaction.
///
/// Both users' back-references and both like rows are cleared together,
/// never one without the other. Wording is asymmetric: the editor is
/// told they caused the unmatch, the partner that the editor changed
/// their information.
async fn unmatch_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    editor: &User,
    partner_id: &str,
) -> Result<Vec<PendingNotification>> {
    let partner = users::find_by_id(&mut **tx, partner_id).await?;

    users::set_matched_with(&mut **tx, &editor.id, None).await?;
    users::set_matched_with(&mut **tx, partner_id, None).await?;
    likes::set_matched(&mut **tx, &editor.id, false).await?;
    likes::set_matched(&mut **tx, partner_id, false).await?;

    let partner_name = partner.map(|p| p.name).unwrap_or_default();

    Ok(vec![
        PendingNotification {
            user_id: editor.id.clone(),
            kind: NotificationKind::UnmatchedInitiator,
            params: json!({ "partner_name": partner_name }),
        },
        PendingNotification {
            user_id: partner_id.to_string(),
            kind: NotificationKind::UnmatchedPartner,
            params: json!({ "partner_name": editor.name.clone() }),
        },
    ])
}
