use serenity::all::UserId;
use tracing::{debug, error};

use crate::models::{
    error::{CollaboratorError, GiveawayError},
    giveaway::{Giveaway, GiveawayId},
    presentation::Presentation,
};

use super::ports::Collaborators;

/// Attempts at writing entries before giving up on a contended giveaway.
const MAX_WRITE_ATTEMPTS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryToggle {
    pub joined: bool,
    pub entry_count: usize,
}

/// Opt-in/opt-out bookkeeping for a single giveaway.
///
/// Every call flips membership, so a double click from a flaky client leaves
/// the user where they started. Callers wanting join-only semantics have to
/// drop rapid repeats themselves.
#[derive(Clone)]
pub struct EntryRegistry {
    collaborators: Collaborators,
}

impl EntryRegistry {
    pub fn new(collaborators: Collaborators) -> Self {
        EntryRegistry { collaborators }
    }

    pub async fn toggle_entry(
        &self,
        id: &GiveawayId,
        user_id: UserId,
    ) -> Result<EntryToggle, GiveawayError> {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let mut giveaway = self.load(id).await?;
            if giveaway.ended {
                return Err(GiveawayError::AlreadyEnded(id.clone()));
            }
            self.check_eligibility(&giveaway, user_id).await?;

            let mut entries = giveaway.entries.clone();
            let joined = if entries.remove(&user_id) {
                false
            } else {
                entries.insert(user_id);
                true
            };

            let written = self
                .collaborators
                .repository
                .update_entries(id, &entries, giveaway.version)
                .await
                .map_err(|err| {
                    error!(
                        "Could not update entries for giveaway {}. Failed with error: {}",
                        id, err
                    );
                    GiveawayError::Persistence(err)
                })?;

            if !written {
                debug!(
                    "Entries for giveaway {} changed underneath user {} (attempt {})",
                    id, user_id, attempt
                );
                continue;
            }

            giveaway.entries = entries;
            giveaway.version += 1;
            let entry_count = giveaway.entries.len();

            self.refresh_counter(giveaway.clone()).await;
            if joined {
                if let Err(err) = self
                    .collaborators
                    .entry_hook
                    .on_join(&giveaway, user_id)
                    .await
                {
                    debug!(
                        "Entry hook for giveaway {} and user {} failed: {}",
                        id, user_id, err
                    );
                }
            }

            return Ok(EntryToggle {
                joined,
                entry_count,
            });
        }

        // The record either ended meanwhile or is heavily contended.
        let giveaway = self.load(id).await?;
        if giveaway.ended {
            return Err(GiveawayError::AlreadyEnded(id.clone()));
        }
        Err(GiveawayError::Persistence(CollaboratorError::Unavailable(
            format!("entries for giveaway {id} kept changing, try again"),
        )))
    }

    async fn load(&self, id: &GiveawayId) -> Result<Giveaway, GiveawayError> {
        match self.collaborators.repository.get(id).await {
            Ok(Some(giveaway)) => Ok(giveaway),
            Ok(None) => Err(GiveawayError::NotFound(id.clone())),
            Err(err) => {
                error!(
                    "Could not get giveaway {} from database. Failed with error: {}",
                    id, err
                );
                Err(GiveawayError::Persistence(err))
            }
        }
    }

    async fn check_eligibility(
        &self,
        giveaway: &Giveaway,
        user_id: UserId,
    ) -> Result<(), GiveawayError> {
        let Some(role_id) = giveaway.required_role_id else {
            return Ok(());
        };

        let denied = || GiveawayError::PermissionDenied {
            id: giveaway.id.clone(),
            user: user_id,
        };

        match self
            .collaborators
            .eligibility
            .member_has_role(giveaway.guild_id, user_id, role_id)
            .await
        {
            Ok(true) => Ok(()),
            Ok(false) => Err(denied()),
            Err(err) => {
                error!(
                    "Could not check role {} of user {} for giveaway {}. Failed with error: {}",
                    role_id, user_id, giveaway.id, err
                );
                Err(denied())
            }
        }
    }

    /// Renders from a fresh read: an end that committed after our entry write
    /// must not be painted over with the active view.
    async fn refresh_counter(&self, written: Giveaway) {
        let giveaway = match self.collaborators.repository.get(&written.id).await {
            Ok(Some(current)) => current,
            Ok(None) => written,
            Err(err) => {
                debug!(
                    "Could not re-read giveaway {} before refreshing its counter: {}",
                    written.id, err
                );
                written
            }
        };
        let presentation = if giveaway.ended {
            Presentation::ended(&giveaway)
        } else {
            Presentation::active(&giveaway)
        };

        if let Err(err) = self
            .collaborators
            .messaging
            .update_announcement(giveaway.channel_id, giveaway.message_id, &presentation)
            .await
        {
            error!(
                "Could not refresh entry count for giveaway {}. {}",
                giveaway.id,
                GiveawayError::Presentation(err)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use serenity::all::{RoleId, UserId};

    use crate::{
        models::{error::GiveawayError, giveaway::GiveawayId, presentation::Presentation},
        testing::{self, Harness},
    };

    #[tokio::test]
    async fn toggling_twice_restores_entries() {
        let harness = Harness::default();
        harness.repository.insert(testing::giveaway("g", &[1, 2]));
        let registry = harness.registry();
        let id: GiveawayId = "g".into();

        let first = registry.toggle_entry(&id, UserId::new(3)).await.unwrap();
        assert!(first.joined);
        assert_eq!(first.entry_count, 3);
        assert_eq!(harness.repository.stored("g").entries, testing::users(&[1, 2, 3]));

        let second = registry.toggle_entry(&id, UserId::new(3)).await.unwrap();
        assert!(!second.joined);
        assert_eq!(harness.repository.stored("g").entries, testing::users(&[1, 2]));
    }

    #[tokio::test]
    async fn ended_giveaway_rejects_entries() {
        let harness = Harness::default();
        let mut giveaway = testing::giveaway("g", &[1]);
        giveaway.ended = true;
        harness.repository.insert(giveaway);

        let result = harness.registry().toggle_entry(&"g".into(), UserId::new(2)).await;
        assert!(matches!(result, Err(GiveawayError::AlreadyEnded(_))));
        let result = harness.registry().toggle_entry(&"g".into(), UserId::new(1)).await;
        assert!(matches!(result, Err(GiveawayError::AlreadyEnded(_))));
        assert_eq!(harness.repository.stored("g").entries, testing::users(&[1]));
    }

    #[tokio::test]
    async fn missing_giveaway_is_not_found() {
        let harness = Harness::default();
        let result = harness
            .registry()
            .toggle_entry(&"missing".into(), UserId::new(1))
            .await;
        assert!(matches!(result, Err(GiveawayError::NotFound(_))));
    }

    #[tokio::test]
    async fn required_role_gates_entry() {
        let harness = Harness::default();
        let mut giveaway = testing::giveaway("g", &[]);
        giveaway.required_role_id = Some(RoleId::new(500));
        harness.repository.insert(giveaway);
        harness.discord.give_role(1, 500);
        let registry = harness.registry();

        let result = registry.toggle_entry(&"g".into(), UserId::new(3)).await;
        assert!(matches!(result, Err(GiveawayError::PermissionDenied { .. })));
        assert!(harness.repository.stored("g").entries.is_empty());

        let joined = registry.toggle_entry(&"g".into(), UserId::new(1)).await.unwrap();
        assert!(joined.joined);
    }

    #[tokio::test]
    async fn join_refreshes_counter_and_calls_hook_once() {
        let harness = Harness::default();
        harness.repository.insert(testing::giveaway("g", &[]));
        let registry = harness.registry();

        registry.toggle_entry(&"g".into(), UserId::new(9)).await.unwrap();
        registry.toggle_entry(&"g".into(), UserId::new(9)).await.unwrap();

        let updates = harness.discord.updates.lock().unwrap();
        assert_eq!(updates.len(), 2);
        assert!(updates[0].2.description.contains("Entries: 1"));
        assert!(updates[1].2.description.contains("Entries: 0"));
        assert_eq!(*harness.hook.joins.lock().unwrap(), vec![UserId::new(9)]);
    }

    #[tokio::test]
    async fn side_effect_failures_do_not_fail_the_toggle() {
        let harness = Harness::default();
        harness.repository.insert(testing::giveaway("g", &[]));
        harness.discord.fail_update.store(true, Ordering::SeqCst);
        harness.hook.fail.store(true, Ordering::SeqCst);

        let toggle = harness
            .registry()
            .toggle_entry(&"g".into(), UserId::new(4))
            .await
            .unwrap();
        assert!(toggle.joined);
        assert_eq!(harness.repository.stored("g").entries, testing::users(&[4]));
    }

    #[tokio::test]
    async fn persistence_failure_is_surfaced() {
        let harness = Harness::default();
        harness.repository.insert(testing::giveaway("g", &[]));
        harness.repository.fail_writes.store(true, Ordering::SeqCst);

        let result = harness.registry().toggle_entry(&"g".into(), UserId::new(4)).await;
        assert!(matches!(result, Err(GiveawayError::Persistence(_))));
        assert!(harness.discord.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn version_conflict_is_retried_against_fresh_state() {
        let harness = Harness::default();
        harness.repository.insert(testing::giveaway("g", &[1]));
        harness.repository.interfere_once.store(true, Ordering::SeqCst);

        let toggle = harness
            .registry()
            .toggle_entry(&"g".into(), UserId::new(2))
            .await
            .unwrap();
        assert!(toggle.joined);
        assert_eq!(harness.repository.stored("g").entries, testing::users(&[1, 2]));
    }

    #[tokio::test]
    async fn counter_refresh_keeps_an_end_that_landed_meanwhile() {
        let harness = Harness::default();
        harness.repository.insert(testing::giveaway("g", &[1]));
        *harness.repository.end_after_entry_write.lock().unwrap() = Some(vec![UserId::new(1)]);

        let toggle = harness
            .registry()
            .toggle_entry(&"g".into(), UserId::new(2))
            .await
            .unwrap();
        assert!(toggle.joined);

        let stored = harness.repository.stored("g");
        assert!(stored.ended);
        let updates = harness.discord.updates.lock().unwrap();
        let (_, _, rendered) = updates.last().unwrap();
        assert_eq!(*rendered, Presentation::ended(&stored));
        assert!(rendered.description.contains("<@1>"));
    }
}
