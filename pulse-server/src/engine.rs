//! The conversational form engine.
//!
//! One call per inbound event: look up the user's session, apply the
//! current step's validator, advance, and answer with the prompts to
//! deliver. The terminal step hands the finalized report to the
//! repository and tears the session down whether or not the write
//! succeeds.

use std::sync::Arc;

use pulse_core::{validate, Command, FormSession, FormState, InboundEvent, Prompt};

use crate::repository::SubmissionRepository;
use crate::store::SessionStore;

/// Form engine shared by all connection tasks.
pub struct FormEngine {
    sessions: SessionStore,
    repository: Arc<dyn SubmissionRepository>,
}

impl FormEngine {
    /// Create an engine over a session store and a repository.
    pub fn new(sessions: SessionStore, repository: Arc<dyn SubmissionRepository>) -> Self {
        Self {
            sessions,
            repository,
        }
    }

    /// The session store, for the expiry sweeper.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Process one inbound event and return the prompts to deliver to the
    /// user. An empty reply means the event was ignored.
    pub async fn handle(&self, event: InboundEvent) -> Vec<Prompt> {
        if let Some(command) = event.command() {
            return self.handle_command(command, &event).await;
        }

        let Some(session) = self.sessions.get(event.user).await else {
            tracing::debug!(user = %event.user, "event without session ignored");
            return Vec::new();
        };

        self.advance(session, &event).await
    }

    /// Boundary commands, recognized in any state.
    async fn handle_command(&self, command: Command, event: &InboundEvent) -> Vec<Prompt> {
        match command {
            Command::Greet => {
                let name = event.full_name.as_deref().unwrap_or("волонтёр");
                if let Err(e) = self.repository.upsert_user(event.user, name).await {
                    tracing::error!(user = %event.user, error = %e, "volunteer upsert failed");
                }
                vec![Prompt::welcome(name)]
            }
            Command::Begin => {
                // Replaces any in-progress session; prior answers are discarded.
                self.sessions.put(FormSession::begin(event.user)).await;
                tracing::debug!(user = %event.user, "form started");
                vec![Prompt::category_menu()]
            }
        }
    }

    /// Apply the current step's validator and advance on success. Rejected
    /// input re-prompts the same step and leaves the session untouched.
    async fn advance(&self, mut session: FormSession, event: &InboundEvent) -> Vec<Prompt> {
        let text = event.text.as_deref().unwrap_or("");
        match session.state {
            FormState::ChoosingCategory => match validate::category(text) {
                Ok(slug) => {
                    session.draft.index_slug = Some(slug);
                    self.step_into(session, FormState::ChoosingLocation).await;
                    vec![Prompt::location_menu()]
                }
                Err(failure) => {
                    tracing::debug!(user = %event.user, %failure, "category rejected");
                    vec![Prompt::category_retry()]
                }
            },
            FormState::ChoosingLocation => match validate::location(text) {
                Ok(location) => {
                    session.draft.location_type = Some(location);
                    self.step_into(session, FormState::EnteringPrice).await;
                    vec![Prompt::price_request()]
                }
                Err(failure) => {
                    tracing::debug!(user = %event.user, %failure, "location rejected");
                    vec![Prompt::location_menu()]
                }
            },
            FormState::EnteringPrice => match validate::price(text) {
                Ok(price) => {
                    session.draft.price = Some(price);
                    self.step_into(session, FormState::UploadingPhoto).await;
                    vec![Prompt::photo_request()]
                }
                Err(failure) => {
                    tracing::debug!(user = %event.user, %failure, "price rejected");
                    vec![Prompt::price_retry()]
                }
            },
            FormState::UploadingPhoto => {
                match validate::photo(event.text.as_deref(), event.photo.as_deref()) {
                    Ok(photo_url) => {
                        let ack = if photo_url.is_some() {
                            Prompt::photo_accepted()
                        } else {
                            Prompt::photo_skipped()
                        };
                        session.draft.photo_url = photo_url;
                        vec![ack, self.commit(session).await]
                    }
                    Err(failure) => {
                        tracing::debug!(user = %event.user, %failure, "photo step rejected");
                        vec![Prompt::photo_retry()]
                    }
                }
            }
            // A stored session is never Idle or Completed.
            FormState::Idle | FormState::Completed => {
                tracing::error!(user = %event.user, state = ?session.state, "impossible session state");
                self.sessions.clear(event.user).await;
                Vec::new()
            }
        }
    }

    async fn step_into(&self, mut session: FormSession, next: FormState) {
        debug_assert!(session.state.can_transition_to(next));
        tracing::debug!(user = %session.user, from = ?session.state, to = ?next, "step");
        session.state = next;
        self.sessions.put(session).await;
    }

    /// Terminal step: build and persist the report. The session is gone
    /// afterwards regardless of the write's outcome, so a failed write
    /// loses the collected answers (current behavior, kept deliberately).
    async fn commit(&self, session: FormSession) -> Prompt {
        let user = session.user;
        self.sessions.clear(user).await;

        let submission = match session.draft.finalize(user) {
            Ok(submission) => submission,
            Err(e) => {
                tracing::error!(user = %user, error = %e, "draft finalization failed");
                return Prompt::save_failed(&e.to_string());
            }
        };

        match self.repository.insert_submission(&submission).await {
            Ok(()) => {
                tracing::info!(
                    user = %user,
                    id = %submission.id,
                    slug = %submission.index_slug,
                    price = submission.price,
                    "submission stored"
                );
                Prompt::saved(&submission)
            }
            Err(e) => {
                tracing::error!(user = %user, error = %e, "submission insert failed");
                Prompt::save_failed(&e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;
    use pulse_core::{IndexSlug, UserId, SKIP_PHOTO_LABEL};

    const USER: UserId = UserId(42);

    fn engine() -> (FormEngine, Arc<MemoryRepository>) {
        let repository = Arc::new(MemoryRepository::new());
        let engine = FormEngine::new(SessionStore::new(None), repository.clone());
        (engine, repository)
    }

    async fn send(engine: &FormEngine, text: &str) -> Vec<Prompt> {
        engine.handle(InboundEvent::text(USER, text)).await
    }

    #[tokio::test]
    async fn event_without_session_is_ignored() {
        let (engine, repository) = engine();

        assert!(send(&engine, "15000").await.is_empty());
        assert!(engine
            .handle(InboundEvent::photo(USER, "file_1"))
            .await
            .is_empty());

        assert_eq!(engine.sessions().len().await, 0);
        assert!(repository.submissions().await.is_empty());
    }

    #[tokio::test]
    async fn greet_upserts_once_per_user() {
        let (engine, repository) = engine();

        let mut event = InboundEvent::text(USER, "/start");
        event.full_name = Some("Анна Каримова".to_string());
        let replies = engine.handle(event.clone()).await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("Анна Каримова"));

        engine.handle(event).await;
        assert_eq!(repository.users().await.len(), 1);
        // Greeting never opens a session.
        assert_eq!(engine.sessions().len().await, 0);
    }

    #[tokio::test]
    async fn begin_opens_session_with_category_menu() {
        let (engine, _) = engine();

        let replies = send(&engine, "/submit").await;
        assert_eq!(replies, vec![Prompt::category_menu()]);

        let session = engine.sessions().get(USER).await.unwrap();
        assert_eq!(session.state, FormState::ChoosingCategory);
    }

    #[tokio::test]
    async fn valid_category_advances_and_stores_slug() {
        let (engine, _) = engine();
        send(&engine, "/submit").await;

        let replies = send(&engine, "🍓 Клубника / Яйцо").await;
        assert_eq!(replies, vec![Prompt::location_menu()]);

        let session = engine.sessions().get(USER).await.unwrap();
        assert_eq!(session.state, FormState::ChoosingLocation);
        assert_eq!(session.draft.index_slug, Some(IndexSlug::StrawberryEgg));
    }

    #[tokio::test]
    async fn every_catalog_label_is_accepted() {
        let (engine, _) = engine();

        for slug in IndexSlug::ALL {
            send(&engine, "/submit").await;
            let replies = send(&engine, slug.label()).await;
            assert_eq!(replies, vec![Prompt::location_menu()], "label {:?}", slug);

            let session = engine.sessions().get(USER).await.unwrap();
            assert_eq!(session.draft.index_slug, Some(slug));
        }
    }

    #[tokio::test]
    async fn unknown_category_reprompts_in_place() {
        let (engine, _) = engine();
        send(&engine, "/submit").await;

        let replies = send(&engine, "Клубника").await;
        assert_eq!(replies, vec![Prompt::category_retry()]);

        let session = engine.sessions().get(USER).await.unwrap();
        assert_eq!(session.state, FormState::ChoosingCategory);
        assert!(session.draft.index_slug.is_none());
    }

    #[tokio::test]
    async fn photo_during_location_step_reprompts() {
        let (engine, _) = engine();
        send(&engine, "/submit").await;
        send(&engine, "🥛 Молоко (Эко)").await;

        let replies = engine.handle(InboundEvent::photo(USER, "file_1")).await;
        assert_eq!(replies, vec![Prompt::location_menu()]);

        let session = engine.sessions().get(USER).await.unwrap();
        assert_eq!(session.state, FormState::ChoosingLocation);
        assert!(session.draft.location_type.is_none());
    }

    #[tokio::test]
    async fn bad_price_inputs_stay_on_price_step() {
        let (engine, _) = engine();
        send(&engine, "/submit").await;
        send(&engine, "🍛 Плов (Лень)").await;
        send(&engine, "🚚 Доставка").await;

        for bad in ["", "-15000", "15.000", "15 000", "сум", "15000сум"] {
            let replies = engine
                .handle(InboundEvent {
                    user: USER,
                    full_name: None,
                    text: Some(bad.to_string()),
                    photo: None,
                })
                .await;
            assert_eq!(replies, vec![Prompt::price_retry()], "input {bad:?}");

            let session = engine.sessions().get(USER).await.unwrap();
            assert_eq!(session.state, FormState::EnteringPrice);
            assert!(session.draft.price.is_none());
        }
    }

    #[tokio::test]
    async fn digit_price_is_stored_exactly() {
        let (engine, _) = engine();
        send(&engine, "/submit").await;
        send(&engine, "🎓 Репетитор").await;
        send(&engine, "🏫 Учебный центр").await;

        let replies = send(&engine, "250000").await;
        assert_eq!(replies, vec![Prompt::photo_request()]);

        let session = engine.sessions().get(USER).await.unwrap();
        assert_eq!(session.draft.price, Some(250000));
    }

    #[tokio::test]
    async fn restart_discards_partial_answers() {
        let (engine, _) = engine();
        send(&engine, "/submit").await;
        send(&engine, "🍓 Клубника / Яйцо").await;
        send(&engine, "🎪 Базар / Частник").await;

        let replies = send(&engine, "/submit").await;
        assert_eq!(replies, vec![Prompt::category_menu()]);

        let session = engine.sessions().get(USER).await.unwrap();
        assert_eq!(session.state, FormState::ChoosingCategory);
        assert_eq!(session.draft, Default::default());
        assert_eq!(engine.sessions().len().await, 1);
    }

    #[tokio::test]
    async fn full_flow_with_skip_commits_without_photo() {
        let (engine, repository) = engine();

        send(&engine, "/submit").await;
        send(&engine, "🍓 Клубника / Яйцо").await;
        send(&engine, "🎪 Базар / Частник").await;
        send(&engine, "15000").await;
        let replies = send(&engine, SKIP_PHOTO_LABEL).await;

        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0], Prompt::photo_skipped());
        assert!(replies[1].text.contains("Данные приняты"));
        assert!(replies[1].text.contains("strawberry_egg"));
        assert!(replies[1].text.contains("15000"));

        let submissions = repository.submissions().await;
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].user_id, USER);
        assert_eq!(submissions[0].index_slug, IndexSlug::StrawberryEgg);
        assert_eq!(submissions[0].location_type, "🎪 Базар / Частник");
        assert_eq!(submissions[0].price, 15000);
        assert!(submissions[0].photo_url.is_none());

        // Session is destroyed by the terminal step.
        assert!(engine.sessions().get(USER).await.is_none());
    }

    #[tokio::test]
    async fn full_flow_with_photo_stores_reference() {
        let (engine, repository) = engine();

        send(&engine, "/submit").await;
        send(&engine, "🥛 Молоко (Эко)").await;
        send(&engine, "🛒 Супермаркет (Korzinka)").await;
        send(&engine, "18000").await;
        let replies = engine.handle(InboundEvent::photo(USER, "AgACAgIAAxkB")).await;

        assert_eq!(replies[0], Prompt::photo_accepted());
        assert!(replies[1].text.contains("Данные приняты"));

        let submissions = repository.submissions().await;
        assert_eq!(submissions[0].photo_url.as_deref(), Some("AgACAgIAAxkB"));
        assert!(engine.sessions().get(USER).await.is_none());
    }

    #[tokio::test]
    async fn photo_step_rejects_plain_text() {
        let (engine, repository) = engine();

        send(&engine, "/submit").await;
        send(&engine, "🥛 Молоко (Эко)").await;
        send(&engine, "🛒 Супермаркет (Korzinka)").await;
        send(&engine, "18000").await;

        let replies = send(&engine, "вот фото").await;
        assert_eq!(replies, vec![Prompt::photo_retry()]);

        let session = engine.sessions().get(USER).await.unwrap();
        assert_eq!(session.state, FormState::UploadingPhoto);
        assert!(repository.submissions().await.is_empty());
    }

    #[tokio::test]
    async fn failed_insert_reports_and_destroys_session() {
        let (engine, repository) = engine();
        repository.fail_inserts_with("connection refused").await;

        send(&engine, "/submit").await;
        send(&engine, "🍓 Клубника / Яйцо").await;
        send(&engine, "🎪 Базар / Частник").await;
        send(&engine, "15000").await;
        let replies = send(&engine, SKIP_PHOTO_LABEL).await;

        assert!(replies[1].text.starts_with("Ошибка сохранения:"));
        assert!(replies[1].text.contains("connection refused"));
        assert!(repository.submissions().await.is_empty());

        // Collected data is gone; a fresh form starts cleanly.
        assert!(engine.sessions().get(USER).await.is_none());
        let replies = send(&engine, "/submit").await;
        assert_eq!(replies, vec![Prompt::category_menu()]);
    }

    #[tokio::test]
    async fn users_are_independent() {
        let (engine, repository) = engine();
        let other = UserId(7);

        send(&engine, "/submit").await;
        engine.handle(InboundEvent::text(other, "/submit")).await;
        send(&engine, "🍓 Клубника / Яйцо").await;

        let mine = engine.sessions().get(USER).await.unwrap();
        let theirs = engine.sessions().get(other).await.unwrap();
        assert_eq!(mine.state, FormState::ChoosingLocation);
        assert_eq!(theirs.state, FormState::ChoosingCategory);
        assert!(repository.submissions().await.is_empty());
    }
}
