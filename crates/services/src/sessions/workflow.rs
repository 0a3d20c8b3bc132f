use std::sync::Arc;

use quiz_core::model::{FeedbackCatalog, LevelId, PlayerIdentity, SessionDefaults, SessionState};
use quiz_core::{BankSource, QuestionBank, ScoringEngine};
use storage::repository::IdentityRepository;
use tracing::info;

use super::service::QuizSession;
use crate::Clock;
use crate::identity_service::IdentityService;
use crate::question_source::{LoadedBank, QuestionBankLoader};

/// Orchestrates session start, bank loading and identity persistence.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    identity: IdentityService,
    loader: QuestionBankLoader,
    engine: ScoringEngine,
    feedback: FeedbackCatalog,
    defaults: SessionDefaults,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(clock: Clock, identities: Arc<dyn IdentityRepository>) -> Self {
        let defaults = SessionDefaults::default();
        Self {
            clock,
            identity: IdentityService::new(identities)
                .with_default_name(defaults.player_name.clone()),
            loader: QuestionBankLoader::builtin_only(),
            engine: ScoringEngine::default(),
            feedback: FeedbackCatalog::builtin(),
            defaults,
        }
    }

    #[must_use]
    pub fn with_loader(mut self, loader: QuestionBankLoader) -> Self {
        self.loader = loader;
        self
    }

    #[must_use]
    pub fn with_engine(mut self, engine: ScoringEngine) -> Self {
        self.engine = engine;
        self
    }

    #[must_use]
    pub fn with_feedback(mut self, feedback: FeedbackCatalog) -> Self {
        self.feedback = feedback;
        self
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: SessionDefaults) -> Self {
        self.identity = self
            .identity
            .with_default_name(defaults.player_name.clone());
        self.defaults = defaults;
        self
    }

    #[must_use]
    pub fn loader(&self) -> &QuestionBankLoader {
        &self.loader
    }

    /// Start a session on the built-in bank.
    ///
    /// The persisted identity is reused when available; `player_override`
    /// replaces the stored name. Never fails: persistence problems are logged
    /// and play continues.
    pub async fn start_session(&self, player_override: Option<&str>) -> QuizSession {
        self.start_with_bank(
            player_override,
            LoadedBank {
                bank: QuestionBank::builtin(),
                source: BankSource::BuiltIn,
            },
        )
        .await
    }

    /// Start a session after waiting for the question source.
    ///
    /// The wait is bounded by the loader's timeout; on timeout or failure the
    /// session uses the built-in bank.
    pub async fn start_session_with_remote(
        &self,
        player_override: Option<&str>,
        level: LevelId,
    ) -> QuizSession {
        let loaded = self.loader.load(level).await;
        self.start_with_bank(player_override, loaded).await
    }

    /// Fetch a bank for `level`, to be handed to `QuizSession::offer_bank`.
    pub async fn load_bank(&self, level: LevelId) -> LoadedBank {
        self.loader.load(level).await
    }

    /// Persist the session's identity. Returns whether it was stored.
    pub async fn finish_session(&self, session: &QuizSession) -> bool {
        let identity = session.identity();
        let saved = self.identity.save(&identity).await;
        info!(
            session_id = %identity.session_id(),
            score = session.state().score(),
            completed = session.is_complete(),
            saved,
            "quiz session finished"
        );
        saved
    }

    async fn start_with_bank(
        &self,
        player_override: Option<&str>,
        loaded: LoadedBank,
    ) -> QuizSession {
        let identity = self.resolve_identity(player_override).await;
        self.identity.save(&identity).await;

        info!(
            player = identity.player_name(),
            session_id = %identity.session_id(),
            questions = loaded.bank.count(),
            source = ?loaded.source,
            "quiz session started"
        );

        let state = SessionState::new(identity, &self.defaults, self.clock.now());
        QuizSession::new(
            state,
            loaded.bank,
            loaded.source,
            self.engine.clone(),
            self.feedback.clone(),
        )
    }

    async fn resolve_identity(&self, player_override: Option<&str>) -> PlayerIdentity {
        let identity = self.identity.load().await;
        match player_override.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => identity.with_player_name(name),
            None => identity,
        }
    }
}
