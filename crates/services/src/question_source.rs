use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::{LevelId, QuestionError, QuestionId, QuestionItem};
use quiz_core::{BankSource, QuestionBank};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_REMOTE_TIMEOUT, RemoteQuestionConfig};
use crate::error::QuestionSourceError;

/// Port for alternative question sets.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch the questions for `level`. An empty list is a valid answer.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError` if the source is disabled or unreachable.
    async fn fetch_questions(&self, level: LevelId)
    -> Result<Vec<QuestionItem>, QuestionSourceError>;
}

//
// ─── REMOTE SOURCE ─────────────────────────────────────────────────────────────
//

/// Reads questions from a hosted `quizzes` table over its REST interface.
#[derive(Clone)]
pub struct RemoteQuestionSource {
    client: Client,
    config: Option<RemoteQuestionConfig>,
}

impl RemoteQuestionSource {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(RemoteQuestionConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<RemoteQuestionConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.config
            .as_ref()
            .map_or(DEFAULT_REMOTE_TIMEOUT, |config| config.timeout)
    }
}

#[async_trait]
impl QuestionSource for RemoteQuestionSource {
    async fn fetch_questions(
        &self,
        level: LevelId,
    ) -> Result<Vec<QuestionItem>, QuestionSourceError> {
        let config = self.config.as_ref().ok_or(QuestionSourceError::Disabled)?;

        let url = format!(
            "{}/rest/v1/quizzes",
            config.base_url.as_str().trim_end_matches('/')
        );
        let response = self
            .client
            .get(url)
            .query(&[
                ("select", "*".to_string()),
                ("level_id", format!("eq.{level}")),
            ])
            .header("apikey", &config.api_key)
            .bearer_auth(&config.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(QuestionSourceError::HttpStatus(response.status()));
        }

        let records: Vec<serde_json::Value> = response.json().await?;
        Ok(map_records(records))
    }
}

/// Row shape of the hosted `quizzes` table.
#[derive(Debug, Deserialize)]
struct RemoteQuestionRecord {
    id: u64,
    question_text: String,
    options: Vec<String>,
    correct_answer_index: usize,
    #[serde(default)]
    rationale: Option<String>,
}

impl RemoteQuestionRecord {
    fn into_question(self) -> Result<QuestionItem, QuestionError> {
        QuestionItem::new(
            QuestionId::new(self.id),
            self.question_text,
            self.options,
            self.correct_answer_index,
            self.rationale.unwrap_or_default(),
        )
    }
}

/// Map raw rows one by one, dropping the malformed ones.
fn map_records(records: Vec<serde_json::Value>) -> Vec<QuestionItem> {
    let total = records.len();
    let questions: Vec<QuestionItem> = records
        .into_iter()
        .enumerate()
        .filter_map(|(row, value)| {
            let record = match serde_json::from_value::<RemoteQuestionRecord>(value) {
                Ok(record) => record,
                Err(err) => {
                    debug!(row, %err, "dropping unreadable question record");
                    return None;
                }
            };
            match record.into_question() {
                Ok(question) => Some(question),
                Err(err) => {
                    debug!(row, %err, "dropping invalid question record");
                    None
                }
            }
        })
        .collect();

    if questions.len() < total {
        debug!(kept = questions.len(), total, "filtered remote question records");
    }
    questions
}

//
// ─── STATIC SOURCE ─────────────────────────────────────────────────────────────
//

/// Serves a fixed list regardless of level.
#[derive(Debug, Clone, Default)]
pub struct StaticQuestionSource {
    questions: Vec<QuestionItem>,
}

impl StaticQuestionSource {
    #[must_use]
    pub fn new(questions: Vec<QuestionItem>) -> Self {
        Self { questions }
    }
}

#[async_trait]
impl QuestionSource for StaticQuestionSource {
    async fn fetch_questions(
        &self,
        _level: LevelId,
    ) -> Result<Vec<QuestionItem>, QuestionSourceError> {
        Ok(self.questions.clone())
    }
}

//
// ─── LOADER ────────────────────────────────────────────────────────────────────
//

/// A bank together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedBank {
    pub bank: QuestionBank,
    pub source: BankSource,
}

/// Turns a question source into a usable bank, never leaving the game without questions.
#[derive(Clone)]
pub struct QuestionBankLoader {
    source: Arc<dyn QuestionSource>,
    timeout: Duration,
}

impl QuestionBankLoader {
    #[must_use]
    pub fn new(source: Arc<dyn QuestionSource>) -> Self {
        Self {
            source,
            timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    /// Loader backed by the environment-configured remote source.
    #[must_use]
    pub fn from_env() -> Self {
        let remote = RemoteQuestionSource::from_env();
        let timeout = remote.timeout();
        Self::new(Arc::new(remote)).with_timeout(timeout)
    }

    /// Loader that always yields the built-in bank.
    #[must_use]
    pub fn builtin_only() -> Self {
        Self::new(Arc::new(StaticQuestionSource::default()))
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch from the source, bounded by the timeout.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError::Timeout` if the source does not answer in
    /// time, or the source's own error.
    pub async fn try_fetch(
        &self,
        level: LevelId,
    ) -> Result<Vec<QuestionItem>, QuestionSourceError> {
        tokio::time::timeout(self.timeout, self.source.fetch_questions(level))
            .await
            .map_err(|_| QuestionSourceError::Timeout {
                millis: self.timeout.as_millis(),
            })?
    }

    /// Fetch and build a bank, falling back to the built-in questions on
    /// error, timeout or an empty result.
    pub async fn load(&self, level: LevelId) -> LoadedBank {
        let fetched = match self.try_fetch(level).await {
            Ok(questions) => questions,
            Err(QuestionSourceError::Disabled) => {
                debug!("remote question source disabled");
                Vec::new()
            }
            Err(err) => {
                warn!(%err, %level, "remote questions unavailable, using built-in bank");
                Vec::new()
            }
        };

        let (bank, source) = QuestionBank::with_fallback(fetched);
        info!(%level, count = bank.count(), ?source, "question bank ready");
        LoadedBank { bank, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct SlowSource;

    #[async_trait]
    impl QuestionSource for SlowSource {
        async fn fetch_questions(
            &self,
            _level: LevelId,
        ) -> Result<Vec<QuestionItem>, QuestionSourceError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }
    }

    fn question(id: u64) -> QuestionItem {
        QuestionItem::new(
            QuestionId::new(id),
            format!("Remote {id}"),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            3,
            "remote rationale",
        )
        .unwrap()
    }

    #[test]
    fn malformed_records_are_dropped_individually() {
        let rows = vec![
            json!({
                "id": 10,
                "question_text": "Which sender is spoofed?",
                "options": ["a", "b", "c", "d"],
                "correct_answer_index": 2,
                "rationale": "look closely",
                "level_id": 2
            }),
            json!({ "id": 11, "question_text": "missing options" }),
            json!({
                "id": 12,
                "question_text": "bad index",
                "options": ["a", "b", "c", "d"],
                "correct_answer_index": 9
            }),
            json!({
                "id": -1,
                "question_text": "negative id",
                "options": ["a", "b", "c", "d"],
                "correct_answer_index": 0
            }),
            json!({
                "id": 13,
                "question_text": "no rationale",
                "options": ["a", "b", "c", "d"],
                "correct_answer_index": 0
            }),
        ];

        let questions = map_records(rows);
        let ids: Vec<u64> = questions.iter().map(|q| q.id().value()).collect();
        assert_eq!(ids, vec![10, 13]);
        assert_eq!(questions[1].rationale(), "");
    }

    #[tokio::test]
    async fn disabled_remote_source_reports_disabled() {
        let source = RemoteQuestionSource::new(None);
        assert!(!source.enabled());
        let err = source.fetch_questions(LevelId::new(2)).await.unwrap_err();
        assert!(matches!(err, QuestionSourceError::Disabled));
    }

    #[tokio::test]
    async fn empty_source_falls_back_to_builtin() {
        let loader = QuestionBankLoader::builtin_only();
        let loaded = loader.load(LevelId::new(2)).await;
        assert_eq!(loaded.source, BankSource::BuiltIn);
        assert_eq!(loaded.bank, QuestionBank::builtin());
    }

    #[tokio::test]
    async fn static_source_replaces_builtin() {
        let loader = QuestionBankLoader::new(Arc::new(StaticQuestionSource::new(vec![
            question(7),
            question(8),
            question(9),
        ])));
        let loaded = loader.load(LevelId::new(1)).await;
        assert_eq!(loaded.source, BankSource::Remote);
        assert_eq!(loaded.bank.count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_source_times_out_to_builtin() {
        let loader =
            QuestionBankLoader::new(Arc::new(SlowSource)).with_timeout(Duration::from_millis(50));

        let err = loader.try_fetch(LevelId::new(2)).await.unwrap_err();
        assert!(matches!(err, QuestionSourceError::Timeout { millis: 50 }));

        let loaded = loader.load(LevelId::new(2)).await;
        assert_eq!(loaded.source, BankSource::BuiltIn);
    }
}
