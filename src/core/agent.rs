//! Prospect agent: builds persona prompts and gets a quick reply from the
//! configured language model, falling back to [`HeuristicResponder`] when the
//! model errors, answers blank, or misses the reply deadline.

use crate::core::heuristic::HeuristicResponder;
use crate::core::prompt::{system_prompt, user_prompt};
use crate::domain::model::{ChatMessage, CompletionRequest, Persona, Scenario, Speaker, Turn};
use crate::domain::ports::LanguageModel;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_MAX_TOKENS: u32 = 120;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_HISTORY_TURNS: usize = 6;

#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Zero disables the deadline.
    pub reply_timeout: Duration,
    pub history_turns: usize,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            history_turns: DEFAULT_HISTORY_TURNS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Model,
    Heuristic,
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub source: ReplySource,
    pub latency: Duration,
}

pub struct ProspectAgent {
    model: Arc<dyn LanguageModel>,
    heuristic: HeuristicResponder,
    options: AgentOptions,
}

impl ProspectAgent {
    pub fn new(model: Arc<dyn LanguageModel>, options: AgentOptions) -> Self {
        Self {
            model,
            heuristic: HeuristicResponder::new(),
            options,
        }
    }

    pub fn with_heuristic(mut self, heuristic: HeuristicResponder) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    pub fn build_request(
        &self,
        rep_text: &str,
        scenario: &Scenario,
        persona: &Persona,
        history: &[Turn],
    ) -> CompletionRequest {
        let mut messages = vec![ChatMessage::system(system_prompt(scenario, persona))];

        let skip = history.len().saturating_sub(self.options.history_turns);
        for turn in &history[skip..] {
            messages.push(match turn.speaker {
                Speaker::Rep => ChatMessage::user(user_prompt(&turn.text)),
                Speaker::Ai => ChatMessage::assistant(turn.text.clone()),
            });
        }

        messages.push(ChatMessage::user(user_prompt(rep_text)));

        CompletionRequest {
            messages,
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
        }
    }

    /// `history` holds the turns before `rep_text`.
    pub async fn reply(
        &self,
        rep_text: &str,
        scenario: &Scenario,
        persona: &Persona,
        history: &[Turn],
    ) -> Reply {
        let request = self.build_request(rep_text, scenario, persona, history);
        tracing::debug!(
            "Asking {} for a {} reply ({} messages)",
            self.model.name(),
            persona,
            request.messages.len()
        );

        let started = Instant::now();
        let outcome = if self.options.reply_timeout.is_zero() {
            Some(self.model.complete(&request).await)
        } else {
            tokio::time::timeout(self.options.reply_timeout, self.model.complete(&request))
                .await
                .ok()
        };

        let text = match outcome {
            Some(Ok(text)) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Some(Ok(_)) => {
                tracing::warn!("⚠️ {} returned an empty reply, using heuristic", self.model.name());
                None
            }
            Some(Err(e)) => {
                tracing::warn!("⚠️ {} failed ({}), using heuristic", self.model.name(), e);
                None
            }
            None => {
                tracing::warn!(
                    "⚠️ {} missed the {:?} reply deadline, using heuristic",
                    self.model.name(),
                    self.options.reply_timeout
                );
                None
            }
        };

        let (text, source) = match text {
            Some(text) => (text, ReplySource::Model),
            None => (self.heuristic.reply(persona), ReplySource::Heuristic),
        };

        Reply {
            text,
            source,
            latency: started.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::heuristic::{ACKNOWLEDGEMENTS, OBJECTION_REPLIES};
    use crate::domain::model::ChatRole;
    use crate::utils::error::{Result, TrainerError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedModel {
        answer: Result<String>,
        delay: Duration,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedModel {
        fn answering(text: &str) -> Self {
            Self {
                answer: Ok(text.to_string()),
                delay: Duration::ZERO,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                answer: Err(TrainerError::provider("scripted", "boom")),
                delay: Duration::ZERO,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match &self.answer {
                Ok(text) => Ok(text.clone()),
                Err(_) => Err(TrainerError::provider("scripted", "boom")),
            }
        }
    }

    fn is_heuristic(text: &str) -> bool {
        OBJECTION_REPLIES.contains(&text) || ACKNOWLEDGEMENTS.contains(&text)
    }

    #[tokio::test]
    async fn test_model_reply_is_trimmed() {
        let model = Arc::new(ScriptedModel::answering("  We already have a CRM.  \n"));
        let agent = ProspectAgent::new(model.clone(), AgentOptions::default());

        let reply = agent
            .reply("Hi, do you have a minute?", &Scenario::ColdCall, &Persona::Rushed, &[])
            .await;

        assert_eq!(reply.text, "We already have a CRM.");
        assert_eq!(reply.source, ReplySource::Model);

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].max_tokens, 120);
        assert_eq!(seen[0].temperature, 0.7);
        assert_eq!(seen[0].messages.len(), 2);
        assert_eq!(seen[0].messages[0].role, ChatRole::System);
        assert_eq!(
            seen[0].messages[1].content,
            "Rep said: \"Hi, do you have a minute?\". Reply as the prospect."
        );
    }

    #[tokio::test]
    async fn test_provider_failure_falls_back_to_heuristic() {
        let agent = ProspectAgent::new(Arc::new(ScriptedModel::failing()), AgentOptions::default())
            .with_heuristic(HeuristicResponder::with_seed(3));

        let reply = agent
            .reply("Hello", &Scenario::ColdCall, &Persona::Annoyed, &[])
            .await;

        assert_eq!(reply.source, ReplySource::Heuristic);
        assert!(is_heuristic(&reply.text));
    }

    #[tokio::test]
    async fn test_blank_model_reply_falls_back_to_heuristic() {
        let agent = ProspectAgent::new(
            Arc::new(ScriptedModel::answering("   ")),
            AgentOptions::default(),
        );

        let reply = agent
            .reply("Hello", &Scenario::DemoCall, &Persona::Friendly, &[])
            .await;

        assert_eq!(reply.source, ReplySource::Heuristic);
    }

    #[tokio::test]
    async fn test_slow_model_misses_deadline() {
        let mut slow = ScriptedModel::answering("Eventually, yes.");
        slow.delay = Duration::from_millis(500);
        let options = AgentOptions {
            reply_timeout: Duration::from_millis(20),
            ..AgentOptions::default()
        };
        let agent = ProspectAgent::new(Arc::new(slow), options);

        let reply = agent
            .reply("Hello", &Scenario::RenewalCall, &Persona::Skeptical, &[])
            .await;

        assert_eq!(reply.source, ReplySource::Heuristic);
        assert!(reply.latency < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_history_is_limited_to_recent_turns() {
        let model = Arc::new(ScriptedModel::answering("Sure."));
        let options = AgentOptions {
            history_turns: 2,
            ..AgentOptions::default()
        };
        let agent = ProspectAgent::new(model.clone(), options);

        let history = vec![
            Turn::new(Speaker::Rep, "first"),
            Turn::new(Speaker::Ai, "Who is this?"),
            Turn::new(Speaker::Rep, "second"),
            Turn::new(Speaker::Ai, "Send me an email."),
        ];
        agent
            .reply("third", &Scenario::FollowUpCall, &Persona::Friendly, &history)
            .await;

        let seen = model.seen.lock().unwrap();
        let messages = &seen[0].messages;
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1].role, ChatRole::User);
        assert!(messages[1].content.contains("second"));
        assert_eq!(messages[2].role, ChatRole::Assistant);
        assert_eq!(messages[2].content, "Send me an email.");
        assert!(messages[3].content.contains("third"));
    }
}
