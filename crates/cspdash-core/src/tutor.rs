#![forbid(unsafe_code)]

//! Chat tutor boundary.
//!
//! The language model sits behind [`TutorBackend`]. A [`TutorSession`] owns
//! the transcript: it opens with a greeting, drops blank input, hands the
//! backend the system instruction plus prior history, and replaces any backend
//! failure with a fixed fallback reply so errors never reach the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::SystemTime;

use crate::problem::{Problem, ProblemCatalog};

pub const DEFAULT_GREETING: &str = "你好！我是你的 CSP-S 专属助教。我可以帮你理解算法、调试代码逻辑，或者讲解 T1-T4 的解题策略。今天想学点什么？";

pub const DEFAULT_FALLBACK: &str = "连接服务器出现问题，请稍后再试。";

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "你是一位精通中国 CSP-S (Certified Software Professional - Senior Group) 竞赛的专家助教。
请务必使用 **中文** 回答所有问题。

你的知识库包括：
- T1: 模拟、贪心、搜索、简单数学。（目标：快速准确，必须拿满分）
- T2: 动态规划(DP)、线段树、图论基础。（目标：拉开分差的关键）
- T3: 大模拟、高级图论、树形DP。
- T4: 高级数学、网络流、复杂数据结构。

教学风格：
- 鼓励但严谨。
- 代码块使用 Markdown 格式。
- 如果用户询问解题思路，先提供“状态转移方程”或“关键思路”，不要直接给出完整 C++ 代码，除非用户明确要求。
- 对于 DP 问题，重点解释状态定义和转移方程的推导过程。";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

impl ChatMessage {
    pub fn now(role: Role, text: impl Into<String>) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
        Self {
            role,
            text: text.into(),
            timestamp_ms,
        }
    }
}

#[derive(Debug, Error)]
pub enum TutorError {
    #[error("tutor backend unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("tutor backend returned an empty reply")]
    EmptyReply,

    #[error("tutor backend failed: {0}")]
    Backend(String),
}

pub trait TutorBackend {
    /// Produce the model's reply to `message` given the prior transcript.
    fn complete(
        &mut self,
        system_instruction: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, TutorError>;
}

/// Session texts. Loaded from the `[tutor]` config table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorConfig {
    pub greeting: String,
    pub fallback_message: String,
    pub system_instruction: String,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_owned(),
            fallback_message: DEFAULT_FALLBACK.to_owned(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_owned(),
        }
    }
}

#[derive(Debug)]
pub struct TutorSession<B> {
    backend: B,
    config: TutorConfig,
    messages: Vec<ChatMessage>,
}

impl<B: TutorBackend> TutorSession<B> {
    pub fn new(backend: B, config: TutorConfig) -> Self {
        let greeting = ChatMessage::now(Role::Model, config.greeting.clone());
        Self {
            backend,
            config,
            messages: vec![greeting],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Send a user message and return the model's reply, or `None` for blank
    /// input. Backend failures yield the fallback reply.
    pub fn send(&mut self, text: &str) -> Option<&ChatMessage> {
        if text.trim().is_empty() {
            return None;
        }
        let history_len = self.messages.len();
        self.messages.push(ChatMessage::now(Role::User, text));

        let reply = match self.backend.complete(
            &self.config.system_instruction,
            &self.messages[..history_len],
            text,
        ) {
            Ok(reply) if reply.trim().is_empty() => {
                tracing::warn!(error = %TutorError::EmptyReply, "tutor reply replaced by fallback");
                self.config.fallback_message.clone()
            }
            Ok(reply) => reply,
            Err(error) => {
                tracing::warn!(%error, "tutor reply replaced by fallback");
                self.config.fallback_message.clone()
            }
        };
        self.messages.push(ChatMessage::now(Role::Model, reply));
        self.messages.last()
    }
}

/// The "ask the tutor about this problem" opening message.
pub fn problem_prompt(problem: &Problem) -> String {
    format!(
        "I am working on {} ({}). The key insight is \"{}\". Can you explain the algorithm in more detail and give a hint without solving it completely?",
        problem.title, problem.tier, problem.key_insights
    )
}

/// Backend that answers from the local problem bank without a network.
///
/// Replies with the key insights of the first problem id named in the
/// message; anything else is reported as unavailable.
#[derive(Debug, Clone)]
pub struct OfflineTutor {
    catalog: ProblemCatalog,
}

impl OfflineTutor {
    pub fn new(catalog: ProblemCatalog) -> Self {
        Self { catalog }
    }
}

impl TutorBackend for OfflineTutor {
    fn complete(
        &mut self,
        _system_instruction: &str,
        _history: &[ChatMessage],
        message: &str,
    ) -> Result<String, TutorError> {
        let problem = message
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|word| !word.is_empty())
            .find_map(|word| self.catalog.find(word).ok())
            .ok_or_else(|| TutorError::Unavailable {
                reason: "offline tutor only answers questions naming a problem id".into(),
            })?;
        Ok(format!("{}\n\n{}", problem.title, problem.key_insights))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recording {
        calls: Vec<(String, usize, String)>,
        fail: bool,
    }

    impl TutorBackend for Recording {
        fn complete(
            &mut self,
            system_instruction: &str,
            history: &[ChatMessage],
            message: &str,
        ) -> Result<String, TutorError> {
            self.calls
                .push((system_instruction.to_owned(), history.len(), message.to_owned()));
            if self.fail {
                Err(TutorError::Backend("boom".into()))
            } else {
                Ok(format!("echo: {message}"))
            }
        }
    }

    #[test]
    fn session_opens_with_greeting() {
        let session = TutorSession::new(Recording::default(), TutorConfig::default());
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, Role::Model);
        assert_eq!(session.messages()[0].text, DEFAULT_GREETING);
        assert!(session.messages()[0].timestamp_ms > 0);
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut session = TutorSession::new(Recording::default(), TutorConfig::default());
        assert!(session.send("   \n").is_none());
        assert_eq!(session.messages().len(), 1);
        assert!(session.backend().calls.is_empty());
    }

    #[test]
    fn backend_sees_instruction_and_prior_history() {
        let mut session = TutorSession::new(Recording::default(), TutorConfig::default());
        let reply = session.send("hi").unwrap().text.clone();
        assert_eq!(reply, "echo: hi");
        session.send("again").unwrap();

        let calls = &session.backend().calls;
        assert_eq!(calls[0], (DEFAULT_SYSTEM_INSTRUCTION.to_owned(), 1, "hi".to_owned()));
        assert_eq!(calls[1].1, 3);
        let roles: Vec<Role> = session.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, [Role::Model, Role::User, Role::Model, Role::User, Role::Model]);
    }

    #[test]
    fn failures_become_the_fallback() {
        let backend = Recording {
            fail: true,
            ..Recording::default()
        };
        let config = TutorConfig {
            fallback_message: "offline".into(),
            ..TutorConfig::default()
        };
        let mut session = TutorSession::new(backend, config);
        assert_eq!(session.send("hi").unwrap().text, "offline");
        assert_eq!(session.messages().len(), 3);
    }

    #[test]
    fn prompt_names_title_tier_and_insight() {
        let catalog = ProblemCatalog::embedded().unwrap();
        let problem = catalog.find("P1090").unwrap();
        let prompt = problem_prompt(problem);
        assert!(prompt.starts_with("I am working on P1090 合并果子 (T1). The key insight is \""));
        assert!(prompt.ends_with("give a hint without solving it completely?"));
    }

    #[test]
    fn offline_tutor_answers_about_named_problems() {
        let catalog = ProblemCatalog::embedded().unwrap();
        let mut session = TutorSession::new(OfflineTutor::new(catalog), TutorConfig::default());
        let reply = session.send("How do I approach P1090?").unwrap();
        assert!(reply.text.starts_with("P1090 合并果子"));
        let reply = session.send("tell me a joke").unwrap();
        assert_eq!(reply.text, DEFAULT_FALLBACK);
    }
}
