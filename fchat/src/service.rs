//! Conversation orchestration: commands, budget trimming and tool dispatch
//! for one user message at a time.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use fchat::ChatService;
//! use fprovider::{
//!     Message, ModelProvider, ModelRequest, ModelResponse, OutputItem, ProviderError,
//!     ProviderFuture, StopReason, TokenUsage,
//! };
//!
//! #[derive(Debug)]
//! struct Parrot;
//!
//! impl ModelProvider for Parrot {
//!     fn complete<'a>(
//!         &'a self,
//!         request: ModelRequest,
//!     ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
//!         Box::pin(async move {
//!             let last = request.messages.last().map(|m| m.text().to_string()).unwrap_or_default();
//!             Ok(ModelResponse {
//!                 endpoint: "parrot".to_string(),
//!                 model: request.model,
//!                 output: vec![OutputItem::Message(Message::assistant(format!("you said {last}")))],
//!                 stop_reason: StopReason::EndTurn,
//!                 usage: TokenUsage::default(),
//!             })
//!         })
//!     }
//! }
//!
//! let runtime = tokio::runtime::Builder::new_current_thread()
//!     .build()
//!     .expect("runtime should build");
//! let service = ChatService::builder(Arc::new(Parrot)).build();
//!
//! let reply = runtime.block_on(service.converse("P100", "You are a helpful assistant.", "hello"));
//! assert_eq!(reply, "you said hello");
//! assert_eq!(service.store().snapshot("P100").map(|s| s.messages.len()), Some(3));
//! ```

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{FixedOffset, Utc};
use fcommon::{ConversationId, GenerationOptions, TraceId};
use fprovider::{Message, ModelProvider};
use ftooling::{DefaultToolRuntime, ToolRuntime};
use futures_util::FutureExt;

use crate::commands::{
    HELP_REPLY, RESET_CONVERSATION_REPLY, RESET_PERSONA_REPLY, SET_PERSONA_REPLY,
};
use crate::dispatch::DEFAULT_MAX_TOOL_ROUND_TRIPS;
use crate::{
    BudgetEvictor, ChatError, ChatRuntimeHooks, CostEstimator, DispatchRequest,
    NoopChatRuntimeHooks, ReservedCommand, SessionStore, ToolDispatchLoop,
};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_COST: usize = 3000;

const TIME_CONTEXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Per-service turn settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPolicy {
    pub model: String,
    pub max_cost: usize,
    pub max_tool_round_trips: usize,
    pub options: GenerationOptions,
    /// When set, every request carries the current time in this offset.
    pub time_context_offset: Option<FixedOffset>,
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_cost: DEFAULT_MAX_COST,
            max_tool_round_trips: DEFAULT_MAX_TOOL_ROUND_TRIPS,
            options: GenerationOptions::default(),
            time_context_offset: None,
        }
    }
}

#[derive(Clone)]
pub struct ChatService {
    store: Arc<SessionStore>,
    evictor: BudgetEvictor,
    dispatch: ToolDispatchLoop,
    hooks: Arc<dyn ChatRuntimeHooks>,
    policy: ChatPolicy,
    turns: Arc<AtomicU64>,
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("sessions", &self.store.len())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ChatService {
    pub fn builder(provider: Arc<dyn ModelProvider>) -> ChatServiceBuilder {
        ChatServiceBuilder::new(provider)
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn policy(&self) -> &ChatPolicy {
        &self.policy
    }

    /// Handles one inbound message and always produces reply text.
    ///
    /// Failures, including panics raised while the turn runs, are rendered
    /// with [`ChatError::user_message`] instead of reaching the caller.
    pub async fn converse(
        &self,
        conversation_id: impl Into<ConversationId>,
        preset: &str,
        user_text: &str,
    ) -> String {
        let conversation_id = conversation_id.into();
        let started = Instant::now();

        let turn = AssertUnwindSafe(self.try_converse(conversation_id.clone(), preset, user_text))
            .catch_unwind()
            .await;

        match turn {
            Ok(Ok(reply)) => reply,
            Ok(Err(error)) => error.user_message(),
            Err(_) => {
                let error = ChatError::store("conversation turn panicked");
                self.hooks
                    .on_turn_failure(&conversation_id, &error, started.elapsed());
                error.user_message()
            }
        }
    }

    /// Same as [`ChatService::converse`] but hands errors back to the caller.
    pub async fn try_converse(
        &self,
        conversation_id: impl Into<ConversationId>,
        preset: &str,
        user_text: &str,
    ) -> Result<String, ChatError> {
        let conversation_id = conversation_id.into();
        let started = Instant::now();

        let result = self.handle(&conversation_id, preset, user_text).await;
        if let Err(error) = &result {
            self.hooks
                .on_turn_failure(&conversation_id, error, started.elapsed());
        }
        result
    }

    async fn handle(
        &self,
        conversation_id: &ConversationId,
        preset: &str,
        user_text: &str,
    ) -> Result<String, ChatError> {
        if conversation_id.is_blank() {
            return Err(ChatError::invalid_argument(
                "conversation id must not be empty",
            ));
        }

        if user_text.trim().is_empty() {
            return Err(ChatError::invalid_argument("message text must not be empty"));
        }

        if let Some(command) = ReservedCommand::parse(user_text) {
            self.hooks.on_command(conversation_id, command.name());
            return self.run_command(conversation_id, preset, command);
        }

        self.run_turn(conversation_id, preset, user_text).await
    }

    fn run_command(
        &self,
        conversation_id: &ConversationId,
        preset: &str,
        command: ReservedCommand,
    ) -> Result<String, ChatError> {
        match command {
            ReservedCommand::ResetConversation => {
                self.store.reset(conversation_id)?;
                Ok(RESET_CONVERSATION_REPLY.to_string())
            }
            ReservedCommand::ResetPersona => {
                self.store.set_preset(conversation_id, preset)?;
                Ok(RESET_PERSONA_REPLY.to_string())
            }
            ReservedCommand::SetPersona(persona) => {
                if persona.is_empty() {
                    return Err(ChatError::invalid_argument("persona text must not be empty"));
                }
                self.store.set_preset(conversation_id, &persona)?;
                Ok(SET_PERSONA_REPLY.to_string())
            }
            ReservedCommand::Help => Ok(HELP_REPLY.to_string()),
        }
    }

    async fn run_turn(
        &self,
        conversation_id: &ConversationId,
        preset: &str,
        user_text: &str,
    ) -> Result<String, ChatError> {
        let started = Instant::now();
        let guard = self.store.begin_turn(conversation_id, preset).await?;
        self.hooks
            .on_turn_start(conversation_id, guard.history().len());

        let mut history = guard.history().to_vec();
        history.push(Message::user(user_text));

        let time_context = self.time_context();
        let context_cost = time_context
            .as_ref()
            .map(|message| self.evictor.estimator().message_cost(message))
            .unwrap_or_default();

        let trimmed = self
            .evictor
            .trim(history, self.policy.max_cost.saturating_sub(context_cost));
        if trimmed.removed > 0 {
            self.hooks
                .on_history_trimmed(conversation_id, trimmed.removed, trimmed.cost);
        }
        let mut history = trimmed.messages;

        let sequence = self.turns.fetch_add(1, Ordering::Relaxed) + 1;
        let request = DispatchRequest::new(conversation_id, self.policy.model.clone())
            .with_trace_id(TraceId::for_turn(conversation_id, sequence))
            .with_options(self.policy.options)
            .with_transient_context(time_context);
        let outcome = self.dispatch.run(&request, &mut history).await?;

        if !guard.commit(history)? {
            self.hooks.on_stale_commit_discarded(conversation_id);
        }

        self.hooks
            .on_turn_complete(conversation_id, outcome.round_trips, started.elapsed());
        Ok(outcome.reply)
    }

    fn time_context(&self) -> Option<Message> {
        let offset = self.policy.time_context_offset?;
        let now = Utc::now().with_timezone(&offset);
        Some(Message::system(format!(
            "current time is: {}",
            now.format(TIME_CONTEXT_FORMAT)
        )))
    }
}

pub struct ChatServiceBuilder {
    provider: Arc<dyn ModelProvider>,
    tools: Arc<dyn ToolRuntime>,
    store: Arc<SessionStore>,
    evictor: BudgetEvictor,
    hooks: Arc<dyn ChatRuntimeHooks>,
    policy: ChatPolicy,
}

impl ChatServiceBuilder {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            tools: Arc::new(DefaultToolRuntime::default()),
            store: Arc::new(SessionStore::new()),
            evictor: BudgetEvictor::default(),
            hooks: Arc::new(NoopChatRuntimeHooks),
            policy: ChatPolicy::default(),
        }
    }

    pub fn tool_runtime(mut self, tools: Arc<dyn ToolRuntime>) -> Self {
        self.tools = tools;
        self
    }

    pub fn store(mut self, store: Arc<SessionStore>) -> Self {
        self.store = store;
        self
    }

    pub fn estimator(mut self, estimator: Arc<dyn CostEstimator>) -> Self {
        self.evictor = BudgetEvictor::new(estimator);
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn ChatRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.policy.model = model.into();
        self
    }

    pub fn max_cost(mut self, max_cost: usize) -> Self {
        self.policy.max_cost = max_cost;
        self
    }

    pub fn max_tool_round_trips(mut self, max_tool_round_trips: usize) -> Self {
        self.policy.max_tool_round_trips = max_tool_round_trips;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.policy.options = self.policy.options.with_temperature(temperature);
        self
    }

    pub fn time_context_offset(mut self, offset: FixedOffset) -> Self {
        self.policy.time_context_offset = Some(offset);
        self
    }

    pub fn build(self) -> ChatService {
        let dispatch = ToolDispatchLoop::new(self.provider, self.tools)
            .with_hooks(Arc::clone(&self.hooks))
            .with_max_round_trips(self.policy.max_tool_round_trips);

        ChatService {
            store: self.store,
            evictor: self.evictor,
            dispatch,
            hooks: self.hooks,
            policy: self.policy,
            turns: Arc::new(AtomicU64::new(0)),
        }
    }
}
