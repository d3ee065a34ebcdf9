//! Bounded tool dispatch loop for a single user turn.
//!
//! The loop is an explicit state machine:
//!
//! ```text
//! Sent -> Completed
//! Sent -> ToolRequested -> ToolResolved -> Sent -> ...
//! Sent -> ToolRequested -> DepthExceeded
//! ```
//!
//! `ToolRequested` may be left through `ToolResolved` at most
//! `max_round_trips` times. The next tool request ends the turn in
//! `DepthExceeded`, which still produces a reply for the user.

use std::sync::Arc;

use fcommon::{ConversationId, GenerationOptions, TraceId};
use fprovider::{Message, ModelProvider, ModelRequest};
use ftooling::{ToolExecutionContext, ToolRuntime};

use crate::{ChatError, ChatRuntimeHooks, NoopChatRuntimeHooks};

pub const DEFAULT_MAX_TOOL_ROUND_TRIPS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Sent,
    ToolRequested,
    ToolResolved,
    Completed,
    DepthExceeded,
}

impl DispatchState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::DepthExceeded)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    pub reply: String,
    /// Every state visited, in order. The last entry is terminal.
    pub states: Vec<DispatchState>,
    pub round_trips: usize,
}

impl DispatchOutcome {
    pub fn final_state(&self) -> DispatchState {
        self.states.last().copied().unwrap_or(DispatchState::Sent)
    }
}

/// Per-turn request settings.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub conversation_id: ConversationId,
    pub trace_id: Option<TraceId>,
    pub model: String,
    pub options: GenerationOptions,
    /// Sent directly after the preset on every request, never stored.
    pub transient_context: Option<Message>,
}

impl DispatchRequest {
    pub fn new(conversation_id: impl Into<ConversationId>, model: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            trace_id: None,
            model: model.into(),
            options: GenerationOptions::default(),
            transient_context: None,
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_transient_context(mut self, message: Option<Message>) -> Self {
        self.transient_context = message;
        self
    }
}

#[derive(Clone)]
pub struct ToolDispatchLoop {
    provider: Arc<dyn ModelProvider>,
    tools: Arc<dyn ToolRuntime>,
    hooks: Arc<dyn ChatRuntimeHooks>,
    max_round_trips: usize,
}

impl ToolDispatchLoop {
    pub fn new(provider: Arc<dyn ModelProvider>, tools: Arc<dyn ToolRuntime>) -> Self {
        Self {
            provider,
            tools,
            hooks: Arc::new(NoopChatRuntimeHooks),
            max_round_trips: DEFAULT_MAX_TOOL_ROUND_TRIPS,
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ChatRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_max_round_trips(mut self, max_round_trips: usize) -> Self {
        self.max_round_trips = max_round_trips;
        self
    }

    pub fn max_round_trips(&self) -> usize {
        self.max_round_trips
    }

    /// Drives one turn to a terminal state.
    ///
    /// `history` must end with the user's message. Tool calls, their results
    /// and the final assistant reply are appended to it in order.
    pub async fn run(
        &self,
        request: &DispatchRequest,
        history: &mut Vec<Message>,
    ) -> Result<DispatchOutcome, ChatError> {
        let definitions = self.tools.definitions();
        let mut states = Vec::new();
        let mut round_trips = 0;

        loop {
            states.push(DispatchState::Sent);
            let model_request = build_request(request, history, &definitions);
            let response = self.provider.complete(model_request).await?;

            let Some(tool_call) = response.tool_call().cloned() else {
                let reply = response.text();
                if reply.trim().is_empty() {
                    return Err(ChatError::provider_permanent(format!(
                        "endpoint '{}' returned an empty reply",
                        response.endpoint
                    )));
                }
                history.push(Message::assistant(reply.clone()));
                states.push(DispatchState::Completed);
                return Ok(DispatchOutcome {
                    reply,
                    states,
                    round_trips,
                });
            };

            states.push(DispatchState::ToolRequested);
            if round_trips >= self.max_round_trips {
                let error = ChatError::depth_exceeded(format!(
                    "model requested tool '{}' after {} round trips",
                    tool_call.name, round_trips
                ));
                let reply = error.user_message();
                history.push(Message::assistant(reply.clone()));
                states.push(DispatchState::DepthExceeded);
                return Ok(DispatchOutcome {
                    reply,
                    states,
                    round_trips,
                });
            }

            round_trips += 1;
            history.push(Message::assistant_tool_call(tool_call.clone()));

            let mut context = ToolExecutionContext::new(request.conversation_id.clone())
                .with_round_trip(round_trips);
            if let Some(trace_id) = &request.trace_id {
                context = context.with_trace_id(trace_id.clone());
            }
            let result = self.tools.execute(tool_call.clone(), context).await;
            history.push(result.to_message());

            let error = result
                .is_error
                .then(|| ChatError::tool_unavailable(result.content()));
            self.hooks.on_tool_round_trip(
                &request.conversation_id,
                &tool_call.name,
                round_trips,
                error.as_ref(),
            );
            states.push(DispatchState::ToolResolved);
        }
    }
}

fn build_request(
    request: &DispatchRequest,
    history: &[Message],
    definitions: &[fprovider::ToolDefinition],
) -> ModelRequest {
    let mut messages = history.to_vec();
    if let Some(context) = &request.transient_context {
        let at = messages.len().min(1);
        messages.insert(at, context.clone());
    }

    let mut model_request = ModelRequest::new(request.model.clone(), messages)
        .with_tools(definitions.to_vec())
        .with_metadata("conversation_id", request.conversation_id.as_str());
    model_request.options = request.options;
    if let Some(trace_id) = &request.trace_id {
        model_request = model_request.with_metadata("trace_id", trace_id.as_str());
    }
    model_request
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use fprovider::{
        ModelResponse, OutputItem, ProviderError, ProviderFuture, Role, StopReason, TokenUsage,
        ToolCall, ToolDefinition, function_pairing_is_valid,
    };
    use ftooling::{DefaultToolRuntime, ToolRegistry};
    use serde_json::json;

    use super::*;
    use crate::ChatErrorKind;

    #[derive(Debug)]
    enum Step {
        Text(&'static str),
        Call(&'static str, &'static str),
        Fail(ProviderError),
    }

    #[derive(Debug, Default)]
    struct ScriptedProvider {
        steps: Mutex<VecDeque<Step>>,
        requests: Mutex<Vec<ModelRequest>>,
    }

    impl ScriptedProvider {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: Mutex::new(steps.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<ModelRequest> {
            self.requests.lock().expect("requests lock").clone()
        }
    }

    impl ModelProvider for ScriptedProvider {
        fn complete<'a>(
            &'a self,
            request: ModelRequest,
        ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
            Box::pin(async move {
                self.requests
                    .lock()
                    .expect("requests lock")
                    .push(request.clone());
                let step = self
                    .steps
                    .lock()
                    .expect("steps lock")
                    .pop_front()
                    .unwrap_or(Step::Text("fallback"));

                let output = match step {
                    Step::Text(text) => vec![OutputItem::Message(Message::assistant(text))],
                    Step::Call(name, arguments) => {
                        vec![OutputItem::ToolCall(ToolCall::new("call_0", name, arguments))]
                    }
                    Step::Fail(error) => return Err(error),
                };

                Ok(ModelResponse {
                    endpoint: "scripted".to_string(),
                    model: request.model,
                    output,
                    stop_reason: StopReason::EndTurn,
                    usage: TokenUsage::default(),
                })
            })
        }
    }

    fn echo_runtime() -> Arc<DefaultToolRuntime> {
        let mut registry = ToolRegistry::new();
        registry
            .register_sync_fn(
                ToolDefinition::new("echo", "Echoes", r#"{"type":"object"}"#),
                |args, _| Ok(json!({ "echo": args })),
            )
            .expect("echo should register");
        Arc::new(DefaultToolRuntime::new(Arc::new(registry)))
    }

    fn base_history() -> Vec<Message> {
        vec![Message::system("preset"), Message::user("go")]
    }

    #[tokio::test]
    async fn plain_reply_completes_immediately() {
        let provider = Arc::new(ScriptedProvider::new(vec![Step::Text("hi there")]));
        let dispatch = ToolDispatchLoop::new(provider.clone(), echo_runtime());
        let mut history = base_history();

        let outcome = dispatch
            .run(&DispatchRequest::new("P1", "gpt"), &mut history)
            .await
            .expect("turn should complete");

        assert_eq!(outcome.reply, "hi there");
        assert_eq!(outcome.states, vec![DispatchState::Sent, DispatchState::Completed]);
        assert_eq!(history.last(), Some(&Message::assistant("hi there")));
        assert_eq!(provider.requests()[0].tools.len(), 1);
    }

    #[tokio::test]
    async fn tool_round_trip_appends_call_and_result_then_resubmits() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Step::Call("echo", r#"{"text":"hello"}"#),
            Step::Text("done"),
        ]));
        let dispatch = ToolDispatchLoop::new(provider.clone(), echo_runtime());
        let mut history = base_history();

        let outcome = dispatch
            .run(&DispatchRequest::new("P1", "gpt"), &mut history)
            .await
            .expect("turn should complete");

        assert_eq!(outcome.reply, "done");
        assert_eq!(outcome.round_trips, 1);
        assert_eq!(
            outcome.states,
            vec![
                DispatchState::Sent,
                DispatchState::ToolRequested,
                DispatchState::ToolResolved,
                DispatchState::Sent,
                DispatchState::Completed,
            ]
        );
        assert_eq!(history.len(), 5);
        assert_eq!(history[3].role, Role::Function);
        assert_eq!(history[3].text(), r#"{"echo":{"text":"hello"}}"#);
        assert!(function_pairing_is_valid(&history));

        let second = &provider.requests()[1];
        assert_eq!(second.messages.len(), 4);
    }

    #[tokio::test]
    async fn endless_tool_requests_stop_at_the_depth_limit() {
        let provider = Arc::new(ScriptedProvider::new(
            (0..10).map(|_| Step::Call("echo", "{}")).collect(),
        ));
        let dispatch = ToolDispatchLoop::new(provider.clone(), echo_runtime()).with_max_round_trips(3);
        let mut history = base_history();

        let outcome = dispatch
            .run(&DispatchRequest::new("P1", "gpt"), &mut history)
            .await
            .expect("turn should end");

        assert_eq!(outcome.final_state(), DispatchState::DepthExceeded);
        assert_eq!(outcome.round_trips, 3);
        assert_eq!(provider.requests().len(), 4);
        assert!(outcome.reply.contains("unable to complete this request"));
        assert!(function_pairing_is_valid(&history));
        assert_eq!(history.last().map(|message| message.role), Some(Role::Assistant));
    }

    #[tokio::test]
    async fn provider_failure_propagates_as_chat_error() {
        let provider = Arc::new(ScriptedProvider::new(vec![Step::Fail(
            ProviderError::endpoints_exhausted("all endpoints failed"),
        )]));
        let dispatch = ToolDispatchLoop::new(provider, echo_runtime());
        let mut history = base_history();

        let error = dispatch
            .run(&DispatchRequest::new("P1", "gpt"), &mut history)
            .await
            .expect_err("turn should fail");
        assert_eq!(error.kind, ChatErrorKind::ProviderTransient);
        assert_eq!(history, base_history());
    }

    #[tokio::test]
    async fn blank_completion_fails_the_turn_instead_of_storing_it() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Step::Call("echo", "{}"),
            Step::Text("  \n"),
        ]));
        let dispatch = ToolDispatchLoop::new(provider, echo_runtime());
        let mut history = base_history();

        let error = dispatch
            .run(&DispatchRequest::new("P1", "gpt"), &mut history)
            .await
            .expect_err("blank reply should fail");

        assert_eq!(error.kind, ChatErrorKind::ProviderPermanent);
        assert!(error.message.contains("empty reply"));
        assert_eq!(history.len(), 4);
        assert_eq!(history.last().map(|message| message.role), Some(Role::Function));
    }

    #[tokio::test]
    async fn tool_context_carries_conversation_trace_and_round_trip() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let mut registry = ToolRegistry::new();
        registry
            .register_sync_fn(
                ToolDefinition::new("echo", "Echoes", r#"{"type":"object"}"#),
                move |args, context| {
                    recorder.lock().expect("seen lock").push(context);
                    Ok(args)
                },
            )
            .expect("echo should register");
        let provider = Arc::new(ScriptedProvider::new(vec![
            Step::Call("echo", "{}"),
            Step::Call("echo", "{}"),
            Step::Text("done"),
        ]));
        let dispatch =
            ToolDispatchLoop::new(provider, Arc::new(DefaultToolRuntime::new(Arc::new(registry))));
        let request = DispatchRequest::new("G5_200", "gpt").with_trace_id("G5_200-t1");

        dispatch
            .run(&request, &mut base_history())
            .await
            .expect("turn should complete");

        let seen = seen.lock().expect("seen lock").clone();
        let rounds = seen.iter().map(|context| context.round_trip).collect::<Vec<_>>();
        assert_eq!(rounds, vec![1, 2]);
        assert!(seen.iter().all(|context| context.conversation_id.as_str() == "G5_200"));
        assert!(
            seen.iter()
                .all(|context| context.trace_id.as_ref().map(|id| id.as_str()) == Some("G5_200-t1"))
        );
    }

    #[tokio::test]
    async fn transient_context_is_sent_but_not_kept() {
        let provider = Arc::new(ScriptedProvider::new(vec![Step::Text("ok")]));
        let dispatch = ToolDispatchLoop::new(provider.clone(), echo_runtime());
        let mut history = base_history();
        let request = DispatchRequest::new("P1", "gpt")
            .with_transient_context(Some(Message::system("current time is: 2024-01-01 08:00:00")));

        dispatch.run(&request, &mut history).await.expect("turn should complete");

        let sent = &provider.requests()[0].messages;
        assert_eq!(sent[1].text(), "current time is: 2024-01-01 08:00:00");
        assert_eq!(sent.len(), 3);
        assert_eq!(history.len(), 3);
        assert!(history.iter().all(|message| !message.text().starts_with("current time")));
    }
}
