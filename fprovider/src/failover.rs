//! Priority failover across the endpoint registry plus its operational hooks.
//!
//! The client keeps a cursor into the registry. Transient failures move the
//! cursor forward and retry the same request on the next endpoint. The cursor
//! never moves backwards, so a demoted endpoint stays demoted for as long as
//! the cursor lives. Callers that want independent failover domains give each
//! tenant its own [`FailoverCursor`].

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::{
    EndpointRegistry, EndpointTransport, FailureClass, ModelProvider, ModelRequest,
    ModelResponse, ProviderError, ProviderFuture,
};

pub trait ProviderOperationHooks: Send + Sync {
    fn on_attempt_start(&self, _endpoint: &str, _position: usize, _attempt: u32) {}

    fn on_failover(&self, _from: &str, _to: &str, _error: &ProviderError) {}

    fn on_success(&self, _endpoint: &str, _attempts: u32, _elapsed: Duration) {}

    fn on_failure(&self, _endpoint: &str, _attempts: u32, _error: &ProviderError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOperationHooks;

impl ProviderOperationHooks for NoopOperationHooks {}

/// Monotonic position into an [`EndpointRegistry`].
///
/// ```rust
/// use fprovider::FailoverCursor;
///
/// let cursor = FailoverCursor::new();
/// assert_eq!(cursor.advance_from(0), 1);
/// // A second caller that also saw position 0 does not skip endpoint 1.
/// assert_eq!(cursor.advance_from(0), 1);
/// assert_eq!(cursor.current(), 1);
/// ```
#[derive(Debug, Default)]
pub struct FailoverCursor {
    position: AtomicUsize,
}

impl FailoverCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(position: usize) -> Self {
        Self {
            position: AtomicUsize::new(position),
        }
    }

    pub fn current(&self) -> usize {
        self.position.load(Ordering::Acquire)
    }

    /// Moves the cursor one step past `observed` unless another caller already
    /// moved it. Returns the position the next attempt should use.
    pub fn advance_from(&self, observed: usize) -> usize {
        match self.position.compare_exchange(
            observed,
            observed + 1,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => observed + 1,
            Err(actual) => actual,
        }
    }
}

#[derive(Clone)]
pub struct FailoverClient {
    registry: Arc<EndpointRegistry>,
    transport: Arc<dyn EndpointTransport>,
    cursor: Arc<FailoverCursor>,
    hooks: Arc<dyn ProviderOperationHooks>,
}

impl std::fmt::Debug for FailoverClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailoverClient")
            .field("endpoints", &self.registry.len())
            .field("cursor", &self.cursor.current())
            .field("transport", &self.transport)
            .finish()
    }
}

impl FailoverClient {
    pub fn new(
        registry: Arc<EndpointRegistry>,
        transport: Arc<dyn EndpointTransport>,
        cursor: Arc<FailoverCursor>,
    ) -> Self {
        Self {
            registry,
            transport,
            cursor,
            hooks: Arc::new(NoopOperationHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    pub fn cursor(&self) -> usize {
        self.cursor.current()
    }

    pub async fn send(&self, request: ModelRequest) -> Result<ModelResponse, ProviderError> {
        request.validate()?;

        let started = Instant::now();
        let mut attempts = 0_u32;
        let mut position = self.cursor.current();

        loop {
            let Some(endpoint) = self.registry.get(position) else {
                return Err(ProviderError::endpoints_exhausted(format!(
                    "endpoint cursor {position} is past the last of {} endpoints",
                    self.registry.len()
                )));
            };

            attempts += 1;
            self.hooks
                .on_attempt_start(endpoint.label(), position, attempts);

            let outcome = match tokio::time::timeout(
                endpoint.timeout,
                self.transport.complete(endpoint, request.clone()),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(ProviderError::timeout(format!(
                    "endpoint '{}' did not respond within {:?}",
                    endpoint.label(),
                    endpoint.timeout
                ))),
            };

            let error = match outcome {
                Ok(response) => {
                    self.hooks
                        .on_success(endpoint.label(), attempts, started.elapsed());
                    return Ok(response);
                }
                Err(error) => error,
            };

            if error.failure_class() == FailureClass::Permanent {
                self.hooks.on_failure(endpoint.label(), attempts, &error);
                return Err(error);
            }

            if position >= self.registry.last_position() {
                let exhausted = ProviderError::endpoints_exhausted(format!(
                    "all {} endpoints failed; last error from '{}': {}",
                    self.registry.len(),
                    endpoint.label(),
                    error
                ));
                self.hooks.on_failure(endpoint.label(), attempts, &exhausted);
                return Err(exhausted);
            }

            let next = self.cursor.advance_from(position);
            let next_label = self
                .registry
                .get(next)
                .map(|endpoint| endpoint.label())
                .unwrap_or_default();
            self.hooks.on_failover(endpoint.label(), next_label, &error);
            position = next;
        }
    }
}

impl ModelProvider for FailoverClient {
    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(self.send(request))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use super::*;
    use crate::{Endpoint, Message, OutputItem, ProviderErrorKind, StopReason, TokenUsage};

    #[derive(Debug)]
    enum Scripted {
        Reply(&'static str),
        Fail(ProviderError),
        Hang,
    }

    #[derive(Debug, Default)]
    struct ScriptedTransport {
        scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn script(self, endpoint: &str, outcomes: Vec<Scripted>) -> Self {
            self.scripts
                .lock()
                .expect("scripts lock")
                .insert(endpoint.to_string(), outcomes.into());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    impl EndpointTransport for ScriptedTransport {
        fn complete<'a>(
            &'a self,
            endpoint: &'a Endpoint,
            request: ModelRequest,
        ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
            Box::pin(async move {
                self.calls
                    .lock()
                    .expect("calls lock")
                    .push(endpoint.name.clone());
                let next = self
                    .scripts
                    .lock()
                    .expect("scripts lock")
                    .get_mut(&endpoint.name)
                    .and_then(VecDeque::pop_front)
                    .unwrap_or(Scripted::Reply("default reply"));

                match next {
                    Scripted::Reply(text) => Ok(ModelResponse {
                        endpoint: endpoint.name.clone(),
                        model: request.model,
                        output: vec![OutputItem::Message(Message::assistant(text))],
                        stop_reason: StopReason::EndTurn,
                        usage: TokenUsage::default(),
                    }),
                    Scripted::Fail(error) => Err(error),
                    Scripted::Hang => std::future::pending().await,
                }
            })
        }
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl ProviderOperationHooks for RecordingHooks {
        fn on_failover(&self, from: &str, to: &str, error: &ProviderError) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("failover:{from}->{to}:{:?}", error.kind));
        }

        fn on_success(&self, endpoint: &str, attempts: u32, _elapsed: Duration) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("success:{endpoint}:{attempts}"));
        }

        fn on_failure(&self, endpoint: &str, attempts: u32, error: &ProviderError) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("failure:{endpoint}:{attempts}:{:?}", error.kind));
        }
    }

    fn registry(names: &[&str]) -> Arc<EndpointRegistry> {
        let endpoints = names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                Endpoint::new(format!("https://{name}.example/v1"), "sk", index as u32)
                    .with_name(*name)
                    .with_timeout(Duration::from_millis(50))
            })
            .collect();
        Arc::new(EndpointRegistry::new(endpoints).expect("registry should load"))
    }

    fn request() -> ModelRequest {
        ModelRequest::new("gpt-4o-mini", vec![Message::user("hello")])
    }

    #[tokio::test]
    async fn timeout_on_first_endpoint_fails_over_and_cursor_sticks() {
        let transport = Arc::new(ScriptedTransport::default().script(
            "primary",
            vec![Scripted::Fail(ProviderError::timeout("simulated timeout"))],
        ));
        let cursor = Arc::new(FailoverCursor::new());
        let client = FailoverClient::new(registry(&["primary", "backup"]), transport.clone(), cursor);

        let response = client.send(request()).await.expect("backup should answer");
        assert_eq!(response.endpoint, "backup");
        assert_eq!(client.cursor(), 1);

        let second = client.send(request()).await.expect("second send should work");
        assert_eq!(second.endpoint, "backup");
        assert_eq!(client.cursor(), 1);
        assert_eq!(transport.calls(), vec!["primary", "backup", "backup"]);
    }

    #[tokio::test]
    async fn unresponsive_endpoint_is_treated_as_timeout() {
        let transport = Arc::new(
            ScriptedTransport::default().script("primary", vec![Scripted::Hang]),
        );
        let hooks = Arc::new(RecordingHooks::default());
        let client = FailoverClient::new(
            registry(&["primary", "backup"]),
            transport,
            Arc::new(FailoverCursor::new()),
        )
        .with_hooks(hooks.clone());

        let response = client.send(request()).await.expect("backup should answer");
        assert_eq!(response.endpoint, "backup");

        let events = hooks.events.lock().expect("events lock").clone();
        assert_eq!(
            events,
            vec![
                "failover:primary->backup:Timeout".to_string(),
                "success:backup:2".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn credential_and_rate_limit_failures_advance_the_cursor() {
        let transport = Arc::new(
            ScriptedTransport::default()
                .script("a", vec![Scripted::Fail(ProviderError::authentication("revoked"))])
                .script("b", vec![Scripted::Fail(ProviderError::rate_limited("quota"))]),
        );
        let client = FailoverClient::new(
            registry(&["a", "b", "c"]),
            transport,
            Arc::new(FailoverCursor::new()),
        );

        let response = client.send(request()).await.expect("c should answer");
        assert_eq!(response.endpoint, "c");
        assert_eq!(client.cursor(), 2);
    }

    #[tokio::test]
    async fn permanent_failures_are_returned_without_advancing() {
        let transport = Arc::new(ScriptedTransport::default().script(
            "primary",
            vec![Scripted::Fail(ProviderError::invalid_request("unknown model"))],
        ));
        let client = FailoverClient::new(
            registry(&["primary", "backup"]),
            transport.clone(),
            Arc::new(FailoverCursor::new()),
        );

        let error = client.send(request()).await.expect_err("should surface error");
        assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
        assert_eq!(client.cursor(), 0);
        assert_eq!(transport.calls(), vec!["primary"]);
    }

    #[tokio::test]
    async fn transient_failure_on_last_endpoint_exhausts() {
        let transport = Arc::new(
            ScriptedTransport::default()
                .script("a", vec![Scripted::Fail(ProviderError::transport("refused"))])
                .script("b", vec![Scripted::Fail(ProviderError::transport("refused"))]),
        );
        let hooks = Arc::new(RecordingHooks::default());
        let client = FailoverClient::new(
            registry(&["a", "b"]),
            transport,
            Arc::new(FailoverCursor::new()),
        )
        .with_hooks(hooks.clone());

        let error = client.send(request()).await.expect_err("should exhaust");
        assert!(error.is_exhausted());
        assert!(error.message.contains("refused"));
        assert_eq!(client.cursor(), 1);

        let events = hooks.events.lock().expect("events lock").clone();
        assert_eq!(events.last(), Some(&"failure:b:2:EndpointsExhausted".to_string()));

        // The cursor stays on the last endpoint, which may recover later.
        let recovered = client.send(request()).await.expect("b recovers");
        assert_eq!(recovered.endpoint, "b");
    }

    #[tokio::test]
    async fn invalid_requests_never_reach_an_endpoint() {
        let transport = Arc::new(ScriptedTransport::default());
        let client = FailoverClient::new(
            registry(&["a"]),
            transport.clone(),
            Arc::new(FailoverCursor::new()),
        );

        let error = client
            .send(ModelRequest::new("gpt", Vec::new()))
            .await
            .expect_err("empty messages should fail");
        assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_failovers_advance_the_cursor_once() {
        let transport = Arc::new(ScriptedTransport::default().script(
            "a",
            (0..8)
                .map(|_| Scripted::Fail(ProviderError::transport("down")))
                .collect(),
        ));
        let client = FailoverClient::new(
            registry(&["a", "b", "c"]),
            transport,
            Arc::new(FailoverCursor::new()),
        );

        let mut handles = Vec::new();
        for _ in 0..8 {
            let client = client.clone();
            handles.push(tokio::spawn(async move { client.send(request()).await }));
        }

        for handle in handles {
            let response = handle
                .await
                .expect("task should join")
                .expect("b should answer");
            assert_eq!(response.endpoint, "b");
        }
        assert_eq!(client.cursor(), 1);
    }

    #[tokio::test]
    async fn shared_cursor_is_observed_by_every_client() {
        let cursor = Arc::new(FailoverCursor::starting_at(1));
        let client = FailoverClient::new(
            registry(&["a", "b"]),
            Arc::new(ScriptedTransport::default()),
            cursor.clone(),
        );

        let response = client
            .complete(request())
            .await
            .expect("completion should work");
        assert_eq!(response.endpoint, "b");
        assert_eq!(cursor.current(), 1);
    }
}
