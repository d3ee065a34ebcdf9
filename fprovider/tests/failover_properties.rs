use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fprovider::{
    Endpoint, EndpointRegistry, EndpointTransport, FailoverClient, FailoverCursor, FailureClass,
    Message, ModelRequest, ModelResponse, OutputItem, ProviderError, ProviderFuture, StopReason,
    TokenUsage,
};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Ok,
    Timeout,
    Transport,
    Auth,
    RateLimited,
    Invalid,
    Unavailable,
}

impl Outcome {
    fn into_result(self, endpoint: &Endpoint) -> Result<ModelResponse, ProviderError> {
        match self {
            Self::Ok => Ok(ModelResponse {
                endpoint: endpoint.label().to_string(),
                model: "gpt".to_string(),
                output: vec![OutputItem::Message(Message::assistant("ok"))],
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            }),
            Self::Timeout => Err(ProviderError::timeout("slow")),
            Self::Transport => Err(ProviderError::transport("refused")),
            Self::Auth => Err(ProviderError::authentication("revoked")),
            Self::RateLimited => Err(ProviderError::rate_limited("quota")),
            Self::Invalid => Err(ProviderError::invalid_request("bad")),
            Self::Unavailable => Err(ProviderError::unavailable("502")),
        }
    }
}

#[derive(Debug)]
struct SequenceTransport {
    outcomes: Mutex<VecDeque<Outcome>>,
}

impl EndpointTransport for SequenceTransport {
    fn complete<'a>(
        &'a self,
        endpoint: &'a Endpoint,
        _request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        let outcome = self
            .outcomes
            .lock()
            .expect("outcomes lock")
            .pop_front()
            .unwrap_or(Outcome::Ok);
        Box::pin(async move { outcome.into_result(endpoint) })
    }
}

fn outcome_strategy() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        Just(Outcome::Ok),
        Just(Outcome::Timeout),
        Just(Outcome::Transport),
        Just(Outcome::Auth),
        Just(Outcome::RateLimited),
        Just(Outcome::Invalid),
        Just(Outcome::Unavailable),
    ]
}

proptest! {
    #[test]
    fn cursor_never_moves_backwards(
        endpoint_count in 1_usize..5,
        outcomes in proptest::collection::vec(outcome_strategy(), 0..40),
        sends in 1_usize..12,
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("runtime should build");

        let endpoints = (0..endpoint_count)
            .map(|index| {
                Endpoint::new(format!("https://e{index}.example/v1"), "sk", index as u32)
                    .with_name(format!("e{index}"))
                    .with_timeout(Duration::from_secs(1))
            })
            .collect();
        let registry = Arc::new(EndpointRegistry::new(endpoints).expect("registry should load"));
        let transport = Arc::new(SequenceTransport {
            outcomes: Mutex::new(outcomes.into()),
        });
        let client = FailoverClient::new(registry, transport, Arc::new(FailoverCursor::new()));

        let mut previous = client.cursor();
        for _ in 0..sends {
            let result = runtime.block_on(
                client.send(ModelRequest::new("gpt", vec![Message::user("hi")])),
            );
            let current = client.cursor();

            prop_assert!(current >= previous);
            prop_assert!(current < endpoint_count);
            if let Err(error) = result {
                prop_assert!(
                    error.is_exhausted() || error.failure_class() == FailureClass::Permanent
                );
            }
            previous = current;
        }
    }
}
