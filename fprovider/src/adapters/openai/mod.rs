mod serde_api;
mod transport;

pub use transport::ChatCompletionsTransport;
