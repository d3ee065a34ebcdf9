//! Cost estimation and oldest-first history eviction.
//!
//! ```rust
//! use fchat::{BudgetEvictor, CharCountEstimator, CostEstimator};
//! use fprovider::Message;
//!
//! let history = vec![
//!     Message::system("preset"),
//!     Message::user("an old question that no longer matters"),
//!     Message::assistant("an old answer"),
//!     Message::user("hello"),
//! ];
//!
//! let evictor = BudgetEvictor::default();
//! let trimmed = evictor.trim(history, 30);
//!
//! assert_eq!(trimmed.messages[0], Message::system("preset"));
//! assert_eq!(trimmed.messages.last(), Some(&Message::user("hello")));
//! assert!(trimmed.cost <= 30);
//! assert_eq!(CharCountEstimator.history_cost(&trimmed.messages), trimmed.cost);
//! ```

use std::sync::Arc;

use fprovider::{Message, Role};

pub const MESSAGE_OVERHEAD_COST: usize = 4;
pub const REPLY_PRIMING_COST: usize = 2;

/// Monotonic stand-in for the provider's input-size accounting.
pub trait CostEstimator: Send + Sync {
    fn message_cost(&self, message: &Message) -> usize;

    fn history_cost(&self, messages: &[Message]) -> usize {
        messages
            .iter()
            .map(|message| self.message_cost(message))
            .sum::<usize>()
            + REPLY_PRIMING_COST
    }
}

/// Counts characters where a tokenizer would count tokens.
#[derive(Debug, Default, Clone, Copy)]
pub struct CharCountEstimator;

impl CostEstimator for CharCountEstimator {
    fn message_cost(&self, message: &Message) -> usize {
        let content = message.text().chars().count();
        let name = message
            .name
            .as_deref()
            .map(|name| name.chars().count())
            .unwrap_or_default();
        let call = message
            .tool_call
            .as_ref()
            .map(|call| call.name.chars().count() + call.arguments.chars().count())
            .unwrap_or_default();

        MESSAGE_OVERHEAD_COST + content + name + call
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trimmed {
    pub messages: Vec<Message>,
    pub removed: usize,
    pub cost: usize,
}

#[derive(Clone)]
pub struct BudgetEvictor {
    estimator: Arc<dyn CostEstimator>,
}

impl Default for BudgetEvictor {
    fn default() -> Self {
        Self::new(Arc::new(CharCountEstimator))
    }
}

impl std::fmt::Debug for BudgetEvictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BudgetEvictor").finish_non_exhaustive()
    }
}

impl BudgetEvictor {
    pub fn new(estimator: Arc<dyn CostEstimator>) -> Self {
        Self { estimator }
    }

    pub fn estimator(&self) -> &dyn CostEstimator {
        self.estimator.as_ref()
    }

    /// Removes the oldest non-preset messages until the history fits
    /// `max_cost`.
    ///
    /// Index 0 is never removed and removal stops once fewer than two
    /// non-preset messages remain, even if the budget is still exceeded. An
    /// assistant tool call is evicted together with the function results
    /// that follow it, so no function message is left without its call.
    pub fn trim(&self, mut messages: Vec<Message>, max_cost: usize) -> Trimmed {
        let mut cost = self.estimator.history_cost(&messages);
        let mut removed = 0;

        while cost > max_cost && messages.len().saturating_sub(1) >= 2 {
            let unit = eviction_unit_len(&messages);
            if unit >= messages.len() - 1 {
                break;
            }

            for message in messages.drain(1..1 + unit) {
                cost -= self.estimator.message_cost(&message);
                removed += 1;
            }
        }

        Trimmed {
            messages,
            removed,
            cost,
        }
    }
}

/// Number of messages starting at index 1 that must leave together.
fn eviction_unit_len(messages: &[Message]) -> usize {
    let Some(first) = messages.get(1) else {
        return 0;
    };

    let mut unit = 1;
    if first.tool_call.is_some() || first.role == Role::Function {
        while messages
            .get(1 + unit)
            .is_some_and(|message| message.role == Role::Function)
        {
            unit += 1;
        }
    }
    unit
}

#[cfg(test)]
mod tests {
    use fprovider::{ToolCall, function_pairing_is_valid};

    use super::*;

    fn cost_of(messages: &[Message]) -> usize {
        CharCountEstimator.history_cost(messages)
    }

    #[test]
    fn char_count_estimator_counts_content_name_and_call() {
        let plain = Message::user("héllo");
        assert_eq!(CharCountEstimator.message_cost(&plain), 4 + 5);

        let function = Message::function("search", "{}");
        assert_eq!(CharCountEstimator.message_cost(&function), 4 + 2 + 6);

        let call = Message::assistant_tool_call(ToolCall::new("c", "search", "{\"q\":1}"));
        assert_eq!(CharCountEstimator.message_cost(&call), 4 + 6 + 7);

        assert_eq!(cost_of(&[plain]), 9 + REPLY_PRIMING_COST);
    }

    #[test]
    fn within_budget_history_is_untouched() {
        let history = vec![Message::system("preset"), Message::user("hi")];
        let trimmed = BudgetEvictor::default().trim(history.clone(), 1_000);
        assert_eq!(trimmed.messages, history);
        assert_eq!(trimmed.removed, 0);
    }

    #[test]
    fn floor_stops_eviction_even_when_over_budget() {
        let history = vec![
            Message::system("a very long preset that alone blows the budget"),
            Message::assistant("older reply"),
            Message::user("latest question"),
        ];
        let trimmed = BudgetEvictor::default().trim(history, 5);

        assert_eq!(trimmed.messages.len(), 2);
        assert_eq!(trimmed.messages[1], Message::user("latest question"));
        assert!(trimmed.cost > 5);
    }

    #[test]
    fn tool_call_and_result_leave_together() {
        let history = vec![
            Message::system("p"),
            Message::user("old"),
            Message::assistant_tool_call(ToolCall::new("c0", "search_internet", "{}")),
            Message::function("search_internet", "{\"data\":\"lots of text here\"}"),
            Message::assistant("answer"),
            Message::user("new"),
        ];
        let budget = cost_of(&[Message::system("p"), Message::assistant("answer"), Message::user("new")]);

        let trimmed = BudgetEvictor::default().trim(history, budget);
        assert!(function_pairing_is_valid(&trimmed.messages));
        assert_eq!(
            trimmed.messages,
            vec![Message::system("p"), Message::assistant("answer"), Message::user("new")]
        );
        assert_eq!(trimmed.removed, 3);
    }

    #[test]
    fn pair_at_the_tail_is_not_split() {
        let history = vec![
            Message::system("p"),
            Message::assistant_tool_call(ToolCall::new("c0", "search_internet", "{}")),
            Message::function("search_internet", "{}"),
        ];
        let trimmed = BudgetEvictor::default().trim(history.clone(), 1);
        assert_eq!(trimmed.messages, history);
    }
}
