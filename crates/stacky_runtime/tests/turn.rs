mod common;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use common::{FakeGateway, FakeProvider, MemoryReader, drain, markdown_text, numbered_source, session};
use stacky_constant::messages;
use stacky_core::{ChatTurn, Scope, StackFrame, TurnEvent, Variable};
use stacky_runtime::{Assistant, CharEstimate, RuntimeConfig, RuntimeError, TokenCounter, TurnRequest};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn config() -> RuntimeConfig {
    RuntimeConfig::new(PathBuf::from("/ws"))
}

fn assistant(provider: Option<Arc<FakeProvider>>) -> Assistant {
    let reader = MemoryReader::new().with_file("/ws/main.rs", numbered_source(20));
    let assistant = Assistant::new(config(), Arc::new(reader));
    match provider {
        Some(provider) => assistant.with_provider(provider),
        None => assistant,
    }
}

async fn run(
    assistant: &Assistant,
    input: &str,
    history: &[ChatTurn],
) -> (stacky_runtime::Result<String>, Vec<TurnEvent>) {
    let (tx, mut rx) = mpsc::channel(64);
    let result = assistant
        .handle_turn(&TurnRequest::parse(input), history, None, &tx, CancellationToken::new())
        .await;
    (result, drain(&mut rx))
}

#[tokio::test]
async fn test_missing_command_returns_help() {
    let provider = Arc::new(FakeProvider::replying(&["unused"]));
    let assistant = assistant(Some(provider.clone()));

    let (result, events) = run(&assistant, "why is this broken?", &[]).await;

    assert_eq!(result.unwrap(), messages::INVALID_COMMAND);
    assert_eq!(
        events,
        vec![
            TurnEvent::progress(messages::THINKING),
            TurnEvent::markdown(messages::INVALID_COMMAND),
            TurnEvent::done(),
        ]
    );
    assert!(provider.last_request().is_none());
}

#[tokio::test]
async fn test_unknown_command_returns_help() {
    let assistant = assistant(Some(Arc::new(FakeProvider::replying(&["unused"]))));
    let (result, _) = run(&assistant, "/x what?", &[]).await;
    assert_eq!(result.unwrap(), messages::INVALID_COMMAND);
}

#[tokio::test]
async fn test_empty_prompt_returns_examples() {
    let assistant = assistant(Some(Arc::new(FakeProvider::replying(&["unused"]))));

    let (result, events) = run(&assistant, "/ch   ", &[]).await;

    assert_eq!(result.unwrap(), messages::EMPTY_PROMPT);
    assert_eq!(markdown_text(&events), messages::EMPTY_PROMPT);
}

#[tokio::test]
async fn test_no_model_emits_notice() {
    let assistant = assistant(None);

    let (result, events) = run(&assistant, "/c why?", &[]).await;

    assert_eq!(result.unwrap(), "");
    assert_eq!(
        events,
        vec![
            TurnEvent::progress(messages::THINKING),
            TurnEvent::notice(messages::NO_MODEL),
            TurnEvent::done(),
        ]
    );
}

#[tokio::test]
async fn test_streams_fragments_in_order() {
    let provider = Arc::new(FakeProvider::replying(&["The ", "loop ", "never ends."]));
    let assistant = assistant(Some(provider.clone()));

    let (result, events) = run(&assistant, "/h why?", &[]).await;

    assert_eq!(result.unwrap(), "The loop never ends.");
    assert_eq!(
        events,
        vec![
            TurnEvent::progress(messages::THINKING),
            TurnEvent::markdown("The "),
            TurnEvent::markdown("loop "),
            TurnEvent::markdown("never ends."),
            TurnEvent::done(),
        ]
    );

    let request = provider.last_request().unwrap();
    assert_eq!(request.model, "gpt-4o");
    assert_eq!(request.options.max_tokens, Some(2048));
    assert!(request.messages.iter().any(|m| m.content == "User Prompt: why?"));
}

#[tokio::test]
async fn test_context_command_without_session_notifies() {
    let provider = Arc::new(FakeProvider::replying(&["ok"]));
    let assistant = assistant(Some(provider.clone()));

    let (result, events) = run(&assistant, "/c what happened?", &[]).await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(events[1], TurnEvent::notice(messages::NO_ACTIVE_SESSION));

    let request = provider.last_request().unwrap();
    assert!(!request.messages.iter().any(|m| m.content.starts_with("Debug Context: ")));
}

#[tokio::test]
async fn test_context_command_includes_debug_context() {
    let gateway = Arc::new(
        FakeGateway::new(vec![StackFrame::new(11, "main", 4).with_path("/ws/main.rs")])
            .with_scopes(11, vec![Scope::new("Locals", 5)])
            .with_variables(5, vec![Variable::new("count", "-1")]),
    );
    let session = session(gateway, 1, 11);
    let provider = Arc::new(FakeProvider::replying(&["ok"]));
    let assistant = assistant(Some(provider.clone()));
    let (tx, mut rx) = mpsc::channel(64);

    let result = assistant
        .handle_turn(
            &TurnRequest::parse("/c why negative?"),
            &[],
            Some(&session),
            &tx,
            CancellationToken::new(),
        )
        .await;

    assert_eq!(result.unwrap(), "ok");
    assert!(!drain(&mut rx).contains(&TurnEvent::notice(messages::NO_ACTIVE_SESSION)));

    let request = provider.last_request().unwrap();
    let context = request
        .messages
        .iter()
        .find(|m| m.content.starts_with("Debug Context: "))
        .unwrap();
    assert!(context.content.contains("Stack Frame 1 \"main\" in \"/ws/main.rs:\""));
    assert!(context.content.contains("count = -1"));
    assert!(context.content.contains("4> | line 4"));
}

#[tokio::test]
async fn test_history_command_sends_history() {
    let provider = Arc::new(FakeProvider::replying(&["again"]));
    let assistant = assistant(Some(provider.clone()));
    let history = vec![
        ChatTurn::request(Some("c".to_string()), "first question"),
        ChatTurn::response("first answer"),
    ];

    let (result, _) = run(&assistant, "/h and now?", &history).await;
    assert_eq!(result.unwrap(), "again");

    let request = provider.last_request().unwrap();
    let block = request
        .messages
        .iter()
        .find(|m| m.content.starts_with("History: "))
        .unwrap();
    assert!(block.content.contains("Stacky: first answer"));
    assert!(block.content.contains("User: /c first question"));
}

#[tokio::test]
async fn test_off_topic_becomes_apology() {
    let provider = Arc::new(FakeProvider::failing("OpenAI API error 400: {\"code\":\"off_topic\"}"));
    let assistant = assistant(Some(provider));

    let (result, events) = run(&assistant, "/h tell me a joke", &[]).await;

    assert_eq!(result.unwrap(), messages::OFF_TOPIC);
    assert_eq!(markdown_text(&events), messages::OFF_TOPIC);
    assert_eq!(events.last(), Some(&TurnEvent::done()));
}

#[tokio::test]
async fn test_model_failure_surfaces_error() {
    let provider = Arc::new(FakeProvider::failing("OpenAI API error 429: rate limited"));
    let assistant = assistant(Some(provider));

    let (result, events) = run(&assistant, "/h why?", &[]).await;

    assert!(matches!(result, Err(RuntimeError::ModelRequest(_))));
    assert!(matches!(events.last(), Some(TurnEvent::Error { .. })));
}

#[tokio::test]
async fn test_cancel_stops_stream() {
    let provider = Arc::new(FakeProvider::replying(&["partial"]).hanging());
    let assistant = assistant(Some(provider));
    let (tx, mut rx) = mpsc::channel(64);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();

    let request = TurnRequest::parse("/h why?");
    let (result, _) = tokio::join!(
        assistant.handle_turn(&request, &[], None, &tx, cancel),
        async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        }
    );

    assert!(matches!(result, Err(RuntimeError::Cancelled)));
    let events = drain(&mut rx);
    assert_eq!(markdown_text(&events), "partial");
    assert!(!events.contains(&TurnEvent::done()));
}

#[tokio::test]
async fn test_cancelled_before_request_skips_model() {
    let provider = Arc::new(FakeProvider::replying(&["never"]));
    let assistant = assistant(Some(provider.clone()));
    let (tx, _rx) = mpsc::channel(64);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = assistant
        .handle_turn(&TurnRequest::parse("/h why?"), &[], None, &tx, cancel)
        .await;

    assert!(matches!(result, Err(RuntimeError::Cancelled)));
    assert!(provider.last_request().is_none());
}

#[tokio::test]
async fn test_input_budget_precedence() {
    let reader = Arc::new(MemoryReader::new());

    let none = Assistant::new(config(), reader.clone());
    assert_eq!(none.input_budget().await, 4096);

    let unknown = Assistant::new(config(), reader.clone())
        .with_provider(Arc::new(FakeProvider::replying(&[])));
    assert_eq!(unknown.input_budget().await, 4096);

    let reported = Assistant::new(config(), reader.clone())
        .with_provider(Arc::new(FakeProvider::replying(&[]).with_context_window(12_000)));
    assert_eq!(reported.input_budget().await, 12_000 - 2048);

    let overridden = Assistant::new(config().with_max_input_tokens(900), reader)
        .with_provider(Arc::new(FakeProvider::replying(&[]).with_context_window(12_000)));
    assert_eq!(overridden.input_budget().await, 900);
}

#[tokio::test]
async fn test_prompt_and_completion_fit_context_window() {
    let gateway = Arc::new(FakeGateway::new(
        (1..=5)
            .map(|i| StackFrame::new(i, format!("f{i}"), 1500).with_path("/ws/big.rs"))
            .collect(),
    ));
    let session = session(gateway, 1, 1);
    let reader = MemoryReader::new().with_file("/ws/big.rs", numbered_source(3000));
    let provider = Arc::new(FakeProvider::replying(&["ok"]).with_context_window(8_000));
    let assistant = Assistant::new(config(), Arc::new(reader)).with_provider(provider.clone());
    let history: Vec<ChatTurn> = (0..400)
        .map(|i| ChatTurn::response(format!("answer number {i} with a fair amount of detail")))
        .collect();
    let (tx, _rx) = mpsc::channel(64);

    let result = assistant
        .handle_turn(&TurnRequest::parse("/ch why?"), &history, Some(&session), &tx, CancellationToken::new())
        .await;
    assert_eq!(result.unwrap(), "ok");

    let request = provider.last_request().unwrap();
    let prompt_tokens: u32 = request
        .messages
        .iter()
        .map(|m| CharEstimate.count(&m.content) + CharEstimate.message_overhead())
        .sum();
    let max_tokens = request.options.max_tokens.unwrap();
    assert_eq!(max_tokens, 2048);
    assert!(prompt_tokens > 4_000, "prompt should fill most of the budget");
    assert!(prompt_tokens + max_tokens <= 8_000);
}

#[tokio::test]
async fn test_tiny_budget_overflows() {
    let provider = Arc::new(FakeProvider::replying(&["unused"]));
    let reader = Arc::new(MemoryReader::new());
    let assistant = Assistant::new(config().with_max_input_tokens(10), reader).with_provider(provider.clone());
    let (tx, _rx) = mpsc::channel(64);

    let result = assistant
        .handle_turn(&TurnRequest::parse("/h why?"), &[], None, &tx, CancellationToken::new())
        .await;

    assert!(matches!(result, Err(RuntimeError::ContextOverflow { .. })));
    assert!(provider.last_request().is_none());
}

#[tokio::test]
async fn test_list_models_without_provider() {
    let assistant = assistant(None);
    let err = assistant.list_models().await.unwrap_err();
    assert!(matches!(err, RuntimeError::ModelUnavailable));
}
