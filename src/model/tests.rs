//! Tests for the model client retry session.

use super::*;
use crate::log::{Level, RunLog};
use crate::test_support::{ScriptedTransport, api_error, connection_error, ok_text};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

// =========================================================================
// Helper functions
// =========================================================================

fn request() -> GenerationRequest {
    GenerationRequest {
        model: "gemini-2.0-flash".to_string(),
        system_instruction: String::new(),
        user_content: "Build a landing page".to_string(),
        params: GenerationParams {
            temperature: 0.7,
            top_p: 0.95,
            max_output_tokens: 8192,
        },
    }
}

/// Client over `transport` whose sleeps are recorded instead of slept.
fn client(transport: ScriptedTransport) -> (ModelClient<ScriptedTransport>, Rc<RefCell<Vec<Duration>>>) {
    let sleeps = Rc::new(RefCell::new(Vec::new()));
    let recorder = Rc::clone(&sleeps);
    let client = ModelClient::new(transport)
        .with_sleeper(move |d| recorder.borrow_mut().push(d));
    (client, sleeps)
}

const TIMEOUT: Duration = Duration::from_secs(30);

// =========================================================================
// Session behavior
// =========================================================================

#[test]
fn test_first_attempt_success_returns_text() {
    let transport = ScriptedTransport::new(vec![ok_text("```js\nx\n```")]);
    let (client, sleeps) = client(transport.clone());
    let log = RunLog::capture();

    let completion = client.complete(&request(), 3, TIMEOUT, &log).unwrap();

    assert_eq!(completion.text, "```js\nx\n```");
    assert_eq!(completion.attempts.len(), 1);
    assert_eq!(completion.attempts[0].index, 1);
    assert_eq!(transport.calls(), 1);
    assert!(sleeps.borrow().is_empty());
}

#[test]
fn test_transport_failures_then_success_stops_at_third_attempt() {
    let transport = ScriptedTransport::new(vec![
        connection_error("connection refused"),
        connection_error("connection reset"),
        ok_text("attempt three"),
        ok_text("never requested"),
    ]);
    let (client, sleeps) = client(transport.clone());
    let log = RunLog::capture();

    let completion = client.complete(&request(), 5, TIMEOUT, &log).unwrap();

    assert_eq!(completion.text, "attempt three");
    assert_eq!(transport.calls(), 3);
    assert_eq!(
        *sleeps.borrow(),
        vec![Duration::from_secs(2), Duration::from_secs(4)]
    );

    let outcomes: Vec<_> = completion.attempts.iter().map(|a| &a.outcome).collect();
    assert!(matches!(outcomes[0], AttemptOutcome::Retryable(AttemptCause::Transport(_))));
    assert!(matches!(outcomes[1], AttemptOutcome::Retryable(AttemptCause::Transport(_))));
    assert!(matches!(outcomes[2], AttemptOutcome::Success(_)));
}

#[test]
fn test_always_api_error_exhausts_attempts() {
    let transport = ScriptedTransport::new(vec![
        api_error(429, "quota exceeded"),
        api_error(429, "quota exceeded"),
        api_error(503, "overloaded"),
    ]);
    let (client, sleeps) = client(transport.clone());
    let log = RunLog::capture();

    let err = client.complete(&request(), 3, TIMEOUT, &log).unwrap_err();

    match err {
        ModelError::Exhausted {
            attempts,
            last,
            history,
        } => {
            assert_eq!(attempts, 3);
            assert_eq!(last, AttemptCause::Api("503: overloaded".to_string()));
            assert_eq!(history.len(), 3);
            assert_eq!(
                history.iter().map(|a| a.index).collect::<Vec<_>>(),
                vec![1, 2, 3]
            );
        }
        other => panic!("expected Exhausted, got {:?}", other),
    }
    assert_eq!(transport.calls(), 3);
    // Fixed API backoff between attempts, nothing after the last one.
    assert_eq!(
        *sleeps.borrow(),
        vec![Duration::from_secs(3), Duration::from_secs(3)]
    );
}

#[test]
fn test_empty_response_retries_without_backoff() {
    let empty = Ok(RawResponse {
        status: 200,
        body: r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#.to_string(),
    });
    let transport = ScriptedTransport::new(vec![empty, ok_text("done")]);
    let (client, sleeps) = client(transport.clone());
    let log = RunLog::capture();

    let completion = client.complete(&request(), 2, TIMEOUT, &log).unwrap();

    assert_eq!(completion.text, "done");
    assert!(sleeps.borrow().is_empty());
    assert!(matches!(
        completion.attempts[0].outcome,
        AttemptOutcome::Retryable(AttemptCause::EmptyResponse(_))
    ));
}

#[test]
fn test_fatal_failure_stops_immediately() {
    let transport = ScriptedTransport::new(vec![
        Err(TransportFailure::InvalidRequest("bad url".to_string())),
        ok_text("unreachable"),
    ]);
    let (client, _sleeps) = client(transport.clone());
    let log = RunLog::capture();

    let err = client.complete(&request(), 3, TIMEOUT, &log).unwrap_err();

    assert!(matches!(err, ModelError::Fatal { attempt: 1, .. }));
    assert_eq!(transport.calls(), 1);
    assert_eq!(log.messages_at(Level::Error).len(), 1);
}

#[test]
fn test_each_failed_attempt_is_logged() {
    let transport = ScriptedTransport::new(vec![
        connection_error("dns failure"),
        api_error(500, "internal"),
        ok_text("ok"),
    ]);
    let (client, _sleeps) = client(transport);
    let log = RunLog::capture();

    client.complete(&request(), 3, TIMEOUT, &log).unwrap();

    let warnings = log.messages_at(Level::Warning);
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].contains("attempt 1/3"));
    assert!(warnings[0].contains("dns failure"));
    assert!(warnings[1].contains("attempt 2/3"));
    assert!(warnings[1].contains("internal"));
}

#[test]
fn test_request_body_rebuilt_per_attempt() {
    let transport = ScriptedTransport::new(vec![connection_error("x"), ok_text("y")]);
    let (client, _sleeps) = client(transport.clone());

    client
        .complete(&request(), 2, TIMEOUT, &RunLog::capture())
        .unwrap();

    let bodies = transport.bodies();
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0], bodies[1]);
}

#[test]
fn test_single_attempt_failure_is_exhausted() {
    let transport = ScriptedTransport::new(vec![
        connection_error("reset by peer"),
        ok_text("never requested"),
    ]);
    let (client, sleeps) = client(transport.clone());

    let err = client
        .complete(&request(), 1, TIMEOUT, &RunLog::capture())
        .unwrap_err();

    match err {
        ModelError::Exhausted {
            attempts, history, ..
        } => {
            assert_eq!(attempts, 1);
            assert_eq!(history.len(), 1);
        }
        other => panic!("expected Exhausted, got {:?}", other),
    }
    assert_eq!(transport.calls(), 1);
    assert!(sleeps.borrow().is_empty());
}

#[test]
fn test_zero_attempts_is_fatal() {
    let transport = ScriptedTransport::new(vec![ok_text("x")]);
    let (client, _sleeps) = client(transport.clone());

    let err = client
        .complete(&request(), 0, TIMEOUT, &RunLog::capture())
        .unwrap_err();

    assert!(matches!(err, ModelError::Fatal { attempt: 0, .. }));
    assert_eq!(transport.calls(), 0);
}

// =========================================================================
// Classification
// =========================================================================

#[test]
fn test_classify_unparseable_body_as_transport() {
    let outcome = classify(Ok(RawResponse {
        status: 502,
        body: "<html>Bad Gateway</html>".to_string(),
    }));
    assert!(matches!(
        outcome,
        AttemptOutcome::Retryable(AttemptCause::Transport(_))
    ));
}

#[test]
fn test_classify_error_status_without_payload_as_api() {
    let outcome = classify(Ok(RawResponse {
        status: 500,
        body: "{}".to_string(),
    }));
    assert_eq!(
        outcome,
        AttemptOutcome::Retryable(AttemptCause::Api("HTTP 500 without error payload".to_string()))
    );
}

#[test]
fn test_classify_missing_candidates_as_empty() {
    let outcome = classify(Ok(RawResponse {
        status: 200,
        body: r#"{"candidates":[{"finishReason":"MAX_TOKENS"}]}"#.to_string(),
    }));
    assert_eq!(
        outcome,
        AttemptOutcome::Retryable(AttemptCause::EmptyResponse(
            "no completion text (finish reason MAX_TOKENS)".to_string()
        ))
    );
}

#[test]
fn test_backoff_schedule() {
    let transport = AttemptCause::Transport("x".to_string());
    assert_eq!(transport.backoff(1), Duration::from_secs(2));
    assert_eq!(transport.backoff(4), Duration::from_secs(8));
    assert_eq!(AttemptCause::Api("x".to_string()).backoff(7), Duration::from_secs(3));
    assert_eq!(
        AttemptCause::EmptyResponse("x".to_string()).backoff(2),
        Duration::ZERO
    );
}
