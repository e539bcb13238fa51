//! Integration tests against local stub services.
//!
//! These tests start an axum server on a random port that mimics the
//! research (chat completions, JSON and SSE) and generation (Messages API)
//! endpoints, then exercise the real HTTP clients and a full session.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use postcraft::prelude::*;
use serde_json::{Value, json};

const RESEARCH_FRAGMENTS: [&str; 4] = [
    "1. Global EV sales passed 14 million in 2023 ",
    "(IEA). 2. Battery pack prices fell 14% ",
    "year over year (BNEF). ",
    "3. Norway: 82% of new cars sold were electric ⚡.",
];

/// What the research endpoint sends back.
#[derive(Default, Clone, Copy)]
enum ResearchReply {
    #[default]
    Facts,
    /// Text first, then an error event mid-stream (streaming only).
    ErrorMidStream,
    /// Only null content, in either mode.
    NoContent,
}

#[derive(Default)]
struct Recorded {
    research: Vec<Value>,
    generation: Vec<Value>,
    research_reply: ResearchReply,
    fail_generation: bool,
}

type Shared = Arc<Mutex<Recorded>>;

async fn chat_completions(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let stream = body["stream"].as_bool().unwrap_or(false);
    let reply = {
        let mut recorded = state.lock().unwrap();
        recorded.research.push(body);
        recorded.research_reply
    };

    if let ResearchReply::NoContent = reply {
        return if stream {
            let sse = concat!(
                "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\",\"content\":null}}]}\n\n",
                "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
                "data: [DONE]\n\n",
            );
            ([(header::CONTENT_TYPE, "text/event-stream")], sse).into_response()
        } else {
            Json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": null},
                    "finish_reason": "stop"
                }]
            }))
            .into_response()
        };
    }

    if stream {
        let mut sse = String::from(": connected\n\n");
        sse.push_str(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\",\"content\":null}}]}\n\n",
        );
        for (i, fragment) in RESEARCH_FRAGMENTS.into_iter().enumerate() {
            if i == 2 && matches!(reply, ResearchReply::ErrorMidStream) {
                sse.push_str("data: {\"error\":{\"message\":\"rate limit exceeded\"}}\n\n");
            }
            let chunk = json!({"choices": [{"delta": {"content": fragment}}]});
            sse.push_str(&format!("data: {chunk}\n\n"));
        }
        sse.push_str("data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}],\"usage\":{\"prompt_tokens\":40,\"completion_tokens\":60,\"total_tokens\":100}}\n\n");
        sse.push_str("data: [DONE]\n\n");
        ([(header::CONTENT_TYPE, "text/event-stream")], sse).into_response()
    } else {
        Json(json!({
            "choices": [{
                "message": {"role": "assistant", "content": RESEARCH_FRAGMENTS.concat()},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 40, "completion_tokens": 60, "total_tokens": 100}
        }))
        .into_response()
    }
}

async fn messages(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut recorded = state.lock().unwrap();
    if recorded.fail_generation {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}})),
        )
            .into_response();
    }
    let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
    let text = if prompt.starts_with("I need you to revise") {
        format!("  Revised post #{}  \n", recorded.generation.len())
    } else {
        "\n⚡ EVs are here.\n\n1️⃣ Sales are up.\n".to_string()
    };
    recorded.generation.push(body);
    Json(json!({
        "id": "msg_stub",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-5-sonnet-20241022",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 500, "output_tokens": 120}
    }))
    .into_response()
}

/// Helper: spawn the stub services on port 0 (random available port).
async fn spawn_stub(fail_generation: bool) -> (Shared, ServiceConfig) {
    spawn_stub_with(Recorded {
        fail_generation,
        ..Default::default()
    })
    .await
}

async fn spawn_stub_with(initial: Recorded) -> (Shared, ServiceConfig) {
    let state: Shared = Arc::new(Mutex::new(initial));
    let app = Router::new()
        .route("/chat/completions", post(chat_completions))
        .route("/v1/messages", post(messages))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ServiceConfig::default()
        .with_research_url(format!("http://{addr}"))
        .with_generation_url(format!("http://{addr}/v1/messages"));
    (state, config)
}

// ── Research ─────────────────────────────────────────────────────────

#[tokio::test]
async fn streamed_and_single_shot_research_match() {
    let (state, config) = spawn_stub(false).await;
    let researcher = PerplexityResearcher::new("pplx-test", &config).unwrap();

    let streamed = researcher
        .get_research("electric vehicles", true)
        .await
        .unwrap();
    let single = researcher
        .get_research("electric vehicles", false)
        .await
        .unwrap();

    assert_eq!(streamed, RESEARCH_FRAGMENTS.concat());
    assert_eq!(streamed, single);

    let recorded = state.lock().unwrap();
    assert_eq!(recorded.research.len(), 2);
    let first = &recorded.research[0];
    assert_eq!(first["model"], "sonar-pro");
    assert_eq!(first["stream"], true);
    assert_eq!(first["messages"][0]["role"], "system");
    assert!(
        first["messages"][1]["content"]
            .as_str()
            .unwrap()
            .contains("about electric vehicles")
    );
    assert!(recorded.research[1].get("stream").is_none());
}

#[tokio::test]
async fn error_event_mid_stream_fails_research() {
    let (state, config) = spawn_stub_with(Recorded {
        research_reply: ResearchReply::ErrorMidStream,
        ..Default::default()
    })
    .await;
    let researcher = PerplexityResearcher::new("pplx-test", &config).unwrap();

    let err = researcher
        .get_research("electric vehicles", true)
        .await
        .unwrap_err();
    match &err {
        Error::Api {
            service, message, ..
        } => {
            assert_eq!(*service, "research");
            assert_eq!(message, "rate limit exceeded");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.exit_code(), 3);
    assert_eq!(state.lock().unwrap().research.len(), 1);
}

#[tokio::test]
async fn empty_research_fails_the_same_way_in_both_modes() {
    let (_state, config) = spawn_stub_with(Recorded {
        research_reply: ResearchReply::NoContent,
        ..Default::default()
    })
    .await;
    let researcher = PerplexityResearcher::new("pplx-test", &config).unwrap();

    let streamed = researcher.get_research("anything", true).await.unwrap_err();
    let single = researcher.get_research("anything", false).await.unwrap_err();
    for err in [streamed, single] {
        assert!(
            matches!(
                err,
                Error::EmptyResponse {
                    service: "research"
                }
            ),
            "{err}"
        );
    }
}

// ── Formatting ───────────────────────────────────────────────────────

#[tokio::test]
async fn format_post_trims_and_sends_single_user_message() {
    let (state, config) = spawn_stub(false).await;
    let formatter = ClaudeFormatter::new("sk-ant-test", &config).unwrap();
    let post_config = PostConfig::new(
        PostFormat::FactsWithEmoji,
        "electric vehicles",
        PostLength::Short,
        false,
    );

    let post = formatter
        .format_post("EV research", &post_config)
        .await
        .unwrap();
    assert_eq!(post, "⚡ EVs are here.\n\n1️⃣ Sales are up.");

    let recorded = state.lock().unwrap();
    let body = &recorded.generation[0];
    assert_eq!(body["max_tokens"], 1000);
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    let prompt = body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("electric vehicles"));
    assert!(prompt.contains("150-200 words"));
    assert!(prompt.contains("5️⃣ [Point 5]"));
    assert!(prompt.ends_with("Here's the research:\nEV research"));
}

#[tokio::test]
async fn revision_payload_is_identical_for_identical_inputs() {
    let (state, config) = spawn_stub(false).await;
    let formatter = ClaudeFormatter::new("sk-ant-test", &config).unwrap();

    let first = formatter.revise_post("Draft", "Less jargon").await.unwrap();
    let second = formatter.revise_post("Draft", "Less jargon").await.unwrap();
    assert_eq!(first, "Revised post #0");
    assert_eq!(second, "Revised post #1");

    let recorded = state.lock().unwrap();
    assert_eq!(recorded.generation[0], recorded.generation[1]);
}

#[tokio::test]
async fn generation_error_surfaces_status_and_message() {
    let (_state, config) = spawn_stub(true).await;
    let formatter = ClaudeFormatter::new("sk-ant-test", &config).unwrap();

    let err = formatter.revise_post("Draft", "Shorter").await.unwrap_err();
    match &err {
        Error::Api {
            service,
            status,
            message,
        } => {
            assert_eq!(*service, "generation");
            assert_eq!(*status, 503);
            assert_eq!(message, "overloaded_error - Overloaded");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn unreachable_service_is_an_http_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ServiceConfig::default().with_research_url(format!("http://{addr}"));
    let researcher = PerplexityResearcher::new("pplx-test", &config).unwrap();
    let err = researcher.get_research("anything", true).await.unwrap_err();
    assert!(matches!(err, Error::Http { .. }), "{err}");
}

// ── Full session ─────────────────────────────────────────────────────

#[tokio::test]
async fn full_session_with_revision_and_restart() {
    let (state, config) = spawn_stub(false).await;
    let researcher = PerplexityResearcher::new("pplx-test", &config).unwrap();
    let formatter = ClaudeFormatter::new("sk-ant-test", &config).unwrap();

    let console = ScriptedConsole::new([
        "electric vehicles",
        "2",
        "yes",
        "2",
        "1",
        "Mention charging",
        "3",
        "solar panels",
        "4",
        "3",
        "2",
    ]);
    let mut session = Session::new(&researcher, &formatter, console);
    let post = session.run().await.unwrap();
    assert_eq!(post, "⚡ EVs are here.\n\n1️⃣ Sales are up.");

    let console = session.into_console();
    assert!(
        console
            .output()
            .iter()
            .any(|line| line == "Revised post #1")
    );

    let recorded = state.lock().unwrap();
    assert_eq!(recorded.research.len(), 2);
    assert_eq!(recorded.generation.len(), 3);

    let story_prompt = recorded.generation[0]["messages"][0]["content"]
        .as_str()
        .unwrap();
    assert!(story_prompt.contains("frame it as a real experience"));
    assert!(story_prompt.contains("250-300 words"));

    let revision_prompt = recorded.generation[1]["messages"][0]["content"]
        .as_str()
        .unwrap();
    assert!(revision_prompt.contains("---\nMention charging\n---"));

    let insight_prompt = recorded.generation[2]["messages"][0]["content"]
        .as_str()
        .unwrap();
    assert!(insight_prompt.contains("solar panels"));
    assert!(insight_prompt.contains("350-450 words"));
    assert!(!insight_prompt.contains("frame it as a real experience"));
    assert!(!insight_prompt.contains("electric vehicles"));
}
