use medchat::config::{Device, HostedModelConfig, LocalModelConfig};
use medchat::llm::{GenerationError, HostedResponder, LocalResponder, Responder};
use mockito::{Matcher, Server};
use serde_json::json;

const MODEL: &str = "medllm";

fn local_config(base_url: &str, device: Device) -> LocalModelConfig {
    LocalModelConfig {
        base_url: base_url.to_string(),
        model_name: MODEL.to_string(),
        max_length: 200,
        temperature: 0.7,
        device,
    }
}

fn hosted_config(base_url: &str) -> HostedModelConfig {
    HostedModelConfig {
        api_key: Some("sk-test".to_string()),
        model_name: "gpt-3.5-turbo".to_string(),
        base_url: base_url.to_string(),
        enabled: true,
    }
}

async fn mock_show(server: &mut Server, status: usize) -> mockito::Mock {
    server
        .mock("POST", "/api/show")
        .match_body(Matcher::PartialJson(json!({ "model": MODEL })))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(r#"{"details":{"family":"llama","parameter_size":"7B"}}"#)
        .create_async()
        .await
}

// ============================================================================
// Local responder
// ============================================================================

#[tokio::test]
async fn test_local_load_and_generate() {
    let mut server = Server::new_async().await;
    let show = mock_show(&mut server, 200).await;
    let generate = server
        .mock("POST", "/api/generate")
        .match_body(Matcher::PartialJson(json!({
            "model": MODEL,
            "raw": true,
            "stream": false,
            "options": { "num_predict": 200, "num_gpu": 0 }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"response":"  Rest, fluids and monitoring your temperature.  ","done":true}"#)
        .create_async()
        .await;

    let responder = LocalResponder::load(&local_config(&server.url(), Device::Cpu)).await;
    assert!(responder.is_available());
    assert_eq!(responder.name(), "local");

    let reply = responder.generate("What should I do about a fever?", None).await.unwrap();
    assert_eq!(reply, "Rest, fluids and monitoring your temperature.");

    show.assert_async().await;
    generate.assert_async().await;
}

#[tokio::test]
async fn test_local_max_tokens_override() {
    let mut server = Server::new_async().await;
    mock_show(&mut server, 200).await;
    let generate = server
        .mock("POST", "/api/generate")
        .match_body(Matcher::PartialJson(json!({ "options": { "num_predict": 42 } })))
        .with_status(200)
        .with_body(r#"{"response":"A sufficiently long reply.","done":true}"#)
        .create_async()
        .await;

    let responder = LocalResponder::load(&local_config(&server.url(), Device::Auto)).await;
    responder.generate("hello there", Some(42)).await.unwrap();

    generate.assert_async().await;
}

#[tokio::test]
async fn test_local_missing_model_is_unavailable() {
    let mut server = Server::new_async().await;
    mock_show(&mut server, 404).await;

    let responder = LocalResponder::load(&local_config(&server.url(), Device::Auto)).await;
    assert!(!responder.is_available());

    let err = responder.generate("What causes diabetes?", None).await.unwrap_err();
    assert!(matches!(err, GenerationError::ModelUnavailable(_)));
    assert!(responder.fallback("What causes diabetes?").contains("Diabetes"));
}

#[tokio::test]
async fn test_local_unreachable_runtime_is_unavailable() {
    let responder = LocalResponder::load(&local_config("http://127.0.0.1:1", Device::Auto)).await;
    assert!(!responder.is_available());
}

#[tokio::test]
async fn test_local_short_reply_is_rejected() {
    let mut server = Server::new_async().await;
    mock_show(&mut server, 200).await;
    server
        .mock("POST", "/api/generate")
        .with_status(200)
        .with_body(r#"{"response":"  Ok.  ","done":true}"#)
        .create_async()
        .await;

    let responder = LocalResponder::load(&local_config(&server.url(), Device::Auto)).await;
    let err = responder.generate("hi", None).await.unwrap_err();
    assert!(matches!(err, GenerationError::ResponseTooShort { len: 3 }));
}

#[tokio::test]
async fn test_local_blank_reply_is_empty() {
    let mut server = Server::new_async().await;
    mock_show(&mut server, 200).await;
    server
        .mock("POST", "/api/generate")
        .with_status(200)
        .with_body(r#"{"response":"   \n ","done":true}"#)
        .create_async()
        .await;

    let responder = LocalResponder::load(&local_config(&server.url(), Device::Auto)).await;
    let err = responder.generate("hi", None).await.unwrap_err();
    assert!(matches!(err, GenerationError::EmptyResponse));
}

#[tokio::test]
async fn test_local_runtime_error_status() {
    let mut server = Server::new_async().await;
    mock_show(&mut server, 200).await;
    server
        .mock("POST", "/api/generate")
        .with_status(500)
        .with_body("out of memory")
        .create_async()
        .await;

    let responder = LocalResponder::load(&local_config(&server.url(), Device::Accelerator)).await;
    match responder.generate("hi", None).await.unwrap_err() {
        GenerationError::Http { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "out of memory");
        }
        other => panic!("Expected Http error, got {:?}", other),
    }
}

// ============================================================================
// Hosted responder
// ============================================================================

#[tokio::test]
async fn test_hosted_generate() {
    let mut server = Server::new_async().await;
    let completion = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-3.5-turbo",
            "max_tokens": 50
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "chatcmpl-1",
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": " Drink water and rest. " },
                    "finish_reason": "stop"
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let responder = HostedResponder::new(&hosted_config(&server.url()));
    assert!(responder.is_available());
    assert_eq!(responder.name(), "hosted");

    // the override is ignored; the request still carries 50
    let reply = responder.generate("I have a headache", Some(500)).await.unwrap();
    assert_eq!(reply, "Drink water and rest.");

    completion.assert_async().await;
}

#[tokio::test]
async fn test_hosted_api_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"message":"Incorrect API key provided","code":"invalid_api_key"}}"#)
        .create_async()
        .await;

    let responder = HostedResponder::new(&hosted_config(&server.url()));
    match responder.generate("hi", None).await.unwrap_err() {
        GenerationError::Http { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "Incorrect API key provided");
        }
        other => panic!("Expected Http error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_hosted_no_choices_is_empty() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[]}"#)
        .create_async()
        .await;

    let responder = HostedResponder::new(&hosted_config(&server.url()));
    let err = responder.generate("hi", None).await.unwrap_err();
    assert!(matches!(err, GenerationError::EmptyResponse));
}

#[tokio::test]
async fn test_hosted_without_key_is_inert() {
    let mut config = hosted_config("http://127.0.0.1:1");
    config.api_key = None;

    let responder = HostedResponder::new(&config);
    assert!(!responder.is_available());
    let err = responder.generate("hi", None).await.unwrap_err();
    assert!(matches!(err, GenerationError::ModelUnavailable(_)));
}

#[tokio::test]
async fn test_hosted_unreachable_endpoint() {
    let responder = HostedResponder::new(&hosted_config("http://127.0.0.1:1"));
    assert!(responder.is_available());

    match responder.generate("hi", None).await.unwrap_err() {
        GenerationError::Http { status, .. } => assert_eq!(status, 0),
        other => panic!("Expected transport error, got {:?}", other),
    }
}
