//! End-to-end tests of the stdio loop over in-memory streams.

mod common;

use std::io;

use serde_json::{json, Value};
use tokio_test::io::Builder;

use common::*;

async fn serve_bytes(transport: &gitlab_mcp::StdioTransport, input: &[u8]) -> Vec<Value> {
    let mut output = Vec::new();
    transport
        .serve(input, &mut output)
        .await
        .expect("serve should finish cleanly");
    output_lines(&output)
}

#[tokio::test]
async fn test_session_transcript() {
    let api = FakeGitlab::ok();
    let t = transport(api.clone());
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#, "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#, "\n",
        r#"{"id":2,"method":"tools/list"}"#, "\n",
        r#"{"id":3,"method":"tools/call","params":{"name":"create_merge_request","arguments":{"project_id":"42","source_branch":"a b","target_branch":"main","title":"t"}}}"#, "\n",
        r#"{"id":4,"method":"does_not_exist"}"#, "\n",
        r#"{"id":5,"#, "\n",
    );

    let responses = serve_bytes(&t, input.as_bytes()).await;
    assert_eq!(responses.len(), 5);

    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(responses[1]["id"], 2);
    assert_eq!(responses[2]["error"]["code"], -32602);
    assert_eq!(responses[3]["error"]["code"], -32601);
    assert_eq!(responses[4]["id"], Value::Null);
    assert_eq!(responses[4]["error"]["code"], -32700);

    assert!(api.calls().is_empty());
    assert!(t.handler().is_initialized().await);
}

#[tokio::test]
async fn test_one_line_per_response() {
    let t = transport(FakeGitlab::ok());
    let mut output = Vec::new();
    t.serve(&b"{\"id\":1,\"method\":\"ping\"}\n{\"id\":2,\"method\":\"ping\"}\n"[..], &mut output)
        .await
        .unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.ends_with('\n'));
    assert_eq!(text.matches('\n').count(), 2);
    assert!(!text.contains("\n\n"));
}

#[tokio::test]
async fn test_responses_keep_request_order() {
    let t = transport_with_test_tools(FakeGitlab::ok());
    let mut input = String::new();
    for (id, delay) in [(1, 50), (2, 0), (3, 20)] {
        let call = tools_call(id, "slow_echo", json!({ "delay_ms": delay, "tag": id }));
        input.push_str(&call.to_string());
        input.push('\n');
    }

    let responses = serve_bytes(&t, input.as_bytes()).await;
    let ids: Vec<_> = responses.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(2), json!(3)]);
    assert_eq!(responses[0]["result"]["content"][0]["text"], "1");
}

#[tokio::test]
async fn test_lines_split_across_reads() {
    let t = transport(FakeGitlab::ok());
    let reader = Builder::new()
        .read(b"{\"jsonrpc\":\"2.0\",\"id\":")
        .read(b"1,\"method\":\"pi")
        .read(b"ng\"}\n{\"id\":2,\"method\":\"tools/list\"}\n{\"id\"")
        .read(b":3,\"method\":\"ping\"}\n")
        .build();

    let mut output = Vec::new();
    t.serve(reader, &mut output).await.unwrap();

    let responses = output_lines(&output);
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[1]["result"]["tools"][0]["name"], "create_merge_request");
    assert_eq!(responses[2]["id"], 3);
}

#[tokio::test]
async fn test_notifications_only_produce_no_output() {
    let t = transport(FakeGitlab::ok());
    let input = concat!(
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#, "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/cancelled","params":{"requestId":1}}"#, "\n",
        r#"{"jsonrpc":"2.0","method":"tools/list"}"#, "\n",
    );

    let mut output = Vec::new();
    t.serve(input.as_bytes(), &mut output).await.unwrap();
    assert!(output.is_empty());
}

#[tokio::test]
async fn test_crlf_and_blank_lines() {
    let t = transport(FakeGitlab::ok());
    let input = b"\r\n\n   \n{\"id\":1,\"method\":\"ping\"}\r\n\n{\"id\":2,\"method\":\"ping\"}\n";

    let responses = serve_bytes(&t, input).await;
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[1]["id"], 2);
}

#[tokio::test]
async fn test_malformed_line_does_not_stop_the_loop() {
    let t = transport(FakeGitlab::ok());
    let input = b"not json\n{\"id\":7,\"method\":\"ping\"}\n";

    let responses = serve_bytes(&t, input).await;
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["error"]["code"], -32700);
    assert_eq!(responses[1]["id"], 7);
}

#[tokio::test]
async fn test_oversized_line_is_rejected() {
    let t = transport(FakeGitlab::ok()).with_max_line_bytes(Some(64));
    let big = format!(r#"{{"id":1,"method":"ping","params":{{"pad":"{}"}}}}"#, "x".repeat(200));
    let input = format!("{big}\n{{\"id\":2,\"method\":\"ping\"}}\n");

    let responses = serve_bytes(&t, input.as_bytes()).await;
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], Value::Null);
    assert_eq!(responses[0]["error"]["code"], -32700);
    assert!(responses[0]["error"]["message"]
        .as_str()
        .unwrap()
        .contains("exceeds limit of 64 bytes"));
    assert_eq!(responses[1]["id"], 2);
}

#[tokio::test]
async fn test_unterminated_trailing_input_is_ignored() {
    let t = transport(FakeGitlab::ok());
    let input = b"{\"id\":1,\"method\":\"ping\"}\n{\"id\":2,\"method\":\"ping\"}";

    let responses = serve_bytes(&t, input).await;
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], 1);
}

#[tokio::test]
async fn test_empty_input_ends_cleanly() {
    let t = transport(FakeGitlab::ok());
    assert!(serve_bytes(&t, b"").await.is_empty());
}

#[tokio::test]
async fn test_panic_barrier_keeps_serving() {
    let t = transport_with_test_tools(FakeGitlab::ok());
    let mut input = tools_call(1, "explode", json!({})).to_string();
    input.push('\n');
    input.push_str("{\"id\":2,\"method\":\"ping\"}\n");

    let responses = serve_bytes(&t, input.as_bytes()).await;
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["error"]["code"], -32603);
    assert_eq!(responses[1]["id"], 2);
    assert_eq!(responses[1]["result"], json!({}));
}

#[tokio::test]
async fn test_write_failure_ends_the_loop() {
    let t = transport(FakeGitlab::ok());
    let reader = Builder::new().read(b"{\"id\":1,\"method\":\"ping\"}\n").build();
    let writer = Builder::new()
        .write_error(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        .build();

    let err = t.serve(reader, writer).await.expect_err("write must fail");
    assert!(err.to_string().contains("closed"));
}
