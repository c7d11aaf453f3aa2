//! TCP line transport against a real local listener

use futures::StreamExt;
use gesture_engine::{Connector, LinkError, TcpLineConnector, WireMessage};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::time;

const WAIT: Duration = Duration::from_secs(5);

async fn listener() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let address = listener.local_addr().expect("local addr").to_string();
    (listener, address)
}

#[tokio::test]
async fn test_lines_become_text_messages() {
    let (listener, address) = listener().await;
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        socket
            .write_all(b"{\"motion_type\":\"stomp\"}\n\n{\"response\":\"pong\"}\r\n")
            .await
            .expect("write");
    });

    let mut stream = TcpLineConnector::default()
        .connect(&address)
        .await
        .expect("connect to local listener");

    let first = time::timeout(WAIT, stream.next()).await.expect("first line");
    let second = time::timeout(WAIT, stream.next()).await.expect("second line");
    let end = time::timeout(WAIT, stream.next()).await.expect("end of stream");

    assert_eq!(first, Some(Ok(WireMessage::from(r#"{"motion_type":"stomp"}"#))));
    assert_eq!(second, Some(Ok(WireMessage::from(r#"{"response":"pong"}"#))));
    assert_eq!(end, None);

    server.await.expect("server task");
}

#[tokio::test]
async fn test_oversized_line_is_skipped() {
    let (listener, address) = listener().await;
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut payload = vec![b'x'; 64];
        payload.push(b'\n');
        payload.extend_from_slice(b"{\"action\":\"kick\"}\n");
        socket.write_all(&payload).await.expect("write");
    });

    let mut stream = TcpLineConnector::new(32)
        .connect(&format!("tcp://{}", address))
        .await
        .expect("scheme prefix is accepted");

    let next = time::timeout(WAIT, stream.next()).await.expect("line after oversized one");
    assert_eq!(next, Some(Ok(WireMessage::from(r#"{"action":"kick"}"#))));

    server.await.expect("server task");
}

#[tokio::test]
async fn test_invalid_utf8_line_is_skipped() {
    let (listener, address) = listener().await;
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        socket
            .write_all(b"\xff\xfe garbage\n{\"action\":\"kick\"}\n")
            .await
            .expect("write");
    });

    let mut stream = TcpLineConnector::default()
        .connect(&address)
        .await
        .expect("connect to local listener");

    let next = time::timeout(WAIT, stream.next()).await.expect("line after bad bytes");
    assert_eq!(next, Some(Ok(WireMessage::from(r#"{"action":"kick"}"#))));

    server.await.expect("server task");
}

#[tokio::test]
async fn test_refused_connection_is_connect_failed() {
    let (listener, address) = listener().await;
    drop(listener);

    let result = TcpLineConnector::default().connect(&address).await;

    match result {
        Err(LinkError::ConnectFailed(message)) => assert!(message.contains(&address)),
        Err(other) => panic!("Expected ConnectFailed, got {:?}", other),
        Ok(_) => panic!("Expected ConnectFailed, got a stream"),
    }
}
