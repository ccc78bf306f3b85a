use hoptrace::{TraceError, TraceOutcome, Tracer, TracerConfig};
use mockito::Matcher;

fn tracer() -> Tracer {
    Tracer::new(TracerConfig::default()).unwrap()
}

#[tokio::test]
async fn test_single_ok_response() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/start")
        .match_header("user-agent", Matcher::Regex("^Mozilla/5.0".to_string()))
        .with_status(200)
        .with_body("hello")
        .create_async()
        .await;

    let start = format!("{}/start", server.url());
    let result = tracer().trace(&start).await.unwrap();

    assert_eq!(result.hops.len(), 1);
    assert_eq!(result.hops[0].number, 1);
    assert_eq!(result.hops[0].url, start);
    assert_eq!(result.hops[0].status_code, 200);
    assert_eq!(result.hops[0].status_code_class, "2xx");
    assert_eq!(result.final_url, start);
    assert!(!result.timed_out);
    assert!(!result.proxy_signature);
    assert_eq!(result.outcome(), TraceOutcome::Completed);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_two_redirects_then_ok() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();
    let absolute_target = format!("{}/c", base);

    // Relative target first, then an absolute one
    let first = server
        .mock("GET", "/a")
        .with_status(302)
        .with_header("location", "/b")
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/b")
        .with_status(302)
        .with_header("location", absolute_target.as_str())
        .expect(1)
        .create_async()
        .await;
    let last = server
        .mock("GET", "/c")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let result = tracer().trace(&format!("{}/a", base)).await.unwrap();

    let numbers: Vec<usize> = result.hops.iter().map(|h| h.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    let statuses: Vec<u16> = result.hops.iter().map(|h| h.status_code).collect();
    assert_eq!(statuses, vec![302, 302, 200]);
    assert_eq!(result.hops[1].url, format!("{}/b", base));
    assert_eq!(result.hops[1].status_code_class, "3xx");
    assert_eq!(result.final_url, format!("{}/c", base));

    first.assert_async().await;
    second.assert_async().await;
    last.assert_async().await;
}

#[tokio::test]
async fn test_non_redirect_error_status_ends_trace() {
    let mut server = mockito::Server::new_async().await;
    let _redirect = server
        .mock("GET", "/old")
        .with_status(301)
        .with_header("location", "/missing")
        .create_async()
        .await;
    let _missing = server
        .mock("GET", "/missing")
        .with_status(404)
        .create_async()
        .await;

    let result = tracer()
        .trace(&format!("{}/old", server.url()))
        .await
        .unwrap();

    assert_eq!(result.hops.len(), 2);
    assert_eq!(result.hops[1].status_code, 404);
    assert_eq!(result.hops[1].status_code_class, "4xx");
    assert_eq!(result.final_url, format!("{}/missing", server.url()));
}

#[tokio::test]
async fn test_return_uri_is_unwrapped() {
    let mut server = mockito::Server::new_async().await;
    let _login = server
        .mock("GET", "/login")
        .with_status(302)
        .with_header("location", "/app?session=42&returnUri=%2Fsecure%2Fapp")
        .create_async()
        .await;
    let app = server
        .mock("GET", "/app")
        .match_query(Matcher::UrlEncoded(
            "returnUri".to_string(),
            "/secure/app".to_string(),
        ))
        .with_status(200)
        .create_async()
        .await;

    let result = tracer()
        .trace(&format!("{}/login", server.url()))
        .await
        .unwrap();

    let expected = format!("{}/app?returnUri=/secure/app", server.url());
    assert_eq!(result.hops.len(), 2);
    assert_eq!(result.hops[1].url, expected);
    assert_eq!(result.final_url, expected);

    app.assert_async().await;
}

#[tokio::test]
async fn test_missing_location_with_proxy_signature() {
    let mut server = mockito::Server::new_async().await;
    let _first = server
        .mock("GET", "/start")
        .with_status(301)
        .with_header("location", "/edge")
        .create_async()
        .await;
    let _edge = server
        .mock("GET", "/edge")
        .with_status(302)
        .with_header("server", "cloudflare")
        .create_async()
        .await;

    let result = tracer()
        .trace(&format!("{}/start", server.url()))
        .await
        .unwrap();

    // Hops collected before the location-less redirect are not reported
    assert!(result.hops.is_empty());
    assert!(result.final_url.is_empty());
    assert!(result.proxy_signature);
    assert!(!result.timed_out);
    assert_eq!(result.outcome(), TraceOutcome::MissingLocation);
}

#[tokio::test]
async fn test_missing_location_without_proxy_signature() {
    let mut server = mockito::Server::new_async().await;
    let _edge = server
        .mock("GET", "/edge")
        .with_status(307)
        .with_header("server", "nginx")
        .create_async()
        .await;

    let result = tracer()
        .trace(&format!("{}/edge", server.url()))
        .await
        .unwrap();

    assert!(result.hops.is_empty());
    assert!(!result.proxy_signature);
    assert_eq!(result.outcome(), TraceOutcome::MissingLocation);
}

#[tokio::test]
async fn test_redirect_loop_is_bounded() {
    let mut server = mockito::Server::new_async().await;
    let looping = server
        .mock("GET", "/loop")
        .with_status(302)
        .with_header("location", "/loop")
        .expect(5)
        .create_async()
        .await;

    let tracer = Tracer::new(TracerConfig {
        max_hops: 5,
        ..TracerConfig::default()
    })
    .unwrap();

    match tracer.trace(&format!("{}/loop", server.url())).await {
        Err(TraceError::RedirectLoop { max_hops }) => assert_eq!(max_hops, 5),
        other => panic!("Expected RedirectLoop error, got {:?}", other),
    }

    looping.assert_async().await;
}

#[tokio::test]
async fn test_connection_refused_is_an_error() {
    // Grab a free port and release it so nothing is listening there
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let start = format!("http://{}/", addr);
    match tracer().trace(&start).await {
        Err(TraceError::Request { url, source }) => {
            assert_eq!(url, start);
            assert!(!source.is_timeout());
        }
        other => panic!("Expected Request error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_trace_all_keeps_order() {
    let mut server = mockito::Server::new_async().await;
    let _one = server
        .mock("GET", "/one")
        .with_status(200)
        .create_async()
        .await;
    let _two = server
        .mock("GET", "/two")
        .with_status(308)
        .with_header("location", "/one")
        .create_async()
        .await;

    let urls = vec![
        format!("{}/one", server.url()),
        format!("{}/two", server.url()),
    ];
    let results = tracer().trace_all(&urls).await;

    assert_eq!(results.len(), 2);
    let first = results[0].as_ref().unwrap();
    let second = results[1].as_ref().unwrap();
    assert_eq!(first.hops.len(), 1);
    assert_eq!(second.hops.len(), 2);
    assert_eq!(second.final_url, urls[0]);
}
