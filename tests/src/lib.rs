#[cfg(test)]
mod tests {
    use http_interceptor::{
        async_trait,
        mutations::{MutationMiddleware, MutationTarget},
        Encoding, Error, HttpMethod, InterceptingClient, Middleware, RequestData, ResponseData,
    };
    use hyper::{Body, Request};
    use regex::Regex;
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Mutex,
        },
        time::Duration,
    };
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };
    use wiremock::{
        matchers::{body_bytes, body_string, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[derive(Debug, Default)]
    struct Counter {
        requests: AtomicUsize,
        responses: AtomicUsize,
    }

    #[async_trait]
    impl Middleware for Counter {
        async fn intercept_request(&self, _request: &mut RequestData) -> Result<(), Error> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn intercept_response(&self, _response: &mut ResponseData) -> Result<(), Error> {
            self.responses.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct Snapshots {
        requests: Mutex<Vec<RequestData>>,
        responses: Mutex<Vec<ResponseData>>,
    }

    #[async_trait]
    impl Middleware for Snapshots {
        async fn intercept_request(&self, request: &mut RequestData) -> Result<(), Error> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(())
        }

        async fn intercept_response(&self, response: &mut ResponseData) -> Result<(), Error> {
            self.responses.lock().unwrap().push(response.clone());
            Ok(())
        }
    }

    /// Answers a single connection with `response`, written verbatim.
    async fn raw_server(response: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buffer = [0u8; 1024];
            while !request.windows(4).any(|window| window == b"\r\n\r\n") {
                let read = socket.read(&mut buffer).await.unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buffer[..read]);
            }
            socket.write_all(response).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}/x", address)
    }

    fn client_with(middlewares: Vec<Arc<dyn Middleware>>) -> InterceptingClient {
        InterceptingClient::builder().middlewares(middlewares).build()
    }

    #[tokio::test]
    async fn every_verb_goes_through_the_pipeline() {
        let server = MockServer::start().await;
        for verb in &["HEAD", "GET", "POST", "PUT", "PATCH", "DELETE"] {
            Mock::given(method(*verb))
                .and(path("/resource"))
                .respond_with(ResponseTemplate::new(200))
                .expect(1)
                .mount(&server)
                .await;
        }
        let counter = Arc::new(Counter::default());
        let client = client_with(vec![counter.clone() as Arc<dyn Middleware>]);
        let url = format!("{}/resource", server.uri());

        client.head(&url, None).await.unwrap();
        client.get(&url, None).await.unwrap();
        client.post(&url, None, "p", None).await.unwrap();
        client.put(&url, None, "p", None).await.unwrap();
        client.patch(&url, None, "p", None).await.unwrap();
        let response = client.delete(&url, None, "p", None).await.unwrap();

        assert_eq!(counter.requests.load(Ordering::SeqCst), 6);
        assert_eq!(counter.responses.load(Ordering::SeqCst), 6);
        assert_eq!(response.request().method, HttpMethod::Delete);
        assert_eq!(response.request().url.as_str(), url);
    }

    #[tokio::test]
    async fn snapshots_mirror_the_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/notes"))
            .and(header("x-client", "tests"))
            .and(body_string("hello"))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("x-note-id", "7")
                    .set_body_string("created"),
            )
            .mount(&server)
            .await;
        let snapshots = Arc::new(Snapshots::default());
        let client = client_with(vec![snapshots.clone() as Arc<dyn Middleware>]);
        let mut headers = HashMap::new();
        headers.insert(String::from("x-client"), String::from("tests"));

        let response = client
            .post(format!("{}/notes", server.uri()), Some(headers), "hello", None)
            .await
            .unwrap();

        assert_eq!(response.status_code(), 201);
        assert_eq!(response.text(), "created");
        assert_eq!(response.header("x-note-id"), Some("7"));
        assert!(response.persistent_connection());
        assert!(!response.is_redirect());

        let requests = snapshots.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].url, format!("{}/notes", server.uri()));
        assert_eq!(requests[0].header("x-client"), Some("tests"));

        let responses = snapshots.responses.lock().unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].status_code, 201);
        assert_eq!(responses[0].body(), "created");
        assert_eq!(responses[0].method, HttpMethod::Post);
    }

    #[tokio::test]
    async fn form_fields_and_bytes_arrive_intact() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/form"))
            .and(header(
                "content-type",
                "application/x-www-form-urlencoded; charset=iso-8859-1",
            ))
            .and(body_string("city=Z%FCrich&name=Jane+Doe"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/blob"))
            .and(body_bytes(vec![0u8, 1, 2, 254, 255]))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        let client = InterceptingClient::new();
        let mut fields = HashMap::new();
        fields.insert(String::from("name"), String::from("Jane Doe"));
        fields.insert(String::from("city"), String::from("Zürich"));

        let form = client
            .post(
                format!("{}/form", server.uri()),
                None,
                fields,
                Some(Encoding::Latin1),
            )
            .await
            .unwrap();
        let blob = client
            .put(
                format!("{}/blob", server.uri()),
                None,
                vec![0u8, 1, 2, 254, 255],
                None,
            )
            .await
            .unwrap();

        assert_eq!(form.status_code(), 204);
        assert_eq!(blob.status_code(), 204);
    }

    #[tokio::test]
    async fn injected_headers_reach_the_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/private"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string("account 12345678"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/private"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        let auth = MutationMiddleware::builder()
            .add_header("Authorization", "Bearer secret")
            .build(MutationTarget::Request);
        let masking = MutationMiddleware::builder()
            .body_replace_regex(Regex::new(r"\d{4}(\d{4})").unwrap(), "****$1")
            .build(MutationTarget::Response);
        let client = InterceptingClient::builder()
            .middleware(auth)
            .middleware(masking)
            .build();

        let body = client
            .read(format!("{}/private", server.uri()), None)
            .await
            .unwrap();

        assert_eq!(body, "account ****5678");
    }

    #[tokio::test]
    async fn read_reports_error_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let counter = Arc::new(Counter::default());
        let client = client_with(vec![counter.clone() as Arc<dyn Middleware>]);
        let url = format!("{}/missing", server.uri());

        let error = client.read(&url, None).await.unwrap_err();
        let bytes_error = client.read_bytes(&url, None).await.unwrap_err();

        for error in &[error, bytes_error] {
            let message = error.to_string();
            assert!(message.contains(&url));
            assert!(message.contains("404"));
            assert!(message.contains("Not Found"));
        }
        assert_eq!(counter.responses.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn server_reason_phrases_survive_the_pipeline() {
        let url = raw_server(
            b"HTTP/1.1 404 Gone Fishing\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;
        let snapshots = Arc::new(Snapshots::default());
        let client = client_with(vec![snapshots.clone() as Arc<dyn Middleware>]);

        let error = client.read(&url, None).await.unwrap_err();

        assert_eq!(
            error.to_string(),
            format!("Request to {} failed with status 404 Gone Fishing", url)
        );
        let responses = snapshots.responses.lock().unwrap();
        assert_eq!(responses[0].reason_phrase.as_deref(), Some("Gone Fishing"));
    }

    #[tokio::test]
    async fn non_ascii_header_values_are_not_dropped() {
        let url = raw_server(
            "HTTP/1.1 200 OK\r\nx-name: café\r\nx-ok: y\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok"
                .as_bytes(),
        )
        .await;
        let client = InterceptingClient::new();

        let response = client.get(&url, None).await.unwrap();

        assert_eq!(response.header("x-name"), Some("café"));
        assert_eq!(response.header("x-ok"), Some("y"));
        assert_eq!(response.reason_phrase(), Some("OK"));
        assert!(!response.persistent_connection());
        assert_eq!(response.text(), "ok");
    }

    #[tokio::test]
    async fn read_bytes_returns_the_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/raw"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFFu8, 0x00, 0x7F]))
            .mount(&server)
            .await;
        let client = InterceptingClient::new();

        let bytes = client
            .read_bytes(format!("{}/raw", server.uri()), None)
            .await
            .unwrap();

        assert_eq!(bytes, vec![0xFFu8, 0x00, 0x7F]);
    }

    #[tokio::test]
    async fn redirects_are_reported_not_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/new"))
            .mount(&server)
            .await;
        let client = InterceptingClient::new();

        let response = client
            .get(format!("{}/old", server.uri()), None)
            .await
            .unwrap();

        assert_eq!(response.status_code(), 302);
        assert!(response.is_redirect());
        assert_eq!(response.header("location"), Some("/new"));
    }

    #[tokio::test]
    async fn slow_servers_time_out_without_response_interception() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;
        let counter = Arc::new(Counter::default());
        let client = InterceptingClient::builder()
            .middlewares(vec![counter.clone() as Arc<dyn Middleware>])
            .request_timeout(Duration::from_millis(50))
            .build();

        let result = client.get(format!("{}/slow", server.uri()), None).await;

        match result {
            Err(Error::Timeout { timeout, .. }) => assert_eq!(timeout, Duration::from_millis(50)),
            other => panic!("expected a timeout, got {:?}", other),
        }
        assert_eq!(counter.requests.load(Ordering::SeqCst), 1);
        assert_eq!(counter.responses.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transport_failures_pass_through() {
        let counter = Arc::new(Counter::default());
        let client = client_with(vec![counter.clone() as Arc<dyn Middleware>]);

        let result = client.get("http://127.0.0.1:1/", None).await;

        assert!(matches!(result, Err(Error::HyperError(_))));
        assert_eq!(counter.requests.load(Ordering::SeqCst), 1);
        assert_eq!(counter.responses.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn send_skips_the_pipeline() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/direct"))
            .respond_with(ResponseTemplate::new(200).set_body_string("direct"))
            .mount(&server)
            .await;
        let counter = Arc::new(Counter::default());
        let client = client_with(vec![counter.clone() as Arc<dyn Middleware>]);

        let request = Request::get(format!("{}/direct", server.uri()))
            .body(Body::empty())
            .unwrap();
        let response = client.send(request).await.unwrap();
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();

        assert_eq!(&body[..], b"direct");
        assert_eq!(counter.requests.load(Ordering::SeqCst), 0);
        assert_eq!(counter.responses.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn closed_clients_refuse_new_requests() {
        let server = MockServer::start().await;
        let client = InterceptingClient::new();

        client.close();
        let result = client.get(server.uri(), None).await;

        assert!(matches!(result, Err(Error::Closed)));
    }

    #[tokio::test]
    async fn concurrent_exchanges_share_middleware() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shared"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(16)
            .mount(&server)
            .await;
        let counter = Arc::new(Counter::default());
        let client = Arc::new(client_with(vec![counter.clone() as Arc<dyn Middleware>]));
        let url = format!("{}/shared", server.uri());

        let handles = (0..16)
            .map(|_| {
                let client = client.clone();
                let url = url.clone();
                tokio::spawn(async move { client.read(url, None).await })
            })
            .collect::<Vec<_>>();
        let results = futures::future::join_all(handles).await;

        for result in results {
            assert_eq!(result.unwrap().unwrap(), "ok");
        }
        assert_eq!(counter.requests.load(Ordering::SeqCst), 16);
        assert_eq!(counter.responses.load(Ordering::SeqCst), 16);
    }
}
