#![allow(dead_code)]

pub mod http_helpers {
    use serde_json::Value;

    /// Build a transport request with optional headers and body
    pub fn request(method: &str, uri: &str, headers: &[(&str, &str)], body: &[u8]) -> http::Request<Vec<u8>> {
        let mut builder = http::Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(body.to_vec()).unwrap()
    }

    pub fn get(uri: &str) -> http::Request<Vec<u8>> {
        request("GET", uri, &[], b"")
    }

    /// Parse the rendered body as JSON
    pub fn json_body(res: &http::Response<Vec<u8>>) -> Value {
        serde_json::from_slice(res.body()).unwrap()
    }

    /// Header value as `&str`, `None` when absent
    pub fn header<'a>(res: &'a http::Response<Vec<u8>>, name: &str) -> Option<&'a str> {
        res.headers().get(name).and_then(|v| v.to_str().ok())
    }
}

pub mod fixtures {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use http::Method;
    use resource_dispatch::resource::{
        EtagProvider, Handler, LastModifiedProvider, Reply, ResourceType, ValidationRule,
    };
    use serde_json::json;

    /// `Sun, 06 Nov 1994 08:49:37 GMT`
    pub const LAST_MODIFIED_SECS: u64 = 784_111_777;
    pub const LAST_MODIFIED_HTTP: &str = "Sun, 06 Nov 1994 08:49:37 GMT";

    pub fn last_modified() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(LAST_MODIFIED_SECS)
    }

    /// `/docs/{id}` with GET and PUT, numeric ids, ETag `doc-{id}` and a
    /// fixed Last-Modified
    pub fn document() -> ResourceType {
        ResourceType::new("Document", "/docs/{id}")
            .validate("id", ValidationRule::pattern("[0-9]+").unwrap())
            .etag(
                EtagProvider::new(|args| Ok(args.str("id").map(|id| format!("doc-{id}"))))
                    .param("id"),
            )
            .last_modified(LastModifiedProvider::new(|_| Ok(Some(last_modified()))))
            .handler(
                Method::GET,
                Handler::new(|args| Ok(Reply::new(json!({ "id": args.str("id") })))).param("id"),
            )
            .handler(
                Method::PUT,
                Handler::new(|args| Ok(Reply::new(json!({ "stored": args.str("id") }))))
                    .param("id"),
            )
    }

    /// `/upload` accepting POST, echoing the body length
    pub fn upload() -> ResourceType {
        ResourceType::new("Upload", "/upload").handler(
            Method::POST,
            Handler::new(|args| Ok(Reply::new(json!({ "size": args.request().body.len() }))))
                .param("request"),
        )
    }

    /// `/status` with a plain-text GET and nothing else
    pub fn status() -> ResourceType {
        ResourceType::new("Status", "/status")
            .handler(Method::GET, Handler::new(|_| Ok(Reply::new("ok"))))
    }
}

pub mod log_capture {
    use std::fmt;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// One recorded event
    #[derive(Debug, Clone)]
    pub struct Captured {
        pub level: Level,
        pub message: String,
        pub status: Option<u64>,
    }

    /// Layer that keeps every event it sees, for asserting on severities
    #[derive(Clone, Default)]
    pub struct LogCapture {
        events: Arc<Mutex<Vec<Captured>>>,
    }

    impl LogCapture {
        pub fn new() -> Self {
            Self::default()
        }

        /// Subscriber handle to inject into a dispatcher
        pub fn dispatch(&self) -> tracing::Dispatch {
            tracing::Dispatch::new(tracing_subscriber::registry().with(self.clone()))
        }

        pub fn events(&self) -> Vec<Captured> {
            self.events.lock().clone()
        }

        /// Events that carried a `status` field
        pub fn status_events(&self) -> Vec<Captured> {
            self.events
                .lock()
                .iter()
                .filter(|e| e.status.is_some())
                .cloned()
                .collect()
        }

        pub fn clear(&self) {
            self.events.lock().clear();
        }
    }

    struct FieldVisitor<'a>(&'a mut Captured);

    impl Visit for FieldVisitor<'_> {
        fn record_u64(&mut self, field: &Field, value: u64) {
            if field.name() == "status" {
                self.0.status = Some(value);
            }
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.0.message = format!("{value:?}");
            }
        }
    }

    impl<S: Subscriber> Layer<S> for LogCapture {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut captured = Captured {
                level: *event.metadata().level(),
                message: String::new(),
                status: None,
            };
            event.record(&mut FieldVisitor(&mut captured));
            self.events.lock().push(captured);
        }
    }
}
