#![allow(dead_code)]

use admin::administration::{
    AdministrationClient, AdministrationClientOptions, AdministrationResult, FeedEntry,
    HttpRequest, HttpResponse, Logger, Transport,
};
use async_trait::async_trait;
use log::{Level, Log, Metadata, Record};
use reqwest::{Method, StatusCode};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

pub const ATOM_ENTRY_PREFIX: &str = r#"<entry xmlns="http://www.w3.org/2005/Atom">"#;
pub const EMPTY_FEED: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title type="text">Publicly Listed Services</title></feed>"#;
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// In-memory namespace speaking the Atom management protocol.
///
/// Entities are keyed by their (encoded) request path and listed in path
/// order, which is enough to exercise paging, identity and CRUD semantics.
#[derive(Default)]
pub struct FakeNamespace {
    entities: Mutex<BTreeMap<String, StoredEntity>>,
    requests: Mutex<Vec<HttpRequest>>,
}

struct StoredEntity {
    collection: String,
    name: String,
    body: String,
}

impl FakeNamespace {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.lock().unwrap().len()
    }

    fn handle(&self, request: &HttpRequest) -> HttpResponse {
        match request.method {
            Method::GET if request.query_value("$skip").is_some() => self.list(request),
            Method::GET => self.get(&request.path),
            Method::PUT => self.put(request),
            Method::DELETE => self.delete(&request.path),
            _ => HttpResponse::new(StatusCode::METHOD_NOT_ALLOWED, ""),
        }
    }

    fn list(&self, request: &HttpRequest) -> HttpResponse {
        let skip: usize = request
            .query_value("$skip")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let top: usize = request
            .query_value("$top")
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);

        let entities = self.entities.lock().unwrap();
        let members: Vec<&StoredEntity> = entities
            .values()
            .filter(|e| e.collection == request.path)
            .collect();

        let mut xml = String::from(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#);
        xml.push_str(&format!(
            r#"<link rel="self" href="https://fake.servicebus.windows.net/{}?$skip={skip}&amp;$top={top}"/>"#,
            request.path
        ));
        if skip + top < members.len() {
            xml.push_str(&format!(
                r#"<link rel="next" href="https://fake.servicebus.windows.net/{}?$skip={}&amp;$top={top}&amp;api-version=2021-05"/>"#,
                request.path,
                skip + top
            ));
        }
        for entity in members.iter().skip(skip).take(top) {
            xml.push_str(&entry_with_title(&entity.body, &entity.name));
        }
        xml.push_str("</feed>");
        HttpResponse::new(StatusCode::OK, xml)
    }

    fn get(&self, path: &str) -> HttpResponse {
        let entities = self.entities.lock().unwrap();
        match entities.get(path) {
            Some(entity) => HttpResponse::new(StatusCode::OK, entry_with_title(&entity.body, &entity.name)),
            // The service answers a get for a missing entity with an empty feed.
            None => HttpResponse::new(StatusCode::OK, EMPTY_FEED),
        }
    }

    fn put(&self, request: &HttpRequest) -> HttpResponse {
        let body = request.body.clone().unwrap_or_default();
        let Ok(Some(entry)) = FeedEntry::parse_single(&body) else {
            return HttpResponse::new(StatusCode::BAD_REQUEST, "<Error><Code>400</Code><Detail>Bad entry</Detail></Error>");
        };
        let Some(content) = entry.content else {
            return HttpResponse::new(StatusCode::BAD_REQUEST, "");
        };

        let is_update = request.headers.get("If-Match").is_some();
        let mut entities = self.entities.lock().unwrap();
        let exists = entities.contains_key(&request.path);
        if exists && !is_update {
            return HttpResponse::new(
                StatusCode::CONFLICT,
                "<Error><Code>409</Code><Detail>The messaging entity already exists.</Detail></Error>",
            );
        }
        if !exists && is_update {
            return HttpResponse::new(StatusCode::NOT_FOUND, "");
        }

        let (parent, last) = match request.path.rsplit_once('/') {
            Some((parent, last)) => (parent.to_string(), last.to_string()),
            None => (String::new(), request.path.clone()),
        };
        let collection = match content.kind_name() {
            "queue" => "$Resources/Queues".to_string(),
            "topic" => "$Resources/Topics".to_string(),
            _ => parent,
        };
        let name = match content.kind_name() {
            "queue" | "topic" => decode(&request.path),
            _ => decode(&last),
        };

        let response_body = entry_with_title(&body, &name);
        entities.insert(
            request.path.clone(),
            StoredEntity {
                collection,
                name,
                body,
            },
        );
        let status = if is_update {
            StatusCode::OK
        } else {
            StatusCode::CREATED
        };
        HttpResponse::new(status, response_body)
    }

    fn delete(&self, path: &str) -> HttpResponse {
        match self.entities.lock().unwrap().remove(path) {
            Some(_) => HttpResponse::new(StatusCode::OK, ""),
            None => HttpResponse::new(
                StatusCode::NOT_FOUND,
                "<Error><Code>404</Code><Detail>Entity not found.</Detail></Error>",
            ),
        }
    }
}

#[async_trait]
impl Transport for FakeNamespace {
    async fn send(&self, request: HttpRequest) -> AdministrationResult<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.handle(&request))
    }
}

/// Transport replaying canned responses in order and recording requests.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: impl IntoIterator<Item = HttpResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::default(),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> AdministrationResult<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted response left"))
    }
}

/// Log sink that keeps every record for later assertions.
#[derive(Default)]
pub struct CapturingLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl CapturingLogger {
    pub fn leak() -> &'static CapturingLogger {
        Box::leak(Box::new(CapturingLogger::default()))
    }

    pub fn messages(&self, level: Level) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Log for CapturingLogger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

pub fn client_with(transport: Arc<dyn Transport>, page_size: u32) -> AdministrationClient {
    AdministrationClient::new(
        transport,
        AdministrationClientOptions::default().with_page_size(page_size),
    )
}

pub fn client_with_logger(
    transport: Arc<dyn Transport>,
    page_size: u32,
    logger: &'static CapturingLogger,
) -> AdministrationClient {
    client_with(transport, page_size).with_logger(Logger::new(logger))
}

pub fn feed(links: &[(&str, &str)], entries: &[String]) -> String {
    let mut xml = String::from(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#);
    for (rel, href) in links {
        xml.push_str(&format!(r#"<link rel="{rel}" href="{}"/>"#, href.replace('&', "&amp;")));
    }
    for entry in entries {
        xml.push_str(entry);
    }
    xml.push_str("</feed>");
    xml
}

pub fn queue_entry(name: &str) -> String {
    format!(
        r#"<entry><title type="text">{name}</title><content type="application/xml"><QueueDescription xmlns="http://schemas.microsoft.com/netservices/2010/10/servicebus/connect"><MaxDeliveryCount>10</MaxDeliveryCount></QueueDescription></content></entry>"#
    )
}

pub fn topic_entry(name: &str) -> String {
    format!(
        r#"<entry><title type="text">{name}</title><content type="application/xml"><TopicDescription xmlns="http://schemas.microsoft.com/netservices/2010/10/servicebus/connect"><SupportOrdering>true</SupportOrdering></TopicDescription></content></entry>"#
    )
}

fn entry_with_title(body: &str, name: &str) -> String {
    let entry = body.trim_start_matches(XML_DECLARATION);
    let title = format!(r#"<title type="text">{name}</title>"#);
    match entry.strip_prefix(ATOM_ENTRY_PREFIX) {
        Some(rest) => format!("{ATOM_ENTRY_PREFIX}{title}{rest}"),
        None => entry.to_string(),
    }
}

fn decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}
