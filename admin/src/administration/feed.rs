//! Atom feed and entry shapes returned by the management API, and their parser.
//!
//! A list call returns `<feed>` with one `<entry>` per entity; a single get
//! returns a bare `<entry>`, or an empty `<feed>` when the entity is missing.
//! Each entry carries the entity name in `<title>` and exactly one
//! description element inside `<content type="application/xml">`.

use super::duration::parse_duration;
use super::errors::{AdministrationError, AdministrationResult};
use super::models::{
    CorrelationRuleFilter, EntityStatus, MessageCountDetails, QueueProperties, RuleAction,
    RuleFilter, RuleProperties, RuntimeInfo, SubscriptionProperties, TopicProperties,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use roxmltree::{Document, Node};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseLink {
    pub rel: String,
    pub href: String,
}

/// A parsed description payload: the settable properties plus whatever
/// runtime information the service included.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDescription<P> {
    pub properties: P,
    pub runtime: RuntimeInfo,
}

/// The single description carried by an entry's `<content>`.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityContent {
    Queue(EntityDescription<QueueProperties>),
    Topic(EntityDescription<TopicProperties>),
    Subscription(EntityDescription<SubscriptionProperties>),
    Rule(EntityDescription<RuleProperties>),
}

impl EntityContent {
    pub fn kind_name(&self) -> &'static str {
        match self {
            EntityContent::Queue(_) => "queue",
            EntityContent::Topic(_) => "topic",
            EntityContent::Subscription(_) => "subscription",
            EntityContent::Rule(_) => "rule",
        }
    }
}

/// One Atom entry. `content == None` means the entity was not found.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub content: Option<EntityContent>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Feed {
    pub entries: Vec<FeedEntry>,
    pub links: Vec<ResponseLink>,
    /// Entries left out because their description could not be read, as
    /// `(title, reason)`. The rest of the feed is still usable.
    pub rejected: Vec<(String, String)>,
}

impl Feed {
    /// Parse a list response. Only links that are direct children of
    /// `<feed>` are collected; per-entry `self` links are ignored.
    ///
    /// Only a document that is not a feed fails; a single unreadable entry
    /// lands in `rejected` instead.
    pub fn parse(xml: &str) -> AdministrationResult<Feed> {
        let doc = parse_document(xml)?;
        let root = doc.root_element();
        if root.tag_name().name() != "feed" {
            return Err(AdministrationError::malformed(format!(
                "expected <feed>, found <{}>",
                root.tag_name().name()
            )));
        }

        let mut feed = Feed::default();
        for child in root.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "link" => {
                    if let (Some(rel), Some(href)) = (child.attribute("rel"), child.attribute("href"))
                    {
                        feed.links.push(ResponseLink {
                            rel: rel.to_string(),
                            href: href.to_string(),
                        });
                    }
                }
                "entry" => match parse_entry(child) {
                    Ok(entry) => feed.entries.push(entry),
                    Err(e) => feed.rejected.push((entry_title(child), e.to_string())),
                },
                _ => {}
            }
        }
        Ok(feed)
    }
}

impl FeedEntry {
    /// Parse a single-entity response.
    ///
    /// Returns `None` for an empty body or an entry-less feed, which is how
    /// the service answers a get for a name that does not exist.
    pub fn parse_single(xml: &str) -> AdministrationResult<Option<FeedEntry>> {
        if xml.trim().is_empty() {
            return Ok(None);
        }
        let doc = parse_document(xml)?;
        let root = doc.root_element();
        match root.tag_name().name() {
            "entry" => parse_entry(root).map(Some),
            "feed" => root
                .children()
                .find(|n| n.is_element() && n.tag_name().name() == "entry")
                .map(parse_entry)
                .transpose(),
            other => Err(AdministrationError::malformed(format!(
                "expected <entry> or <feed>, found <{other}>"
            ))),
        }
    }
}

fn parse_document(xml: &str) -> AdministrationResult<Document<'_>> {
    Document::parse(xml).map_err(|e| AdministrationError::malformed(format!("invalid XML: {e}")))
}

fn entry_title(entry: Node) -> String {
    child(entry, "title")
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

fn parse_entry(entry: Node) -> AdministrationResult<FeedEntry> {
    let title = entry_title(entry);

    let description = child(entry, "content").and_then(|c| c.children().find(Node::is_element));
    let content = match description {
        Some(node) => parse_description(node)?,
        None => None,
    };

    Ok(FeedEntry { title, content })
}

fn parse_description(node: Node) -> AdministrationResult<Option<EntityContent>> {
    let content = match node.tag_name().name() {
        "QueueDescription" => EntityContent::Queue(parse_queue(node)?),
        "TopicDescription" => EntityContent::Topic(parse_topic(node)?),
        "SubscriptionDescription" => EntityContent::Subscription(parse_subscription(node)?),
        "RuleDescription" => EntityContent::Rule(parse_rule(node)?),
        // Other payloads (e.g. namespace info) are not entities this client manages.
        _ => return Ok(None),
    };
    Ok(Some(content))
}

fn parse_queue(node: Node) -> AdministrationResult<EntityDescription<QueueProperties>> {
    let mut props = QueueProperties::default();
    let mut runtime = RuntimeInfo::default();

    for field in node.children().filter(Node::is_element) {
        let value = text(field);
        match field.tag_name().name() {
            "LockDuration" => props.lock_duration = parse_duration(value)?,
            "MaxSizeInMegabytes" => props.max_size_in_megabytes = parse_number(field)?,
            "RequiresDuplicateDetection" => props.requires_duplicate_detection = parse_bool(field)?,
            "RequiresSession" => props.requires_session = parse_bool(field)?,
            "DefaultMessageTimeToLive" => props.default_message_time_to_live = parse_duration(value)?,
            "DeadLetteringOnMessageExpiration" => {
                props.dead_lettering_on_message_expiration = parse_bool(field)?
            }
            "DuplicateDetectionHistoryTimeWindow" => {
                props.duplicate_detection_history_time_window = parse_duration(value)?
            }
            "MaxDeliveryCount" => props.max_delivery_count = parse_number(field)?,
            "EnableBatchedOperations" => props.enable_batched_operations = parse_bool(field)?,
            "Status" => props.status = parse_status(field),
            "ForwardTo" => props.forward_to = optional_text(field),
            "UserMetadata" => props.user_metadata = optional_text(field),
            "AutoDeleteOnIdle" => props.auto_delete_on_idle = parse_duration(value)?,
            "EnablePartitioning" => props.enable_partitioning = parse_bool(field)?,
            "ForwardDeadLetteredMessagesTo" => {
                props.forward_dead_lettered_messages_to = optional_text(field)
            }
            "MaxMessageSizeInKilobytes" => {
                props.max_message_size_in_kilobytes = Some(parse_number(field)?)
            }
            _ => parse_runtime_field(field, &mut runtime)?,
        }
    }

    Ok(EntityDescription {
        properties: props,
        runtime,
    })
}

fn parse_topic(node: Node) -> AdministrationResult<EntityDescription<TopicProperties>> {
    let mut props = TopicProperties::default();
    let mut runtime = RuntimeInfo::default();

    for field in node.children().filter(Node::is_element) {
        let value = text(field);
        match field.tag_name().name() {
            "DefaultMessageTimeToLive" => props.default_message_time_to_live = parse_duration(value)?,
            "MaxSizeInMegabytes" => props.max_size_in_megabytes = parse_number(field)?,
            "RequiresDuplicateDetection" => props.requires_duplicate_detection = parse_bool(field)?,
            "DuplicateDetectionHistoryTimeWindow" => {
                props.duplicate_detection_history_time_window = parse_duration(value)?
            }
            "EnableBatchedOperations" => props.enable_batched_operations = parse_bool(field)?,
            "Status" => props.status = parse_status(field),
            "UserMetadata" => props.user_metadata = optional_text(field),
            "SupportOrdering" => props.support_ordering = parse_bool(field)?,
            "AutoDeleteOnIdle" => props.auto_delete_on_idle = parse_duration(value)?,
            "EnablePartitioning" => props.enable_partitioning = parse_bool(field)?,
            "MaxMessageSizeInKilobytes" => {
                props.max_message_size_in_kilobytes = Some(parse_number(field)?)
            }
            _ => parse_runtime_field(field, &mut runtime)?,
        }
    }

    Ok(EntityDescription {
        properties: props,
        runtime,
    })
}

fn parse_subscription(
    node: Node,
) -> AdministrationResult<EntityDescription<SubscriptionProperties>> {
    let mut props = SubscriptionProperties::default();
    let mut runtime = RuntimeInfo::default();

    for field in node.children().filter(Node::is_element) {
        let value = text(field);
        match field.tag_name().name() {
            "LockDuration" => props.lock_duration = parse_duration(value)?,
            "RequiresSession" => props.requires_session = parse_bool(field)?,
            "DefaultMessageTimeToLive" => props.default_message_time_to_live = parse_duration(value)?,
            "DeadLetteringOnMessageExpiration" => {
                props.dead_lettering_on_message_expiration = parse_bool(field)?
            }
            "DeadLetteringOnFilterEvaluationExceptions" => {
                props.dead_lettering_on_filter_evaluation_exceptions = parse_bool(field)?
            }
            "MaxDeliveryCount" => props.max_delivery_count = parse_number(field)?,
            "EnableBatchedOperations" => props.enable_batched_operations = parse_bool(field)?,
            "Status" => props.status = parse_status(field),
            "ForwardTo" => props.forward_to = optional_text(field),
            "UserMetadata" => props.user_metadata = optional_text(field),
            "ForwardDeadLetteredMessagesTo" => {
                props.forward_dead_lettered_messages_to = optional_text(field)
            }
            "AutoDeleteOnIdle" => props.auto_delete_on_idle = parse_duration(value)?,
            _ => parse_runtime_field(field, &mut runtime)?,
        }
    }

    Ok(EntityDescription {
        properties: props,
        runtime,
    })
}

fn parse_rule(node: Node) -> AdministrationResult<EntityDescription<RuleProperties>> {
    let mut props = RuleProperties::default();
    let mut runtime = RuntimeInfo::default();

    for field in node.children().filter(Node::is_element) {
        match field.tag_name().name() {
            "Filter" => props.filter = parse_filter(field)?,
            "Action" => props.action = parse_action(field)?,
            // Identity comes from the entry title.
            "Name" => {}
            _ => parse_runtime_field(field, &mut runtime)?,
        }
    }

    Ok(EntityDescription {
        properties: props,
        runtime,
    })
}

fn parse_filter(node: Node) -> AdministrationResult<RuleFilter> {
    match type_attribute(node) {
        Some("SqlFilter") => Ok(RuleFilter::Sql {
            expression: child(node, "SqlExpression")
                .map(|n| text(n).to_string())
                .unwrap_or_default(),
        }),
        Some("TrueFilter") => Ok(RuleFilter::True),
        Some("FalseFilter") => Ok(RuleFilter::False),
        Some("CorrelationFilter") => {
            let mut filter = CorrelationRuleFilter::default();
            for field in node.children().filter(Node::is_element) {
                match field.tag_name().name() {
                    "CorrelationId" => filter.correlation_id = optional_text(field),
                    "MessageId" => filter.message_id = optional_text(field),
                    "To" => filter.to = optional_text(field),
                    "ReplyTo" => filter.reply_to = optional_text(field),
                    "Label" => filter.subject = optional_text(field),
                    "SessionId" => filter.session_id = optional_text(field),
                    "ReplyToSessionId" => filter.reply_to_session_id = optional_text(field),
                    "ContentType" => filter.content_type = optional_text(field),
                    "Properties" => {
                        for pair in field.children().filter(Node::is_element) {
                            let key = child(pair, "Key").map(text);
                            let value = child(pair, "Value").map(text);
                            if let (Some(key), Some(value)) = (key, value) {
                                filter.properties.insert(key.to_string(), value.to_string());
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(RuleFilter::Correlation(filter))
        }
        other => Err(AdministrationError::malformed(format!(
            "unsupported rule filter type {other:?}"
        ))),
    }
}

fn parse_action(node: Node) -> AdministrationResult<Option<RuleAction>> {
    match type_attribute(node) {
        Some("SqlRuleAction") => Ok(Some(RuleAction::Sql {
            expression: child(node, "SqlExpression")
                .map(|n| text(n).to_string())
                .unwrap_or_default(),
        })),
        Some("EmptyRuleAction") | None => Ok(None),
        Some(other) => Err(AdministrationError::malformed(format!(
            "unsupported rule action type '{other}'"
        ))),
    }
}

/// Runtime-only elements shared by every description. Unknown elements are
/// skipped so newer service versions do not break parsing.
fn parse_runtime_field(field: Node, runtime: &mut RuntimeInfo) -> AdministrationResult<()> {
    match field.tag_name().name() {
        "CreatedAt" => runtime.created_at = parse_timestamp(field)?,
        "UpdatedAt" => runtime.updated_at = parse_timestamp(field)?,
        "AccessedAt" => runtime.accessed_at = parse_timestamp(field)?,
        "SizeInBytes" => runtime.size_in_bytes = Some(parse_number(field)?),
        "MessageCount" => runtime.total_message_count = Some(parse_number(field)?),
        "SubscriptionCount" => runtime.subscription_count = Some(parse_number(field)?),
        "CountDetails" => runtime.counts = parse_count_details(field)?,
        _ => {}
    }
    Ok(())
}

fn parse_count_details(node: Node) -> AdministrationResult<MessageCountDetails> {
    let mut counts = MessageCountDetails::default();
    for field in node.children().filter(Node::is_element) {
        match field.tag_name().name() {
            "ActiveMessageCount" => counts.active_message_count = parse_number(field)?,
            "DeadLetterMessageCount" => counts.dead_letter_message_count = parse_number(field)?,
            "ScheduledMessageCount" => counts.scheduled_message_count = parse_number(field)?,
            "TransferMessageCount" => counts.transfer_message_count = parse_number(field)?,
            "TransferDeadLetterMessageCount" => {
                counts.transfer_dead_letter_message_count = parse_number(field)?
            }
            _ => {}
        }
    }
    Ok(counts)
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn text<'a>(node: Node<'a, '_>) -> &'a str {
    node.text().map(str::trim).unwrap_or("")
}

fn optional_text(node: Node) -> Option<String> {
    let value = text(node);
    (!value.is_empty()).then(|| value.to_string())
}

fn type_attribute<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name() == "type")
        .map(|a| a.value())
}

fn field_error(node: Node, value: &str, expected: &str) -> AdministrationError {
    AdministrationError::malformed(format!(
        "<{}> holds '{value}', expected {expected}",
        node.tag_name().name()
    ))
}

fn parse_bool(node: Node) -> AdministrationResult<bool> {
    match text(node) {
        "true" | "True" => Ok(true),
        "false" | "False" => Ok(false),
        other => Err(field_error(node, other, "a boolean")),
    }
}

fn parse_number<T: std::str::FromStr>(node: Node) -> AdministrationResult<T> {
    let value = text(node);
    value
        .parse()
        .map_err(|_| field_error(node, value, "a number"))
}

fn parse_status(node: Node) -> EntityStatus {
    text(node).parse().unwrap_or(EntityStatus::Unknown)
}

fn parse_timestamp(node: Node) -> AdministrationResult<Option<DateTime<Utc>>> {
    let value = text(node);
    if value.is_empty() {
        return Ok(None);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(|_| field_error(node, value, "a timestamp"))
}
