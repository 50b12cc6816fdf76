//! Entity kinds and where they live in the namespace.
//!
//! Each marker type pairs a wire description variant with its public
//! properties type, its request paths and its request body writer. The
//! projector and the client are generic over [`EntityKind`], so adding a
//! kind never touches the paging code.

use super::feed::{EntityContent, EntityDescription};
use super::models::{QueueProperties, RuleProperties, SubscriptionProperties, TopicProperties};
use super::serialization;

/// Owning names for kinds that live beneath a topic or subscription.
///
/// Identity of nested entities is never reported by the service body, so it
/// is carried out of band from the request that fetched them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityScope {
    pub topic_name: Option<String>,
    pub subscription_name: Option<String>,
}

impl EntityScope {
    /// Scope of top-level entities (queues and topics).
    pub fn namespace() -> Self {
        Self::default()
    }

    pub fn topic(topic_name: impl Into<String>) -> Self {
        Self {
            topic_name: Some(topic_name.into()),
            subscription_name: None,
        }
    }

    pub fn subscription(topic_name: impl Into<String>, subscription_name: impl Into<String>) -> Self {
        Self {
            topic_name: Some(topic_name.into()),
            subscription_name: Some(subscription_name.into()),
        }
    }

    fn topic_name(&self) -> &str {
        self.topic_name.as_deref().unwrap_or_default()
    }

    fn subscription_name(&self) -> &str {
        self.subscription_name.as_deref().unwrap_or_default()
    }
}

pub trait EntityKind: Send + Sync + 'static {
    type Properties: Clone + Send + Sync + 'static;

    /// Lower-case kind name used in log lines and error messages.
    const KIND: &'static str;

    /// Path of the collection listing entities of this kind.
    fn collection_path(scope: &EntityScope) -> String;

    /// Path of one entity of this kind.
    fn entity_path(scope: &EntityScope, name: &str) -> String;

    /// Take this kind's payload out of an entry's content, if it is one.
    fn take(content: EntityContent) -> Option<EntityDescription<Self::Properties>>;

    /// Write the identity fields the service leaves out of the body.
    fn assign_identity(properties: &mut Self::Properties, name: &str, scope: &EntityScope);

    /// Atom entry body for create and update.
    fn entry_body(properties: &Self::Properties) -> String;
}

pub struct Queue;
pub struct Topic;
pub struct Subscription;
pub struct Rule;

impl EntityKind for Queue {
    type Properties = QueueProperties;
    const KIND: &'static str = "queue";

    fn collection_path(_: &EntityScope) -> String {
        "$Resources/Queues".to_string()
    }

    fn entity_path(_: &EntityScope, name: &str) -> String {
        encode_path(name)
    }

    fn take(content: EntityContent) -> Option<EntityDescription<QueueProperties>> {
        match content {
            EntityContent::Queue(description) => Some(description),
            _ => None,
        }
    }

    fn assign_identity(properties: &mut QueueProperties, name: &str, _: &EntityScope) {
        properties.name = name.to_string();
    }

    fn entry_body(properties: &QueueProperties) -> String {
        serialization::queue_entry(properties)
    }
}

impl EntityKind for Topic {
    type Properties = TopicProperties;
    const KIND: &'static str = "topic";

    fn collection_path(_: &EntityScope) -> String {
        "$Resources/Topics".to_string()
    }

    fn entity_path(_: &EntityScope, name: &str) -> String {
        encode_path(name)
    }

    fn take(content: EntityContent) -> Option<EntityDescription<TopicProperties>> {
        match content {
            EntityContent::Topic(description) => Some(description),
            _ => None,
        }
    }

    fn assign_identity(properties: &mut TopicProperties, name: &str, _: &EntityScope) {
        properties.name = name.to_string();
    }

    fn entry_body(properties: &TopicProperties) -> String {
        serialization::topic_entry(properties)
    }
}

impl EntityKind for Subscription {
    type Properties = SubscriptionProperties;
    const KIND: &'static str = "subscription";

    fn collection_path(scope: &EntityScope) -> String {
        format!("{}/Subscriptions", encode_path(scope.topic_name()))
    }

    fn entity_path(scope: &EntityScope, name: &str) -> String {
        format!("{}/{}", Self::collection_path(scope), encode_path(name))
    }

    fn take(content: EntityContent) -> Option<EntityDescription<SubscriptionProperties>> {
        match content {
            EntityContent::Subscription(description) => Some(description),
            _ => None,
        }
    }

    fn assign_identity(properties: &mut SubscriptionProperties, name: &str, scope: &EntityScope) {
        properties.topic_name = scope.topic_name().to_string();
        properties.subscription_name = name.to_string();
    }

    fn entry_body(properties: &SubscriptionProperties) -> String {
        serialization::subscription_entry(properties, None)
    }
}

impl EntityKind for Rule {
    type Properties = RuleProperties;
    const KIND: &'static str = "rule";

    fn collection_path(scope: &EntityScope) -> String {
        format!(
            "{}/Subscriptions/{}/Rules",
            encode_path(scope.topic_name()),
            encode_path(scope.subscription_name())
        )
    }

    fn entity_path(scope: &EntityScope, name: &str) -> String {
        format!("{}/{}", Self::collection_path(scope), encode_path(name))
    }

    fn take(content: EntityContent) -> Option<EntityDescription<RuleProperties>> {
        match content {
            EntityContent::Rule(description) => Some(description),
            _ => None,
        }
    }

    fn assign_identity(properties: &mut RuleProperties, name: &str, scope: &EntityScope) {
        properties.topic_name = scope.topic_name().to_string();
        properties.subscription_name = scope.subscription_name().to_string();
        properties.name = name.to_string();
    }

    fn entry_body(properties: &RuleProperties) -> String {
        serialization::rule_entry(properties)
    }
}

/// Percent-encode each segment; queue and topic names may contain `/`.
fn encode_path(name: &str) -> String {
    name.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
