use super::duration::{self, MAX_DURATION};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_LOCK_DURATION: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_SIZE_IN_MEGABYTES: i64 = 1024;
pub const DEFAULT_MAX_DELIVERY_COUNT: i32 = 10;
pub const DEFAULT_DUPLICATE_DETECTION_WINDOW: Duration = Duration::from_secs(600);

/// Name given to the rule the service creates with every subscription.
pub const DEFAULT_RULE_NAME: &str = "$Default";

/// Lifecycle state reported by the service for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum EntityStatus {
    #[default]
    Active,
    Disabled,
    SendDisabled,
    ReceiveDisabled,
    Creating,
    Deleting,
    Renaming,
    Restoring,
    Unknown,
}

impl EntityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::Active => "Active",
            EntityStatus::Disabled => "Disabled",
            EntityStatus::SendDisabled => "SendDisabled",
            EntityStatus::ReceiveDisabled => "ReceiveDisabled",
            EntityStatus::Creating => "Creating",
            EntityStatus::Deleting => "Deleting",
            EntityStatus::Renaming => "Renaming",
            EntityStatus::Restoring => "Restoring",
            EntityStatus::Unknown => "Unknown",
        }
    }
}

impl FromStr for EntityStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "Active" => EntityStatus::Active,
            "Disabled" => EntityStatus::Disabled,
            "SendDisabled" => EntityStatus::SendDisabled,
            "ReceiveDisabled" => EntityStatus::ReceiveDisabled,
            "Creating" => EntityStatus::Creating,
            "Deleting" => EntityStatus::Deleting,
            "Renaming" => EntityStatus::Renaming,
            "Restoring" => EntityStatus::Restoring,
            _ => EntityStatus::Unknown,
        })
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Queue configuration.
///
/// The same shape is sent on create/update and returned on read. `name` is
/// never part of the description body on the wire; it is filled in from the
/// Atom entry title when the entity is read back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueProperties {
    pub name: String,
    #[serde(serialize_with = "duration::serialize")]
    pub lock_duration: Duration,
    pub max_size_in_megabytes: i64,
    pub requires_duplicate_detection: bool,
    pub requires_session: bool,
    #[serde(serialize_with = "duration::serialize")]
    pub default_message_time_to_live: Duration,
    pub dead_lettering_on_message_expiration: bool,
    #[serde(serialize_with = "duration::serialize")]
    pub duplicate_detection_history_time_window: Duration,
    pub max_delivery_count: i32,
    pub enable_batched_operations: bool,
    pub status: EntityStatus,
    pub forward_to: Option<String>,
    pub user_metadata: Option<String>,
    #[serde(serialize_with = "duration::serialize")]
    pub auto_delete_on_idle: Duration,
    pub enable_partitioning: bool,
    pub forward_dead_lettered_messages_to: Option<String>,
    pub max_message_size_in_kilobytes: Option<i64>,
}

impl QueueProperties {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for QueueProperties {
    fn default() -> Self {
        Self {
            name: String::new(),
            lock_duration: DEFAULT_LOCK_DURATION,
            max_size_in_megabytes: DEFAULT_MAX_SIZE_IN_MEGABYTES,
            requires_duplicate_detection: false,
            requires_session: false,
            default_message_time_to_live: MAX_DURATION,
            dead_lettering_on_message_expiration: false,
            duplicate_detection_history_time_window: DEFAULT_DUPLICATE_DETECTION_WINDOW,
            max_delivery_count: DEFAULT_MAX_DELIVERY_COUNT,
            enable_batched_operations: true,
            status: EntityStatus::Active,
            forward_to: None,
            user_metadata: None,
            auto_delete_on_idle: MAX_DURATION,
            enable_partitioning: false,
            forward_dead_lettered_messages_to: None,
            max_message_size_in_kilobytes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicProperties {
    pub name: String,
    #[serde(serialize_with = "duration::serialize")]
    pub default_message_time_to_live: Duration,
    pub max_size_in_megabytes: i64,
    pub requires_duplicate_detection: bool,
    #[serde(serialize_with = "duration::serialize")]
    pub duplicate_detection_history_time_window: Duration,
    pub enable_batched_operations: bool,
    pub status: EntityStatus,
    pub user_metadata: Option<String>,
    pub support_ordering: bool,
    #[serde(serialize_with = "duration::serialize")]
    pub auto_delete_on_idle: Duration,
    pub enable_partitioning: bool,
    pub max_message_size_in_kilobytes: Option<i64>,
}

impl TopicProperties {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for TopicProperties {
    fn default() -> Self {
        Self {
            name: String::new(),
            default_message_time_to_live: MAX_DURATION,
            max_size_in_megabytes: DEFAULT_MAX_SIZE_IN_MEGABYTES,
            requires_duplicate_detection: false,
            duplicate_detection_history_time_window: DEFAULT_DUPLICATE_DETECTION_WINDOW,
            enable_batched_operations: true,
            status: EntityStatus::Active,
            user_metadata: None,
            support_ordering: false,
            auto_delete_on_idle: MAX_DURATION,
            enable_partitioning: false,
            max_message_size_in_kilobytes: None,
        }
    }
}

/// Subscription configuration. `topic_name` and `subscription_name` are
/// identity fields injected on read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionProperties {
    pub topic_name: String,
    pub subscription_name: String,
    #[serde(serialize_with = "duration::serialize")]
    pub lock_duration: Duration,
    pub requires_session: bool,
    #[serde(serialize_with = "duration::serialize")]
    pub default_message_time_to_live: Duration,
    pub dead_lettering_on_message_expiration: bool,
    pub dead_lettering_on_filter_evaluation_exceptions: bool,
    pub max_delivery_count: i32,
    pub enable_batched_operations: bool,
    pub status: EntityStatus,
    pub forward_to: Option<String>,
    pub user_metadata: Option<String>,
    pub forward_dead_lettered_messages_to: Option<String>,
    #[serde(serialize_with = "duration::serialize")]
    pub auto_delete_on_idle: Duration,
}

impl SubscriptionProperties {
    pub fn new(topic_name: impl Into<String>, subscription_name: impl Into<String>) -> Self {
        Self {
            topic_name: topic_name.into(),
            subscription_name: subscription_name.into(),
            ..Self::default()
        }
    }
}

impl Default for SubscriptionProperties {
    fn default() -> Self {
        Self {
            topic_name: String::new(),
            subscription_name: String::new(),
            lock_duration: DEFAULT_LOCK_DURATION,
            requires_session: false,
            default_message_time_to_live: MAX_DURATION,
            dead_lettering_on_message_expiration: false,
            dead_lettering_on_filter_evaluation_exceptions: true,
            max_delivery_count: DEFAULT_MAX_DELIVERY_COUNT,
            enable_batched_operations: true,
            status: EntityStatus::Active,
            forward_to: None,
            user_metadata: None,
            forward_dead_lettered_messages_to: None,
            auto_delete_on_idle: MAX_DURATION,
        }
    }
}

/// Filter half of a subscription rule.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub enum RuleFilter {
    Sql { expression: String },
    /// Matches every message (`1=1`).
    #[default]
    True,
    /// Matches no message (`1=0`).
    False,
    Correlation(CorrelationRuleFilter),
}

impl RuleFilter {
    pub fn sql(expression: impl Into<String>) -> Self {
        RuleFilter::Sql {
            expression: expression.into(),
        }
    }

    /// SQL expression the service evaluates for this filter, if it has one.
    pub fn sql_expression(&self) -> Option<&str> {
        match self {
            RuleFilter::Sql { expression } => Some(expression),
            RuleFilter::True => Some("1=1"),
            RuleFilter::False => Some("1=0"),
            RuleFilter::Correlation(_) => None,
        }
    }
}

/// Matches on system properties and string-valued application properties.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CorrelationRuleFilter {
    pub correlation_id: Option<String>,
    pub message_id: Option<String>,
    pub to: Option<String>,
    pub reply_to: Option<String>,
    pub subject: Option<String>,
    pub session_id: Option<String>,
    pub reply_to_session_id: Option<String>,
    pub content_type: Option<String>,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RuleAction {
    Sql { expression: String },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RuleProperties {
    pub topic_name: String,
    pub subscription_name: String,
    pub name: String,
    pub filter: RuleFilter,
    pub action: Option<RuleAction>,
}

impl RuleProperties {
    pub fn new(name: impl Into<String>, filter: RuleFilter) -> Self {
        Self {
            name: name.into(),
            filter,
            ..Self::default()
        }
    }
}

/// Message counters reported with runtime properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MessageCountDetails {
    pub active_message_count: i64,
    pub dead_letter_message_count: i64,
    pub scheduled_message_count: i64,
    pub transfer_message_count: i64,
    pub transfer_dead_letter_message_count: i64,
}

/// Read-only runtime information parsed alongside a description.
///
/// Only populated by the service when the request asked for enrichment.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RuntimeInfo {
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub accessed_at: Option<DateTime<Utc>>,
    pub size_in_bytes: Option<i64>,
    pub total_message_count: Option<i64>,
    pub subscription_count: Option<i32>,
    pub counts: MessageCountDetails,
}

/// Properties of an entity decorated with its runtime counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeProperties<P> {
    #[serde(flatten)]
    properties: P,
    runtime: RuntimeInfo,
}

impl<P> RuntimeProperties<P> {
    pub fn new(properties: P, runtime: RuntimeInfo) -> Self {
        Self {
            properties,
            runtime,
        }
    }

    pub fn properties(&self) -> &P {
        &self.properties
    }

    pub fn into_properties(self) -> P {
        self.properties
    }

    pub fn runtime(&self) -> &RuntimeInfo {
        &self.runtime
    }

    pub fn active_message_count(&self) -> i64 {
        self.runtime.counts.active_message_count
    }

    pub fn dead_letter_message_count(&self) -> i64 {
        self.runtime.counts.dead_letter_message_count
    }

    pub fn scheduled_message_count(&self) -> i64 {
        self.runtime.counts.scheduled_message_count
    }

    pub fn size_in_bytes(&self) -> i64 {
        self.runtime.size_in_bytes.unwrap_or_default()
    }

    pub fn total_message_count(&self) -> i64 {
        self.runtime.total_message_count.unwrap_or_default()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.runtime.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.runtime.updated_at
    }

    pub fn accessed_at(&self) -> Option<DateTime<Utc>> {
        self.runtime.accessed_at
    }
}

impl<P> Deref for RuntimeProperties<P> {
    type Target = P;

    fn deref(&self) -> &P {
        &self.properties
    }
}

pub type QueueRuntimeProperties = RuntimeProperties<QueueProperties>;
pub type TopicRuntimeProperties = RuntimeProperties<TopicProperties>;
pub type SubscriptionRuntimeProperties = RuntimeProperties<SubscriptionProperties>;

impl TopicRuntimeProperties {
    pub fn subscription_count(&self) -> i32 {
        self.runtime.subscription_count.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_defaults() {
        let queue = QueueProperties::new("orders");
        assert_eq!(queue.name, "orders");
        assert_eq!(queue.lock_duration, Duration::from_secs(60));
        assert_eq!(queue.max_delivery_count, 10);
        assert_eq!(queue.default_message_time_to_live, MAX_DURATION);
        assert!(queue.enable_batched_operations);

        let subscription = SubscriptionProperties::new("events", "audit");
        assert_eq!(subscription.topic_name, "events");
        assert!(subscription.dead_lettering_on_filter_evaluation_exceptions);
    }

    #[test]
    fn unknown_status_maps_to_unknown() {
        assert_eq!("SendDisabled".parse::<EntityStatus>().unwrap(), EntityStatus::SendDisabled);
        assert_eq!("Paused".parse::<EntityStatus>().unwrap(), EntityStatus::Unknown);
    }

    #[test]
    fn runtime_properties_deref_to_properties() {
        let runtime = RuntimeInfo {
            size_in_bytes: Some(2048),
            counts: MessageCountDetails {
                active_message_count: 3,
                dead_letter_message_count: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        let props = QueueRuntimeProperties::new(QueueProperties::new("orders"), runtime);

        assert_eq!(props.name, "orders");
        assert_eq!(props.active_message_count(), 3);
        assert_eq!(props.dead_letter_message_count(), 1);
        assert_eq!(props.size_in_bytes(), 2048);
        assert_eq!(props.total_message_count(), 0);
    }

    #[test]
    fn serializes_durations_as_iso8601() {
        let json = serde_json::to_value(QueueProperties::new("orders")).unwrap();
        assert_eq!(json["lock_duration"], "PT1M");
        assert_eq!(json["auto_delete_on_idle"], "P10675199DT2H48M5.4775807S");
    }
}
