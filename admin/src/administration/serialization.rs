//! Atom entry bodies for create and update requests.
//!
//! The service binds descriptions with data contracts, so elements must be
//! written in contract order. Identity (queue/topic/subscription name) is
//! never written into the body; it travels in the request path.

use super::duration::format_duration;
use super::models::{
    CorrelationRuleFilter, QueueProperties, RuleAction, RuleFilter, RuleProperties,
    SubscriptionProperties, TopicProperties,
};
use std::time::Duration;

pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";
pub const SERVICE_BUS_NAMESPACE: &str =
    "http://schemas.microsoft.com/netservices/2010/10/servicebus/connect";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
const SQL_COMPATIBILITY_LEVEL: &str = "20";

pub fn queue_entry(props: &QueueProperties) -> String {
    let mut w = DescriptionWriter::default();
    w.duration("LockDuration", props.lock_duration);
    w.value("MaxSizeInMegabytes", props.max_size_in_megabytes);
    w.value("RequiresDuplicateDetection", props.requires_duplicate_detection);
    w.value("RequiresSession", props.requires_session);
    w.duration("DefaultMessageTimeToLive", props.default_message_time_to_live);
    w.value(
        "DeadLetteringOnMessageExpiration",
        props.dead_lettering_on_message_expiration,
    );
    w.duration(
        "DuplicateDetectionHistoryTimeWindow",
        props.duplicate_detection_history_time_window,
    );
    w.value("MaxDeliveryCount", props.max_delivery_count);
    w.value("EnableBatchedOperations", props.enable_batched_operations);
    w.value("Status", props.status);
    w.optional("ForwardTo", props.forward_to.as_deref());
    w.optional("UserMetadata", props.user_metadata.as_deref());
    w.duration("AutoDeleteOnIdle", props.auto_delete_on_idle);
    w.value("EnablePartitioning", props.enable_partitioning);
    w.optional(
        "ForwardDeadLetteredMessagesTo",
        props.forward_dead_lettered_messages_to.as_deref(),
    );
    if let Some(size) = props.max_message_size_in_kilobytes {
        w.value("MaxMessageSizeInKilobytes", size);
    }
    w.into_entry("QueueDescription")
}

pub fn topic_entry(props: &TopicProperties) -> String {
    let mut w = DescriptionWriter::default();
    w.duration("DefaultMessageTimeToLive", props.default_message_time_to_live);
    w.value("MaxSizeInMegabytes", props.max_size_in_megabytes);
    w.value("RequiresDuplicateDetection", props.requires_duplicate_detection);
    w.duration(
        "DuplicateDetectionHistoryTimeWindow",
        props.duplicate_detection_history_time_window,
    );
    w.value("EnableBatchedOperations", props.enable_batched_operations);
    w.value("Status", props.status);
    w.optional("UserMetadata", props.user_metadata.as_deref());
    w.value("SupportOrdering", props.support_ordering);
    w.duration("AutoDeleteOnIdle", props.auto_delete_on_idle);
    w.value("EnablePartitioning", props.enable_partitioning);
    if let Some(size) = props.max_message_size_in_kilobytes {
        w.value("MaxMessageSizeInKilobytes", size);
    }
    w.into_entry("TopicDescription")
}

/// Subscription body, optionally carrying the rule the service should create
/// in place of its `$Default` pass-through rule.
pub fn subscription_entry(
    props: &SubscriptionProperties,
    default_rule: Option<&RuleProperties>,
) -> String {
    let mut w = DescriptionWriter::default();
    w.duration("LockDuration", props.lock_duration);
    w.value("RequiresSession", props.requires_session);
    w.duration("DefaultMessageTimeToLive", props.default_message_time_to_live);
    w.value(
        "DeadLetteringOnMessageExpiration",
        props.dead_lettering_on_message_expiration,
    );
    w.value(
        "DeadLetteringOnFilterEvaluationExceptions",
        props.dead_lettering_on_filter_evaluation_exceptions,
    );
    if let Some(rule) = default_rule {
        w.raw("<DefaultRuleDescription>");
        w.rule_body(rule);
        w.raw("</DefaultRuleDescription>");
    }
    w.value("MaxDeliveryCount", props.max_delivery_count);
    w.value("EnableBatchedOperations", props.enable_batched_operations);
    w.value("Status", props.status);
    w.optional("ForwardTo", props.forward_to.as_deref());
    w.optional("UserMetadata", props.user_metadata.as_deref());
    w.optional(
        "ForwardDeadLetteredMessagesTo",
        props.forward_dead_lettered_messages_to.as_deref(),
    );
    w.duration("AutoDeleteOnIdle", props.auto_delete_on_idle);
    w.into_entry("SubscriptionDescription")
}

pub fn rule_entry(props: &RuleProperties) -> String {
    let mut w = DescriptionWriter::default();
    w.rule_body(props);
    w.into_entry("RuleDescription")
}

#[derive(Default)]
struct DescriptionWriter {
    body: String,
}

impl DescriptionWriter {
    fn raw(&mut self, xml: &str) {
        self.body.push_str(xml);
    }

    fn text(&mut self, name: &str, value: &str) {
        self.body
            .push_str(&format!("<{name}>{}</{name}>", escape(value)));
    }

    fn value(&mut self, name: &str, value: impl ToString) {
        self.text(name, &value.to_string());
    }

    fn optional(&mut self, name: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.text(name, value);
        }
    }

    fn duration(&mut self, name: &str, value: Duration) {
        self.text(name, &format_duration(value));
    }

    fn rule_body(&mut self, rule: &RuleProperties) {
        self.filter(&rule.filter);
        match &rule.action {
            Some(RuleAction::Sql { expression }) => {
                self.raw(r#"<Action i:type="SqlRuleAction">"#);
                self.text("SqlExpression", expression);
                self.text("CompatibilityLevel", SQL_COMPATIBILITY_LEVEL);
                self.raw("</Action>");
            }
            None => self.raw(r#"<Action i:type="EmptyRuleAction"/>"#),
        }
        self.text("Name", &rule.name);
    }

    fn filter(&mut self, filter: &RuleFilter) {
        let kind = match filter {
            RuleFilter::Sql { .. } => "SqlFilter",
            RuleFilter::True => "TrueFilter",
            RuleFilter::False => "FalseFilter",
            RuleFilter::Correlation(_) => "CorrelationFilter",
        };
        self.raw(&format!(r#"<Filter i:type="{kind}">"#));
        match filter {
            RuleFilter::Correlation(correlation) => self.correlation(correlation),
            sql => {
                self.text("SqlExpression", sql.sql_expression().unwrap_or_default());
                self.text("CompatibilityLevel", SQL_COMPATIBILITY_LEVEL);
            }
        }
        self.raw("</Filter>");
    }

    fn correlation(&mut self, filter: &CorrelationRuleFilter) {
        self.optional("CorrelationId", filter.correlation_id.as_deref());
        self.optional("MessageId", filter.message_id.as_deref());
        self.optional("To", filter.to.as_deref());
        self.optional("ReplyTo", filter.reply_to.as_deref());
        self.optional("Label", filter.subject.as_deref());
        self.optional("SessionId", filter.session_id.as_deref());
        self.optional("ReplyToSessionId", filter.reply_to_session_id.as_deref());
        self.optional("ContentType", filter.content_type.as_deref());
        if !filter.properties.is_empty() {
            self.raw("<Properties>");
            for (key, value) in &filter.properties {
                self.raw("<KeyValueOfstringanyType>");
                self.text("Key", key);
                self.raw(&format!(
                    r#"<Value i:type="d6p1:string" xmlns:d6p1="{XSD_NAMESPACE}">{}</Value>"#,
                    escape(value)
                ));
                self.raw("</KeyValueOfstringanyType>");
            }
            self.raw("</Properties>");
        }
    }

    fn into_entry(self, description: &str) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="utf-8"?>"#,
                r#"<entry xmlns="{atom}"><content type="application/xml">"#,
                r#"<{description} xmlns="{sb}" xmlns:i="{xsi}">{body}</{description}>"#,
                r#"</content></entry>"#
            ),
            atom = ATOM_NAMESPACE,
            sb = SERVICE_BUS_NAMESPACE,
            xsi = XSI_NAMESPACE,
            description = description,
            body = self.body,
        )
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::administration::feed::{EntityContent, FeedEntry};

    fn position(haystack: &str, needle: &str) -> usize {
        haystack
            .find(needle)
            .unwrap_or_else(|| panic!("{needle} missing from {haystack}"))
    }

    #[test]
    fn queue_body_follows_contract_order_and_omits_name() {
        let mut props = QueueProperties::new("orders");
        props.forward_to = Some("archive".to_string());
        let xml = queue_entry(&props);

        assert!(xml.contains(r#"<content type="application/xml">"#));
        assert!(position(&xml, "<LockDuration>PT1M</LockDuration>") < position(&xml, "<MaxSizeInMegabytes>"));
        assert!(position(&xml, "<MaxDeliveryCount>") < position(&xml, "<Status>Active</Status>"));
        assert!(position(&xml, "<ForwardTo>archive</ForwardTo>") < position(&xml, "<AutoDeleteOnIdle>"));
        assert!(!xml.contains("orders"));
        assert!(!xml.contains("MaxMessageSizeInKilobytes"));
    }

    #[test]
    fn user_metadata_is_escaped() {
        let mut props = TopicProperties::new("events");
        props.user_metadata = Some(r#"<owner team="a&b"/>"#.to_string());
        let xml = topic_entry(&props);
        assert!(xml.contains("&lt;owner team=&quot;a&amp;b&quot;/&gt;"));
    }

    #[test]
    fn subscription_body_embeds_default_rule() {
        let props = SubscriptionProperties::new("events", "audit");
        let rule = RuleProperties::new("passThrough", RuleFilter::True);
        let xml = subscription_entry(&props, Some(&rule));

        let rule_at = position(&xml, "<DefaultRuleDescription>");
        assert!(position(&xml, "<DeadLetteringOnFilterEvaluationExceptions>") < rule_at);
        assert!(rule_at < position(&xml, "<MaxDeliveryCount>"));
        assert!(xml.contains(r#"<Filter i:type="TrueFilter"><SqlExpression>1=1</SqlExpression>"#));
        assert!(xml.contains(r#"<Action i:type="EmptyRuleAction"/>"#));
        assert!(xml.contains("<Name>passThrough</Name>"));
    }

    #[test]
    fn written_rule_parses_back() {
        let mut correlation = CorrelationRuleFilter {
            correlation_id: Some("abc".to_string()),
            subject: Some("invoice".to_string()),
            ..Default::default()
        };
        correlation
            .properties
            .insert("region".to_string(), "emea".to_string());
        let mut rule = RuleProperties::new("routing", RuleFilter::Correlation(correlation));
        rule.action = Some(RuleAction::Sql {
            expression: "SET x = 1".to_string(),
        });

        let entry = FeedEntry::parse_single(&rule_entry(&rule)).unwrap().unwrap();
        let Some(EntityContent::Rule(parsed)) = entry.content else {
            panic!("expected rule content");
        };
        assert_eq!(parsed.properties.filter, rule.filter);
        assert_eq!(parsed.properties.action, rule.action);
    }
}
