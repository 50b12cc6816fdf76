//! Dispatch of parsed commands onto the administration client.
//!
//! Every command yields a JSON value; `main` prints it.

use crate::cli::{Commands, CreateSettings, EntityAction};
use anyhow::{Result, bail};
use futures::TryStreamExt;
use sbadmin_core::administration::duration::parse_duration;
use sbadmin_core::administration::{
    AdministrationClient, DEFAULT_RULE_NAME, EntityStream, Page, QueueProperties, RuleAction,
    RuleFilter, RuleProperties, SubscriptionProperties, TopicProperties,
};
use serde::Serialize;
use serde_json::{Value, json};

pub async fn run(client: &AdministrationClient, command: Commands) -> Result<Value> {
    match command {
        Commands::Queue { action } => queue(client, action).await,
        Commands::Topic { action } => topic(client, action).await,
        Commands::Subscription { topic, action } => subscription(client, &topic, action).await,
        Commands::Rule {
            topic,
            subscription,
            action,
        } => rule(client, &topic, &subscription, action).await,
    }
}

async fn queue(client: &AdministrationClient, action: EntityAction) -> Result<Value> {
    match action {
        EntityAction::List { runtime, token, all } => match (runtime, all) {
            (false, false) => page_json(client.list_queues(token.as_deref()).await?),
            (true, false) => page_json(
                client
                    .list_queues_runtime_properties(token.as_deref())
                    .await?,
            ),
            (false, true) => collect_all(client.queues()).await,
            (true, true) => collect_all(client.queues_runtime_properties()).await,
        },
        EntityAction::Get { name } => to_json(client.get_queue(&name).await?),
        EntityAction::Runtime { name } => {
            to_json(client.get_queue_runtime_properties(&name).await?)
        }
        EntityAction::Exists { name } => {
            let exists = client.queue_exists(&name).await?;
            Ok(json!({ "name": name, "exists": exists }))
        }
        EntityAction::Create { name, settings } => {
            let props = queue_properties(&settings)?;
            to_json(client.create_queue(&name, props).await?)
        }
        EntityAction::Delete { name } => {
            client.delete_queue(&name).await?;
            Ok(deleted(&name))
        }
    }
}

async fn topic(client: &AdministrationClient, action: EntityAction) -> Result<Value> {
    match action {
        EntityAction::List { runtime, token, all } => match (runtime, all) {
            (false, false) => page_json(client.list_topics(token.as_deref()).await?),
            (true, false) => page_json(
                client
                    .list_topics_runtime_properties(token.as_deref())
                    .await?,
            ),
            (false, true) => collect_all(client.topics()).await,
            (true, true) => collect_all(client.topics_runtime_properties()).await,
        },
        EntityAction::Get { name } => to_json(client.get_topic(&name).await?),
        EntityAction::Runtime { name } => {
            to_json(client.get_topic_runtime_properties(&name).await?)
        }
        EntityAction::Exists { name } => {
            let exists = client.topic_exists(&name).await?;
            Ok(json!({ "name": name, "exists": exists }))
        }
        EntityAction::Create { name, settings } => {
            let props = topic_properties(&settings)?;
            to_json(client.create_topic(&name, props).await?)
        }
        EntityAction::Delete { name } => {
            client.delete_topic(&name).await?;
            Ok(deleted(&name))
        }
    }
}

async fn subscription(
    client: &AdministrationClient,
    topic: &str,
    action: EntityAction,
) -> Result<Value> {
    match action {
        EntityAction::List { runtime, token, all } => match (runtime, all) {
            (false, false) => page_json(client.list_subscriptions(topic, token.as_deref()).await?),
            (true, false) => page_json(
                client
                    .list_subscriptions_runtime_properties(topic, token.as_deref())
                    .await?,
            ),
            (false, true) => collect_all(client.subscriptions(topic)?).await,
            (true, true) => collect_all(client.subscriptions_runtime_properties(topic)?).await,
        },
        EntityAction::Get { name } => to_json(client.get_subscription(topic, &name).await?),
        EntityAction::Runtime { name } => to_json(
            client
                .get_subscription_runtime_properties(topic, &name)
                .await?,
        ),
        EntityAction::Exists { name } => {
            let exists = client.subscription_exists(topic, &name).await?;
            Ok(json!({ "topic": topic, "name": name, "exists": exists }))
        }
        EntityAction::Create { name, settings } => {
            let props = subscription_properties(&settings)?;
            let created = match default_rule(&settings) {
                Some(rule) => {
                    client
                        .create_subscription_with_default_rule(topic, &name, props, rule)
                        .await?
                }
                None => client.create_subscription(topic, &name, props).await?,
            };
            to_json(created)
        }
        EntityAction::Delete { name } => {
            client.delete_subscription(topic, &name).await?;
            Ok(deleted(&name))
        }
    }
}

async fn rule(
    client: &AdministrationClient,
    topic: &str,
    subscription: &str,
    action: EntityAction,
) -> Result<Value> {
    match action {
        EntityAction::List { runtime: true, .. } | EntityAction::Runtime { .. } => {
            bail!("rules have no runtime properties")
        }
        EntityAction::List { token, all, .. } => {
            if all {
                collect_all(client.rules(topic, subscription)?).await
            } else {
                page_json(
                    client
                        .list_rules(topic, subscription, token.as_deref())
                        .await?,
                )
            }
        }
        EntityAction::Get { name } => to_json(client.get_rule(topic, subscription, &name).await?),
        EntityAction::Exists { name } => {
            let exists = client.rule_exists(topic, subscription, &name).await?;
            Ok(json!({ "topic": topic, "subscription": subscription, "name": name, "exists": exists }))
        }
        EntityAction::Create { name, settings } => {
            let props = rule_properties(&settings)?;
            to_json(client.create_rule(topic, subscription, &name, props).await?)
        }
        EntityAction::Delete { name } => {
            client.delete_rule(topic, subscription, &name).await?;
            Ok(deleted(&name))
        }
    }
}

fn queue_properties(settings: &CreateSettings) -> Result<QueueProperties> {
    reject_rule_settings(settings, "queues")?;
    let mut props = QueueProperties::default();
    if let Some(count) = settings.max_delivery_count {
        props.max_delivery_count = count;
    }
    if let Some(lock) = &settings.lock_duration {
        props.lock_duration = parse_duration(lock)?;
    }
    if let Some(ttl) = &settings.default_ttl {
        props.default_message_time_to_live = parse_duration(ttl)?;
    }
    props.requires_session = settings.requires_session;
    props.user_metadata = settings.metadata.clone();
    Ok(props)
}

fn topic_properties(settings: &CreateSettings) -> Result<TopicProperties> {
    reject_rule_settings(settings, "topics")?;
    if settings.max_delivery_count.is_some()
        || settings.lock_duration.is_some()
        || settings.requires_session
    {
        bail!("delivery settings apply to queues and subscriptions, not topics");
    }
    let mut props = TopicProperties::default();
    if let Some(ttl) = &settings.default_ttl {
        props.default_message_time_to_live = parse_duration(ttl)?;
    }
    props.user_metadata = settings.metadata.clone();
    Ok(props)
}

fn subscription_properties(settings: &CreateSettings) -> Result<SubscriptionProperties> {
    let mut props = SubscriptionProperties::default();
    if let Some(count) = settings.max_delivery_count {
        props.max_delivery_count = count;
    }
    if let Some(lock) = &settings.lock_duration {
        props.lock_duration = parse_duration(lock)?;
    }
    if let Some(ttl) = &settings.default_ttl {
        props.default_message_time_to_live = parse_duration(ttl)?;
    }
    props.requires_session = settings.requires_session;
    props.user_metadata = settings.metadata.clone();
    Ok(props)
}

/// The rule a new subscription starts with, when a filter or action was given.
fn default_rule(settings: &CreateSettings) -> Option<RuleProperties> {
    if settings.sql_filter.is_none() && settings.sql_action.is_none() {
        return None;
    }
    let mut rule = RuleProperties::new(DEFAULT_RULE_NAME, sql_filter(settings));
    rule.action = sql_action(settings);
    Some(rule)
}

fn rule_properties(settings: &CreateSettings) -> Result<RuleProperties> {
    if settings.max_delivery_count.is_some()
        || settings.lock_duration.is_some()
        || settings.default_ttl.is_some()
        || settings.requires_session
        || settings.metadata.is_some()
    {
        bail!("rules accept only --sql-filter and --sql-action");
    }
    let mut props = RuleProperties::new("", sql_filter(settings));
    props.action = sql_action(settings);
    Ok(props)
}

fn sql_filter(settings: &CreateSettings) -> RuleFilter {
    settings
        .sql_filter
        .as_deref()
        .map(RuleFilter::sql)
        .unwrap_or(RuleFilter::True)
}

fn sql_action(settings: &CreateSettings) -> Option<RuleAction> {
    settings.sql_action.as_ref().map(|expression| RuleAction::Sql {
        expression: expression.clone(),
    })
}

fn reject_rule_settings(settings: &CreateSettings, kind: &str) -> Result<()> {
    if settings.sql_filter.is_some() || settings.sql_action.is_some() {
        bail!("--sql-filter and --sql-action do not apply to {kind}");
    }
    Ok(())
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn page_json<T: Serialize>(page: Page<T>) -> Result<Value> {
    Ok(json!({
        "items": serde_json::to_value(page.items)?,
        "continuation_token": page.continuation_token,
    }))
}

async fn collect_all<T: Serialize>(stream: EntityStream<T>) -> Result<Value> {
    let items: Vec<T> = stream.try_collect().await?;
    Ok(json!({ "items": serde_json::to_value(items)? }))
}

fn deleted(name: &str) -> Value {
    json!({ "name": name, "deleted": true })
}
