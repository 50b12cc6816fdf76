use super::client::AdministrationClient;
use super::errors::{AdministrationError, AdministrationResult};
use super::models::{
    QueueProperties, QueueRuntimeProperties, RuleProperties, SubscriptionProperties,
    SubscriptionRuntimeProperties, TopicProperties, TopicRuntimeProperties,
};
use super::paging::Page;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};

/// Synchronous view of an [`AdministrationClient`].
///
/// Owns a current-thread Tokio runtime and blocks on the async operations.
/// Must not be used from inside an async context; call the async client
/// there instead.
#[derive(Clone)]
pub struct BlockingAdministrationClient {
    inner: AdministrationClient,
    runtime: Arc<Runtime>,
}

impl BlockingAdministrationClient {
    pub fn new(inner: AdministrationClient) -> AdministrationResult<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                AdministrationError::Configuration(format!("Failed to start runtime: {e}"))
            })?;
        Ok(Self {
            inner,
            runtime: Arc::new(runtime),
        })
    }

    pub fn async_client(&self) -> &AdministrationClient {
        &self.inner
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn create_queue(
        &self,
        name: &str,
        properties: QueueProperties,
    ) -> AdministrationResult<QueueProperties> {
        self.block_on(self.inner.create_queue(name, properties))
    }

    pub fn get_queue(&self, name: &str) -> AdministrationResult<QueueProperties> {
        self.block_on(self.inner.get_queue(name))
    }

    pub fn get_queue_runtime_properties(
        &self,
        name: &str,
    ) -> AdministrationResult<QueueRuntimeProperties> {
        self.block_on(self.inner.get_queue_runtime_properties(name))
    }

    pub fn queue_exists(&self, name: &str) -> AdministrationResult<bool> {
        self.block_on(self.inner.queue_exists(name))
    }

    pub fn update_queue(&self, properties: QueueProperties) -> AdministrationResult<QueueProperties> {
        self.block_on(self.inner.update_queue(properties))
    }

    pub fn delete_queue(&self, name: &str) -> AdministrationResult<()> {
        self.block_on(self.inner.delete_queue(name))
    }

    pub fn list_queues(
        &self,
        continuation_token: Option<&str>,
    ) -> AdministrationResult<Page<QueueProperties>> {
        self.block_on(self.inner.list_queues(continuation_token))
    }

    pub fn create_topic(
        &self,
        name: &str,
        properties: TopicProperties,
    ) -> AdministrationResult<TopicProperties> {
        self.block_on(self.inner.create_topic(name, properties))
    }

    pub fn get_topic(&self, name: &str) -> AdministrationResult<TopicProperties> {
        self.block_on(self.inner.get_topic(name))
    }

    pub fn get_topic_runtime_properties(
        &self,
        name: &str,
    ) -> AdministrationResult<TopicRuntimeProperties> {
        self.block_on(self.inner.get_topic_runtime_properties(name))
    }

    pub fn topic_exists(&self, name: &str) -> AdministrationResult<bool> {
        self.block_on(self.inner.topic_exists(name))
    }

    pub fn update_topic(&self, properties: TopicProperties) -> AdministrationResult<TopicProperties> {
        self.block_on(self.inner.update_topic(properties))
    }

    pub fn delete_topic(&self, name: &str) -> AdministrationResult<()> {
        self.block_on(self.inner.delete_topic(name))
    }

    pub fn list_topics(
        &self,
        continuation_token: Option<&str>,
    ) -> AdministrationResult<Page<TopicProperties>> {
        self.block_on(self.inner.list_topics(continuation_token))
    }

    pub fn create_subscription(
        &self,
        topic_name: &str,
        subscription_name: &str,
        properties: SubscriptionProperties,
    ) -> AdministrationResult<SubscriptionProperties> {
        self.block_on(
            self.inner
                .create_subscription(topic_name, subscription_name, properties),
        )
    }

    pub fn create_subscription_with_default_rule(
        &self,
        topic_name: &str,
        subscription_name: &str,
        properties: SubscriptionProperties,
        rule: RuleProperties,
    ) -> AdministrationResult<SubscriptionProperties> {
        self.block_on(self.inner.create_subscription_with_default_rule(
            topic_name,
            subscription_name,
            properties,
            rule,
        ))
    }

    pub fn get_subscription(
        &self,
        topic_name: &str,
        subscription_name: &str,
    ) -> AdministrationResult<SubscriptionProperties> {
        self.block_on(self.inner.get_subscription(topic_name, subscription_name))
    }

    pub fn get_subscription_runtime_properties(
        &self,
        topic_name: &str,
        subscription_name: &str,
    ) -> AdministrationResult<SubscriptionRuntimeProperties> {
        self.block_on(
            self.inner
                .get_subscription_runtime_properties(topic_name, subscription_name),
        )
    }

    pub fn subscription_exists(
        &self,
        topic_name: &str,
        subscription_name: &str,
    ) -> AdministrationResult<bool> {
        self.block_on(self.inner.subscription_exists(topic_name, subscription_name))
    }

    pub fn update_subscription(
        &self,
        properties: SubscriptionProperties,
    ) -> AdministrationResult<SubscriptionProperties> {
        self.block_on(self.inner.update_subscription(properties))
    }

    pub fn delete_subscription(
        &self,
        topic_name: &str,
        subscription_name: &str,
    ) -> AdministrationResult<()> {
        self.block_on(self.inner.delete_subscription(topic_name, subscription_name))
    }

    pub fn list_subscriptions(
        &self,
        topic_name: &str,
        continuation_token: Option<&str>,
    ) -> AdministrationResult<Page<SubscriptionProperties>> {
        self.block_on(self.inner.list_subscriptions(topic_name, continuation_token))
    }

    pub fn create_rule(
        &self,
        topic_name: &str,
        subscription_name: &str,
        rule_name: &str,
        properties: RuleProperties,
    ) -> AdministrationResult<RuleProperties> {
        self.block_on(
            self.inner
                .create_rule(topic_name, subscription_name, rule_name, properties),
        )
    }

    pub fn get_rule(
        &self,
        topic_name: &str,
        subscription_name: &str,
        rule_name: &str,
    ) -> AdministrationResult<RuleProperties> {
        self.block_on(self.inner.get_rule(topic_name, subscription_name, rule_name))
    }

    pub fn rule_exists(
        &self,
        topic_name: &str,
        subscription_name: &str,
        rule_name: &str,
    ) -> AdministrationResult<bool> {
        self.block_on(self.inner.rule_exists(topic_name, subscription_name, rule_name))
    }

    pub fn update_rule(&self, properties: RuleProperties) -> AdministrationResult<RuleProperties> {
        self.block_on(self.inner.update_rule(properties))
    }

    pub fn delete_rule(
        &self,
        topic_name: &str,
        subscription_name: &str,
        rule_name: &str,
    ) -> AdministrationResult<()> {
        self.block_on(self.inner.delete_rule(topic_name, subscription_name, rule_name))
    }

    pub fn list_rules(
        &self,
        topic_name: &str,
        subscription_name: &str,
        continuation_token: Option<&str>,
    ) -> AdministrationResult<Page<RuleProperties>> {
        self.block_on(
            self.inner
                .list_rules(topic_name, subscription_name, continuation_token),
        )
    }
}
