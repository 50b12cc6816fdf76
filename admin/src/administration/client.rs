use super::AdministrationClientOptions;
use super::continuation::PageCursor;
use super::entity::{EntityKind, EntityScope, Queue, Rule, Subscription, Topic};
use super::errors::{AdministrationError, AdministrationResult, ResponseContext};
use super::feed::FeedEntry;
use super::logging::Logger;
use super::models::{
    DEFAULT_RULE_NAME, QueueProperties, QueueRuntimeProperties, RuleProperties,
    SubscriptionProperties, SubscriptionRuntimeProperties, TopicProperties,
    TopicRuntimeProperties,
};
use super::paging::{API_VERSION_PARAMETER, Page, PagedFetcher};
use super::projection::{Projector, project_one, project_one_runtime};
use super::serialization;
use super::transport::{HttpRequest, ReqwestTransport, Transport};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, IF_MATCH};
use std::sync::Arc;

const ATOM_ENTRY_CONTENT_TYPE: &str = "application/atom+xml;type=entry;charset=utf-8";
const ENRICH_PARAMETER: &str = "enrich";

/// Stream of entities that fetches the next page only once the previous one
/// has been consumed.
pub type EntityStream<T> = BoxStream<'static, AdministrationResult<T>>;

/// A value together with the raw response it was read from.
#[derive(Debug, Clone)]
pub struct Response<T> {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub value: T,
}

impl<T> Response<T> {
    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            status: self.status,
            headers: self.headers,
            value: f(self.value),
        }
    }
}

/// Asynchronous client for queue, topic, subscription and rule management.
///
/// Every operation comes in two forms: `*_with_response` returns the value
/// wrapped in a [`Response`] carrying status and headers, the plain form
/// returns the value alone. Listing is available page by page with
/// continuation tokens, or as a [`futures::Stream`].
///
/// # Examples
///
/// ```no_run
/// use admin::administration::{AdministrationClient, AdministrationClientOptions, QueueProperties};
///
/// # async fn example() -> admin::administration::AdministrationResult<()> {
/// let client = AdministrationClient::from_connection_string(
///     "Endpoint=sb://contoso.servicebus.windows.net/;SharedAccessKeyName=policy;SharedAccessKey=key",
///     AdministrationClientOptions::default(),
/// )?;
/// client.create_queue("orders", QueueProperties::default()).await?;
/// assert!(client.queue_exists("orders").await?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AdministrationClient {
    transport: Arc<dyn Transport>,
    options: Arc<AdministrationClientOptions>,
    logger: Logger,
}

impl AdministrationClient {
    pub fn new(transport: Arc<dyn Transport>, options: AdministrationClientOptions) -> Self {
        Self {
            transport,
            options: Arc::new(options),
            logger: Logger::global(),
        }
    }

    pub fn from_connection_string(
        connection_string: &str,
        options: AdministrationClientOptions,
    ) -> AdministrationResult<Self> {
        let transport = ReqwestTransport::from_connection_string(connection_string, &options)?;
        Ok(Self::new(Arc::new(transport), options))
    }

    /// Route this client's log records to `logger` instead of the global facade.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn options(&self) -> &AdministrationClientOptions {
        &self.options
    }

    // Queues

    pub async fn create_queue_with_response(
        &self,
        name: &str,
        properties: QueueProperties,
    ) -> AdministrationResult<Response<QueueProperties>> {
        require_name("queue_name", name)?;
        self.create_entity::<Queue>(&EntityScope::namespace(), name, properties)
            .await
    }

    pub async fn create_queue(
        &self,
        name: &str,
        properties: QueueProperties,
    ) -> AdministrationResult<QueueProperties> {
        self.create_queue_with_response(name, properties)
            .await
            .map(Response::into_value)
    }

    pub async fn get_queue_with_response(
        &self,
        name: &str,
    ) -> AdministrationResult<Response<QueueProperties>> {
        require_name("queue_name", name)?;
        self.get_entity::<Queue, _>(&EntityScope::namespace(), name, false, project_one::<Queue>)
            .await
    }

    pub async fn get_queue(&self, name: &str) -> AdministrationResult<QueueProperties> {
        self.get_queue_with_response(name)
            .await
            .map(Response::into_value)
    }

    pub async fn get_queue_runtime_properties_with_response(
        &self,
        name: &str,
    ) -> AdministrationResult<Response<QueueRuntimeProperties>> {
        require_name("queue_name", name)?;
        self.get_entity::<Queue, _>(
            &EntityScope::namespace(),
            name,
            true,
            project_one_runtime::<Queue>,
        )
        .await
    }

    pub async fn get_queue_runtime_properties(
        &self,
        name: &str,
    ) -> AdministrationResult<QueueRuntimeProperties> {
        self.get_queue_runtime_properties_with_response(name)
            .await
            .map(Response::into_value)
    }

    pub async fn queue_exists_with_response(
        &self,
        name: &str,
    ) -> AdministrationResult<Response<bool>> {
        require_name("queue_name", name)?;
        self.entity_exists::<Queue>(&EntityScope::namespace(), name)
            .await
    }

    pub async fn queue_exists(&self, name: &str) -> AdministrationResult<bool> {
        self.queue_exists_with_response(name)
            .await
            .map(Response::into_value)
    }

    /// Replace a queue's configuration. `properties` must be fully populated,
    /// typically by modifying the result of [`get_queue`](Self::get_queue).
    pub async fn update_queue_with_response(
        &self,
        properties: QueueProperties,
    ) -> AdministrationResult<Response<QueueProperties>> {
        require_name("queue_name", &properties.name)?;
        let name = properties.name.clone();
        self.update_entity::<Queue>(&EntityScope::namespace(), &name, properties)
            .await
    }

    pub async fn update_queue(
        &self,
        properties: QueueProperties,
    ) -> AdministrationResult<QueueProperties> {
        self.update_queue_with_response(properties)
            .await
            .map(Response::into_value)
    }

    pub async fn delete_queue_with_response(&self, name: &str) -> AdministrationResult<Response<()>> {
        require_name("queue_name", name)?;
        self.delete_entity::<Queue>(&EntityScope::namespace(), name)
            .await
    }

    pub async fn delete_queue(&self, name: &str) -> AdministrationResult<()> {
        self.delete_queue_with_response(name)
            .await
            .map(Response::into_value)
    }

    /// One page of queues. Pass `None` (or an empty token) for the first page
    /// and the previous page's `continuation_token` afterwards.
    pub async fn list_queues(
        &self,
        continuation_token: Option<&str>,
    ) -> AdministrationResult<Page<QueueProperties>> {
        self.list_page::<Queue, _>(
            &EntityScope::namespace(),
            continuation_token,
            project_one::<Queue>,
        )
        .await
    }

    pub async fn list_queues_runtime_properties(
        &self,
        continuation_token: Option<&str>,
    ) -> AdministrationResult<Page<QueueRuntimeProperties>> {
        self.list_page::<Queue, _>(
            &EntityScope::namespace(),
            continuation_token,
            project_one_runtime::<Queue>,
        )
        .await
    }

    pub fn queues(&self) -> EntityStream<QueueProperties> {
        self.entity_stream::<Queue, _>(EntityScope::namespace(), project_one::<Queue>)
    }

    pub fn queues_runtime_properties(&self) -> EntityStream<QueueRuntimeProperties> {
        self.entity_stream::<Queue, _>(EntityScope::namespace(), project_one_runtime::<Queue>)
    }

    // Topics

    pub async fn create_topic_with_response(
        &self,
        name: &str,
        properties: TopicProperties,
    ) -> AdministrationResult<Response<TopicProperties>> {
        require_name("topic_name", name)?;
        self.create_entity::<Topic>(&EntityScope::namespace(), name, properties)
            .await
    }

    pub async fn create_topic(
        &self,
        name: &str,
        properties: TopicProperties,
    ) -> AdministrationResult<TopicProperties> {
        self.create_topic_with_response(name, properties)
            .await
            .map(Response::into_value)
    }

    pub async fn get_topic_with_response(
        &self,
        name: &str,
    ) -> AdministrationResult<Response<TopicProperties>> {
        require_name("topic_name", name)?;
        self.get_entity::<Topic, _>(&EntityScope::namespace(), name, false, project_one::<Topic>)
            .await
    }

    pub async fn get_topic(&self, name: &str) -> AdministrationResult<TopicProperties> {
        self.get_topic_with_response(name)
            .await
            .map(Response::into_value)
    }

    pub async fn get_topic_runtime_properties_with_response(
        &self,
        name: &str,
    ) -> AdministrationResult<Response<TopicRuntimeProperties>> {
        require_name("topic_name", name)?;
        self.get_entity::<Topic, _>(
            &EntityScope::namespace(),
            name,
            true,
            project_one_runtime::<Topic>,
        )
        .await
    }

    pub async fn get_topic_runtime_properties(
        &self,
        name: &str,
    ) -> AdministrationResult<TopicRuntimeProperties> {
        self.get_topic_runtime_properties_with_response(name)
            .await
            .map(Response::into_value)
    }

    pub async fn topic_exists_with_response(
        &self,
        name: &str,
    ) -> AdministrationResult<Response<bool>> {
        require_name("topic_name", name)?;
        self.entity_exists::<Topic>(&EntityScope::namespace(), name)
            .await
    }

    pub async fn topic_exists(&self, name: &str) -> AdministrationResult<bool> {
        self.topic_exists_with_response(name)
            .await
            .map(Response::into_value)
    }

    pub async fn update_topic_with_response(
        &self,
        properties: TopicProperties,
    ) -> AdministrationResult<Response<TopicProperties>> {
        require_name("topic_name", &properties.name)?;
        let name = properties.name.clone();
        self.update_entity::<Topic>(&EntityScope::namespace(), &name, properties)
            .await
    }

    pub async fn update_topic(
        &self,
        properties: TopicProperties,
    ) -> AdministrationResult<TopicProperties> {
        self.update_topic_with_response(properties)
            .await
            .map(Response::into_value)
    }

    pub async fn delete_topic_with_response(&self, name: &str) -> AdministrationResult<Response<()>> {
        require_name("topic_name", name)?;
        self.delete_entity::<Topic>(&EntityScope::namespace(), name)
            .await
    }

    pub async fn delete_topic(&self, name: &str) -> AdministrationResult<()> {
        self.delete_topic_with_response(name)
            .await
            .map(Response::into_value)
    }

    pub async fn list_topics(
        &self,
        continuation_token: Option<&str>,
    ) -> AdministrationResult<Page<TopicProperties>> {
        self.list_page::<Topic, _>(
            &EntityScope::namespace(),
            continuation_token,
            project_one::<Topic>,
        )
        .await
    }

    pub async fn list_topics_runtime_properties(
        &self,
        continuation_token: Option<&str>,
    ) -> AdministrationResult<Page<TopicRuntimeProperties>> {
        self.list_page::<Topic, _>(
            &EntityScope::namespace(),
            continuation_token,
            project_one_runtime::<Topic>,
        )
        .await
    }

    pub fn topics(&self) -> EntityStream<TopicProperties> {
        self.entity_stream::<Topic, _>(EntityScope::namespace(), project_one::<Topic>)
    }

    pub fn topics_runtime_properties(&self) -> EntityStream<TopicRuntimeProperties> {
        self.entity_stream::<Topic, _>(EntityScope::namespace(), project_one_runtime::<Topic>)
    }

    // Subscriptions

    pub async fn create_subscription_with_response(
        &self,
        topic_name: &str,
        subscription_name: &str,
        properties: SubscriptionProperties,
    ) -> AdministrationResult<Response<SubscriptionProperties>> {
        let scope = subscription_parent(topic_name, subscription_name)?;
        self.create_entity::<Subscription>(&scope, subscription_name, properties)
            .await
    }

    pub async fn create_subscription(
        &self,
        topic_name: &str,
        subscription_name: &str,
        properties: SubscriptionProperties,
    ) -> AdministrationResult<SubscriptionProperties> {
        self.create_subscription_with_response(topic_name, subscription_name, properties)
            .await
            .map(Response::into_value)
    }

    /// Create a subscription whose initial rule is `rule` instead of the
    /// service's pass-through `$Default`, in a single request. A rule without
    /// a name is created as `$Default`.
    pub async fn create_subscription_with_default_rule_with_response(
        &self,
        topic_name: &str,
        subscription_name: &str,
        mut properties: SubscriptionProperties,
        mut rule: RuleProperties,
    ) -> AdministrationResult<Response<SubscriptionProperties>> {
        let scope = subscription_parent(topic_name, subscription_name)?;
        if rule.name.trim().is_empty() {
            rule.name = DEFAULT_RULE_NAME.to_string();
        }

        Subscription::assign_identity(&mut properties, subscription_name, &scope);
        let body = serialization::subscription_entry(&properties, Some(&rule));
        self.logger.debug(format_args!(
            "Creating subscription '{topic_name}/{subscription_name}' with rule '{}'",
            rule.name
        ));
        self.put_entity::<Subscription>(&scope, subscription_name, body, false)
            .await
    }

    pub async fn create_subscription_with_default_rule(
        &self,
        topic_name: &str,
        subscription_name: &str,
        properties: SubscriptionProperties,
        rule: RuleProperties,
    ) -> AdministrationResult<SubscriptionProperties> {
        self.create_subscription_with_default_rule_with_response(
            topic_name,
            subscription_name,
            properties,
            rule,
        )
        .await
        .map(Response::into_value)
    }

    pub async fn get_subscription_with_response(
        &self,
        topic_name: &str,
        subscription_name: &str,
    ) -> AdministrationResult<Response<SubscriptionProperties>> {
        let scope = subscription_parent(topic_name, subscription_name)?;
        self.get_entity::<Subscription, _>(
            &scope,
            subscription_name,
            false,
            project_one::<Subscription>,
        )
        .await
    }

    pub async fn get_subscription(
        &self,
        topic_name: &str,
        subscription_name: &str,
    ) -> AdministrationResult<SubscriptionProperties> {
        self.get_subscription_with_response(topic_name, subscription_name)
            .await
            .map(Response::into_value)
    }

    pub async fn get_subscription_runtime_properties_with_response(
        &self,
        topic_name: &str,
        subscription_name: &str,
    ) -> AdministrationResult<Response<SubscriptionRuntimeProperties>> {
        let scope = subscription_parent(topic_name, subscription_name)?;
        self.get_entity::<Subscription, _>(
            &scope,
            subscription_name,
            true,
            project_one_runtime::<Subscription>,
        )
        .await
    }

    pub async fn get_subscription_runtime_properties(
        &self,
        topic_name: &str,
        subscription_name: &str,
    ) -> AdministrationResult<SubscriptionRuntimeProperties> {
        self.get_subscription_runtime_properties_with_response(topic_name, subscription_name)
            .await
            .map(Response::into_value)
    }

    pub async fn subscription_exists_with_response(
        &self,
        topic_name: &str,
        subscription_name: &str,
    ) -> AdministrationResult<Response<bool>> {
        let scope = subscription_parent(topic_name, subscription_name)?;
        self.entity_exists::<Subscription>(&scope, subscription_name)
            .await
    }

    pub async fn subscription_exists(
        &self,
        topic_name: &str,
        subscription_name: &str,
    ) -> AdministrationResult<bool> {
        self.subscription_exists_with_response(topic_name, subscription_name)
            .await
            .map(Response::into_value)
    }

    pub async fn update_subscription_with_response(
        &self,
        properties: SubscriptionProperties,
    ) -> AdministrationResult<Response<SubscriptionProperties>> {
        let scope = subscription_parent(&properties.topic_name, &properties.subscription_name)?;
        let name = properties.subscription_name.clone();
        self.update_entity::<Subscription>(&scope, &name, properties)
            .await
    }

    pub async fn update_subscription(
        &self,
        properties: SubscriptionProperties,
    ) -> AdministrationResult<SubscriptionProperties> {
        self.update_subscription_with_response(properties)
            .await
            .map(Response::into_value)
    }

    pub async fn delete_subscription_with_response(
        &self,
        topic_name: &str,
        subscription_name: &str,
    ) -> AdministrationResult<Response<()>> {
        let scope = subscription_parent(topic_name, subscription_name)?;
        self.delete_entity::<Subscription>(&scope, subscription_name)
            .await
    }

    pub async fn delete_subscription(
        &self,
        topic_name: &str,
        subscription_name: &str,
    ) -> AdministrationResult<()> {
        self.delete_subscription_with_response(topic_name, subscription_name)
            .await
            .map(Response::into_value)
    }

    pub async fn list_subscriptions(
        &self,
        topic_name: &str,
        continuation_token: Option<&str>,
    ) -> AdministrationResult<Page<SubscriptionProperties>> {
        require_name("topic_name", topic_name)?;
        self.list_page::<Subscription, _>(
            &EntityScope::topic(topic_name),
            continuation_token,
            project_one::<Subscription>,
        )
        .await
    }

    pub async fn list_subscriptions_runtime_properties(
        &self,
        topic_name: &str,
        continuation_token: Option<&str>,
    ) -> AdministrationResult<Page<SubscriptionRuntimeProperties>> {
        require_name("topic_name", topic_name)?;
        self.list_page::<Subscription, _>(
            &EntityScope::topic(topic_name),
            continuation_token,
            project_one_runtime::<Subscription>,
        )
        .await
    }

    pub fn subscriptions(
        &self,
        topic_name: &str,
    ) -> AdministrationResult<EntityStream<SubscriptionProperties>> {
        require_name("topic_name", topic_name)?;
        Ok(self.entity_stream::<Subscription, _>(
            EntityScope::topic(topic_name),
            project_one::<Subscription>,
        ))
    }

    pub fn subscriptions_runtime_properties(
        &self,
        topic_name: &str,
    ) -> AdministrationResult<EntityStream<SubscriptionRuntimeProperties>> {
        require_name("topic_name", topic_name)?;
        Ok(self.entity_stream::<Subscription, _>(
            EntityScope::topic(topic_name),
            project_one_runtime::<Subscription>,
        ))
    }

    // Rules

    pub async fn create_rule_with_response(
        &self,
        topic_name: &str,
        subscription_name: &str,
        rule_name: &str,
        properties: RuleProperties,
    ) -> AdministrationResult<Response<RuleProperties>> {
        let scope = subscription_scope(topic_name, subscription_name)?;
        require_name("rule_name", rule_name)?;
        self.create_entity::<Rule>(&scope, rule_name, properties)
            .await
    }

    pub async fn create_rule(
        &self,
        topic_name: &str,
        subscription_name: &str,
        rule_name: &str,
        properties: RuleProperties,
    ) -> AdministrationResult<RuleProperties> {
        self.create_rule_with_response(topic_name, subscription_name, rule_name, properties)
            .await
            .map(Response::into_value)
    }

    pub async fn get_rule_with_response(
        &self,
        topic_name: &str,
        subscription_name: &str,
        rule_name: &str,
    ) -> AdministrationResult<Response<RuleProperties>> {
        let scope = subscription_scope(topic_name, subscription_name)?;
        require_name("rule_name", rule_name)?;
        self.get_entity::<Rule, _>(&scope, rule_name, false, project_one::<Rule>)
            .await
    }

    pub async fn get_rule(
        &self,
        topic_name: &str,
        subscription_name: &str,
        rule_name: &str,
    ) -> AdministrationResult<RuleProperties> {
        self.get_rule_with_response(topic_name, subscription_name, rule_name)
            .await
            .map(Response::into_value)
    }

    pub async fn rule_exists_with_response(
        &self,
        topic_name: &str,
        subscription_name: &str,
        rule_name: &str,
    ) -> AdministrationResult<Response<bool>> {
        let scope = subscription_scope(topic_name, subscription_name)?;
        require_name("rule_name", rule_name)?;
        self.entity_exists::<Rule>(&scope, rule_name).await
    }

    pub async fn rule_exists(
        &self,
        topic_name: &str,
        subscription_name: &str,
        rule_name: &str,
    ) -> AdministrationResult<bool> {
        self.rule_exists_with_response(topic_name, subscription_name, rule_name)
            .await
            .map(Response::into_value)
    }

    pub async fn update_rule_with_response(
        &self,
        properties: RuleProperties,
    ) -> AdministrationResult<Response<RuleProperties>> {
        let scope = subscription_scope(&properties.topic_name, &properties.subscription_name)?;
        require_name("rule_name", &properties.name)?;
        let name = properties.name.clone();
        self.update_entity::<Rule>(&scope, &name, properties).await
    }

    pub async fn update_rule(&self, properties: RuleProperties) -> AdministrationResult<RuleProperties> {
        self.update_rule_with_response(properties)
            .await
            .map(Response::into_value)
    }

    pub async fn delete_rule_with_response(
        &self,
        topic_name: &str,
        subscription_name: &str,
        rule_name: &str,
    ) -> AdministrationResult<Response<()>> {
        let scope = subscription_scope(topic_name, subscription_name)?;
        require_name("rule_name", rule_name)?;
        self.delete_entity::<Rule>(&scope, rule_name).await
    }

    pub async fn delete_rule(
        &self,
        topic_name: &str,
        subscription_name: &str,
        rule_name: &str,
    ) -> AdministrationResult<()> {
        self.delete_rule_with_response(topic_name, subscription_name, rule_name)
            .await
            .map(Response::into_value)
    }

    pub async fn list_rules(
        &self,
        topic_name: &str,
        subscription_name: &str,
        continuation_token: Option<&str>,
    ) -> AdministrationResult<Page<RuleProperties>> {
        let scope = subscription_scope(topic_name, subscription_name)?;
        self.list_page::<Rule, _>(&scope, continuation_token, project_one::<Rule>)
            .await
    }

    pub fn rules(
        &self,
        topic_name: &str,
        subscription_name: &str,
    ) -> AdministrationResult<EntityStream<RuleProperties>> {
        let scope = subscription_scope(topic_name, subscription_name)?;
        Ok(self.entity_stream::<Rule, _>(scope, project_one::<Rule>))
    }

    // Shared plumbing

    async fn create_entity<K: EntityKind>(
        &self,
        scope: &EntityScope,
        name: &str,
        mut properties: K::Properties,
    ) -> AdministrationResult<Response<K::Properties>> {
        K::assign_identity(&mut properties, name, scope);
        self.logger.debug(format_args!(
            "Creating {} '{}'",
            K::KIND,
            entity_label(scope, name)
        ));
        self.put_entity::<K>(scope, name, K::entry_body(&properties), false)
            .await
    }

    async fn update_entity<K: EntityKind>(
        &self,
        scope: &EntityScope,
        name: &str,
        mut properties: K::Properties,
    ) -> AdministrationResult<Response<K::Properties>> {
        K::assign_identity(&mut properties, name, scope);
        self.logger.debug(format_args!(
            "Updating {} '{}'",
            K::KIND,
            entity_label(scope, name)
        ));
        self.put_entity::<K>(scope, name, K::entry_body(&properties), true)
            .await
    }

    /// PUT an entry body. Create and update differ only by `If-Match: *`,
    /// which makes the service reject the request if the entity is missing.
    async fn put_entity<K: EntityKind>(
        &self,
        scope: &EntityScope,
        name: &str,
        body: String,
        is_update: bool,
    ) -> AdministrationResult<Response<K::Properties>> {
        let mut request = HttpRequest::put(K::entity_path(scope, name), body)
            .with_query(API_VERSION_PARAMETER, &self.options.api_version)
            .with_header(
                CONTENT_TYPE,
                HeaderValue::from_static(ATOM_ENTRY_CONTENT_TYPE),
            );
        if is_update {
            request = request.with_header(IF_MATCH, HeaderValue::from_static("*"));
        }

        let operation = if is_update { "update" } else { "create" };
        let response = self.transport.send(request).await?;
        let label = entity_label(scope, name);
        if !response.status.is_success() {
            return Err(AdministrationError::from_status(
                &format!("{operation} {}", K::KIND),
                &label,
                response.status,
                &response.headers,
                &response.body,
            ));
        }

        let value = FeedEntry::parse_single(&response.body)?
            .and_then(|entry| project_one::<K>(entry, scope))
            .ok_or_else(|| {
                AdministrationError::malformed(format!(
                    "{operation} of {} '{label}' returned no {} description",
                    K::KIND,
                    K::KIND
                ))
            })?;

        Ok(Response {
            status: response.status,
            headers: response.headers,
            value,
        })
    }

    /// Fetch one entity, turning every shape of "absent" into
    /// [`AdministrationError::ResourceNotFound`]: a 404, an empty body, an
    /// entry-less feed, or an entry without a payload of this kind.
    async fn get_entity<K: EntityKind, T>(
        &self,
        scope: &EntityScope,
        name: &str,
        enrich: bool,
        projector: Projector<T>,
    ) -> AdministrationResult<Response<T>> {
        let label = entity_label(scope, name);
        self.logger
            .debug(format_args!("Getting {} '{label}' (enrich={enrich})", K::KIND));

        let request = HttpRequest::get(K::entity_path(scope, name))
            .with_query(ENRICH_PARAMETER, enrich)
            .with_query(API_VERSION_PARAMETER, &self.options.api_version);
        let response = self.transport.send(request).await?;

        if !response.status.is_success() {
            return Err(AdministrationError::from_status(
                &format!("get {}", K::KIND),
                &label,
                response.status,
                &response.headers,
                &response.body,
            ));
        }

        let value = FeedEntry::parse_single(&response.body)?
            .and_then(|entry| projector(entry, scope));
        match value {
            Some(value) => Ok(Response {
                status: response.status,
                headers: response.headers,
                value,
            }),
            None => Err(AdministrationError::ResourceNotFound {
                entity: label,
                response: ResponseContext::new(response.status, response.headers),
            }),
        }
    }

    async fn entity_exists<K: EntityKind>(
        &self,
        scope: &EntityScope,
        name: &str,
    ) -> AdministrationResult<Response<bool>> {
        match self
            .get_entity::<K, _>(scope, name, false, project_one::<K>)
            .await
        {
            Ok(found) => Ok(found.map(|_| true)),
            Err(AdministrationError::ResourceNotFound { response, .. }) => Ok(Response {
                status: response.status,
                headers: response.headers,
                value: false,
            }),
            Err(e) => Err(e),
        }
    }

    async fn delete_entity<K: EntityKind>(
        &self,
        scope: &EntityScope,
        name: &str,
    ) -> AdministrationResult<Response<()>> {
        let label = entity_label(scope, name);
        self.logger
            .debug(format_args!("Deleting {} '{label}'", K::KIND));

        let request = HttpRequest::delete(K::entity_path(scope, name))
            .with_query(API_VERSION_PARAMETER, &self.options.api_version);
        let response = self.transport.send(request).await?;

        if !response.status.is_success() {
            return Err(AdministrationError::from_status(
                &format!("delete {}", K::KIND),
                &label,
                response.status,
                &response.headers,
                &response.body,
            ));
        }

        Ok(Response {
            status: response.status,
            headers: response.headers,
            value: (),
        })
    }

    async fn list_page<K: EntityKind, T>(
        &self,
        scope: &EntityScope,
        continuation_token: Option<&str>,
        projector: Projector<T>,
    ) -> AdministrationResult<Page<T>> {
        let cursor = PageCursor::from_token(continuation_token)?;
        PagedFetcher::new(self.transport.as_ref(), &self.options, self.logger)
            .fetch_page(&K::collection_path(scope), scope, cursor, projector)
            .await
    }

    fn entity_stream<K: EntityKind, T: Send + 'static>(
        &self,
        scope: EntityScope,
        projector: Projector<T>,
    ) -> EntityStream<T> {
        let client = self.clone();
        // `Some(token)` is the next page to fetch; `None` means the last page was seen.
        let pages = stream::try_unfold(Some(None::<String>), move |next| {
            let client = client.clone();
            let scope = scope.clone();
            async move {
                let Some(token) = next else {
                    return Ok::<_, AdministrationError>(None);
                };
                let page = client
                    .list_page::<K, T>(&scope, token.as_deref(), projector)
                    .await?;
                let following = page.continuation_token.clone().map(Some);
                Ok(Some((page.items, following)))
            }
        });

        pages
            .map_ok(|items| stream::iter(items.into_iter().map(Ok::<T, AdministrationError>)))
            .try_flatten()
            .boxed()
    }
}

impl std::fmt::Debug for AdministrationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdministrationClient")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn require_name(parameter: &str, value: &str) -> AdministrationResult<()> {
    if value.trim().is_empty() {
        return Err(AdministrationError::invalid_argument(
            parameter,
            "must not be empty",
        ));
    }
    Ok(())
}

/// Scope for operations on a subscription itself: the owning topic.
fn subscription_parent(
    topic_name: &str,
    subscription_name: &str,
) -> AdministrationResult<EntityScope> {
    require_name("topic_name", topic_name)?;
    require_name("subscription_name", subscription_name)?;
    Ok(EntityScope::topic(topic_name))
}

/// Scope for operations on rules: the owning topic and subscription.
fn subscription_scope(topic_name: &str, subscription_name: &str) -> AdministrationResult<EntityScope> {
    require_name("topic_name", topic_name)?;
    require_name("subscription_name", subscription_name)?;
    Ok(EntityScope::subscription(topic_name, subscription_name))
}

/// Human-readable entity path for logs and errors.
fn entity_label(scope: &EntityScope, name: &str) -> String {
    match (&scope.topic_name, &scope.subscription_name) {
        (Some(topic), Some(subscription)) => format!("{topic}/{subscription}/{name}"),
        (Some(topic), None) => format!("{topic}/{name}"),
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_are_rejected() {
        for blank in ["", "   ", "\t"] {
            let err = require_name("queue_name", blank).unwrap_err();
            assert!(matches!(
                err,
                AdministrationError::InvalidArgument { ref parameter, .. } if parameter == "queue_name"
            ));
        }
        assert!(subscription_scope("events", " ").is_err());
        assert!(subscription_parent("", "audit").is_err());
        assert_eq!(
            subscription_parent("events", "audit").unwrap(),
            EntityScope::topic("events")
        );
    }

    #[test]
    fn labels_include_owners() {
        assert_eq!(entity_label(&EntityScope::namespace(), "orders"), "orders");
        assert_eq!(entity_label(&EntityScope::topic("events"), "audit"), "events/audit");
        assert_eq!(
            entity_label(&EntityScope::subscription("events", "audit"), "$Default"),
            "events/audit/$Default"
        );
    }
}
