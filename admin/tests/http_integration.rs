use admin::administration::{
    AdministrationClient, AdministrationClientOptions, AdministrationError, QueueProperties,
    ReqwestTransport, RuleFilter, RuleProperties, SubscriptionProperties,
};
use admin::auth::BearerTokenCredential;
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{body_string_contains, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EMPTY_FEED: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title type="text">Publicly Listed Services</title></feed>"#;

fn queue_entry(name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><entry xmlns="http://www.w3.org/2005/Atom"><title type="text">{name}</title><content type="application/xml"><QueueDescription xmlns="http://schemas.microsoft.com/netservices/2010/10/servicebus/connect"><MaxDeliveryCount>7</MaxDeliveryCount></QueueDescription></content></entry>"#
    )
}

fn subscription_entry(name: &str) -> String {
    format!(
        r#"<entry xmlns="http://www.w3.org/2005/Atom"><title type="text">{name}</title><content type="application/xml"><SubscriptionDescription xmlns="http://schemas.microsoft.com/netservices/2010/10/servicebus/connect"><MaxDeliveryCount>10</MaxDeliveryCount></SubscriptionDescription></content></entry>"#
    )
}

fn client_for(server: &MockServer) -> AdministrationClient {
    let options = AdministrationClientOptions::default();
    let endpoint = Url::parse(&format!("{}/", server.uri())).unwrap();
    let transport = ReqwestTransport::new(
        endpoint,
        Arc::new(BearerTokenCredential::new("test-token")),
        &options,
    )
    .unwrap();
    AdministrationClient::new(Arc::new(transport), options)
}

mod requests {
    use super::*;

    #[tokio::test]
    async fn create_sends_atom_entry_with_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/orders"))
            .and(query_param("api-version", "2021-05"))
            .and(header(
                "content-type",
                "application/atom+xml;type=entry;charset=utf-8",
            ))
            .and(header("authorization", "Bearer test-token"))
            .and(header_exists("x-ms-client-request-id"))
            .and(body_string_contains("<QueueDescription"))
            .respond_with(ResponseTemplate::new(201).set_body_string(queue_entry("orders")))
            .expect(1)
            .mount(&server)
            .await;

        let created = client_for(&server)
            .create_queue("orders", QueueProperties::default())
            .await
            .unwrap();
        assert_eq!(created.name, "orders");
        assert_eq!(created.max_delivery_count, 7);
    }

    #[tokio::test]
    async fn update_sends_unconditional_if_match() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/orders"))
            .and(header("if-match", "*"))
            .respond_with(ResponseTemplate::new(200).set_body_string(queue_entry("orders")))
            .expect(1)
            .mount(&server)
            .await;

        let updated = client_for(&server)
            .update_queue(QueueProperties::new("orders"))
            .await
            .unwrap();
        assert_eq!(updated.name, "orders");
    }

    #[tokio::test]
    async fn get_asks_for_enriched_entity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orders"))
            .and(query_param("enrich", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_string(queue_entry("orders")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/orders"))
            .and(query_param("enrich", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_string(queue_entry("orders")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.get_queue("orders").await.unwrap().name, "orders");
        let runtime = client.get_queue_runtime_properties("orders").await.unwrap();
        assert_eq!(runtime.name, "orders");
    }

    #[tokio::test]
    async fn subscription_with_default_rule_embeds_rule_description() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/events/Subscriptions/urgent"))
            .and(body_string_contains("<DefaultRuleDescription>"))
            .and(body_string_contains("<Name>vip</Name>"))
            .respond_with(
                ResponseTemplate::new(201).set_body_string(subscription_entry("urgent")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let created = client_for(&server)
            .create_subscription_with_default_rule(
                "events",
                "urgent",
                SubscriptionProperties::default(),
                RuleProperties::new("vip", RuleFilter::sql("tier = 'gold'")),
            )
            .await
            .unwrap();
        assert_eq!(created.topic_name, "events");
        assert_eq!(created.subscription_name, "urgent");
    }

    #[tokio::test]
    async fn list_carries_skip_and_top() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/$Resources/Queues"))
            .and(query_param("$skip", "0"))
            .and(query_param("$top", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_FEED))
            .expect(1)
            .mount(&server)
            .await;

        let page = client_for(&server).list_queues(None).await.unwrap();
        assert!(page.items.is_empty());
        assert!(page.is_last());
    }
}

mod responses {
    use super::*;

    #[tokio::test]
    async fn conflict_maps_to_resource_exists() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(409).set_body_string(
                "<Error><Code>409</Code><Detail>The messaging entity already exists.</Detail></Error>",
            ))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_queue("orders", QueueProperties::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AdministrationError::ResourceExists { ref entity, .. } if entity == "orders"));
    }

    #[tokio::test]
    async fn empty_feed_means_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ghost"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_FEED))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(!client.queue_exists("ghost").await.unwrap());
        let err = client.get_queue("ghost").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(200));
    }

    #[tokio::test]
    async fn unauthorized_propagates_through_exists() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string(
                "<Error><Code>401</Code><Detail>ExpiredToken</Detail></Error>",
            ))
            .mount(&server)
            .await;

        let err = client_for(&server).queue_exists("orders").await.unwrap_err();
        assert!(matches!(
            err,
            AdministrationError::AuthenticationFailed { status: 401, ref message } if message.contains("ExpiredToken")
        ));
    }

    #[tokio::test]
    async fn delete_of_missing_entity_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/orders"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).delete_queue("orders").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
