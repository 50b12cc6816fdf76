//! Wire descriptions to public models.
//!
//! The Atom title is the only authoritative source of an entity's name, so
//! every projection writes it (and the out-of-band owner names) into the
//! freshly parsed properties before handing them out.

use super::entity::{EntityKind, EntityScope};
use super::feed::{EntityDescription, Feed, FeedEntry};
use super::models::RuntimeProperties;

/// Projection applied to each entry of a page.
pub type Projector<T> = fn(FeedEntry, &EntityScope) -> Option<T>;

fn project_description<K: EntityKind>(
    entry: FeedEntry,
    scope: &EntityScope,
) -> Option<EntityDescription<K::Properties>> {
    let FeedEntry { title, content } = entry;
    let mut description = K::take(content?)?;
    K::assign_identity(&mut description.properties, &title, scope);
    Some(description)
}

/// `None` when the entry carries no payload or a payload of another kind.
pub fn project_one<K: EntityKind>(entry: FeedEntry, scope: &EntityScope) -> Option<K::Properties> {
    project_description::<K>(entry, scope).map(|description| description.properties)
}

pub fn project_one_runtime<K: EntityKind>(
    entry: FeedEntry,
    scope: &EntityScope,
) -> Option<RuntimeProperties<K::Properties>> {
    project_description::<K>(entry, scope)
        .map(|description| RuntimeProperties::new(description.properties, description.runtime))
}

pub fn project_list<K: EntityKind>(feed: Feed, scope: &EntityScope) -> Vec<K::Properties> {
    project_entries(feed.entries, scope, project_one::<K>)
}

pub fn project_list_runtime<K: EntityKind>(
    feed: Feed,
    scope: &EntityScope,
) -> Vec<RuntimeProperties<K::Properties>> {
    project_entries(feed.entries, scope, project_one_runtime::<K>)
}

/// Apply `projector` to every entry, dropping the ones it rejects.
pub fn project_entries<T>(
    entries: Vec<FeedEntry>,
    scope: &EntityScope,
    projector: Projector<T>,
) -> Vec<T> {
    entries
        .into_iter()
        .filter_map(|entry| projector(entry, scope))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::administration::entity::{Queue, Rule, Subscription};
    use crate::administration::feed::EntityContent;
    use crate::administration::models::{
        QueueProperties, RuleProperties, RuntimeInfo, SubscriptionProperties, TopicProperties,
    };

    fn entry(title: &str, content: Option<EntityContent>) -> FeedEntry {
        FeedEntry {
            title: title.to_string(),
            content,
        }
    }

    fn queue_content(size: i64) -> EntityContent {
        EntityContent::Queue(EntityDescription {
            properties: QueueProperties::default(),
            runtime: RuntimeInfo {
                size_in_bytes: Some(size),
                ..Default::default()
            },
        })
    }

    #[test]
    fn name_comes_from_title() {
        let props = project_one::<Queue>(
            entry("orders", Some(queue_content(0))),
            &EntityScope::namespace(),
        )
        .unwrap();
        assert_eq!(props.name, "orders");
    }

    #[test]
    fn nested_kinds_get_owner_names_from_scope() {
        let sub = project_one::<Subscription>(
            entry(
                "audit",
                Some(EntityContent::Subscription(EntityDescription {
                    properties: SubscriptionProperties::default(),
                    runtime: RuntimeInfo::default(),
                })),
            ),
            &EntityScope::topic("events"),
        )
        .unwrap();
        assert_eq!(sub.topic_name, "events");
        assert_eq!(sub.subscription_name, "audit");

        let rule = project_one::<Rule>(
            entry(
                "$Default",
                Some(EntityContent::Rule(EntityDescription {
                    properties: RuleProperties::default(),
                    runtime: RuntimeInfo::default(),
                })),
            ),
            &EntityScope::subscription("events", "audit"),
        )
        .unwrap();
        assert_eq!(
            (rule.topic_name.as_str(), rule.subscription_name.as_str(), rule.name.as_str()),
            ("events", "audit", "$Default")
        );
    }

    #[test]
    fn list_drops_empty_and_foreign_entries() {
        let feed = Feed {
            entries: vec![
                entry("a", Some(queue_content(1))),
                entry("ghost", None),
                entry(
                    "not-a-queue",
                    Some(EntityContent::Topic(EntityDescription {
                        properties: TopicProperties::default(),
                        runtime: RuntimeInfo::default(),
                    })),
                ),
                entry("b", Some(queue_content(2))),
            ],
            links: Vec::new(),
            rejected: Vec::new(),
        };

        let names: Vec<_> = project_list::<Queue>(feed.clone(), &EntityScope::namespace())
            .into_iter()
            .map(|q| q.name)
            .collect();
        assert_eq!(names, ["a", "b"]);

        let runtime = project_list_runtime::<Queue>(feed, &EntityScope::namespace());
        assert_eq!(runtime.len(), 2);
        assert_eq!(runtime[1].name, "b");
        assert_eq!(runtime[1].size_in_bytes(), 2);
    }
}
