use admin::administration::duration::{MAX_DURATION, format_duration, parse_duration};
use admin::administration::serialization;
use admin::administration::{
    EntityContent, FeedEntry, Logger, PageCursor, QueueProperties, ResponseLink, decode_token,
    encode_token,
};
use admin::administration::continuation::next_skip;
use proptest::prelude::*;
use std::time::Duration;

fn link(rel: &str, href: String) -> ResponseLink {
    ResponseLink {
        rel: rel.to_string(),
        href,
    }
}

mod continuation_properties {
    use super::*;

    proptest! {
        #[test]
        fn issued_tokens_decode_to_their_skip(skip in any::<u64>()) {
            let token = encode_token(skip);
            prop_assert_eq!(decode_token(&token).unwrap(), skip);
            prop_assert_eq!(
                PageCursor::from_token(Some(&token)).unwrap().skip(),
                skip
            );
        }

        #[test]
        fn foreign_tokens_are_rejected(token in "[a-zA-Z_\\-+. ]{1,16}") {
            prop_assert!(decode_token(&token).is_err());
        }

        #[test]
        fn next_link_skip_is_extracted(
            skip in 0u64..1_000_000,
            top in 1u32..1_000,
            skip_first in any::<bool>(),
        ) {
            let query = if skip_first {
                format!("$skip={skip}&$top={top}&api-version=2021-05")
            } else {
                format!("api-version=2021-05&$top={top}&$skip={skip}")
            };
            let links = vec![
                link("self", "https://contoso.servicebus.windows.net/$Resources/Queues?$skip=0".to_string()),
                link("next", format!("https://contoso.servicebus.windows.net/$Resources/Queues?{query}")),
            ];
            prop_assert_eq!(next_skip(&links, &Logger::global()).unwrap(), Some(skip));
        }

        #[test]
        fn feeds_without_next_are_terminal(rels in prop::collection::vec("(self|alternate|previous)", 0..4)) {
            let links: Vec<_> = rels
                .into_iter()
                .map(|rel| link(&rel, "https://contoso.servicebus.windows.net/x?$skip=5".to_string()))
                .collect();
            prop_assert_eq!(next_skip(&links, &Logger::global()).unwrap(), None);
        }
    }
}

mod duration_properties {
    use super::*;

    proptest! {
        #[test]
        fn formatted_durations_parse_back(
            secs in 0u64..(MAX_DURATION.as_secs() - 1),
            nanos in 0u32..1_000_000_000,
        ) {
            let duration = Duration::new(secs, nanos);
            let text = format_duration(duration);
            prop_assert!(text.starts_with('P'));
            prop_assert_eq!(parse_duration(&text).unwrap(), duration);
        }

        #[test]
        fn parsing_never_exceeds_the_sentinel(days in 10_675_199u64..u32::MAX as u64) {
            let parsed = parse_duration(&format!("P{days}D")).unwrap();
            prop_assert!(parsed <= MAX_DURATION);
        }
    }
}

mod serialization_properties {
    use super::*;

    proptest! {
        #[test]
        fn user_metadata_survives_escaping(metadata in "[a-zA-Z0-9<>&\"'/=;]{1,40}") {
            let props = QueueProperties {
                user_metadata: Some(metadata.clone()),
                ..QueueProperties::default()
            };
            let body = serialization::queue_entry(&props);
            let entry = FeedEntry::parse_single(&body).unwrap().unwrap();
            match entry.content {
                Some(EntityContent::Queue(description)) => {
                    prop_assert_eq!(description.properties.user_metadata, Some(metadata));
                }
                other => prop_assert!(false, "unexpected content {:?}", other.map(|c| c.kind_name())),
            }
        }
    }
}
