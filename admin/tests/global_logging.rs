mod common;

use admin::administration::HttpResponse;
use common::*;
use log::{Level, LevelFilter};
use reqwest::StatusCode;

/// Kept alone in its binary: it installs the process-wide logger.
#[tokio::test]
async fn logger_installed_after_client_creation_receives_warnings() {
    let transport = ScriptedTransport::new([HttpResponse::new(
        StatusCode::OK,
        "<html>maintenance</html>",
    )]);
    let client = client_with(transport, 10);

    let logger = CapturingLogger::leak();
    log::set_logger(logger).unwrap();
    log::set_max_level(LevelFilter::Warn);

    let page = client.list_queues(None).await.unwrap();
    assert!(page.items.is_empty());
    let warnings = logger.messages(Level::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("$Resources/Queues"));
    assert!(logger.messages(Level::Debug).is_empty());
}
