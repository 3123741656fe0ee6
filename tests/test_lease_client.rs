/// Client library against a live lease service: handle lifecycle, release
/// idempotency, background renewal and status queries.
mod helpers;

use helpers::*;
use leasekeeper::config::LeaseSettings;
use leasekeeper::domain::ports::lease_store::LeaseStore;
use leasekeeper::{ClientError, LeaseClient};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

// ===== Acquisition =====

#[tokio::test]
async fn test_acquire_returns_handle() {
    let server = setup_test_server().await;
    let client = server.client();
    let resource = unique("test-resource");

    let handle = client.acquire(&resource, Some("client-1")).await.unwrap();
    let handle = handle.expect("lease should be granted");

    assert_eq!(handle.resource_name(), resource);
    assert_eq!(handle.token().len(), 64);
    assert!(client.is_locked(&resource).await.unwrap());

    assert!(handle.release().await);
    teardown_test_server(server).await;
}

#[tokio::test]
async fn test_empty_resource_name_is_error() {
    let server = setup_test_server().await;
    let client = server.client();

    let result = client.acquire("", Some("client-1")).await;
    assert!(matches!(result, Err(ClientError::MissingArgument(_))));

    teardown_test_server(server).await;
}

#[tokio::test]
async fn test_contended_acquire_returns_none() {
    let server = setup_test_server().await;
    let client = server.client();
    let resource = unique("contested-resource");

    let first = client.acquire(&resource, Some("client-1")).await.unwrap();
    assert!(first.is_some());

    let second = client.acquire(&resource, Some("client-2")).await.unwrap();
    assert!(second.is_none());

    first.unwrap().release().await;
    teardown_test_server(server).await;
}

#[tokio::test]
async fn test_owner_id_generated_when_absent() {
    let server = setup_test_server().await;
    let client = server.client();
    let resource = unique("anonymous");

    let handle = client.acquire(&resource, None).await.unwrap().unwrap();
    let snapshot = server.store.query(&resource).unwrap();
    assert_eq!(snapshot.owner_id.len(), 32);

    let blank = client.acquire(&unique("blank-owner"), Some("  ")).await.unwrap();
    assert!(blank.is_some());

    handle.release().await;
    blank.unwrap().release().await;
    teardown_test_server(server).await;
}

#[tokio::test]
async fn test_multiple_resources_held_independently() {
    let server = setup_test_server().await;
    let client = server.client();
    let resources: Vec<String> = (1..=3).map(|i| unique(&format!("resource-{}", i))).collect();

    let mut handles = Vec::new();
    for resource in &resources {
        handles.push(client.acquire(resource, Some("client-1")).await.unwrap().unwrap());
    }
    for resource in &resources {
        assert!(client.is_locked(resource).await.unwrap());
    }

    handles[1].release().await;
    assert!(client.is_locked(&resources[0]).await.unwrap());
    assert!(!client.is_locked(&resources[1]).await.unwrap());
    assert!(client.is_locked(&resources[2]).await.unwrap());

    for handle in &handles {
        handle.release().await;
    }
    teardown_test_server(server).await;
}

// ===== Release =====

#[tokio::test]
async fn test_release_frees_resource_for_next_client() {
    let server = setup_test_server().await;
    let client = server.client();
    let resource = unique("test-resource-release");

    let first = client.acquire(&resource, Some("client-1")).await.unwrap().unwrap();
    assert!(first.release().await);
    assert!(first.is_released().await);
    assert!(!client.is_locked(&resource).await.unwrap());

    let second = client.acquire(&resource, Some("client-2")).await.unwrap();
    let second = second.expect("released resource should be acquirable");
    assert_ne!(second.token(), first.token());

    second.release().await;
    teardown_test_server(server).await;
}

#[tokio::test]
async fn test_release_is_idempotent() {
    let server = setup_test_server().await;
    let client = server.client();
    let resource = unique("idempotent");

    let handle = client.acquire(&resource, Some("client-1")).await.unwrap().unwrap();

    assert!(handle.release().await);
    assert!(!handle.release().await);
    assert!(!handle.release().await);
    assert!(server.store.is_empty());

    teardown_test_server(server).await;
}

#[tokio::test]
async fn test_concurrent_release_performs_once() {
    let server = setup_test_server().await;
    let client = server.client();
    let resource = unique("concurrent-release");

    let handle = Arc::new(client.acquire(&resource, Some("client-1")).await.unwrap().unwrap());

    let releases: Vec<_> = (0..8)
        .map(|_| {
            let handle = handle.clone();
            tokio::spawn(async move { handle.release().await })
        })
        .collect();

    let mut performed = 0;
    for release in releases {
        if release.await.unwrap() {
            performed += 1;
        }
    }
    assert_eq!(performed, 1);
    assert!(!client.is_locked(&resource).await.unwrap());

    teardown_test_server(server).await;
}

#[tokio::test]
async fn test_release_after_server_reclaimed_does_not_fail() {
    let server = setup_test_server().await;
    let client = server.client();
    let resource = unique("reclaimed");

    let handle = client.acquire(&resource, Some("client-1")).await.unwrap().unwrap();
    server.advance(Duration::from_secs(60));
    let thief = client.acquire(&resource, Some("client-2")).await.unwrap().unwrap();

    // The stale handle's release is rejected server-side and swallowed
    assert!(handle.release().await);
    assert!(client.is_locked(&resource).await.unwrap());

    thief.release().await;
    teardown_test_server(server).await;
}

#[tokio::test]
async fn test_no_heartbeat_after_release() {
    let (server, counting) = setup_counting_server(LeaseSettings {
        lease_timeout: Duration::from_secs(2),
        sweep_interval: Duration::from_millis(100),
    })
    .await;
    let client = server
        .client()
        .with_renew_interval(Duration::from_millis(50))
        .unwrap();
    let resource = unique("stop-then-release");

    let handle = client.acquire(&resource, Some("client-1")).await.unwrap().unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(counting.renewals() >= 2, "renewal loop never ran");

    assert!(handle.release().await);
    let at_release = counting.renewals();
    assert!(!client.is_locked(&resource).await.unwrap());

    // Several renewal periods later nothing else has reached the service
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(counting.renewals(), at_release);

    teardown_test_server(server).await;
}

#[tokio::test]
async fn test_interrupted_release_can_be_retried() {
    let server = setup_test_server().await;
    let client = server.client();
    let resource = unique("interrupted-release");

    let handle = client.acquire(&resource, Some("client-1")).await.unwrap().unwrap();

    // Abandon the release before its request goes out
    {
        let mut release = Box::pin(handle.release());
        assert!(futures::poll!(&mut release).is_pending());
    }
    assert!(!handle.is_released().await);
    assert!(client.is_locked(&resource).await.unwrap());

    assert!(handle.release().await);
    assert!(handle.is_released().await);
    assert!(!client.is_locked(&resource).await.unwrap());

    teardown_test_server(server).await;
}

// ===== Renewal =====

#[tokio::test]
async fn test_renewal_paced_by_advertised_timeout() {
    let server = setup_real_time_server(LeaseSettings {
        lease_timeout: Duration::from_millis(900),
        sweep_interval: Duration::from_millis(100),
    })
    .await;
    // No pinned interval: the handle paces itself from the grant
    let client = server.client();
    let resource = unique("advertised-timeout");

    let handle = client.acquire(&resource, Some("client-1")).await.unwrap().unwrap();
    assert_eq!(handle.renew_interval(), Duration::from_millis(600));

    // Well past several lease timeouts
    tokio::time::sleep(Duration::from_millis(2500)).await;

    assert!(client.is_locked(&resource).await.unwrap());
    let other = client.acquire(&resource, Some("client-2")).await.unwrap();
    assert!(other.is_none());

    handle.release().await;
    teardown_test_server(server).await;
}

#[tokio::test]
async fn test_pinned_renewal_keeps_lease_alive() {
    let server = setup_real_time_server(LeaseSettings {
        lease_timeout: Duration::from_millis(600),
        sweep_interval: Duration::from_millis(100),
    })
    .await;
    let client = server
        .client()
        .with_renew_interval(Duration::from_millis(150))
        .unwrap();
    let resource = unique("heartbeat-test");

    let handle = client.acquire(&resource, Some("client-1")).await.unwrap().unwrap();
    assert_eq!(handle.renew_interval(), Duration::from_millis(150));

    tokio::time::sleep(Duration::from_millis(2000)).await;

    assert!(client.is_locked(&resource).await.unwrap());
    let other = client.acquire(&resource, Some("client-2")).await.unwrap();
    assert!(other.is_none());

    handle.release().await;
    assert!(!client.is_locked(&resource).await.unwrap());
    teardown_test_server(server).await;
}

#[tokio::test]
async fn test_lease_without_heartbeats_expires() {
    let server = setup_real_time_server(LeaseSettings {
        lease_timeout: Duration::from_millis(300),
        sweep_interval: Duration::from_millis(50),
    })
    .await;
    // Renewal far slower than the lease timeout, so the lease lapses
    let client = server
        .client()
        .with_renew_interval(Duration::from_secs(60))
        .unwrap();
    let resource = unique("missed-heartbeat");

    let handle = client.acquire(&resource, Some("client-1")).await.unwrap().unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert!(!client.is_locked(&resource).await.unwrap());
    let next = client.acquire(&resource, Some("client-2")).await.unwrap();
    assert!(next.is_some());

    handle.release().await;
    next.unwrap().release().await;
    teardown_test_server(server).await;
}

// ===== Status =====

#[tokio::test]
async fn test_is_locked_false_for_unknown_resource() {
    let server = setup_test_server().await;
    let client = server.client();

    assert!(!client.is_locked(&unique("unlocked-resource")).await.unwrap());

    teardown_test_server(server).await;
}

#[tokio::test]
async fn test_resource_names_with_reserved_characters() {
    let server = setup_test_server().await;
    let client = server.client();
    let resource = format!("jobs/nightly report?{}", Uuid::new_v4());

    let handle = client.acquire(&resource, Some("client-1")).await.unwrap().unwrap();
    assert!(client.is_locked(&resource).await.unwrap());

    handle.release().await;
    assert!(!client.is_locked(&resource).await.unwrap());
    teardown_test_server(server).await;
}

#[tokio::test]
async fn test_unreachable_service_reads_as_unlocked() {
    let client = LeaseClient::new("http://127.0.0.1:1").unwrap();

    assert!(!client.is_locked("anything").await.unwrap());
    assert!(client.acquire("anything", None).await.unwrap().is_none());
}
