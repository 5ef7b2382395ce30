//! Tests for the connection layer over manual and replay sources

use super::*;
use crate::PosecastError;
use crate::bridge::{Transport, UdpSubscriber};
use crate::config::{BridgeConfig, PublishConfig, TrackerConfig};
use crate::mailbox::FrameMailbox;
use crate::source::ConnectParams;
use crate::sources::ReplaySource;
use crate::test_utils::{ManualSource, frame_with_body, stick_descriptions, stick_recording};
use crate::tracker::PoseTracker;
use crate::types::{Pose, UpdateRate};
use futures::StreamExt;
use std::time::Duration;

fn fast_tracker_config() -> TrackerConfig {
    TrackerConfig { poll_interval_ms: 1, ..TrackerConfig::default() }
}

fn fast_bridge_config() -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.capture.server_address = "127.0.0.1".to_string();
    config.tracker = fast_tracker_config();
    config
}

fn manual_connection(source: &ManualSource) -> LiveConnection {
    let mut tracker = PoseTracker::new(source.clone(), FrameMailbox::default(), fast_tracker_config());
    tracker.connect(&ConnectParams::new("127.0.0.1")).unwrap();
    tracker.update_descriptions().unwrap();
    LiveConnection::spawn(tracker, None, &fast_tracker_config()).unwrap()
}

#[tokio::test]
async fn subscribe_waits_for_first_snapshot() {
    let source = ManualSource::new(stick_descriptions());
    let connection = manual_connection(&source);
    assert!(connection.current().is_none());

    let mut stream = connection.subscribe(UpdateRate::Native);
    source.push(frame_with_body(1, 7, [4.0, 5.0, 6.0]));

    let snapshot = tokio::time::timeout(Duration::from_secs(2), stream.next()).await.unwrap().unwrap();
    assert_eq!(snapshot.get("Stick").unwrap().position(), [4.0, 5.0, 6.0]);
    assert_eq!(connection.rigid_body("Stick").unwrap().position(), [4.0, 5.0, 6.0]);
    assert_eq!(connection.server_info().unwrap().host_app, "Motive");
}

#[tokio::test]
async fn stream_ends_after_close() {
    let source = ManualSource::new(stick_descriptions());
    let connection = manual_connection(&source);
    let mut stream = connection.subscribe(UpdateRate::Native);

    source.push(frame_with_body(1, 7, [0.0; 3]));
    tokio::time::timeout(Duration::from_secs(2), stream.next()).await.unwrap().unwrap();

    connection.close();
    let ended = tokio::time::timeout(Duration::from_secs(2), async {
        while stream.next().await.is_some() {}
    })
    .await;
    assert!(ended.is_ok(), "stream should end once the driver stops");
}

#[tokio::test]
async fn throttled_subscription_still_sees_latest_pose() {
    let source = ManualSource::new(stick_descriptions());
    let connection = manual_connection(&source);
    let mut stream = connection.rigid_body_updates("Stick", UpdateRate::Max(20));

    for n in 0..10 {
        source.push(frame_with_body(n, 7, [n as f32, 0.0, 0.0]));
        tokio::time::sleep(Duration::from_millis(3)).await;
    }

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let pose: Pose = tokio::time::timeout_at(deadline, stream.next()).await.unwrap().unwrap();
        if pose.position()[0] == 9.0 {
            break;
        }
    }
}

#[tokio::test]
async fn replay_source_streams_through_connect() {
    let source = ReplaySource::new(stick_recording(50)).with_rate(500.0);
    let connection = LiveConnection::connect(source, &fast_bridge_config()).await.unwrap();

    let mut stream = connection.rigid_body_updates("Stick", UpdateRate::Native);
    let pose = tokio::time::timeout(Duration::from_secs(2), stream.next()).await.unwrap().unwrap();
    assert!(pose.position()[0] >= 0.0);
    assert!(connection.stats().frames >= 1);
}

#[tokio::test]
async fn connect_with_publish_section_forwards_tracked_bodies() {
    let subscriber = UdpSubscriber::bind("127.0.0.1:0").unwrap();
    let mut config = fast_bridge_config();
    config.publish = Some(PublishConfig { endpoint: subscriber.local_addr().unwrap().to_string() });

    let source = ReplaySource::new(stick_recording(50)).with_rate(500.0).looping(true);
    let _connection = LiveConnection::connect(source, &config).await.unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    let record = loop {
        if let Some(record) = subscriber.poll().unwrap() {
            break record;
        }
        assert!(tokio::time::Instant::now() < deadline, "no record published");
        tokio::time::sleep(Duration::from_millis(5)).await;
    };
    assert_eq!(record.id, 7);
    assert_eq!(record.qw, 1.0);
}

#[tokio::test]
async fn refused_connection_is_reported() {
    let source = ManualSource::new(stick_descriptions());
    source.refuse_connections();

    let result = LiveConnection::connect(source, &fast_bridge_config()).await;
    assert!(matches!(result, Err(PosecastError::Connection { .. })));
}

#[tokio::test]
async fn spawn_rejects_zero_poll_interval() {
    let source = ManualSource::new(stick_descriptions());
    let mut tracker = PoseTracker::new(source, FrameMailbox::default(), TrackerConfig::default());
    tracker.connect(&ConnectParams::new("127.0.0.1")).unwrap();

    let config = TrackerConfig { poll_interval_ms: 0, ..TrackerConfig::default() };
    let result = LiveConnection::spawn(tracker, None, &config);
    assert!(matches!(result, Err(PosecastError::Config { .. })));
}

#[test]
fn boxed_transport_is_a_transport() {
    fn assert_transport<T: Transport>() {}
    assert_transport::<Box<dyn Transport>>();
}
