mod common;

use common::hosts;
use rstest::rstest;
use rust_rtsp_grabber::iterator::{Credential, Route, Trial, TrialSpace};
use std::time::Duration;

fn routes(entries: &[&str]) -> Vec<Route> {
    entries.iter().map(|r| Route::new(r)).collect()
}

fn credentials(entries: &[(&str, &str)]) -> Vec<Credential> {
    entries.iter().map(|(u, p)| Credential::new(u, p)).collect()
}

fn sample_space() -> TrialSpace {
    TrialSpace::new(
        hosts(&["10.0.0.1", "10.0.0.2"]),
        routes(&["/a", "/b"]),
        credentials(&[("admin", ""), ("admin", "admin"), ("root", "root")]),
    )
}

#[test]
fn test_order_is_host_then_route_then_credential() {
    let space = sample_space();
    let trials: Vec<Trial> = space.iter().collect();

    let mut expected = Vec::new();
    for host in hosts(&["10.0.0.1", "10.0.0.2"]) {
        for route in routes(&["/a", "/b"]) {
            for credential in credentials(&[("admin", ""), ("admin", "admin"), ("root", "root")]) {
                expected.push(Trial {
                    host: host.clone(),
                    route: route.clone(),
                    credential,
                });
            }
        }
    }
    assert_eq!(trials, expected);
}

/// 测试尝试总数为三个列表长度之积
#[rstest]
#[case(1, 1, 1)]
#[case(3, 2, 4)]
#[case(5, 1, 7)]
#[case(0, 3, 3)]
#[case(2, 0, 3)]
#[case(2, 3, 0)]
fn test_len_is_product(#[case] host_count: usize, #[case] route_count: usize, #[case] cred_count: usize) {
    let host_list: Vec<String> = (0..host_count).map(|i| format!("10.0.0.{}", i + 1)).collect();
    let host_refs: Vec<&str> = host_list.iter().map(String::as_str).collect();
    let route_list: Vec<String> = (0..route_count).map(|i| format!("/r{}", i)).collect();
    let route_refs: Vec<&str> = route_list.iter().map(String::as_str).collect();
    let cred_list: Vec<Credential> = (0..cred_count)
        .map(|i| Credential::new("admin", &i.to_string()))
        .collect();

    let space = TrialSpace::new(hosts(&host_refs), routes(&route_refs), cred_list);
    let expected = host_count * route_count * cred_count;
    assert_eq!(space.len(), expected);
    assert_eq!(space.is_empty(), expected == 0);
    assert_eq!(space.iter().count(), expected);
}

#[test]
fn test_iteration_restarts_from_beginning() {
    let space = sample_space();
    let first: Vec<Trial> = space.iter().collect();
    let second: Vec<Trial> = (&space).into_iter().collect();
    assert_eq!(first, second);
}

#[test]
fn test_size_hint_tracks_remaining() {
    let space = sample_space();
    let mut iter = space.iter();
    assert_eq!(iter.size_hint(), (12, Some(12)));

    for consumed in 1..=12 {
        assert!(iter.next().is_some());
        let remaining = 12 - consumed;
        assert_eq!(iter.size_hint(), (remaining, Some(remaining)));
    }
    assert!(iter.next().is_none());
    assert!(iter.next().is_none());
}

#[test]
fn test_cloned_iterator_continues_independently() {
    let space = sample_space();
    let mut iter = space.iter();
    iter.next();
    let snapshot = iter.clone();
    assert_eq!(iter.count(), 11);
    assert_eq!(snapshot.count(), 11);
}

#[test]
fn test_capture_request_carries_credentials() {
    let trial = Trial {
        host: hosts(&["10.0.0.1:8554"]).remove(0),
        route: Route::new("/live"),
        credential: Credential::new("admin", ""),
    };

    let request = trial.capture_request(Duration::from_secs(5));
    assert_eq!(request.address, "rtsp://10.0.0.1:8554/live");
    assert_eq!(request.username.as_deref(), Some("admin"));
    assert_eq!(request.password, None);
    assert_eq!(request.timeout, Duration::from_secs(5));
    assert_eq!(trial.to_string(), "rtsp://10.0.0.1:8554/live with admin:");
}
