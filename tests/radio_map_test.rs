/// 数据集加载与端到端定位测试

use std::path::PathBuf;
use wifiloc::{LoadOptions, Location, Locator, LocatorError, RadioMap, RadioMapError};

const RADIO_MAP: &str = r#"[
    {"CLASSNAME": "Fingerprint", "INSTANCE": {
        "mWiFiFingerprint": {"00:11:22:33:44:01": -45, "00:11:22:33:44:02": -60, "00:11:22:33:44:03": -72},
        "mCenter": {"x": 0.0, "y": 0.0},
        "mRadius": 1.0, "mColor": -65536, "mColor4f": [255, 0, 0, 255], "mIsRemoved": false}},
    {"CLASSNAME": "Fingerprint", "INSTANCE": {
        "mWiFiFingerprint": {"00:11:22:33:44:01": -58, "00:11:22:33:44:02": -50, "00:11:22:33:44:03": -70},
        "mCenter": {"x": 5.0, "y": 0.0},
        "mRadius": 1.0, "mColor": -65536, "mColor4f": [255, 0, 0, 255], "mIsRemoved": false}},
    {"CLASSNAME": "Fingerprint", "INSTANCE": {
        "mWiFiFingerprint": {"00:11:22:33:44:01": -52, "00:11:22:33:44:02": -55, "00:11:22:33:44:03": -71},
        "mCenter": {"x": 2.5, "y": 0.0},
        "mRadius": 1.0, "mColor": -65536, "mColor4f": [255, 0, 0, 255], "mIsRemoved": true}},
    {"CLASSNAME": "Fingerprint", "INSTANCE": {
        "mWiFiFingerprint": {"66:77:88:99:AA:01": -40, "66:77:88:99:AA:02": -42, "66:77:88:99:AA:03": -48},
        "mCenter": {"x": 40.0, "y": 30.0},
        "mRadius": 1.0, "mColor": -16776961, "mColor4f": [0, 0, 255, 255], "mIsRemoved": false}}
]"#;

fn write_temp_map(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("wifiloc_{}_{}.json", name, std::process::id()));
    std::fs::write(&path, RADIO_MAP).expect("写入临时文件失败");
    path
}

#[test]
fn test_load_and_locate() {
    let path = write_temp_map("sync");
    let map = RadioMap::load(&path, &LoadOptions { require_mac_ids: true }).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(map.len(), 4);
    // 已删除标记只是附带属性
    assert!(map.fingerprints()[2].payload().removed);

    let (query, reference) = map.split_off_query(2).unwrap();
    let result = Locator::default().locate(&reference, &query).unwrap();
    println!("定位结果: {}", result);

    // 第四条指纹的接入点完全不同，不会被选为邻居
    assert_eq!(result.neighbor_count, 2);
    assert!(result.location.x > 0.0 && result.location.x < 5.0);
    assert!(result.location.y.abs() < 1e-9);
    assert!(result.distance_to(&Location::new(2.5, 0.0)) < 2.5);
}

#[tokio::test]
async fn test_load_async() {
    let path = write_temp_map("async");
    let map = RadioMap::load_async(&path, &LoadOptions::default()).await.unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(map.len(), 4);
    assert_eq!(map.fingerprints()[3].signal("66:77:88:99:aa:01"), Some(-40));
}

#[test]
fn test_load_async_missing_file() {
    let path = std::env::temp_dir().join("wifiloc_does_not_exist.json");
    let err = tokio_test::block_on(RadioMap::load_async(&path, &LoadOptions::default())).unwrap_err();
    assert!(matches!(err, RadioMapError::Io(_)));
}

#[test]
fn test_reject_non_mac_ids() {
    let json = r#"[{"INSTANCE": {
        "mWiFiFingerprint": {"lobby-ap": -50},
        "mCenter": {"x": 0.0, "y": 0.0}}}]"#;

    assert!(RadioMap::from_json_str(json, &LoadOptions::default()).is_ok());

    let err = RadioMap::from_json_str(json, &LoadOptions { require_mac_ids: true }).unwrap_err();
    assert!(matches!(err, RadioMapError::InvalidRecord { index: 0, .. }));
}

#[test]
fn test_malformed_json() {
    let err = RadioMap::from_json_str("[{", &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, RadioMapError::Json(_)));

    let err = RadioMap::from_reader(&b"{}"[..], &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, RadioMapError::Json(_)));
}

#[test]
fn test_isolated_query_has_no_neighbors() {
    let map = RadioMap::from_json_str(RADIO_MAP, &LoadOptions::default()).unwrap();
    let (query, reference) = map.split_off_query(3).unwrap();

    let err = Locator::default().estimate_location(&reference, &query).unwrap_err();
    assert_eq!(err, LocatorError::NoComparableNeighbors);
}

#[test]
fn test_decreasing_reference_set() {
    let map = RadioMap::from_json_str(RADIO_MAP, &LoadOptions::default()).unwrap();
    let (query, mut reference) = map.split_off_query(0).unwrap();
    let locator = Locator::default();

    let mut outcomes = Vec::new();
    while !reference.is_empty() {
        outcomes.push(locator.estimate_location(&reference, &query));
        reference.remove(0);
    }

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_ok());
    assert!(outcomes[1].is_ok());
    // 只剩下接入点完全不同的指纹
    assert_eq!(outcomes[2], Err(LocatorError::NoComparableNeighbors));
}
