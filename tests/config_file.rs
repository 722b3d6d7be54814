use std::io::Write;
use std::sync::Arc;

use tempfile::NamedTempFile;

use webview_sim::{
    ConfigError, InMemorySurface, InjectionController, SimulationConfig, Transition, UnknownSimulationPolicy,
};

#[test]
fn loads_config_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"topic": "preview-debug", "grid_size": 20, "unknown_policy": "reject"}}"#).unwrap();

    let cfg = SimulationConfig::from_path(file.path()).unwrap();
    assert_eq!(cfg.topic, "preview-debug");
    assert_eq!(cfg.grid_size, 20);
    assert_eq!(cfg.unknown_policy, UnknownSimulationPolicy::Reject);
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = SimulationConfig::from_path(&path).unwrap_err();
    match err {
        ConfigError::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[tokio::test]
async fn configured_controller_rejects_unknown_ids() {
    let cfg = SimulationConfig::from_json_str(r#"{"unknown_policy": "reject", "grid_size": 10}"#).unwrap();
    let controller = InjectionController::new(Arc::new(cfg.registry()), cfg.controller());
    let surface = Arc::new(InMemorySurface::default());
    controller.bind(surface.clone()).await;

    controller.select(Some("grid")).await;
    assert!(surface.live_stylesheets()[0].contains("10px 10px"));

    let t = controller.select(Some("aria")).await;
    assert!(matches!(t, Transition::Failed(_)));
    assert_eq!(controller.active().as_ref().map(|id| id.as_str()), Some("grid"));
}
