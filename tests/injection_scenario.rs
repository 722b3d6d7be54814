use std::sync::Arc;

use webview_sim::{
    Category, ControllerConfig, InMemorySurface, InjectionController, StylesheetEntry, StylesheetRegistry,
    SurfaceCall, SurfaceOperation, Transition,
};

fn registry() -> Arc<StylesheetRegistry> {
    Arc::new(
        StylesheetRegistry::builder()
            .register("grid", Category::Layout, StylesheetEntry::css("A"))
            .register("hostile", Category::Layout, StylesheetEntry::with_script("B", "run()"))
            .build(),
    )
}

async fn setup() -> (InjectionController, Arc<InMemorySurface>) {
    let controller = InjectionController::new(registry(), ControllerConfig::default());
    let surface = Arc::new(InMemorySurface::new("https://example.test/"));
    controller.bind(surface.clone()).await;
    (controller, surface)
}

fn inserted(calls: &[SurfaceCall]) -> Vec<&str> {
    calls
        .iter()
        .filter_map(|c| match c {
            SurfaceCall::InsertCss { css, .. } => Some(css.as_str()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn grid_then_hostile_then_navigate_then_disable() {
    let (controller, surface) = setup().await;

    // select("grid")
    let t = controller.select(Some("grid")).await;
    assert!(matches!(t, Transition::Applied(ref id) if id == "grid"));
    let calls = surface.take_calls();
    assert_eq!(inserted(&calls), vec!["A"]);
    assert_eq!(calls.len(), 1);
    let grid_handle = controller.state().await.unwrap().handle().clone();

    // select("hostile"): grid had no script, so no reload.
    let t = controller.select(Some("hostile")).await;
    assert!(matches!(t, Transition::Applied(ref id) if id == "hostile"));
    let calls = surface.take_calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], SurfaceCall::RemoveInsertedCss { handle: grid_handle });
    assert!(matches!(&calls[1], SurfaceCall::InsertCss { css, .. } if css == "B"));
    assert_eq!(calls[2], SurfaceCall::ExecuteJavaScript { js: "run()".to_string() });
    let first_hostile = controller.state().await.unwrap().handle().clone();

    // Navigation re-applies CSS and script, without a reload.
    surface.navigate("https://example.test/other");
    let t = controller.on_navigate().await;
    assert!(matches!(t, Transition::Reapplied(ref id) if id == "hostile"));
    let calls = surface.take_calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(&calls[0], SurfaceCall::InsertCss { css, .. } if css == "B"));
    assert_eq!(calls[1], SurfaceCall::ExecuteJavaScript { js: "run()".to_string() });
    let new_hostile = controller.state().await.unwrap().handle().clone();
    assert_ne!(first_hostile, new_hostile);
    assert_eq!(controller.active().as_ref().map(|id| id.as_str()), Some("hostile"));

    // Disable: hostile ran a script, so reload first, then remove the new handle.
    let t = controller.select(None).await;
    assert!(matches!(t, Transition::Cleared(ref id) if id == "hostile"));
    let calls = surface.take_calls();
    assert_eq!(calls, vec![SurfaceCall::Reload, SurfaceCall::RemoveInsertedCss { handle: new_hostile }]);
    assert!(controller.active().is_none());
    assert!(surface.live_stylesheets().is_empty());
}

#[tokio::test]
async fn unknown_id_behaves_like_clear() {
    let (with_unknown, surface_a) = setup().await;
    let (with_clear, surface_b) = setup().await;

    with_unknown.select(Some("grid")).await;
    with_clear.select(Some("grid")).await;
    surface_a.take_calls();
    surface_b.take_calls();

    let a = with_unknown.select(Some("nonexistent-id")).await;
    let b = with_clear.clear().await;
    assert!(matches!(a, Transition::Cleared(_)));
    assert!(matches!(b, Transition::Cleared(_)));

    let ops_a: Vec<SurfaceOperation> = surface_a.calls().iter().map(SurfaceCall::operation).collect();
    let ops_b: Vec<SurfaceOperation> = surface_b.calls().iter().map(SurfaceCall::operation).collect();
    assert_eq!(ops_a, ops_b);
    assert!(with_unknown.active().is_none());
}

#[tokio::test]
async fn repeated_apply_inserts_once() {
    let (controller, surface) = setup().await;
    for _ in 0..3 {
        controller.apply("grid").await;
    }
    assert_eq!(surface.count(SurfaceOperation::InsertCss), 1);
    assert_eq!(surface.live_stylesheets(), vec!["A".to_string()]);
}

#[tokio::test]
async fn exactly_one_stylesheet_after_switching() {
    let (controller, surface) = setup().await;
    controller.apply("grid").await;
    controller.apply("hostile").await;
    controller.apply("grid").await;
    assert_eq!(surface.live_stylesheets(), vec!["A".to_string()]);
    assert_eq!(surface.count(SurfaceOperation::RemoveInsertedCss), 2);
    // Only leaving hostile (which has a script) reloads.
    assert_eq!(surface.count(SurfaceOperation::Reload), 1);
}

#[tokio::test]
async fn builtin_registry_applies_grid() {
    let controller = InjectionController::builtin();
    let surface = Arc::new(InMemorySurface::default());
    controller.bind(surface.clone()).await;

    controller.select(Some("grid")).await;
    let live = surface.live_stylesheets();
    assert_eq!(live.len(), 1);
    assert!(live[0].contains("15px 15px"));
}
