use std::time::{Duration, Instant};

use iced_complexp::animation::SchedulerState;
use iced_complexp::{
    ComplexpPlot, ParameterConfig, Parameters, PlotConfig, PlotEvent, PlotPoint, PlotRegistry,
    PointDescriptor, Redraw, ScreenPoint,
};

fn config() -> PlotConfig {
    PlotConfig::from_toml_str(
        r##"
        viewport_center = [0.5, -0.25]
        initial_pixels_per_unit = 80.0

        [[parameters]]
        id = "x"
        min = -10.0
        max = 10.0
        step = 0.01
        value = 1.0

        [[parameters]]
        id = "r"
        min = 0.0
        max = 5.0
        step = 0.5
        value = 1.0
        animation_speed = 1.0
        "##,
    )
    .unwrap()
}

fn plot() -> ComplexpPlot {
    let point = PointDescriptor::builder()
        .x(|p: &Parameters| p.value("r") * p.value("x").cos())
        .y(|p: &Parameters| p.value("r") * p.value("x").sin())
        .color("#000000")
        .size(5.0)
        .build()
        .unwrap();
    let mut plot = ComplexpPlot::builder()
        .config(config())
        .points(vec![point])
        .build()
        .unwrap();
    plot.handle(PlotEvent::SurfaceResized {
        width: 640.0,
        height: 480.0,
    });
    plot
}

fn frames(plot: &mut ComplexpPlot, start: Instant, limit: usize) -> usize {
    let mut count = 0;
    while plot.is_animating() {
        count += 1;
        assert!(count <= limit, "animation did not finish");
        plot.handle(PlotEvent::Frame(start + Duration::from_millis(16 * count as u64)));
    }
    count
}

fn assert_view(plot: &ComplexpPlot, center: PlotPoint, pixels_per_unit: f64) {
    let cs = plot.coordinate_system();
    assert!((cs.pixels_per_unit() - pixels_per_unit).abs() < 1e-9);
    let actual = cs.view_center();
    assert!((actual.x - center.x).abs() < 1e-6, "{actual:?}");
    assert!((actual.y - center.y).abs() < 1e-6, "{actual:?}");
}

#[test]
fn test_pan_zoom_then_refresh_restores_initial_view() {
    let mut plot = plot();
    let initial = PlotPoint::new(0.5, -0.25);
    assert_view(&plot, initial, 80.0);

    plot.handle(PlotEvent::PointerPressed(ScreenPoint::new(100.0, 100.0)));
    plot.handle(PlotEvent::PointerMoved(ScreenPoint::new(400.0, -50.0)));
    plot.handle(PlotEvent::PointerReleased);
    plot.handle(PlotEvent::WheelScrolled {
        delta_y: -300.0,
        position: ScreenPoint::new(20.0, 30.0),
    });
    assert!(plot.coordinate_system().pixels_per_unit() > 80.0);

    plot.handle(PlotEvent::Refresh);
    assert_eq!(plot.scheduler_state(), SchedulerState::GestureRunning);
    frames(&mut plot, Instant::now(), 2_000);

    assert_view(&plot, initial, 80.0);
}

#[test]
fn test_zoom_buttons_keep_view_center() {
    let mut plot = plot();
    let center = plot.coordinate_system().view_center();

    plot.handle(PlotEvent::ZoomIn);
    frames(&mut plot, Instant::now(), 100);
    assert_view(&plot, center, 160.0);

    plot.handle(PlotEvent::ZoomOut);
    plot.handle(PlotEvent::ZoomOut);
    frames(&mut plot, Instant::now(), 100);
    // the second press restarts from the current zoom
    assert_view(&plot, center, 80.0);
}

#[test]
fn test_sweep_and_gesture_share_frames() {
    let mut plot = plot();
    let start = Instant::now();
    plot.handle(PlotEvent::ParameterChanged("r".into(), 4.0));
    plot.handle(PlotEvent::TogglePlay("r".into()));
    plot.handle(PlotEvent::ZoomIn);
    assert_eq!(plot.scheduler_state(), SchedulerState::GestureAndSweep);

    let redraw = plot.handle(PlotEvent::Frame(start));
    assert_eq!(redraw, Redraw::ALL);
    assert_eq!(plot.parameters().value("r"), 4.5);

    let redraw = plot.handle(PlotEvent::Frame(start));
    assert_eq!(redraw, Redraw::ALL);
    assert_eq!(plot.parameters().value("r"), 5.0);
    assert!(!plot.control("r").unwrap().sweep.is_increasing);

    let series = plot.series();
    let sum = series.sum();
    assert!((sum.x - 5.0 * 1f64.cos()).abs() < 1e-9);
    assert!((sum.y - 5.0 * 1f64.sin()).abs() < 1e-9);
    assert_eq!(plot.label("r"), Some("r = 5"));
}

#[test]
fn test_registry_routes_events() {
    let mut registry = PlotRegistry::new();
    registry.insert("complexp", plot());
    let now = Instant::now();

    let redraw = registry.dispatch("complexp", PlotEvent::ToggleGrid, now);
    assert_eq!(
        redraw,
        Redraw {
            axis: true,
            ..Redraw::NONE
        }
    );
    assert!(!registry.get("complexp").unwrap().is_grid_visible());

    registry.dispatch("complexp", PlotEvent::ToggleFullscreen, now);
    assert!(registry.is_animating());
    registry.tick(now);
    registry.tick(now + Duration::from_secs(1));
    assert!(!registry.is_animating());
}

#[test]
fn test_invalid_config_fails_fast() {
    let mut config = config();
    config.parameters.push(ParameterConfig::new("x", 0.0, 1.0, 0.1, 0.0));
    assert!(ComplexpPlot::builder().config(config).build().is_err());

    let config = PlotConfig {
        axis_color: "#12".to_string(),
        ..self::config()
    };
    assert!(ComplexpPlot::builder().config(config).build().is_err());
}
