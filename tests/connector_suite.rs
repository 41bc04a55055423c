use std::rc::Rc;

use arc_connector::{
    AnimatedConnector, ConnectorConfig, DrawCommand, ManualScheduler, Rect, RecordingSurface,
    SvgSurface, Theme,
};

fn scenario_rects() -> (Rect, Rect) {
    (
        Rect::new(0.0, 100.0, 50.0, 20.0),
        Rect::new(200.0, 0.0, 50.0, 20.0),
    )
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

#[test]
fn arc_settles_after_one_second() {
    let (from, to) = scenario_rects();
    let scheduler = Rc::new(ManualScheduler::new());
    let config = ConnectorConfig::default().with_strands(1);
    let connector = AnimatedConnector::new(config.clone(), Theme::electric());
    let handle = connector.start(RecordingSurface::new(300.0, 200.0), from, to, scheduler.clone());

    scheduler.run_for(1_000.0, 20.0);

    let report = handle.last_report().expect("frames should have been rendered");
    assert_eq!(report.elapsed_ms, 1_000.0);
    assert_eq!(report.strands.len(), 1);
    let path = &report.strands[0];
    assert_eq!(path.width, config.max_stroke_width);

    let curve = handle.scene().curve;
    let first = path.first().unwrap();
    let last = path.last().unwrap();
    let last_i = 0.05 + (path.points.len() - 1) as f32 * config.step;
    assert!(distance(first, curve.point(0.05)) <= config.max_deviance + 1e-3);
    assert!(distance(last, curve.point(last_i)) <= config.max_deviance + 1e-3);

    handle.with_surface(|surface| {
        let markers: Vec<_> = surface
            .last_frame()
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Circle { center, radius, .. } => Some((*center, *radius)),
                _ => None,
            })
            .collect();
        assert_eq!(markers, vec![(first, 5.0), (last, 5.0)]);
    });
    handle.stop();
}

#[test]
fn nothing_is_scheduled_after_stop() {
    let (from, to) = scenario_rects();
    let scheduler = Rc::new(ManualScheduler::new());
    let handle = AnimatedConnector::default().start(
        RecordingSurface::new(300.0, 200.0),
        from,
        to,
        scheduler.clone(),
    );
    scheduler.run_for(100.0, 10.0);
    let before = handle.frames_rendered();
    handle.stop();
    scheduler.tick(10.0);
    scheduler.tick(10.0);
    assert!(handle.frames_rendered() <= before + 1);
    assert_eq!(scheduler.pending_count(), 0);
    handle.stop();
    assert_eq!(scheduler.pending_count(), 0);
}

#[test]
fn multiple_strands_draw_distinct_paths() {
    let (from, to) = scenario_rects();
    let scheduler = Rc::new(ManualScheduler::new());
    let connector = AnimatedConnector::new(
        ConnectorConfig::default().with_strands(3).with_seed(2024),
        Theme::electric(),
    );
    let handle = connector.start(RecordingSurface::new(300.0, 200.0), from, to, scheduler.clone());
    scheduler.run_for(1_200.0, 16.0);
    let report = handle.last_report().unwrap();
    assert_eq!(report.strands.len(), 3);
    assert_ne!(report.strands[0].points, report.strands[1].points);
    assert_ne!(report.strands[1].points, report.strands[2].points);
}

#[test]
fn pinned_seed_reproduces_frames() {
    let (from, to) = scenario_rects();
    let render = || {
        let scheduler = Rc::new(ManualScheduler::new());
        let connector = AnimatedConnector::new(ConnectorConfig::default().with_seed(7), Theme::electric());
        let handle = connector.start(SvgSurface::new(300.0, 200.0), from, to, scheduler.clone());
        scheduler.run_for(600.0, 20.0);
        handle.stop();
        handle.with_surface(|surface| surface.to_svg())
    };
    assert_eq!(render(), render());
}

#[test]
fn detached_surface_stops_without_drawing() {
    let (from, to) = scenario_rects();
    let scheduler = Rc::new(ManualScheduler::new());
    let mut surface = RecordingSurface::new(300.0, 200.0);
    surface.detach();
    let handle = AnimatedConnector::default().start(surface, from, to, scheduler.clone());
    scheduler.tick(16.0);
    assert!(!handle.is_running());
    assert_eq!(handle.frames_rendered(), 0);
    assert_eq!(scheduler.pending_count(), 0);
    handle.with_surface(|surface| assert!(surface.commands.is_empty()));
}

#[cfg(feature = "png")]
#[test]
fn frame_rasterizes_to_png() {
    use arc_connector::RenderConfig;
    use arc_connector::render::write_output_png;

    let (from, to) = scenario_rects();
    let scheduler = Rc::new(ManualScheduler::new());
    let surface = SvgSurface::new(300.0, 200.0).with_background("#312F54");
    let handle = AnimatedConnector::default().start(surface, from, to, scheduler.clone());
    scheduler.run_for(500.0, 20.0);
    let svg = handle.with_surface(|surface| surface.to_svg());

    let output = std::env::temp_dir().join(format!("arc-connector-{}.png", std::process::id()));
    let render_cfg = RenderConfig {
        width: 300.0,
        height: 200.0,
        ..Default::default()
    };
    write_output_png(&svg, &output, &render_cfg).expect("png render failed");
    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"\x89PNG"));
    let _ = std::fs::remove_file(&output);
}
