use newsbooth_core::error::NewsboothError;
use newsbooth_core::prelude::*;

#[test]
fn default_config_is_valid() {
    let cfg = CompositorConfig::default();
    cfg.validate().expect("default validates");
    assert_eq!((cfg.canvas_width, cfg.canvas_height), (2550, 3300));
    assert_eq!(cfg.primary, Rect::new(200, 200, 2100, 1400));
    assert_eq!(cfg.secondary, Rect::new(200, 1700, 2100, 1200));
    assert_eq!(cfg.grain.count, 1000);
    assert!(cfg.grain.seed.is_none());
}

#[test]
fn test_zero_canvas() {
    let cfg = CompositorConfig::builder().with_canvas(0, 100).build();
    match cfg.validate() {
        Err(NewsboothError::InvalidDimensions { width, height }) => {
            assert_eq!(width, 0);
            assert_eq!(height, 100);
        }
        other => panic!("Expected InvalidDimensions error, got {other:?}"),
    }
}

#[test]
fn test_rect_outside_canvas() {
    let cfg = CompositorConfig::builder()
        .with_canvas(1000, 1000)
        .primary(Rect::new(100, 100, 400, 300))
        .secondary(Rect::new(600, 900, 400, 200))
        .build();
    match cfg.validate() {
        Err(NewsboothError::InvalidConfig(msg)) => assert!(msg.contains("secondary")),
        other => panic!("Expected InvalidConfig error, got {other:?}"),
    }
}

#[test]
fn test_empty_rect() {
    let cfg = CompositorConfig::builder()
        .primary(Rect::new(10, 10, 0, 50))
        .build();
    match cfg.validate() {
        Err(NewsboothError::InvalidConfig(msg)) => assert!(msg.contains("primary")),
        other => panic!("Expected InvalidConfig error, got {other:?}"),
    }
}

#[test]
fn test_effect_ranges() {
    assert!(CompositorConfig::builder().grain_alpha(1.5).build().validate().is_err());
    assert!(CompositorConfig::builder().vignette_alpha(-0.1).build().validate().is_err());
    assert!(
        CompositorConfig::builder()
            .vignette_radius_divisor(0.0)
            .build()
            .validate()
            .is_err()
    );
    assert!(
        CompositorConfig::builder()
            .vignette_radius_divisor(f32::NAN)
            .build()
            .validate()
            .is_err()
    );
}

#[test]
fn overlapping_rects_are_allowed() {
    let cfg = CompositorConfig::builder()
        .with_canvas(100, 100)
        .primary(Rect::new(0, 0, 60, 60))
        .secondary(Rect::new(40, 40, 60, 60))
        .build();
    cfg.validate().expect("overlap is fine");
}

#[test]
fn partial_json_fills_defaults() {
    let json = r#"{
        "canvas_width": 800,
        "canvas_height": 600,
        "primary": {"x": 0, "y": 0, "w": 400, "h": 600},
        "secondary": {"x": 400, "y": 0, "w": 400, "h": 600},
        "grain": {"seed": 42},
        "output_format": "jpeg"
    }"#;
    let cfg: CompositorConfig = serde_json::from_str(json).expect("parse");
    assert_eq!(cfg.template, "newspaper-template.png");
    assert_eq!(cfg.grain.seed, Some(42));
    assert_eq!(cfg.grain.count, 1000);
    assert!((cfg.vignette.radius_divisor - 1.2).abs() < f32::EPSILON);
    assert_eq!(cfg.output_format, OutputFormat::Jpeg);
    cfg.validate().expect("valid");
}

#[test]
fn enum_names_parse() {
    assert_eq!("PNG".parse::<OutputFormat>(), Ok(OutputFormat::Png));
    assert_eq!("jpg".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg));
    assert!("gif".parse::<OutputFormat>().is_err());
    assert_eq!("bilinear".parse::<ResampleFilter>(), Ok(ResampleFilter::Triangle));
    assert_eq!("lanczos3".parse::<ResampleFilter>(), Ok(ResampleFilter::Lanczos3));
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(serde_json::from_str::<CompositorConfig>(r#"{"grain_count": 5}"#).is_err());
    assert!(serde_json::from_str::<CompositorConfig>(r#"{"grain": {"dots": 5}}"#).is_err());
    assert!(serde_json::from_str::<CompositorConfig>(r#"{"resample": "sharpest"}"#).is_err());
}

#[test]
fn empty_document_is_the_default_config() {
    let cfg: CompositorConfig = serde_json::from_str("{}").expect("parse");
    assert_eq!(cfg, CompositorConfig::default());
}
