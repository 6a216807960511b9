// Layout and rasterization tests

mod common;

use common::*;
use epd_sysmon::composer::{
    FontError, FontRole, Fonts, FrameComposer, LEFT_MARGIN, Typeface, layout,
};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::Point;
use epd_sysmon::config::FontConfig;

fn composer_with_system_font() -> Option<FrameComposer> {
    let path = find_font()?;
    let fonts = Fonts::load(&FontConfig {
        body_path: path.clone(),
        body_size: 15.0,
        title_path: path,
        title_size: 24.0,
    })
    .expect("system font loads");
    Some(FrameComposer::new(fonts, PANEL))
}

#[test]
fn test_layout_lines_top_to_bottom() {
    let lines = layout(&sample_snapshot());
    let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "Time: 2024-01-01 00:00:00",
            "IP: 192.168.1.5",
            "CPU Temp: 45.0°C",
            "Mem Usage: 32%",
            "Disk Usage: 58%",
        ]
    );
}

#[test]
fn test_layout_positions_and_fonts() {
    let lines = layout(&fallback_snapshot());
    let origins: Vec<Point> = lines.iter().map(|l| l.origin).collect();
    assert_eq!(
        origins,
        vec![
            Point::new(10, 10),
            Point::new(10, 30),
            Point::new(10, 50),
            Point::new(10, 70),
            Point::new(10, 90),
        ]
    );
    assert!(lines.iter().all(|l| l.role == FontRole::Body));
    assert_eq!(lines[1].text, "IP: No IP");
    assert_eq!(lines[4].text, "Disk Usage: N/A");
}

#[test]
fn test_typeface_missing_file() {
    let err = match Typeface::load("does/not/exist/Font.ttc", 15.0) {
        Err(e) => e,
        Ok(_) => panic!("missing font must fail"),
    };
    assert!(matches!(err, FontError::Io { .. }));
    assert!(err.to_string().contains("Font.ttc"));
}

#[test]
fn test_typeface_rejects_non_font_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("Font.ttc");
    std::fs::write(&path, b"definitely not a font").unwrap();
    assert!(matches!(
        Typeface::load(&path, 15.0),
        Err(FontError::Invalid { .. })
    ));
}

#[test]
fn test_compose_is_deterministic() {
    let Some(composer) = composer_with_system_font() else {
        return; // Skip when no TrueType font is installed
    };
    let a = composer.compose(&sample_snapshot());
    let b = composer.compose(&sample_snapshot());
    assert_eq!(a, b);
    assert!(a.ink_count() > 0);
}

#[test]
fn test_compose_dimensions_independent_of_content() {
    let Some(composer) = composer_with_system_font() else {
        return;
    };
    let mut long = sample_snapshot();
    long.ip_address = "fe80::1234:5678:9abc:def0:1234:5678".repeat(4);
    for snapshot in [sample_snapshot(), fallback_snapshot(), long] {
        assert_eq!(composer.compose(&snapshot).dimensions(), (250, 122));
    }
}

#[test]
fn test_compose_into_fully_overwrites_previous_frame() {
    let Some(composer) = composer_with_system_font() else {
        return;
    };
    let mut reused = composer.compose(&fallback_snapshot());
    composer.compose_into(&sample_snapshot(), &mut reused);
    assert_eq!(reused, composer.compose(&sample_snapshot()));
    assert_ne!(reused, composer.compose(&fallback_snapshot()));
}

#[test]
fn test_compose_keeps_ink_inside_text_area() {
    let Some(composer) = composer_with_system_font() else {
        return;
    };
    let frame = composer.compose(&sample_snapshot());
    for y in 0..frame.height() {
        for x in 0..frame.width() {
            if frame.pixel(x, y) == Some(BinaryColor::On) {
                assert!(y >= 8, "ink above the first line at ({}, {})", x, y);
                assert!(x as i32 >= LEFT_MARGIN - 2, "ink left of margin at ({}, {})", x, y);
            }
        }
    }
    // last line starts at y = 90 and a 15px face fits well inside the frame
    let lowest = (0..frame.height())
        .rev()
        .find(|&y| (0..frame.width()).any(|x| frame.pixel(x, y) == Some(BinaryColor::On)))
        .unwrap();
    assert!((90..frame.height()).contains(&lowest));
}

#[test]
fn test_compose_is_the_sum_of_lines_drawn_at_fixed_offsets() {
    let Some(composer) = composer_with_system_font() else {
        return;
    };
    let snapshot = sample_snapshot();
    let composed = composer.compose(&snapshot);

    let body = &composer.fonts().body;
    let mut summed = composer.blank_frame();
    for (i, line) in snapshot.lines().iter().enumerate() {
        let origin = Point::new(10, 10 + 20 * i as i32);
        let mut alone = composer.blank_frame();
        let Ok(()) = body.draw_text(&mut alone, origin, line);
        assert!(alone.ink_count() > 0, "line {} drew nothing", i);
        let Ok(()) = body.draw_text(&mut summed, origin, line);
    }
    assert_eq!(summed, composed);
}

#[test]
fn test_title_face_is_loaded_but_unused_by_layout() {
    let Some(composer) = composer_with_system_font() else {
        return;
    };
    assert_eq!(composer.fonts().title.size(), 24.0);
    assert_eq!(composer.fonts().body.size(), 15.0);
}
