use image::{Rgba, RgbaImage};
use newsbooth_core::{Rect, desaturate_region, luminance};

#[test]
fn known_luminance_values() {
    assert_eq!(luminance(255, 0, 0), 76);
    assert_eq!(luminance(0, 255, 0), 150);
    assert_eq!(luminance(255, 255, 255), 255);
    assert_eq!(luminance(128, 128, 128), 128);
    // 0.299*10 + 0.587*20 + 0.114*30 = 18.15
    assert_eq!(luminance(10, 20, 30), 18);
}

#[test]
fn only_the_rectangle_turns_gray() {
    let mut canvas = RgbaImage::from_fn(64, 48, |x, y| {
        Rgba([(x * 4) as u8, (y * 5) as u8, ((x + y) * 2) as u8, 255])
    });
    let before = canvas.clone();
    let rect = Rect::new(8, 6, 30, 20);
    desaturate_region(&mut canvas, rect);

    for (x, y, px) in canvas.enumerate_pixels() {
        let orig = before.get_pixel(x, y);
        if rect.contains_point(x, y) {
            let g = luminance(orig[0], orig[1], orig[2]);
            assert_eq!(px.0, [g, g, g, orig[3]], "at {x},{y}");
        } else {
            assert_eq!(px, orig, "outside pixel changed at {x},{y}");
        }
    }
}

#[test]
fn primaries_map_to_expected_grays() {
    let mut canvas = RgbaImage::new(3, 1);
    canvas.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
    canvas.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
    canvas.put_pixel(2, 0, Rgba([255, 255, 255, 255]));
    desaturate_region(&mut canvas, Rect::new(0, 0, 3, 1));
    assert_eq!(canvas.get_pixel(0, 0).0, [76, 76, 76, 255]);
    assert_eq!(canvas.get_pixel(1, 0).0, [150, 150, 150, 255]);
    assert_eq!(canvas.get_pixel(2, 0).0, [255, 255, 255, 255]);
}

#[test]
fn alpha_is_left_alone() {
    let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([200, 10, 10, 77]));
    desaturate_region(&mut canvas, Rect::new(0, 0, 4, 4));
    for px in canvas.pixels() {
        assert_eq!(px[3], 77);
    }
}

#[test]
fn rect_past_the_edge_is_clipped() {
    let mut canvas = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
    desaturate_region(&mut canvas, Rect::new(5, 5, 100, 100));
    assert_eq!(canvas.get_pixel(9, 9).0, [76, 76, 76, 255]);
    assert_eq!(canvas.get_pixel(4, 4).0, [255, 0, 0, 255]);
}
