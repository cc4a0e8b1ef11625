use super::*;

use std::io::Cursor;

fn png_of(pixels: &[[u8; 4]], width: u32, height: u32) -> Vec<u8> {
    let mut img = image::RgbaImage::new(width, height);
    for (i, px) in pixels.iter().enumerate() {
        let x = i as u32 % width;
        let y = i as u32 / width;
        img.put_pixel(x, y, image::Rgba(*px));
    }
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

#[test]
fn decode_premultiplies_alpha() {
    let bytes = png_of(
        &[
            [255, 0, 0, 255],
            [255, 0, 0, 128],
            [0, 200, 0, 0],
            [10, 20, 30, 51],
        ],
        2,
        2,
    );
    let surface = decode_image(&bytes).unwrap();

    assert_eq!(surface.width(), 2);
    assert_eq!(surface.height(), 2);
    // Opaque pixels pass through.
    assert_eq!(surface.pixel(0, 0).unwrap(), [255, 0, 0, 255]);
    // Half-transparent red: color scaled by alpha, rounded.
    assert_eq!(surface.pixel(1, 0).unwrap(), [128, 0, 0, 128]);
    // Fully transparent collapses to zero regardless of color.
    assert_eq!(surface.pixel(0, 1).unwrap(), [0, 0, 0, 0]);
    // a = 51 is exactly 1/5: components divide cleanly.
    assert_eq!(surface.pixel(1, 1).unwrap(), [2, 4, 6, 51]);
}

#[test]
fn decode_rejects_garbage() {
    assert!(decode_image(b"definitely not an image").is_err());
}

#[test]
fn load_reports_the_missing_path() {
    let err = load_image(std::path::Path::new("/nonexistent/overlay.png")).unwrap_err();
    assert!(err.to_string().contains("overlay.png"));
}
