use std::io::Cursor;

use criterion::{criterion_group, criterion_main, Criterion};
use image::{ImageFormat, Rgba, RgbaImage};

use cardshot::compose::compose_html;
use cardshot::render::postprocess::normalize;
use cardshot::{RenderRequest, TextPlacement, AUTHORING_CANVAS, OUTPUT_SIZE};

fn bench_compose(c: &mut Criterion) {
    let request = RenderRequest {
        category_name: "TECH NEWS".into(),
        category_bg_color: "linear-gradient(135deg, #00D4FF 0%, #0077BE 100%)".into(),
        category_text_color: "#FFFFFF".into(),
        content: "<span class='highlight' data-text='CHATGPT'>CHATGPT</span> CHANGED EVERYTHING".into(),
        background_theme: "technology".into(),
        logo_url: None,
        show_logo: true,
        text_align: None,
    };
    let logo = format!("data:image/png;base64,{}", "A".repeat(16 * 1024));

    c.bench_function("compose_html", |b| {
        b.iter(|| compose_html(&request, "https://images.test/bg.jpg", Some(&logo), TextPlacement::Left))
    });
}

fn bench_normalize(c: &mut Criterion) {
    // full canvas with the transparent marker strip at the bottom
    let (w, h) = (AUTHORING_CANVAS.width, AUTHORING_CANVAS.height);
    let mut img = RgbaImage::from_pixel(w, h, Rgba([40, 80, 120, 255]));
    for y in h - 5..h {
        for x in 0..w {
            img.put_pixel(x, y, Rgba([0, 0, 0, 0]));
        }
    }
    let mut raw = Vec::new();
    img.write_to(&mut Cursor::new(&mut raw), ImageFormat::Png).unwrap();

    c.bench_function("normalize_capture", |b| b.iter(|| normalize(&raw, OUTPUT_SIZE).unwrap()));
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_compose, bench_normalize
}
criterion_main!(benches);
