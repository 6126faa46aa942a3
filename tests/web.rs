// Browser smoke tests, run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use neon_deck::audio::{AudioCue, AudioSink, HtmlAudioSink};
use neon_deck::engine::Surface;
use neon_deck::web::CanvasSurface;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window().and_then(|w| w.document()).expect("document")
}

#[wasm_bindgen_test]
fn canvas_surface_draws_without_throwing() {
    let doc = document();
    let canvas: web_sys::HtmlCanvasElement = doc.create_element("canvas").unwrap().dyn_into().unwrap();
    canvas.set_id("animationCanvas");
    doc.body().unwrap().append_child(&canvas).unwrap();

    let mut surface = CanvasSurface::find(&doc, "animationCanvas").expect("canvas surface");
    surface.clear(300.0, 130.0);
    surface.fill_circle(10.0, 10.0, 4.0, "hsl(120,30%,75%)", 0.5);
    surface.stroke_line(0.0, 0.0, 50.0, 50.0, 2.0, "#fff");
    surface.fill_text("ア", 14.0, 20.0, "#0f0", "14px monospace");
    canvas.remove();
}

#[wasm_bindgen_test]
fn missing_canvas_is_reported() {
    assert!(CanvasSurface::find(&document(), "no-such-canvas").is_err());
}

#[wasm_bindgen_test]
fn site_starts_on_a_bare_page() {
    // No terminal, canvas or overlays: everything optional is skipped.
    neon_deck::start_site().expect("start_site");
}

#[wasm_bindgen_test]
async fn rejected_playback_is_swallowed() {
    let doc = document();
    let audio: web_sys::HtmlAudioElement = doc.create_element("audio").unwrap().dyn_into().unwrap();
    audio.set_id("secretSound");
    audio.set_src("data:audio/wav;base64,AAAA");
    doc.body().unwrap().append_child(&audio).unwrap();

    let mut sink = HtmlAudioSink::new(doc);
    // Decode fails asynchronously; the call itself still succeeds.
    assert!(sink.play(AudioCue::Secret).is_ok());
    let tick = js_sys::Promise::resolve(&wasm_bindgen::JsValue::NULL);
    wasm_bindgen_futures::JsFuture::from(tick).await.unwrap();
    audio.remove();
}

#[wasm_bindgen_test]
fn theme_icon_follows_the_toggle() {
    let doc = document();
    let button = doc.create_element("button").unwrap();
    button.set_id("theme-toggle");
    let icon = doc.create_element("div").unwrap();
    icon.set_class_name("fa-moon");
    button.append_child(&icon).unwrap();
    doc.body().unwrap().append_child(&button).unwrap();

    let found = doc.query_selector(neon_deck::prefs::Theme::ICON_SELECTOR).unwrap();
    assert_eq!(found.as_ref(), Some(&icon));
    button.remove();
}
