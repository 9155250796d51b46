#![cfg(target_arch = "wasm32")]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Event, EventInit, HtmlElement, KeyboardEvent, KeyboardEventInit};

use folio_wasm::config::PageConfig;
use folio_wasm::wasm::background::{self, FrameLoop, LoopState};
use folio_wasm::wasm::modal::ModalController;
use folio_wasm::wasm::nav::NavController;
use folio_wasm::wasm::timer::DebouncedTimer;
use folio_wasm::wasm::{bootstrap, scroll, PageContext};

wasm_bindgen_test_configure!(run_in_browser);

const FIXTURE: &str = "data-fixture";

/// Fresh fixture container standing in for `<body>`.
///
/// Listeners wired by earlier tests stay registered on `document` and
/// `window`, but their context points at that test's container, which is
/// detached here, so their class and overflow writes never reach this one.
fn page(markup: &str) -> Rc<PageContext> {
    let window = web_sys::window().unwrap();
    let document = window.document().unwrap();
    let stale = document.query_selector_all(&format!("[{FIXTURE}]")).unwrap();
    for i in 0..stale.length() {
        if let Some(node) = stale.get(i) {
            node.dyn_into::<web_sys::Element>().unwrap().remove();
        }
    }

    let container: HtmlElement = document.create_element("div").unwrap().dyn_into().unwrap();
    container.set_attribute(FIXTURE, "").unwrap();
    container.set_inner_html(markup);
    let body = document.body().unwrap();
    body.insert_before(&container, body.first_child().as_ref()).unwrap();
    window.scroll_to_with_x_and_y(0.0, 0.0);

    PageContext::with_body(window, container, PageConfig::default()).unwrap()
}

fn element(ctx: &PageContext, selector: &str) -> HtmlElement {
    ctx.document
        .query_selector(selector)
        .unwrap()
        .expect("fixture element")
        .dyn_into::<HtmlElement>()
        .unwrap()
}

fn overflow(ctx: &PageContext) -> String {
    ctx.body.style().get_property_value("overflow").unwrap()
}

fn press(ctx: &PageContext, key: &str) {
    let init = KeyboardEventInit::new();
    init.set_key(key);
    init.set_bubbles(true);
    let event = KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap();
    ctx.document.dispatch_event(&event).unwrap();
}

const NAV: &str = r##"
    <button class="menu-toggle">menu</button>
    <nav class="nav-menu"><a class="nav-link" href="#x">x</a></nav>
    <p id="outside">outside</p>
"##;

#[wasm_bindgen_test]
fn menu_toggles_and_closes_on_outside_click() {
    let ctx = page(NAV);
    let nav = NavController::wire(&ctx).unwrap().expect("menu wired");
    let toggle = element(&ctx, ".menu-toggle");
    let menu = element(&ctx, ".nav-menu");

    toggle.click();
    assert!(nav.is_open());
    assert!(menu.class_list().contains("active"));
    assert_eq!(toggle.get_attribute("aria-expanded").as_deref(), Some("true"));
    assert_eq!(overflow(&ctx), "hidden");

    element(&ctx, "#outside").click();
    assert!(!nav.is_open());
    assert!(!menu.class_list().contains("active"));
    assert_eq!(overflow(&ctx), "");

    // Outside click while closed changes nothing.
    element(&ctx, "#outside").click();
    assert!(!nav.is_open());
}

#[wasm_bindgen_test]
fn menu_closes_on_link_click() {
    let ctx = page(NAV);
    let nav = NavController::wire(&ctx).unwrap().expect("menu wired");
    element(&ctx, ".menu-toggle").click();
    element(&ctx, ".nav-link").click();
    assert!(!nav.is_open());
    assert!(!element(&ctx, ".menu-toggle").class_list().contains("active"));
}

#[wasm_bindgen_test]
fn missing_menu_is_skipped() {
    let ctx = page("<p>no menu here</p>");
    assert!(NavController::wire(&ctx).unwrap().is_none());
}

const MODAL: &str = r##"
    <a href="#" class="view-certificate" data-certificate="/c1.png">view</a>
    <div id="certificate-modal" style="display: none">
        <button class="close-modal">close</button>
        <img id="certificate-image">
    </div>
"##;

#[wasm_bindgen_test]
fn certificate_opens_with_focus_and_scroll_lock() {
    let ctx = page(MODAL);
    let modal = ModalController::wire(&ctx).unwrap().expect("modal wired");

    element(&ctx, ".view-certificate").click();
    assert!(modal.is_open());
    let overlay = element(&ctx, "#certificate-modal");
    assert_eq!(overlay.style().get_property_value("display").unwrap(), "block");
    assert_eq!(
        element(&ctx, "#certificate-image").get_attribute("src").as_deref(),
        Some("/c1.png")
    );
    let focused = ctx.document.active_element().expect("focused element");
    assert!(focused.class_list().contains("close-modal"));
    assert_eq!(overflow(&ctx), "hidden");
}

#[wasm_bindgen_test]
fn escape_closes_once() {
    let ctx = page(MODAL);
    let modal = ModalController::wire(&ctx).unwrap().expect("modal wired");
    element(&ctx, ".view-certificate").click();

    press(&ctx, "Escape");
    assert!(!modal.is_open());
    assert_eq!(overflow(&ctx), "");
    let overlay = element(&ctx, "#certificate-modal");
    assert_eq!(overlay.style().get_property_value("display").unwrap(), "none");

    press(&ctx, "Escape");
    assert!(!modal.is_open());
    assert_eq!(overflow(&ctx), "");
}

#[wasm_bindgen_test]
fn backdrop_click_closes_but_content_click_does_not() {
    let ctx = page(MODAL);
    let modal = ModalController::wire(&ctx).unwrap().expect("modal wired");
    element(&ctx, ".view-certificate").click();

    element(&ctx, "#certificate-image").click();
    assert!(modal.is_open());
    element(&ctx, "#certificate-modal").click();
    assert!(!modal.is_open());

    // Closing again through the button is a no-op.
    element(&ctx, ".close-modal").click();
    assert!(!modal.is_open());
}

#[wasm_bindgen_test]
fn anchors_only_intercept_resolvable_targets() {
    let ctx = page(
        r##"
        <a id="to-about" href="#about">about</a>
        <a id="to-nowhere" href="#nowhere">nowhere</a>
        <section id="about">about</section>
    "##,
    );
    assert_eq!(scroll::wire_anchors(&ctx).unwrap(), 2);

    let click = || {
        let init = EventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        Event::new_with_event_init_dict("click", &init).unwrap()
    };
    // `dispatch_event` returns false once a listener prevented the default.
    assert!(!element(&ctx, "#to-about").dispatch_event(&click()).unwrap());
    assert!(element(&ctx, "#to-nowhere").dispatch_event(&click()).unwrap());
}

#[wasm_bindgen_test]
fn skip_link_is_inserted_once() {
    let ctx = page("<main id=\"main\"></main>");
    bootstrap::insert_skip_link(&ctx).unwrap();
    bootstrap::insert_skip_link(&ctx).unwrap();
    let links = ctx.document.query_selector_all(".skip-link").unwrap();
    assert_eq!(links.length(), 1);
    let first = ctx.body.first_element_child().unwrap();
    assert_eq!(first.get_attribute("href").as_deref(), Some("#main"));
}

#[wasm_bindgen_test]
fn low_end_strips_card_blur() {
    let ctx = page(r#"<div class="card" style="backdrop-filter: blur(4px)"></div>"#);
    bootstrap::apply_low_end(&ctx);
    let card = element(&ctx, ".card");
    assert_eq!(card.style().get_property_value("backdrop-filter").unwrap(), "none");
    assert!(ctx.body.class_list().contains("low-end"));
}

async fn sleep(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

#[wasm_bindgen_test(async)]
async fn resize_burst_runs_once_with_last_value() {
    let runs = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&runs);
    let timer = DebouncedTimer::new(web_sys::window().unwrap(), 250, move |width: u32| {
        seen.borrow_mut().push(width)
    });

    for width in [800, 700, 600, 500] {
        timer.call(width);
        sleep(20).await;
    }
    sleep(400).await;
    assert_eq!(*runs.borrow(), vec![500]);
}

#[wasm_bindgen_test(async)]
async fn dropped_timer_never_fires() {
    let runs = Rc::new(Cell::new(0));
    let seen = Rc::clone(&runs);
    let timer = DebouncedTimer::new(web_sys::window().unwrap(), 50, move |_: ()| {
        seen.set(seen.get() + 1)
    });
    timer.call(());
    assert!(timer.is_pending());
    drop(timer);

    sleep(200).await;
    assert_eq!(runs.get(), 0);
}

#[wasm_bindgen_test(async)]
async fn timer_fires_again_after_quiet_period() {
    let runs = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&runs);
    let timer = DebouncedTimer::new(web_sys::window().unwrap(), 30, move |n: u32| {
        seen.borrow_mut().push(n)
    });

    timer.call(1);
    sleep(120).await;
    assert!(!timer.is_pending());
    timer.call(2);
    sleep(120).await;
    assert_eq!(*runs.borrow(), vec![1, 2]);
}

#[wasm_bindgen_test(async)]
async fn section_in_view_is_revealed() {
    let ctx = page(r#"<section id="about" style="height: 200px">about</section>"#);
    let observer = scroll::observe_reveals(&ctx).unwrap();
    assert!(observer.is_some());

    sleep(200).await;
    assert!(element(&ctx, "#about").class_list().contains("visible"));
}

#[wasm_bindgen_test]
fn nothing_to_reveal_is_skipped() {
    let ctx = page("<div>plain</div>");
    // Earlier fixtures are gone, so the selectors match nothing.
    assert!(scroll::observe_reveals(&ctx).unwrap().is_none());
    assert!(scroll::observe_lazy_images(&ctx).unwrap().is_none());
}

const PIXEL: &str = "data:image/gif;base64,R0lGODlhAQABAAAAACH5BAEKAAEALAAAAAABAAEAAAICTAEAOw==";

#[wasm_bindgen_test(async)]
async fn lazy_image_loads_once() {
    let ctx = page(&format!(
        r#"<img id="shot" data-src="{PIXEL}" style="display: block; width: 10px; height: 10px">"#
    ));
    scroll::observe_lazy_images(&ctx).unwrap().expect("images observed");

    sleep(200).await;
    let image = element(&ctx, "#shot");
    assert_eq!(image.get_attribute("src").as_deref(), Some(PIXEL));
    assert!(!image.has_attribute("data-src"));
    assert!(image.class_list().contains("visible"));

    // Once loaded the image is no longer watched: leaving and re-entering
    // the viewport with a fresh `data-src` changes nothing.
    image.class_list().remove_1("visible").unwrap();
    image.set_attribute("data-src", "/other.png").unwrap();
    image.style().set_property("display", "none").unwrap();
    sleep(100).await;
    image.style().set_property("display", "block").unwrap();
    sleep(200).await;
    assert_eq!(image.get_attribute("src").as_deref(), Some(PIXEL));
    assert!(!image.class_list().contains("visible"));
}

async fn frame_count_after(frames: &Cell<u32>, ms: i32) -> u32 {
    sleep(ms).await;
    frames.get()
}

#[wasm_bindgen_test(async)]
async fn frame_loop_pause_resume_stop() {
    let frames = Rc::new(Cell::new(0u32));
    let counted = Rc::clone(&frames);
    let frame_loop = FrameLoop::start(web_sys::window().unwrap(), move || {
        counted.set(counted.get() + 1)
    })
    .unwrap();

    assert!(frame_count_after(&frames, 150).await > 0);

    frame_loop.pause();
    assert_eq!(frame_loop.state(), LoopState::Paused);
    let paused_at = frames.get();
    assert_eq!(frame_count_after(&frames, 150).await, paused_at);

    // The tab coming back does not undo an explicit pause.
    frame_loop.set_hidden(true);
    frame_loop.set_hidden(false);
    assert_eq!(frame_loop.state(), LoopState::Paused);
    assert_eq!(frame_count_after(&frames, 150).await, paused_at);

    frame_loop.resume();
    assert_eq!(frame_loop.state(), LoopState::Running);
    assert!(frame_count_after(&frames, 150).await > paused_at);

    // A hidden tab holds the loop even after an explicit resume.
    frame_loop.set_hidden(true);
    assert_eq!(frame_loop.state(), LoopState::Paused);
    frame_loop.set_hidden(false);
    assert_eq!(frame_loop.state(), LoopState::Running);

    frame_loop.stop();
    let stopped_at = frames.get();
    frame_loop.resume();
    assert_eq!(frame_loop.state(), LoopState::Stopped);
    assert_eq!(frame_count_after(&frames, 150).await, stopped_at);
}

#[wasm_bindgen_test(async)]
async fn background_handle_controls_the_loop() {
    let ctx = page(r#"<div id="background"></div>"#);
    let container = element(&ctx, "#background");
    let handle = match background::start(&ctx, &ctx.environment()) {
        Ok(handle) => handle,
        Err(_) => {
            // No WebGL2 in this browser: the canvas must not be left behind.
            assert!(container.query_selector("canvas").unwrap().is_none());
            return;
        }
    };
    assert!(container.query_selector("canvas").unwrap().is_some());
    assert!(handle.is_running());

    handle.pause();
    assert!(!handle.is_running());
    assert_eq!(handle.state(), LoopState::Paused);
    handle.resume();
    assert!(handle.is_running());

    handle.stop();
    handle.resume();
    assert_eq!(handle.state(), LoopState::Stopped);
    sleep(50).await;
    assert_eq!(handle.state(), LoopState::Stopped);
}

#[wasm_bindgen_test]
fn background_without_container_fails_cleanly() {
    let ctx = page("<div>no background</div>");
    assert!(background::start(&ctx, &ctx.environment()).is_err());
    assert!(ctx.body.query_selector("canvas").unwrap().is_none());
}

#[cfg(feature = "webgl-fallback")]
#[wasm_bindgen_test]
fn render_errors_mark_no_webgl() {
    use web_sys::{ErrorEvent, ErrorEventInit};

    let ctx = page("");
    let source = ctx.document.create_element("div").unwrap();
    bootstrap::listen_render_errors(&source, ctx.body.clone()).unwrap();
    let raise = |message: &str| {
        let init = ErrorEventInit::new();
        init.set_message(message);
        let event = ErrorEvent::new_with_event_init_dict("error", &init).unwrap();
        source.dispatch_event(&event).unwrap();
    };

    raise("TypeError: x is undefined");
    assert!(!ctx.body.class_list().contains("no-webgl"));
    raise("WebGL: CONTEXT_LOST_WEBGL: loseContext: context lost");
    assert!(ctx.body.class_list().contains("no-webgl"));
}

#[wasm_bindgen_test]
fn load_hides_loading_screen() {
    let ctx = page(r#"<div id="loading-screen"></div>"#);
    bootstrap::on_load(&ctx).unwrap();
    if ctx.document.ready_state() != "complete" {
        ctx.window.dispatch_event(&Event::new("load").unwrap()).unwrap();
    }
    assert!(element(&ctx, "#loading-screen").class_list().contains("hidden"));
    assert!(ctx.body.class_list().contains("loaded"));
}
