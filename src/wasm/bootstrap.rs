//! Load-time sequencing and page-wide affordances.

use std::cell::RefCell;
use std::rc::Rc;

use web_sys::Event;

use super::background::ParticleRenderer;
use super::timer::DebouncedTimer;
use super::{dom, PageContext};
use crate::device::Environment;
use crate::error::Result;

const SKIP_LINK_CLASS: &str = "skip-link";

/// Hides the loading screen and marks the body once everything has loaded.
pub fn on_load(ctx: &Rc<PageContext>) -> Result<()> {
    if ctx.document.ready_state() == "complete" {
        loaded(ctx);
        return Ok(());
    }
    let ready = Rc::clone(ctx);
    dom::listen(&ctx.window, "load", move |_: Event| loaded(&ready))
}

fn loaded(ctx: &PageContext) {
    if let Some(screen) = dom::by_id(&ctx.document, ctx.config.loading_screen_id) {
        dom::set_class(&screen, "hidden", true);
    }
    dom::set_class(&ctx.body, "loaded", true);

    #[cfg(feature = "analytics")]
    record_page_view(ctx);
    #[cfg(feature = "service-worker")]
    register_service_worker(ctx);
}

/// Puts a "skip to content" link first in the tab order, once.
pub fn insert_skip_link(ctx: &PageContext) -> Result<()> {
    let selector = format!(".{SKIP_LINK_CLASS}");
    if dom::query(&ctx.document, &selector).is_some() {
        return Ok(());
    }
    let link = ctx.document.create_element("a")?;
    link.set_attribute("href", ctx.config.skip_target)?;
    link.set_class_name(SKIP_LINK_CLASS);
    link.set_text_content(Some("Skip to main content"));
    let first = ctx.body.first_child();
    ctx.body.insert_before(&link, first.as_ref())?;
    Ok(())
}

/// Cheaper visuals for weak devices: faster CSS animations, no backdrop blur.
pub fn apply_low_end(ctx: &PageContext) {
    log::info!("low-end device, reducing visual effects");
    if let Some(root) = ctx.document.document_element().and_then(dom::html) {
        dom::set_style(&root, "--animation-duration", ctx.config.low_end_animation_duration);
    }
    for card in dom::query_all(&ctx.document, ctx.config.card_selector) {
        if let Some(card) = dom::html(card) {
            dom::set_style(&card, "backdrop-filter", "none");
            dom::set_style(&card, "-webkit-backdrop-filter", "none");
        }
    }
    dom::set_class(&ctx.body, "low-end", true);
}

/// Debounced viewport refresh: resizes the particle canvas and re-tags the
/// body with the current device tier.
pub fn watch_resize(
    ctx: &Rc<PageContext>,
    renderer: Option<Rc<RefCell<ParticleRenderer>>>,
) -> Result<()> {
    let body = ctx.body.clone();
    let timer = DebouncedTimer::new(
        ctx.window.clone(),
        ctx.config.resize_debounce_ms,
        move |env: Environment| {
            if let Some(renderer) = &renderer {
                renderer.borrow_mut().resize(&env);
            }
            dom::set_class(&body, "is-mobile", env.is_mobile());
        },
    );
    dom::set_class(&ctx.body, "is-mobile", ctx.environment().is_mobile());

    for event in ["resize", "orientationchange"] {
        let ctx_for_event = Rc::clone(ctx);
        let timer = timer.clone();
        dom::listen(&ctx.window, event, move |_: Event| {
            timer.call(ctx_for_event.environment())
        })?;
    }
    Ok(())
}

/// Tags the body with `no-webgl` when a rendering error reaches `window`.
#[cfg(feature = "webgl-fallback")]
pub fn watch_render_errors(ctx: &Rc<PageContext>) -> Result<()> {
    listen_render_errors(&ctx.window, ctx.body.clone())
}

/// `error` listener on `target` that marks `body` for render failures and
/// ignores everything else.
#[cfg(feature = "webgl-fallback")]
pub fn listen_render_errors(target: &web_sys::EventTarget, body: web_sys::HtmlElement) -> Result<()> {
    dom::listen(target, "error", move |event: web_sys::ErrorEvent| {
        let message = event.message();
        if crate::particles::is_render_error(&message) {
            log::warn!("rendering error, falling back: {message}");
            dom::set_class(&body, "no-webgl", true);
        }
    })
}

#[cfg(feature = "analytics")]
fn record_page_view(ctx: &PageContext) {
    let path = ctx.window.location().pathname().unwrap_or_default();
    log::debug!("page view {path}");
}

#[cfg(feature = "service-worker")]
fn register_service_worker(ctx: &PageContext) {
    let promise = ctx.window.navigator().service_worker().register("/sw.js");
    wasm_bindgen_futures::spawn_local(async move {
        match wasm_bindgen_futures::JsFuture::from(promise).await {
            Ok(_) => log::info!("service worker registered"),
            Err(e) => log::warn!("service worker registration failed: {:?}", e),
        }
    });
}

