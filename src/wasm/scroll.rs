use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    Element, Event, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    ScrollBehavior, ScrollToOptions,
};

use super::{dom, PageContext};
use crate::config::ObserverOptions;
use crate::error::Result;
use crate::reveal::{RevealAction, RevealKind, RevealTracker};
use crate::scroll::{anchor_target, scroll_destination};

const DEFERRED_SOURCE: &str = "data-src";

/// Smooth, header-aware scrolling for every in-page anchor.
pub fn wire_anchors(ctx: &Rc<PageContext>) -> Result<usize> {
    let anchors = dom::query_all(&ctx.document, r##"a[href^="#"]"##);
    for anchor in &anchors {
        let ctx = Rc::clone(ctx);
        let link = anchor.clone();
        dom::listen(anchor, "click", move |event: Event| {
            let Some(href) = link.get_attribute("href") else {
                return;
            };
            let Some(target) = anchor_target(&href).and_then(|id| dom::by_id(&ctx.document, id))
            else {
                return;
            };
            event.prevent_default();
            let top = scroll_destination(
                target.get_bounding_client_rect().top(),
                ctx.window.scroll_y().unwrap_or(0.0),
                ctx.config.header_offset,
            );
            let options = ScrollToOptions::new();
            options.set_top(top);
            options.set_behavior(ScrollBehavior::Smooth);
            ctx.window.scroll_to_with_scroll_to_options(&options);
        })?;
    }
    log::debug!("{} anchors wired", anchors.len());
    Ok(anchors.len())
}

/// Adds the visible class to sections the first time they scroll into view.
pub fn observe_reveals(ctx: &Rc<PageContext>) -> Result<Option<IntersectionObserver>> {
    observe(ctx, &ctx.config.reveal, RevealKind::Section)
}

/// Swaps `data-src` into `src` the first time an image nears the viewport.
pub fn observe_lazy_images(ctx: &Rc<PageContext>) -> Result<Option<IntersectionObserver>> {
    observe(ctx, &ctx.config.lazy_images, RevealKind::LazyImage)
}

fn observe(
    ctx: &Rc<PageContext>,
    options: &ObserverOptions,
    kind: RevealKind,
) -> Result<Option<IntersectionObserver>> {
    let elements = dom::query_all(&ctx.document, options.selector);
    if elements.is_empty() {
        log::info!("nothing matches `{}`, not observing", options.selector);
        return Ok(None);
    }

    let mut tracker = RevealTracker::new(kind);
    for _ in &elements {
        tracker.track();
    }
    let tracker = RefCell::new(tracker);
    let visible_class = ctx.config.visible_class;
    let observed = elements.clone();

    let callback = Closure::wrap(Box::new(move |entries: js_sys::Array, observer: IntersectionObserver| {
        for entry in entries.iter() {
            let entry: IntersectionObserverEntry = entry.unchecked_into();
            let target = entry.target();
            let node: &web_sys::Node = &target;
            let Some(id) = observed.iter().position(|el| el.is_same_node(Some(node))) else {
                continue;
            };
            let action = tracker.borrow_mut().observe(id, entry.is_intersecting());
            match action {
                Some(RevealAction::Reveal) => {}
                Some(RevealAction::LoadImage) => load_deferred(&target),
                None => continue,
            }
            dom::set_class(&target, visible_class, true);
            observer.unobserve(&target);
        }
    }) as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);

    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(options.threshold));
    init.set_root_margin(options.root_margin);
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
    callback.forget();

    for element in &elements {
        observer.observe(element);
    }
    log::debug!("observing {} `{}`", elements.len(), options.selector);
    Ok(Some(observer))
}

fn load_deferred(image: &Element) {
    let Some(source) = image.get_attribute(DEFERRED_SOURCE) else {
        return;
    };
    if let Err(e) = image.set_attribute("src", &source) {
        log::error!("lazy image {source}: {:?}", e);
        return;
    }
    image.remove_attribute(DEFERRED_SOURCE).ok();
}
