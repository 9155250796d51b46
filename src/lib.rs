//! Interactive layer for the portfolio page: particle background, mobile
//! menu, anchor scrolling, reveal-on-scroll, lazy images and the
//! certificate viewer.
//!
//! The page decisions live in target-independent modules so they can be
//! tested on the host; the `wasm` module binds them to the DOM.

pub mod config;
pub mod debounce;
pub mod device;
pub mod error;
pub mod modal;
pub mod nav;
pub mod particles;
pub mod reveal;
pub mod scroll;

pub use config::PageConfig;
pub use error::{PageError, Result};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;

    use crate::config::PageConfig;

    pub mod background;
    pub mod bootstrap;
    pub mod context;
    pub mod dom;
    pub mod modal;
    pub mod nav;
    pub mod scroll;
    pub mod timer;

    pub use background::BackgroundHandle;
    pub use context::PageContext;

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let level = if cfg!(debug_assertions) {
            log::Level::Debug
        } else {
            log::Level::Info
        };
        console_log::init_with_level(level).ok();

        let ctx = PageContext::from_window(PageConfig::default())?;
        if ctx.document.ready_state() == "loading" {
            let ready = Rc::clone(&ctx);
            dom::listen(&ctx.document, "DOMContentLoaded", move |_: web_sys::Event| {
                init(&ready)
            })?;
        } else {
            init(&ctx);
        }
        Ok(())
    }

    /// Wires every controller. Features whose markup is missing are skipped;
    /// nothing here aborts the rest of the page.
    fn init(ctx: &Rc<PageContext>) {
        let env = ctx.environment();
        log::debug!("wiring page, viewport {}x{}", env.width, env.height);

        if let Err(e) = bootstrap::insert_skip_link(ctx) {
            log::error!("skip link: {e}");
        }
        if env.is_low_end() {
            bootstrap::apply_low_end(ctx);
        }
        #[cfg(feature = "webgl-fallback")]
        if let Err(e) = bootstrap::watch_render_errors(ctx) {
            log::error!("render error watcher: {e}");
        }
        if let Err(e) = bootstrap::on_load(ctx) {
            log::error!("load handler: {e}");
        }

        let renderer = match background::start(ctx, &env) {
            Ok(handle) => {
                let renderer = handle.renderer();
                background::install(handle);
                Some(renderer)
            }
            Err(e) => {
                log::warn!("particle background disabled: {e}");
                None
            }
        };
        if let Err(e) = bootstrap::watch_resize(ctx, renderer) {
            log::error!("resize handler: {e}");
        }

        if let Err(e) = nav::NavController::wire(ctx) {
            log::error!("navigation: {e}");
        }
        if let Err(e) = modal::ModalController::wire(ctx) {
            log::error!("certificate modal: {e}");
        }
        if let Err(e) = scroll::wire_anchors(ctx) {
            log::error!("anchor scrolling: {e}");
        }
        if let Err(e) = scroll::observe_reveals(ctx) {
            log::error!("section reveal: {e}");
        }
        if let Err(e) = scroll::observe_lazy_images(ctx) {
            log::error!("lazy images: {e}");
        }
    }
}
