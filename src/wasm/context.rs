use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsValue;
use web_sys::{Document, HtmlElement, Window};

use crate::config::PageConfig;
use crate::device::Environment;
use crate::error::{PageError, Result};

/// Who is holding the page scroll lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollLock {
    Menu = 0b01,
    Modal = 0b10,
}

/// Handles shared by every controller, created once at start-up.
pub struct PageContext {
    pub window: Window,
    pub document: Document,
    pub body: HtmlElement,
    pub config: PageConfig,
    scroll_locks: Cell<u8>,
}

impl PageContext {
    pub fn new(window: Window, config: PageConfig) -> Result<Rc<Self>> {
        let document = window
            .document()
            .ok_or_else(|| PageError::MissingElement("document".into()))?;
        let body = document
            .body()
            .ok_or_else(|| PageError::MissingElement("body".into()))?;
        Self::with_body(window, body, config)
    }

    /// Context whose page-wide classes and scroll lock land on `body`
    /// instead of `document.body`.
    pub fn with_body(window: Window, body: HtmlElement, config: PageConfig) -> Result<Rc<Self>> {
        let document = window
            .document()
            .ok_or_else(|| PageError::MissingElement("document".into()))?;
        Ok(Rc::new(Self {
            window,
            document,
            body,
            config,
            scroll_locks: Cell::new(0),
        }))
    }

    pub fn from_window(config: PageConfig) -> Result<Rc<Self>> {
        let window = web_sys::window().ok_or_else(|| PageError::Js("no window".into()))?;
        Self::new(window, config)
    }

    /// Reads viewport size and hardware hints as they are right now.
    pub fn environment(&self) -> Environment {
        let dimension = |value: std::result::Result<JsValue, JsValue>| {
            value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
        };
        let navigator = self.window.navigator();
        let cores = navigator.hardware_concurrency();
        // `deviceMemory` is Chromium-only and has no typed binding.
        let memory = js_sys::Reflect::get(&navigator, &JsValue::from_str("deviceMemory"))
            .ok()
            .and_then(|v| v.as_f64());

        Environment {
            width: dimension(self.window.inner_width()),
            height: dimension(self.window.inner_height()),
            pixel_ratio: self.window.device_pixel_ratio(),
            user_agent: navigator.user_agent().unwrap_or_default(),
            hardware_concurrency: (cores > 0.0).then_some(cores as u32),
            device_memory_gib: memory,
        }
    }

    /// Page scrolling stays disabled while any holder has it locked.
    pub fn set_scroll_locked(&self, holder: ScrollLock, locked: bool) {
        let bits = if locked {
            self.scroll_locks.get() | holder as u8
        } else {
            self.scroll_locks.get() & !(holder as u8)
        };
        self.scroll_locks.set(bits);
        let style = self.body.style();
        let applied = if bits == 0 {
            style.remove_property("overflow").map(|_| ())
        } else {
            style.set_property("overflow", "hidden")
        };
        if let Err(e) = applied {
            log::error!("scroll lock: {:?}", e);
        }
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_locks.get() != 0
    }
}
