use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlElement, HtmlImageElement, KeyboardEvent};

use super::context::{PageContext, ScrollLock};
use super::dom;
use crate::error::{PageError, Result};
use crate::modal::{ModalEffect, ModalState};

/// Image overlay for certificates.
pub struct ModalController {
    ctx: Rc<PageContext>,
    modal: HtmlElement,
    image: HtmlImageElement,
    close: HtmlElement,
    state: RefCell<ModalState>,
    opener: RefCell<Option<HtmlElement>>,
}

impl ModalController {
    /// Wires the viewer. Returns `Ok(None)` when the page has no modal.
    pub fn wire(ctx: &Rc<PageContext>) -> Result<Option<Rc<Self>>> {
        let config = &ctx.config.modal;
        let Some(modal) = dom::by_id(&ctx.document, config.modal_id).and_then(dom::html) else {
            log::info!("no certificate modal, skipping");
            return Ok(None);
        };
        let image = dom::by_id(&ctx.document, config.image_id)
            .and_then(|el| el.dyn_into::<HtmlImageElement>().ok())
            .ok_or_else(|| PageError::MissingElement(format!("img#{}", config.image_id)))?;
        let close = dom::query(&ctx.document, config.close)
            .and_then(dom::html)
            .ok_or_else(|| PageError::MissingElement(config.close.into()))?;

        let controller = Rc::new(Self {
            ctx: Rc::clone(ctx),
            modal,
            image,
            close,
            state: RefCell::new(ModalState::default()),
            opener: RefCell::new(None),
        });

        for trigger in dom::query_all(&ctx.document, config.triggers) {
            let Some(trigger) = dom::html(trigger) else {
                continue;
            };
            let this = Rc::clone(&controller);
            let opener = trigger.clone();
            dom::listen(&trigger, "click", move |event: Event| {
                event.prevent_default();
                let source = opener.get_attribute(this.ctx.config.modal.source_attr);
                this.open(source.as_deref(), Some(opener.clone()));
            })?;
        }

        let this = Rc::clone(&controller);
        dom::listen(&controller.close, "click", move |_: Event| this.close())?;

        // Clicks on the dimmed backdrop land on the modal element itself.
        let this = Rc::clone(&controller);
        dom::listen(&ctx.window, "click", move |event: Event| {
            let modal: &web_sys::Node = &this.modal;
            let on_backdrop =
                dom::event_node(&event).is_some_and(|node| node.is_same_node(Some(modal)));
            if on_backdrop {
                this.close();
            }
        })?;

        let this = Rc::clone(&controller);
        dom::listen(&ctx.document, "keydown", move |event: KeyboardEvent| {
            let effect = this.state.borrow_mut().on_key(&event.key());
            if let Some(effect) = effect {
                this.apply(effect);
            }
        })?;

        log::debug!("certificate modal wired");
        Ok(Some(controller))
    }

    pub fn is_open(&self) -> bool {
        self.state.borrow().is_open()
    }

    pub fn open(&self, source: Option<&str>, opener: Option<HtmlElement>) {
        let effect = self.state.borrow_mut().open(source);
        if let Some(effect) = effect {
            *self.opener.borrow_mut() = opener;
            self.apply(effect);
        }
    }

    pub fn close(&self) {
        let effect = self.state.borrow_mut().close();
        if let Some(effect) = effect {
            self.apply(effect);
        }
    }

    fn apply(&self, effect: ModalEffect) {
        let class = self.ctx.config.modal.open_class;
        match effect {
            ModalEffect::Show { source } => {
                self.image.set_src(&source);
                dom::set_style(&self.modal, "display", "block");
                dom::set_class(&self.modal, class, true);
                self.set_hidden(false);
                self.ctx.set_scroll_locked(ScrollLock::Modal, true);
                if let Err(e) = self.close.focus() {
                    log::warn!("focus close control: {:?}", e);
                }
            }
            ModalEffect::Hide => {
                dom::set_style(&self.modal, "display", "none");
                dom::set_class(&self.modal, class, false);
                self.set_hidden(true);
                self.ctx.set_scroll_locked(ScrollLock::Modal, false);
                if let Some(opener) = self.opener.borrow_mut().take() {
                    opener.focus().ok();
                }
            }
        }
    }

    fn set_hidden(&self, hidden: bool) {
        let value = if hidden { "true" } else { "false" };
        if let Err(e) = self.modal.set_attribute("aria-hidden", value) {
            log::error!("aria-hidden: {:?}", e);
        }
    }
}
