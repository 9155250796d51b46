use std::cell::RefCell;
use std::rc::Rc;

use web_sys::{Element, Event};

use super::context::{PageContext, ScrollLock};
use super::dom;
use crate::error::Result;
use crate::nav::{MenuState, NavEvent};

pub struct NavController {
    ctx: Rc<PageContext>,
    toggle: Element,
    menu: Element,
    state: RefCell<MenuState>,
}

impl NavController {
    /// Wires the mobile menu. Returns `Ok(None)` when the page has no menu.
    pub fn wire(ctx: &Rc<PageContext>) -> Result<Option<Rc<Self>>> {
        let config = &ctx.config.nav;
        let (Some(toggle), Some(menu)) = (
            dom::query(&ctx.document, config.toggle),
            dom::query(&ctx.document, config.menu),
        ) else {
            log::info!("no navigation menu, skipping");
            return Ok(None);
        };

        let controller = Rc::new(Self {
            ctx: Rc::clone(ctx),
            toggle,
            menu,
            state: RefCell::new(MenuState::default()),
        });
        controller.apply(false);

        let this = Rc::clone(&controller);
        dom::listen(&controller.toggle, "click", move |event: Event| {
            // Keep the document handler from reading this as an outside click.
            event.stop_propagation();
            this.dispatch(NavEvent::Toggle);
        })?;

        for link in dom::query_all(&ctx.document, config.links) {
            let this = Rc::clone(&controller);
            dom::listen(&link, "click", move |_: Event| this.dispatch(NavEvent::LinkClicked))?;
        }

        let this = Rc::clone(&controller);
        dom::listen(&ctx.document, "click", move |event: Event| {
            if !this.is_open() {
                return;
            }
            let inside = dom::event_node(&event).is_some_and(|node| {
                this.menu.contains(Some(&node)) || this.toggle.contains(Some(&node))
            });
            if !inside {
                this.dispatch(NavEvent::OutsideClick);
            }
        })?;

        log::debug!("navigation wired");
        Ok(Some(controller))
    }

    pub fn is_open(&self) -> bool {
        self.state.borrow().is_open()
    }

    pub fn dispatch(&self, event: NavEvent) {
        let changed = self.state.borrow_mut().handle(event);
        if let Some(open) = changed {
            self.apply(open);
        }
    }

    fn apply(&self, open: bool) {
        let class = self.ctx.config.nav.open_class;
        dom::set_class(&self.menu, class, open);
        dom::set_class(&self.toggle, class, open);
        if let Err(e) = self
            .toggle
            .set_attribute("aria-expanded", if open { "true" } else { "false" })
        {
            log::error!("aria-expanded: {:?}", e);
        }
        self.ctx.set_scroll_locked(ScrollLock::Menu, open);
    }
}
