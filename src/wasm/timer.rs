use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::Window;

use crate::debounce::Debouncer;

struct Pending<A> {
    window: Window,
    debouncer: Debouncer<A>,
    /// Generation the live `setTimeout` was armed for.
    armed: Option<u64>,
    handle: Option<i32>,
}

impl<A> Drop for Pending<A> {
    fn drop(&mut self) {
        // The firing closure is freed with the last timer handle, so the
        // browser must not call it afterwards.
        if let Some(handle) = self.handle.take() {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

/// `setTimeout`-backed trailing debounce. Each call cancels the previous
/// timer; the callback runs once per quiet period with the newest arguments.
///
/// One firing closure is created per timer and reused for every
/// `setTimeout`, so cancelled timers leave nothing behind.
pub struct DebouncedTimer<A: 'static> {
    delay_ms: i32,
    pending: Rc<RefCell<Pending<A>>>,
    fire: Rc<Closure<dyn FnMut()>>,
}

impl<A: 'static> Clone for DebouncedTimer<A> {
    fn clone(&self) -> Self {
        Self {
            delay_ms: self.delay_ms,
            pending: Rc::clone(&self.pending),
            fire: Rc::clone(&self.fire),
        }
    }
}

impl<A: 'static> DebouncedTimer<A> {
    pub fn new(window: Window, delay_ms: i32, callback: impl Fn(A) + 'static) -> Self {
        let pending = Rc::new(RefCell::new(Pending {
            window,
            debouncer: Debouncer::new(),
            armed: None,
            handle: None,
        }));

        let fired = Rc::downgrade(&pending);
        let fire = Closure::wrap(Box::new(move || {
            let Some(pending) = fired.upgrade() else {
                return;
            };
            let args = {
                let mut pending = pending.borrow_mut();
                pending.handle = None;
                match pending.armed.take() {
                    Some(generation) => pending.debouncer.fire(generation),
                    None => None,
                }
            };
            if let Some(args) = args {
                callback(args);
            }
        }) as Box<dyn FnMut()>);

        Self {
            delay_ms,
            pending,
            fire: Rc::new(fire),
        }
    }

    pub fn call(&self, args: A) {
        let mut pending = self.pending.borrow_mut();
        let generation = pending.debouncer.call(args);
        pending.armed = Some(generation);
        if let Some(handle) = pending.handle.take() {
            pending.window.clear_timeout_with_handle(handle);
        }

        let callback: &Closure<dyn FnMut()> = &self.fire;
        match pending
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.as_ref().unchecked_ref(), self.delay_ms)
        {
            Ok(handle) => pending.handle = Some(handle),
            Err(e) => log::error!("setTimeout failed: {:?}", e),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.borrow().handle.is_some()
    }
}
