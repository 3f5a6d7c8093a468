//! Shared hover slot: one per page, written by nav items, read by the cursor follower.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec as AllocVec;
use core::cell::RefCell;

use crate::float::Float;
use crate::vec::Vec2;

/// What is currently hovered. `label` and `target` are cleared on leave.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HoverState<F: Float> {
    pub hovered: bool,
    pub label: Option<String>,
    /// Center of the hovered element, in viewport pixels.
    pub target: Option<Vec2<F>>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Listener<F> = Rc<dyn Fn(&HoverState<F>)>;

struct Inner<F: Float> {
    state: HoverState<F>,
    listeners: AllocVec<(SubscriptionId, Listener<F>)>,
    next_id: u64,
}

/// Cloneable handle to the shared hover state.
///
/// Listeners run synchronously inside `set_hovered`, after the slot's own
/// borrow is released, so a listener may read the slot or even set it again.
pub struct HoverSlot<F: Float> {
    inner: Rc<RefCell<Inner<F>>>,
}

impl<F: Float> Clone for HoverSlot<F> {
    fn clone(&self) -> Self {
        HoverSlot { inner: Rc::clone(&self.inner) }
    }
}

impl<F: Float> Default for HoverSlot<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> HoverSlot<F> {
    pub fn new() -> Self {
        HoverSlot {
            inner: Rc::new(RefCell::new(Inner {
                state: HoverState::default(),
                listeners: AllocVec::new(),
                next_id: 0,
            })),
        }
    }

    pub fn get(&self) -> HoverState<F> {
        self.inner.borrow().state.clone()
    }

    pub fn is_hovered(&self) -> bool {
        self.inner.borrow().state.hovered
    }

    /// Updates the slot and notifies listeners if anything changed.
    pub fn set_hovered(&self, hovered: bool, label: Option<&str>, target: Option<Vec2<F>>) {
        let next = if hovered {
            HoverState {
                hovered,
                label: label.map(String::from),
                target,
            }
        } else {
            HoverState::default()
        };

        let (state, listeners) = {
            let mut inner = self.inner.borrow_mut();
            if inner.state == next {
                return;
            }
            inner.state = next;
            let listeners: AllocVec<Listener<F>> =
                inner.listeners.iter().map(|(_, l)| Rc::clone(l)).collect();
            (inner.state.clone(), listeners)
        };
        tracing::trace!(hovered = state.hovered, listeners = listeners.len(), "hover changed");
        for listener in listeners {
            listener(&state);
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&HoverState<F>) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.listeners.push((id, Rc::new(listener)));
        id
    }

    /// Removes one listener by identity. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|(sid, _)| *sid != id);
        inner.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}
