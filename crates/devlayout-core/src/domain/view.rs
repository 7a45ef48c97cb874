//! A positioned panel of elements within a device layout.
//!
//! A [`DeviceView`] owns an ordered list of [`Element`]s plus presentation
//! attributes for its background image.  Views are always handled through an
//! `Arc` so that listeners and the owning layout can hold on to them.
//!
//! # Locking
//!
//! Each view guards its state with one mutex.  The view never calls into its
//! layout (or any listener) while that mutex is held, which keeps the lock
//! order strictly layout → view.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::trace;

use crate::domain::element::{Element, IO};
use crate::domain::kinds::{ComponentType, ViewPosition};
use crate::domain::layout::DeviceLayout;
use crate::domain::listeners::ListenerRegistry;

/// Observer of a single view.
///
/// All methods default to no-ops so implementors only override what they need.
/// Listeners are invoked outside the view's lock and may freely call back into
/// the view or its layout.
pub trait ViewListener: Send + Sync {
    /// A presentation attribute or the position of `view` changed.
    fn view_changed(&self, _view: &Arc<DeviceView>) {}

    fn element_added(&self, _view: &Arc<DeviceView>, _element: &Element) {}

    /// `element` is the new handle now stored in the view.
    fn element_changed(&self, _view: &Arc<DeviceView>, _element: &Element) {}

    fn element_removed(&self, _view: &Arc<DeviceView>, _element: &Element) {}
}

/// Presentation attributes and position of a view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewAttributes {
    pub position: ViewPosition,
    pub image_uri: Option<String>,
    pub image_opacity: f32,
    pub image_scale: f32,
    pub desaturate_image: bool,
}

impl ViewAttributes {
    /// Default presentation (opaque, unscaled, full colour, no image) at `position`.
    pub fn new(position: ViewPosition) -> Self {
        Self {
            position,
            image_uri: None,
            image_opacity: 1.0,
            image_scale: 1.0,
            desaturate_image: false,
        }
    }
}

struct ViewState {
    attributes: ViewAttributes,
    elements: Vec<Element>,
    /// Back-reference for event routing only; never used to mutate the layout.
    layout: Weak<DeviceLayout>,
}

/// One positioned panel of a device layout.
pub struct DeviceView {
    state: Mutex<ViewState>,
    listeners: ListenerRegistry<dyn ViewListener>,
}

impl DeviceView {
    /// Creates an empty, unattached view at `position`.
    pub fn new(position: ViewPosition) -> Arc<Self> {
        Self::with_elements(ViewAttributes::new(position), Vec::new())
    }

    /// Creates an unattached view from existing attributes and elements.
    ///
    /// No events are fired.
    pub fn with_elements(attributes: ViewAttributes, elements: Vec<IO>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ViewState {
                attributes,
                elements: elements.into_iter().map(Arc::new).collect(),
                layout: Weak::new(),
            }),
            listeners: ListenerRegistry::new(),
        })
    }

    // ── Listeners ─────────────────────────────────────────────────────────────

    pub fn add_listener(&self, listener: Arc<dyn ViewListener>) {
        self.listeners.add(listener);
    }

    /// Removes a previously added listener.  Returns `false` if it was not registered.
    pub fn remove_listener(&self, listener: &Arc<dyn ViewListener>) -> bool {
        self.listeners.remove(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // ── Layout back-reference ─────────────────────────────────────────────────

    /// Returns the layout this view is attached to, if any.
    pub fn layout(&self) -> Option<Arc<DeviceLayout>> {
        self.lock().layout.upgrade()
    }

    /// Sets (or clears) the back-reference to the owning layout.
    ///
    /// This does not register the view with the layout; use
    /// [`DeviceLayout::add_view`] for that.
    pub fn set_layout(&self, layout: Option<&Arc<DeviceLayout>>) {
        self.lock().layout = layout.map(Arc::downgrade).unwrap_or_default();
    }

    /// Returns `true` if this view's back-reference points at `layout`.
    pub fn is_attached_to(&self, layout: &DeviceLayout) -> bool {
        std::ptr::eq(self.lock().layout.as_ptr(), layout)
    }

    // ── Attributes ────────────────────────────────────────────────────────────

    pub fn position(&self) -> ViewPosition {
        self.lock().attributes.position
    }

    /// Moves the view to another slot.
    ///
    /// When attached, the owning layout re-keys its view collection before
    /// `view_changed` is delivered.
    pub fn set_position(self: &Arc<Self>, position: ViewPosition) {
        let layout = {
            let mut state = self.lock();
            state.attributes.position = position;
            state.layout.upgrade()
        };
        if let Some(layout) = layout {
            layout.update_position(self);
        }
        self.fire_view_changed();
    }

    /// Returns a snapshot of the view's position and presentation attributes.
    pub fn attributes(&self) -> ViewAttributes {
        self.lock().attributes.clone()
    }

    pub fn image_uri(&self) -> Option<String> {
        self.lock().attributes.image_uri.clone()
    }

    pub fn set_image_uri(self: &Arc<Self>, image_uri: Option<String>) {
        self.update_attributes(|a| a.image_uri = image_uri);
    }

    pub fn image_opacity(&self) -> f32 {
        self.lock().attributes.image_opacity
    }

    pub fn set_image_opacity(self: &Arc<Self>, image_opacity: f32) {
        self.update_attributes(|a| a.image_opacity = image_opacity);
    }

    pub fn image_scale(&self) -> f32 {
        self.lock().attributes.image_scale
    }

    pub fn set_image_scale(self: &Arc<Self>, image_scale: f32) {
        self.update_attributes(|a| a.image_scale = image_scale);
    }

    pub fn desaturate_image(&self) -> bool {
        self.lock().attributes.desaturate_image
    }

    pub fn set_desaturate_image(self: &Arc<Self>, desaturate_image: bool) {
        self.update_attributes(|a| a.desaturate_image = desaturate_image);
    }

    // ── Elements ──────────────────────────────────────────────────────────────

    /// Returns a snapshot of the elements in insertion order.
    pub fn elements(&self) -> Vec<Element> {
        self.lock().elements.clone()
    }

    pub fn element(&self, index: usize) -> Option<Element> {
        self.lock().elements.get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().elements.is_empty()
    }

    /// Returns `true` if at least one element is of type `kind`.
    pub fn has_component(&self, kind: ComponentType) -> bool {
        self.lock()
            .elements
            .iter()
            .any(|e| ComponentType::of(e) == kind)
    }

    /// Appends an element and returns the handle stored in the view.
    pub fn add_element(self: &Arc<Self>, element: impl Into<IO>) -> Element {
        let element = Arc::new(element.into());
        self.lock().elements.push(Arc::clone(&element));
        self.listeners.notify(|l| l.element_added(self, &element));
        element
    }

    /// Removes `element` (matched by identity).  Returns `false` if it is not
    /// part of this view.
    pub fn remove_element(self: &Arc<Self>, element: &Element) -> bool {
        let removed = {
            let mut state = self.lock();
            state
                .elements
                .iter()
                .position(|e| Arc::ptr_eq(e, element))
                .map(|idx| state.elements.remove(idx))
        };
        match removed {
            Some(removed) => {
                self.listeners.notify(|l| l.element_removed(self, &removed));
                true
            }
            None => false,
        }
    }

    /// Removes the element at `index`, if any.
    pub fn remove_element_at(self: &Arc<Self>, index: usize) -> Option<Element> {
        let removed = {
            let mut state = self.lock();
            (index < state.elements.len()).then(|| state.elements.remove(index))
        }?;
        self.listeners.notify(|l| l.element_removed(self, &removed));
        Some(removed)
    }

    /// Applies `edit` to a copy of the element at `index`, stores the result
    /// in its place and fires `element_changed` with the new handle.
    ///
    /// Returns `None` if `index` is out of range, or if the element was
    /// removed or replaced concurrently.  `edit` runs without the view lock.
    pub fn update_element(
        self: &Arc<Self>,
        index: usize,
        edit: impl FnOnce(&mut IO),
    ) -> Option<Element> {
        let current = self.element(index)?;
        let mut io = IO::clone(&current);
        edit(&mut io);
        let updated = Arc::new(io);
        {
            let mut state = self.lock();
            // The element may have been removed or replaced while `edit` ran.
            let slot = state
                .elements
                .iter_mut()
                .find(|e| Arc::ptr_eq(e, &current))?;
            *slot = Arc::clone(&updated);
        }
        self.listeners.notify(|l| l.element_changed(self, &updated));
        Some(updated)
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn update_attributes(self: &Arc<Self>, edit: impl FnOnce(&mut ViewAttributes)) {
        edit(&mut self.lock().attributes);
        self.fire_view_changed();
    }

    fn fire_view_changed(self: &Arc<Self>) {
        trace!(position = %self.position(), "view changed");
        self.listeners.notify(|l| l.view_changed(self));
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for DeviceView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("DeviceView")
            .field("attributes", &state.attributes)
            .field("elements", &state.elements.len())
            .field("attached", &(state.layout.strong_count() > 0))
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
