//! Device layout aggregate root.
//!
//! A [`DeviceLayout`] describes how a device's illuminated surface is divided
//! into [`DeviceView`]s, keyed by [`ViewPosition`].  Layouts are shared as
//! `Arc<DeviceLayout>` between the UI and device-event threads.
//!
//! # Events
//!
//! Each attached view gets one forwarding listener (a [`LayoutBridge`]) that
//! re-publishes the view's events to the layout's own listeners:
//!
//! ```text
//! view.add_element() ─► ViewListener::element_added (newest first)
//!                          └─ LayoutBridge ─► LayoutListener::view_element_added
//! ```
//!
//! The bridge is registered in [`DeviceLayout::add_view`] and removed again
//! when the view leaves the layout.  Because the bridge is normally the most
//! recently registered view listener it sees events first.
//!
//! # Locking
//!
//! All structural operations and the scan queries run under one mutex guarding
//! the view collection.  Listeners are always called after that mutex is
//! released.  Lock order is layout → view; a view never takes the layout's
//! lock while holding its own.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, trace, warn};

use crate::domain::device::Device;
use crate::domain::element::Element;
use crate::domain::kinds::{Capability, ComponentType, DeviceType, ViewPosition};
use crate::domain::listeners::ListenerRegistry;
use crate::domain::view::{DeviceView, ViewListener};

/// Observer of a whole layout.
///
/// All methods default to no-ops.  Callbacks run outside every model lock, so
/// they may call back into the layout, but structural changes made from a
/// callback are only visible to later events.
pub trait LayoutListener: Send + Sync {
    /// Layout metadata changed (`view` is `None`) or the view collection was
    /// replaced wholesale.
    fn layout_changed(&self, _layout: &Arc<DeviceLayout>, _view: Option<Arc<DeviceView>>) {}

    fn view_added(&self, _layout: &Arc<DeviceLayout>, _view: &Arc<DeviceView>) {}

    fn view_removed(&self, _layout: &Arc<DeviceLayout>, _view: &Arc<DeviceView>) {}

    /// A member view's position or presentation attributes changed.
    fn view_changed(&self, _layout: &Arc<DeviceLayout>, _view: &Arc<DeviceView>) {}

    fn view_element_added(
        &self,
        _layout: &Arc<DeviceLayout>,
        _view: &Arc<DeviceView>,
        _element: &Element,
    ) {
    }

    fn view_element_changed(
        &self,
        _layout: &Arc<DeviceLayout>,
        _view: &Arc<DeviceView>,
        _element: &Element,
    ) {
    }

    fn view_element_removed(
        &self,
        _layout: &Arc<DeviceLayout>,
        _view: &Arc<DeviceView>,
        _element: &Element,
    ) {
    }
}

/// Device identity and matrix description of a layout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutMetadata {
    pub name: Option<String>,
    /// Number of matrix columns; 0 when the device has no addressable matrix.
    pub matrix_width: u32,
    /// Number of matrix rows; 0 when the device has no addressable matrix.
    pub matrix_height: u32,
    pub device_type: DeviceType,
    pub read_only: bool,
    /// Archive the layout was loaded from, used as the default save target.
    pub base: Option<PathBuf>,
}

/// Forwards one view's events to the owning layout's listeners.
struct LayoutBridge {
    layout: Weak<DeviceLayout>,
}

impl ViewListener for LayoutBridge {
    fn view_changed(&self, view: &Arc<DeviceView>) {
        if let Some(layout) = self.layout.upgrade() {
            layout.fire_view_changed(view);
        }
    }

    fn element_added(&self, view: &Arc<DeviceView>, element: &Element) {
        if let Some(layout) = self.layout.upgrade() {
            layout.listeners.notify(|l| l.view_element_added(&layout, view, element));
        }
    }

    fn element_changed(&self, view: &Arc<DeviceView>, element: &Element) {
        if let Some(layout) = self.layout.upgrade() {
            layout.listeners.notify(|l| l.view_element_changed(&layout, view, element));
        }
    }

    fn element_removed(&self, view: &Arc<DeviceView>, element: &Element) {
        if let Some(layout) = self.layout.upgrade() {
            layout.listeners.notify(|l| l.view_element_removed(&layout, view, element));
        }
    }
}

/// A member view together with the key it is stored under and its bridge.
struct AttachedView {
    position: ViewPosition,
    view: Arc<DeviceView>,
    bridge: Arc<dyn ViewListener>,
}

/// The layout aggregate: metadata plus a position-keyed, insertion-ordered
/// collection of views.
pub struct DeviceLayout {
    metadata: Mutex<LayoutMetadata>,
    views: Mutex<Vec<AttachedView>>,
    listeners: ListenerRegistry<dyn LayoutListener>,
}

impl DeviceLayout {
    /// Creates an empty layout.
    pub fn new() -> Arc<Self> {
        Self::with_metadata(LayoutMetadata::default())
    }

    /// Creates a layout with the given metadata and no views.
    pub fn with_metadata(metadata: LayoutMetadata) -> Arc<Self> {
        Arc::new(Self {
            metadata: Mutex::new(metadata),
            views: Mutex::new(Vec::new()),
            listeners: ListenerRegistry::new(),
        })
    }

    /// Creates an empty layout describing `device`.
    ///
    /// Matrix dimensions are taken from the device only when it advertises
    /// [`Capability::Matrix`]; otherwise they stay 0.
    pub fn from_device<D: Device + ?Sized>(device: &D) -> Arc<Self> {
        let mut metadata = LayoutMetadata {
            name: Some(device.name()),
            device_type: device.device_type(),
            ..Default::default()
        };
        if device.has_capability(Capability::Matrix) {
            let [rows, columns] = device.matrix_size();
            metadata.matrix_height = rows;
            metadata.matrix_width = columns;
        }
        Self::with_metadata(metadata)
    }

    // ── Listeners ─────────────────────────────────────────────────────────────

    pub fn add_listener(&self, listener: Arc<dyn LayoutListener>) {
        self.listeners.add(listener);
    }

    /// Removes a previously added listener.  Returns `false` if it was not registered.
    pub fn remove_listener(&self, listener: &Arc<dyn LayoutListener>) -> bool {
        self.listeners.remove(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // ── Metadata ──────────────────────────────────────────────────────────────

    /// Returns a snapshot of the layout metadata.
    pub fn metadata(&self) -> LayoutMetadata {
        self.lock_metadata().clone()
    }

    pub fn name(&self) -> Option<String> {
        self.lock_metadata().name.clone()
    }

    pub fn set_name(self: &Arc<Self>, name: Option<String>) {
        self.update_metadata(|m| m.name = name);
    }

    pub fn matrix_width(&self) -> u32 {
        self.lock_metadata().matrix_width
    }

    pub fn set_matrix_width(self: &Arc<Self>, matrix_width: u32) {
        self.update_metadata(|m| m.matrix_width = matrix_width);
    }

    pub fn matrix_height(&self) -> u32 {
        self.lock_metadata().matrix_height
    }

    pub fn set_matrix_height(self: &Arc<Self>, matrix_height: u32) {
        self.update_metadata(|m| m.matrix_height = matrix_height);
    }

    pub fn device_type(&self) -> DeviceType {
        self.lock_metadata().device_type
    }

    pub fn set_device_type(self: &Arc<Self>, device_type: DeviceType) {
        self.update_metadata(|m| m.device_type = device_type);
    }

    pub fn is_read_only(&self) -> bool {
        self.lock_metadata().read_only
    }

    pub fn set_read_only(self: &Arc<Self>, read_only: bool) {
        self.update_metadata(|m| m.read_only = read_only);
    }

    pub fn base(&self) -> Option<PathBuf> {
        self.lock_metadata().base.clone()
    }

    pub fn set_base(self: &Arc<Self>, base: Option<PathBuf>) {
        self.update_metadata(|m| m.base = base);
    }

    // ── Views ─────────────────────────────────────────────────────────────────

    /// Returns a snapshot of the member views in insertion order.
    pub fn views(&self) -> Vec<Arc<DeviceView>> {
        self.lock_views().iter().map(|a| Arc::clone(&a.view)).collect()
    }

    /// Returns the positions views are stored under, in insertion order.
    pub fn positions(&self) -> Vec<ViewPosition> {
        self.lock_views().iter().map(|a| a.position).collect()
    }

    pub fn view(&self, position: ViewPosition) -> Option<Arc<DeviceView>> {
        self.lock_views()
            .iter()
            .find(|a| a.position == position)
            .map(|a| Arc::clone(&a.view))
    }

    pub fn view_count(&self) -> usize {
        self.lock_views().len()
    }

    /// Attaches `view` under the position it currently reports and fires
    /// `view_added`.
    ///
    /// A view already occupying that position is evicted silently: it is
    /// detached but no `view_removed` is fired.  Call [`remove_view`] first
    /// when listeners must hear about the replacement.
    ///
    /// A view that belongs to a different layout is removed from it first
    /// (that layout fires `view_removed`).  Re-adding a view that is already a
    /// member keeps its slot in insertion order (or re-keys it if its position
    /// changed) without duplicating its forwarding subscription.
    ///
    /// [`remove_view`]: DeviceLayout::remove_view
    pub fn add_view(self: &Arc<Self>, view: Arc<DeviceView>) {
        self.release_from_other_layout(&view);

        {
            let mut views = self.lock_views();
            let position = view.position();
            let member = views.iter().position(|a| Arc::ptr_eq(&a.view, &view));
            match member {
                // Already stored under its current position: keep its slot and bridge.
                Some(idx) if views[idx].position == position => {
                    debug!(%position, "member view re-added in place");
                }
                _ => {
                    let entry = match member {
                        Some(idx) => {
                            let mut kept = views.remove(idx);
                            kept.position = position;
                            kept
                        }
                        None => self.attach(Arc::clone(&view)),
                    };
                    debug!(%position, "view attached");
                    if let Some(evicted) = insert_view(&mut views, entry) {
                        warn!(position = %evicted.position, "view replaced without removal");
                        self.detach(&evicted);
                    }
                }
            }
        }

        self.listeners.notify(|l| l.view_added(self, &view));
    }

    /// Detaches and returns the view stored at `position`, firing
    /// `view_removed`.  Does nothing (and fires nothing) if the slot is empty.
    pub fn remove_view(self: &Arc<Self>, position: ViewPosition) -> Option<Arc<DeviceView>> {
        let removed = {
            let mut views = self.lock_views();
            let idx = views.iter().position(|a| a.position == position)?;
            let entry = views.remove(idx);
            self.detach(&entry);
            entry
        };
        debug!(position = %removed.position, "view detached");
        self.listeners.notify(|l| l.view_removed(self, &removed.view));
        Some(removed.view)
    }

    /// Replaces the whole view collection, keyed by each view's current
    /// position, and fires a single `layout_changed`.
    ///
    /// Views that stay members keep their subscription; views that drop out
    /// are detached.  No per-view add/remove events are fired.
    pub fn set_views(self: &Arc<Self>, new_views: Vec<Arc<DeviceView>>) {
        for view in &new_views {
            self.release_from_other_layout(view);
        }

        {
            let mut views = self.lock_views();
            let mut previous = std::mem::take(&mut *views);
            let mut dropped = Vec::new();

            for view in new_views {
                if views.iter().any(|a| Arc::ptr_eq(&a.view, &view)) {
                    continue;
                }
                let entry = match previous.iter().position(|a| Arc::ptr_eq(&a.view, &view)) {
                    Some(idx) => {
                        let mut kept = previous.remove(idx);
                        kept.position = kept.view.position();
                        kept
                    }
                    None => self.attach(view),
                };
                if let Some(evicted) = insert_view(&mut views, entry) {
                    warn!(position = %evicted.position, "view replaced without removal");
                    dropped.push(evicted);
                }
            }

            dropped.append(&mut previous);
            for entry in &dropped {
                self.detach(entry);
            }
            debug!(views = views.len(), dropped = dropped.len(), "view collection replaced");
        }

        self.fire_changed(None);
    }

    /// Re-keys the view collection after a member view changed position.
    ///
    /// Called by [`DeviceView::set_position`]; insertion order of the views is
    /// preserved.  If two views now report the same position, the later one
    /// takes the earlier one's slot and the earlier one is detached silently.
    pub fn update_position(&self, view: &Arc<DeviceView>) {
        let mut views = self.lock_views();
        let previous = std::mem::take(&mut *views);
        for mut entry in previous {
            entry.position = entry.view.position();
            if let Some(evicted) = insert_view(&mut views, entry) {
                warn!(position = %evicted.position, "re-keyed view collided with another view");
                self.detach(&evicted);
            }
        }
        debug!(position = %view.position(), "view collection re-keyed");
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    /// Returns the first view (in insertion order) containing at least one
    /// element of type `kind`.
    pub fn view_that_has(&self, kind: ComponentType) -> Option<Arc<DeviceView>> {
        self.lock_views()
            .iter()
            .find(|a| a.view.has_component(kind))
            .map(|a| Arc::clone(&a.view))
    }

    /// Returns every view containing at least one element of type `kind`.
    pub fn views_that_have(&self, kind: ComponentType) -> Vec<Arc<DeviceView>> {
        self.lock_views()
            .iter()
            .filter(|a| a.view.has_component(kind))
            .map(|a| Arc::clone(&a.view))
            .collect()
    }

    /// Lists elements whose matrix coordinates fall outside the declared
    /// matrix, paired with the position of their view.
    ///
    /// Always empty when the layout declares no matrix (both dimensions 0).
    pub fn out_of_matrix_elements(&self) -> Vec<(ViewPosition, Element)> {
        let (width, height) = {
            let metadata = self.lock_metadata();
            (metadata.matrix_width, metadata.matrix_height)
        };
        if width == 0 && height == 0 {
            return Vec::new();
        }

        let views = self.lock_views();
        let mut outside = Vec::new();
        for attached in views.iter() {
            for element in attached.view.elements() {
                if let Some((x, y)) = element.matrix() {
                    if x >= width || y >= height {
                        outside.push((attached.position, element));
                    }
                }
            }
        }
        outside
    }

    // ── Event fan-out ─────────────────────────────────────────────────────────

    pub(crate) fn fire_changed(self: &Arc<Self>, view: Option<Arc<DeviceView>>) {
        trace!("layout changed");
        self.listeners.notify(|l| l.layout_changed(self, view.clone()));
    }

    fn fire_view_changed(self: &Arc<Self>, view: &Arc<DeviceView>) {
        self.listeners.notify(|l| l.view_changed(self, view));
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn update_metadata(self: &Arc<Self>, edit: impl FnOnce(&mut LayoutMetadata)) {
        edit(&mut self.lock_metadata());
        self.fire_changed(None);
    }

    /// Sets the back-reference and subscribes a fresh bridge on `view`.
    fn attach(self: &Arc<Self>, view: Arc<DeviceView>) -> AttachedView {
        view.set_layout(Some(self));
        let bridge: Arc<dyn ViewListener> = Arc::new(LayoutBridge {
            layout: Arc::downgrade(self),
        });
        view.add_listener(Arc::clone(&bridge));
        AttachedView {
            position: view.position(),
            view,
            bridge,
        }
    }

    /// Undoes [`attach`](Self::attach).  The back-reference is only cleared if
    /// it still points at this layout.
    fn detach(&self, entry: &AttachedView) {
        entry.view.remove_listener(&entry.bridge);
        if entry.view.is_attached_to(self) {
            entry.view.set_layout(None);
        }
    }

    /// Removes `view` from the layout it is currently attached to, if that is
    /// not this layout.
    fn release_from_other_layout(self: &Arc<Self>, view: &Arc<DeviceView>) {
        let Some(previous) = view.layout() else {
            return;
        };
        if Arc::ptr_eq(&previous, self) {
            return;
        }
        let removed = {
            let mut views = previous.lock_views();
            views
                .iter()
                .position(|a| Arc::ptr_eq(&a.view, view))
                .map(|idx| views.remove(idx))
        };
        match removed {
            Some(entry) => {
                previous.detach(&entry);
                debug!(position = %entry.position, "view moved between layouts");
                previous
                    .listeners
                    .notify(|l| l.view_removed(&previous, &entry.view));
            }
            None => view.set_layout(None),
        }
    }

    fn lock_views(&self) -> MutexGuard<'_, Vec<AttachedView>> {
        self.views.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_metadata(&self) -> MutexGuard<'_, LayoutMetadata> {
        self.metadata.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Inserts `entry` under its position.
///
/// An occupied slot is overwritten in place (keeping its place in insertion
/// order) and the previous occupant is returned.  This is the only place that
/// decides what happens on a position collision.
fn insert_view(views: &mut Vec<AttachedView>, entry: AttachedView) -> Option<AttachedView> {
    match views.iter_mut().find(|a| a.position == entry.position) {
        Some(slot) => Some(std::mem::replace(slot, entry)),
        None => {
            views.push(entry);
            None
        }
    }
}

impl Drop for DeviceLayout {
    /// Unsubscribes the bridges of every remaining view.
    fn drop(&mut self) {
        let views = std::mem::take(
            self.views
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for entry in &views {
            self.detach(entry);
        }
    }
}

impl std::fmt::Debug for DeviceLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceLayout")
            .field("metadata", &*self.lock_metadata())
            .field("positions", &self.positions())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
