//! Integration tests for event delivery through the public API.
//!
//! Listeners are mockall mocks: any callback without a matching expectation
//! panics, so each test also proves that no unexpected events were fired.

use std::sync::{Arc, Mutex};

use devlayout_core::{
    ComponentType, DeviceLayout, DeviceView, Element, LayoutListener, Led, ViewListener,
    ViewPosition, IO,
};
use mockall::{mock, Sequence};

mock! {
    pub LayoutObserver {}

    impl LayoutListener for LayoutObserver {
        fn layout_changed(&self, layout: &Arc<DeviceLayout>, view: Option<Arc<DeviceView>>);
        fn view_added(&self, layout: &Arc<DeviceLayout>, view: &Arc<DeviceView>);
        fn view_removed(&self, layout: &Arc<DeviceLayout>, view: &Arc<DeviceView>);
        fn view_changed(&self, layout: &Arc<DeviceLayout>, view: &Arc<DeviceView>);
        fn view_element_added(
            &self,
            layout: &Arc<DeviceLayout>,
            view: &Arc<DeviceView>,
            element: &Element,
        );
        fn view_element_changed(
            &self,
            layout: &Arc<DeviceLayout>,
            view: &Arc<DeviceView>,
            element: &Element,
        );
        fn view_element_removed(
            &self,
            layout: &Arc<DeviceLayout>,
            view: &Arc<DeviceView>,
            element: &Element,
        );
    }
}

mock! {
    pub ViewObserver {}

    impl ViewListener for ViewObserver {
        fn view_changed(&self, view: &Arc<DeviceView>);
        fn element_added(&self, view: &Arc<DeviceView>, element: &Element);
        fn element_changed(&self, view: &Arc<DeviceView>, element: &Element);
        fn element_removed(&self, view: &Arc<DeviceView>, element: &Element);
    }
}

fn layout_with_top_view() -> (Arc<DeviceLayout>, Arc<DeviceView>) {
    let layout = DeviceLayout::new();
    let view = DeviceView::new(ViewPosition::Top);
    layout.add_view(Arc::clone(&view));
    (layout, view)
}

// ── Propagation ───────────────────────────────────────────────────────────────

#[test]
fn test_element_added_reaches_layout_listener_once_with_same_handle() {
    // Arrange
    let (layout, view) = layout_with_top_view();
    let seen: Arc<Mutex<Vec<Element>>> = Arc::default();
    let mut observer = MockLayoutObserver::new();
    let sink = Arc::clone(&seen);
    let expected_view = Arc::clone(&view);
    observer
        .expect_view_element_added()
        .withf(move |_, v, _| Arc::ptr_eq(v, &expected_view))
        .times(1)
        .returning(move |_, _, element| sink.lock().unwrap().push(Arc::clone(element)));
    layout.add_listener(Arc::new(observer));

    // Act
    let added = view.add_element(Led::default());

    // Assert
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(Arc::ptr_eq(&seen[0], &added));
}

#[test]
fn test_view_listener_and_layout_listener_both_hear_element_change() {
    let (layout, view) = layout_with_top_view();
    view.add_element(Led::default());

    let mut view_observer = MockViewObserver::new();
    view_observer
        .expect_element_changed()
        .withf(|_, element| element.matrix() == Some((4, 2)))
        .times(1)
        .return_const(());
    view.add_listener(Arc::new(view_observer));

    let mut layout_observer = MockLayoutObserver::new();
    layout_observer
        .expect_view_element_changed()
        .withf(|_, _, element| element.matrix() == Some((4, 2)))
        .times(1)
        .return_const(());
    layout.add_listener(Arc::new(layout_observer));

    let updated = view.update_element(0, |io| {
        io.set_matrix(4, 2);
    });

    assert!(updated.is_some());
}

#[test]
fn test_view_position_change_fires_view_changed_at_layout() {
    let (layout, view) = layout_with_top_view();
    let mut observer = MockLayoutObserver::new();
    observer
        .expect_view_changed()
        .withf(|_, v| v.position() == ViewPosition::Bottom)
        .times(1)
        .return_const(());
    layout.add_listener(Arc::new(observer));

    view.set_position(ViewPosition::Bottom);

    assert!(layout.view(ViewPosition::Top).is_none());
    assert!(Arc::ptr_eq(&layout.view(ViewPosition::Bottom).unwrap(), &view));
}

// ── Ordering ──────────────────────────────────────────────────────────────────

#[test]
fn test_layout_listeners_receive_events_newest_first() {
    let layout = DeviceLayout::new();
    let mut seq = Sequence::new();
    let mut first = MockLayoutObserver::new();
    let mut second = MockLayoutObserver::new();
    second
        .expect_view_added()
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    first
        .expect_view_added()
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    layout.add_listener(Arc::new(first));
    layout.add_listener(Arc::new(second));

    layout.add_view(DeviceView::new(ViewPosition::Front));
}

#[test]
fn test_view_listeners_receive_events_newest_first() {
    let view = DeviceView::new(ViewPosition::Left);
    let mut seq = Sequence::new();
    let mut first = MockViewObserver::new();
    let mut second = MockViewObserver::new();
    second
        .expect_view_changed()
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    first
        .expect_view_changed()
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    view.add_listener(Arc::new(first));
    view.add_listener(Arc::new(second));

    view.set_image_opacity(0.5);
}

// ── Attachment lifecycle ──────────────────────────────────────────────────────

#[test]
fn test_detached_view_stops_forwarding_until_reattached() {
    // Arrange
    let (layout, view) = layout_with_top_view();
    let mut seq = Sequence::new();
    let mut observer = MockLayoutObserver::new();
    observer
        .expect_view_removed()
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    observer
        .expect_view_added()
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    observer
        .expect_view_element_added()
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    layout.add_listener(Arc::new(observer));

    // Act: a mutation while detached must not reach the layout listener.
    let removed = layout.remove_view(ViewPosition::Top).expect("top view");
    removed.add_element(Led::default());
    layout.add_view(Arc::clone(&removed));
    removed.add_element(Led::default());

    // Assert
    assert_eq!(view.listener_count(), 1);
    assert_eq!(view.len(), 2);
}

#[test]
fn test_removed_layout_listener_hears_nothing() {
    let (layout, view) = layout_with_top_view();
    // No expectations: any callback would panic.
    let observer: Arc<dyn LayoutListener> = Arc::new(MockLayoutObserver::new());
    layout.add_listener(Arc::clone(&observer));

    assert!(layout.remove_listener(&observer));
    view.add_element(Led::default());
    layout.set_name(Some("quiet".to_string()));
    layout.remove_view(ViewPosition::Top);

    assert_eq!(layout.listener_count(), 0);
}

#[test]
fn test_metadata_change_fires_layout_changed_without_view() {
    let layout = DeviceLayout::new();
    let mut observer = MockLayoutObserver::new();
    observer
        .expect_layout_changed()
        .withf(|layout, view| view.is_none() && layout.matrix_width() == 22)
        .times(1)
        .return_const(());
    layout.add_listener(Arc::new(observer));

    layout.set_matrix_width(22);
}

#[test]
fn test_listener_may_query_layout_from_callback() {
    let (layout, view) = layout_with_top_view();
    let mut observer = MockLayoutObserver::new();
    observer
        .expect_view_element_added()
        .times(1)
        .returning(|layout, _, _| {
            // Locks are released before delivery, so reading back is safe.
            assert!(layout.view_that_has(ComponentType::Key).is_some());
        });
    layout.add_listener(Arc::new(observer));

    let added = view.add_element(IO::Key(Default::default()));

    assert_eq!(added.component_type(), ComponentType::Key);
}

#[test]
fn test_replacing_view_via_remove_then_add_fires_two_distinct_events() {
    let (layout, old) = layout_with_top_view();
    let fresh = DeviceView::new(ViewPosition::Top);
    let mut seq = Sequence::new();
    let mut observer = MockLayoutObserver::new();
    let expected_old = Arc::clone(&old);
    observer
        .expect_view_removed()
        .withf(move |_, v| Arc::ptr_eq(v, &expected_old))
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    let expected_fresh = Arc::clone(&fresh);
    observer
        .expect_view_added()
        .withf(move |_, v| Arc::ptr_eq(v, &expected_fresh))
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    layout.add_listener(Arc::new(observer));

    layout.remove_view(ViewPosition::Top);
    layout.add_view(Arc::clone(&fresh));

    assert!(old.layout().is_none());
    assert!(Arc::ptr_eq(&layout.view(ViewPosition::Top).unwrap(), &fresh));
}
