use device_backend::{
    Device, DeviceConfig, DeviceEvent, Geometry, HeadlessConfig, HeadlessDevice, Key, KEY_RELEASED,
};

fn open() -> HeadlessDevice {
    HeadlessDevice::init(HeadlessConfig::default(), DeviceConfig::default())
        .expect("headless device always initializes")
}

#[test]
fn polls_stay_active_until_closed() {
    let mut device = open();
    for _ in 0..10 {
        assert!(device.poll_input().is_some());
    }
    device.request_close();
    assert!(device.poll_input().is_none());
    // closing is terminal.
    assert!(device.poll_input().is_none());
    device.dispose();
}

#[test]
fn set_size_is_reflected_by_size() {
    let mut device = open();
    let placement = Geometry::new(600, 200, 600, 400);
    device.set_size(placement);
    assert_eq!(device.size(), placement);
    let input = device.poll_input().unwrap();
    assert!(input.resized);
    assert!(!device.poll_input().unwrap().resized);
}

#[test]
fn toggling_full_screen_reports_a_resize() {
    let mut device = open();
    device.toggle_full_screen();
    assert!(device.poll_input().unwrap().resized);
    device.toggle_full_screen();
    assert!(device.poll_input().unwrap().resized);
    assert!(!device.is_full_screen());
}

#[test]
fn key_walks_through_its_lifecycle() {
    let mut device = open();
    device.push_event(DeviceEvent::KeyPressed(Key::W));
    assert_eq!(device.poll_input().unwrap().down[&Key::W], 1);
    assert_eq!(device.poll_input().unwrap().down[&Key::W], 2);
    assert_eq!(device.poll_input().unwrap().down[&Key::W], 3);
    device.push_event(DeviceEvent::KeyReleased(Key::W));
    let input = device.poll_input().unwrap();
    assert_eq!(input.down[&Key::W], KEY_RELEASED + 4);
    assert_eq!(input.released(Key::W), Some(4));
    assert!(!device.poll_input().unwrap().down.contains_key(&Key::W));
}

#[test]
fn snapshots_are_independent_values() {
    let mut device = open();
    device.push_event(DeviceEvent::Scroll(3));
    device.push_event(DeviceEvent::KeyPressed(Key::MouseLeft));
    let first = device.poll_input().unwrap();
    let second = device.poll_input().unwrap();
    assert_eq!(first.scroll, 3);
    assert_eq!(first.down[&Key::MouseLeft], 1);
    assert_eq!(second.scroll, 0);
    assert_eq!(second.down[&Key::MouseLeft], 2);
}

#[test]
fn focus_flag_follows_the_window() {
    let mut device = open();
    assert!(device.poll_input().unwrap().focus);
    device.push_event(DeviceEvent::KeyPressed(Key::A));
    device.push_event(DeviceEvent::Focus(false));
    let input = device.poll_input().unwrap();
    assert!(!input.focus);
    assert_eq!(input.released(Key::A), Some(1));
    device.push_event(DeviceEvent::Focus(true));
    let input = device.poll_input().unwrap();
    assert!(input.focus);
    assert!(input.down.is_empty());
}

#[test]
fn quick_repress_reports_the_release_first() {
    let mut device = open();
    device.push_event(DeviceEvent::KeyPressed(Key::W));
    let mut durations = vec![device.poll_input().unwrap().down.get(&Key::W).copied()];
    durations.push(device.poll_input().unwrap().down.get(&Key::W).copied());
    device.push_event(DeviceEvent::KeyReleased(Key::W));
    device.push_event(DeviceEvent::KeyPressed(Key::W));
    for _ in 0..3 {
        durations.push(device.poll_input().unwrap().down.get(&Key::W).copied());
    }
    assert_eq!(
        durations,
        vec![Some(1), Some(2), Some(KEY_RELEASED + 3), Some(1), Some(2)]
    );
}
