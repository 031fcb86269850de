//! prints whatever the device reports until the window is closed or `X` is pressed.
//! `W` toggles full screen.
use std::io::Write;

use anyhow::Context;
use device_backend::{Device, Geometry, Input, Key};

pub const TITLE: &str = "Test Window";
pub const PLACEMENT: Geometry = Geometry {
    x: 600,
    y: 200,
    w: 600,
    h: 400,
};

/// runs the showcase loop on an initialized device and disposes it at the end.
pub fn run<D: Device>(mut device: D, out: &mut impl Write) -> anyhow::Result<()> {
    device.set_title(TITLE);
    device.set_size(PLACEMENT);
    let result = event_loop(&mut device, out);
    device.dispose();
    result
}

fn event_loop<D: Device>(device: &mut D, out: &mut impl Write) -> anyhow::Result<()> {
    let mut focus = true;
    while let Some(input) = device.poll_input() {
        if focus != input.focus {
            focus = input.focus;
            writeln!(out, "focus change {focus}")?;
        }
        if input.resized {
            let Geometry { x, y, w, h } = device.size();
            writeln!(out, "window moved or resized {x} {y} {w} {h}")?;
        }
        if input.scroll != 0 {
            writeln!(out, "scroll {}", input.scroll)?;
        }
        if !report_keys(device, &input, out)? {
            tracing::info!("close requested from the keyboard");
            break;
        }
    }
    out.flush().context("flushing showcase output")?;
    Ok(())
}

/// prints key transitions. returns false when the loop should stop.
fn report_keys<D: Device>(device: &mut D, input: &Input, out: &mut impl Write) -> anyhow::Result<bool> {
    // map order is random. sort so the output is stable.
    let mut keys: Vec<(Key, i32)> = input.down.iter().map(|(k, v)| (*k, *v)).collect();
    keys.sort_unstable();
    for (key, duration) in keys {
        if duration == 1 {
            writeln!(out, "key pressed {key:?} {duration}")?;
            match key {
                Key::W => {
                    writeln!(out, "toggled window full screen")?;
                    device.toggle_full_screen();
                }
                Key::X => {
                    writeln!(out, "close window")?;
                    return Ok(false);
                }
                _ => {}
            }
        } else if duration < 0 {
            writeln!(out, "key released {key:?} {duration}")?;
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use device_backend::{DeviceEvent, HeadlessDevice, KEY_RELEASED};

    fn headless() -> HeadlessDevice {
        HeadlessDevice::init(Default::default(), Default::default()).unwrap()
    }

    fn lines(out: Vec<u8>) -> Vec<String> {
        String::from_utf8(out).unwrap().lines().map(str::to_string).collect()
    }

    #[test]
    fn reports_placement_then_stops_on_close() {
        let mut device = headless();
        device.request_close();
        let mut out = Vec::new();
        run(device, &mut out).unwrap();
        assert_eq!(lines(out), vec!["window moved or resized 600 200 600 400"]);
    }

    #[test]
    fn prints_events_and_exits_on_x() {
        let mut device = headless();
        device.push_event(DeviceEvent::Scroll(-2));
        device.push_event(DeviceEvent::KeyPressed(Key::A));
        device.push_event(DeviceEvent::KeyReleased(Key::A));
        device.push_event(DeviceEvent::Focus(false));
        device.push_event(DeviceEvent::KeyPressed(Key::X));
        let mut out = Vec::new();
        run(device, &mut out).unwrap();
        assert_eq!(
            lines(out),
            vec![
                "focus change false".to_string(),
                "window moved or resized 600 200 600 400".to_string(),
                "scroll -2".to_string(),
                format!("key released A {}", KEY_RELEASED + 1),
                "key pressed X 1".to_string(),
                "close window".to_string(),
            ]
        );
    }

    #[test]
    fn w_toggles_full_screen() {
        let mut device = headless();
        device.push_event(DeviceEvent::KeyPressed(Key::W));
        device.request_close();
        let mut out = Vec::new();
        run(device, &mut out).unwrap();
        assert_eq!(
            lines(out),
            vec![
                "window moved or resized 600 200 600 400",
                "key pressed W 1",
                "toggled window full screen",
                "window moved or resized 0 0 1920 1080",
            ]
        );
    }
}
