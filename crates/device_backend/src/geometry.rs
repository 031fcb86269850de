//! window placement in bottom left coordinates.
//!
//! most os apis put the origin at the top left of the screen (and of the window). the device api uses the
//! bottom left, y going up, so every backend converts with the helpers here.

/// position and size of the drawable (client) area of a window.
/// x, y are relative to the bottom left of the screen. w, h are in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Geometry {
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
}

/// Converts the y of a span with height `h` between top left and bottom left origins inside `extent`.
/// The conversion is its own inverse.
pub fn flip_y(y: i32, h: u32, extent: u32) -> i32 {
    extent as i32 - y - h as i32
}

/// Converts a cursor row measured from the top of the drawable area into one measured from the bottom.
pub fn cursor_y(y: f64, client_height: u32) -> i32 {
    (client_height as f64 - y).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_y_round_trips() {
        // a 400 pixel tall window 200 pixels above the bottom of a 1080 screen.
        let top = flip_y(200, 400, 1080);
        assert_eq!(top, 480);
        assert_eq!(flip_y(top, 400, 1080), 200);
    }

    #[test]
    fn full_screen_window_sits_at_origin() {
        assert_eq!(flip_y(0, 1080, 1080), 0);
    }

    #[test]
    fn cursor_rows_count_from_the_bottom() {
        assert_eq!(cursor_y(0.0, 400), 400);
        assert_eq!(cursor_y(399.6, 400), 0);
        assert_eq!(cursor_y(100.0, 400), 300);
    }
}
