//! Wheel delta translation for `GridWidget`.

use serde::{Deserialize, Serialize};

/// `WheelEvent.deltaMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WheelDeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl WheelDeltaMode {
    /// From the DOM constants `DOM_DELTA_PIXEL`, `DOM_DELTA_LINE`,
    /// `DOM_DELTA_PAGE`. Unknown values are treated as pixels.
    pub fn from_dom(mode: u32) -> Self {
        match mode {
            1 => Self::Line,
            2 => Self::Page,
            _ => Self::Pixel,
        }
    }
}

/// Pixel deltas for one wheel event.
///
/// Lines are one default row high; pages are one viewport. Shift turns a
/// vertical wheel into horizontal scrolling.
pub fn wheel_pixels(
    dx: f64,
    dy: f64,
    mode: WheelDeltaMode,
    shift: bool,
    line: f64,
    page: (f64, f64),
) -> (f64, f64) {
    let (dx, dy) = match mode {
        WheelDeltaMode::Pixel => (dx, dy),
        WheelDeltaMode::Line => (dx * line, dy * line),
        WheelDeltaMode::Page => (dx * page.0, dy * page.1),
    };
    if shift && dx.abs() < f64::EPSILON {
        (dy, 0.0)
    } else {
        (dx, dy)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_modes() {
        assert_eq!(wheel_pixels(0.0, 3.0, WheelDeltaMode::Line, false, 20.0, (800.0, 600.0)), (0.0, 60.0));
        assert_eq!(wheel_pixels(1.0, 0.0, WheelDeltaMode::Page, false, 20.0, (800.0, 600.0)), (800.0, 0.0));
        assert_eq!(wheel_pixels(0.0, 40.0, WheelDeltaMode::Pixel, true, 20.0, (800.0, 600.0)), (40.0, 0.0));
        assert_eq!(WheelDeltaMode::from_dom(1), WheelDeltaMode::Line);
        assert_eq!(WheelDeltaMode::from_dom(9), WheelDeltaMode::Pixel);
    }
}
