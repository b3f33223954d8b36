use std::fmt;

/// Upper bound of the low-intensity band.
pub const LOW_THRESHOLD: f64 = 0.3;
/// Upper bound of the medium-intensity band.
pub const MEDIUM_THRESHOLD: f64 = 0.7;

/// Fill used for regions with no recorded volume.
pub const INACTIVE_HEX: &str = "#e9ecef";
pub const INACTIVE: Rgb = Rgb::new(0xe9, 0xec, 0xef);

const LOW_START: Rgb = Rgb::new(200, 200, 200);
const LOW_END: Rgb = Rgb::new(255, 150, 100);
const MEDIUM_END: Rgb = Rgb::new(255, 50, 20);
const HIGH_END: Rgb = Rgb::new(155, 0, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channel-wise `floor(start + (end - start) * t)`.
    ///
    /// Kept in this operation order rather than `(1 - t) * start + t * end`:
    /// the two disagree by one on some channels after flooring, and this form
    /// reproduces the established palette (0.5 gives `rgb(255, 99, 59)`).
    fn lerp(start: Rgb, end: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| {
            let v = (a as f64 + (b as f64 - a as f64) * t).floor();
            v.clamp(0.0, 255.0) as u8
        };
        Rgb::new(
            channel(start.r, end.r),
            channel(start.g, end.g),
            channel(start.b, end.b),
        )
    }
}

/// Fill color of one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatColor {
    /// No activity, rendered as [`INACTIVE_HEX`].
    Inactive,
    Scaled(Rgb),
}

impl HeatColor {
    pub fn rgb(self) -> Rgb {
        match self {
            HeatColor::Inactive => INACTIVE,
            HeatColor::Scaled(c) => c,
        }
    }
}

impl fmt::Display for HeatColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeatColor::Inactive => f.write_str(INACTIVE_HEX),
            HeatColor::Scaled(c) => write!(f, "rgb({}, {}, {})", c.r, c.g, c.b),
        }
    }
}

/// Map an intensity in `[0, 1]` onto the three-band heat gradient.
///
/// Values outside the range are clamped; NaN counts as no activity.
pub fn color_for_intensity(intensity: f64) -> HeatColor {
    if intensity.is_nan() || intensity <= 0.0 {
        return HeatColor::Inactive;
    }
    let i = intensity.min(1.0);
    let rgb = if i < LOW_THRESHOLD {
        Rgb::lerp(LOW_START, LOW_END, i / LOW_THRESHOLD)
    } else if i < MEDIUM_THRESHOLD {
        Rgb::lerp(
            LOW_END,
            MEDIUM_END,
            (i - LOW_THRESHOLD) / (MEDIUM_THRESHOLD - LOW_THRESHOLD),
        )
    } else {
        Rgb::lerp(MEDIUM_END, HIGH_END, (i - MEDIUM_THRESHOLD) / (1.0 - MEDIUM_THRESHOLD))
    };
    HeatColor::Scaled(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_inactive_gray() {
        assert_eq!(color_for_intensity(0.0), HeatColor::Inactive);
        assert_eq!(color_for_intensity(0.0).to_string(), "#e9ecef");
        assert_eq!(color_for_intensity(f64::NAN), HeatColor::Inactive);
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(color_for_intensity(0.3).rgb(), Rgb::new(255, 150, 100));
        assert_eq!(color_for_intensity(0.7).rgb(), Rgb::new(255, 50, 20));
        assert_eq!(color_for_intensity(1.0).rgb(), Rgb::new(155, 0, 0));
        assert_eq!(color_for_intensity(3.0).rgb(), Rgb::new(155, 0, 0));
    }

    #[test]
    fn channels_are_truncated() {
        // t = 0.5 -> 227.5, 175, 150
        assert_eq!(color_for_intensity(0.15).to_string(), "rgb(227, 175, 150)");
        // t lands a hair above 0.5, so 100 and 60 floor down
        assert_eq!(color_for_intensity(0.5).to_string(), "rgb(255, 99, 59)");
    }

    #[test]
    fn redness_never_decreases() {
        // green and blue drain out while red stays dominant
        let mut prev = u16::MAX;
        for step in 1..=100 {
            let c = color_for_intensity(step as f64 / 100.0).rgb();
            let cool = c.g as u16 + c.b as u16;
            assert!(cool <= prev, "redness dropped at {step}: {c:?}");
            assert!(c.r >= c.g && c.r >= c.b);
            prev = cool;
        }
    }
}
