//! Front and back body drawings.
//!
//! The templates only place shapes; colors arrive already computed, one per
//! region. Right-hand regions are the left-hand shapes mirrored across the
//! vertical center line.

use maud::{Markup, html};

use crate::colors::HeatColor;

pub const VIEW_WIDTH: f64 = 660.46;
pub const VIEW_HEIGHT: f64 = 1206.46;

const OUTLINE: &str = "#adb5bd";
const SKIN: &str = "#f8f9fa";
const MIRROR: &str = "matrix(-1 0 0 1 660.46 0)";

/// Region fills of the front view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrontViewColors {
    pub traps: HeatColor,
    pub biceps: HeatColor,
    pub forearms: HeatColor,
    pub quads: HeatColor,
    pub calves: HeatColor,
    pub abs: HeatColor,
    pub obliques: HeatColor,
    pub front_shoulders: HeatColor,
    pub upper_chest: HeatColor,
    pub middle_chest: HeatColor,
}

/// Region fills of the back view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackViewColors {
    pub lower_back: HeatColor,
    pub traps: HeatColor,
    pub traps_middle: HeatColor,
    pub lats: HeatColor,
    pub triceps: HeatColor,
    pub forearms: HeatColor,
    pub glutes: HeatColor,
    pub quads: HeatColor,
    pub hamstrings: HeatColor,
    pub calves: HeatColor,
    pub rear_shoulders: HeatColor,
}

fn silhouette() -> Markup {
    html! {
        g class="body-outline" fill=(SKIN) stroke=(OUTLINE) stroke-width="3" {
            ellipse cx="330.23" cy="95" rx="62" ry="78" {}
            rect x="300" y="165" width="60.46" height="45" {}
            path d="M200 225 L460.46 225 L430 420 L420 610 L240.46 610 L230.46 420 Z" {}
            @for transform in ["", MIRROR] {
                g transform=(transform) {
                    path d="M200 225 L150 250 L125 440 L120 640 L165 650 L185 450 L215 330 Z" {}
                    path d="M240.46 600 L325 610 L318 1150 L255 1150 L232 800 Z" {}
                }
            }
        }
    }
}

/// A left/right pair of identical shapes.
fn pair(id: &str, label: &str, fill: HeatColor, shape: Markup) -> Markup {
    html! {
        g class="muscle" id=(id) fill=(fill) stroke=(OUTLINE) stroke-width="2" {
            title { (label) }
            g class="side-left" { (shape) }
            g class="side-right" transform=(MIRROR) { (shape) }
        }
    }
}

/// A single shape straddling the center line.
fn single(id: &str, label: &str, fill: HeatColor, shape: Markup) -> Markup {
    html! {
        g class="muscle" id=(id) fill=(fill) stroke=(OUTLINE) stroke-width="2" {
            title { (label) }
            (shape)
        }
    }
}

fn ellipse(cx: f64, cy: f64, rx: f64, ry: f64) -> Markup {
    html! { ellipse cx=(cx) cy=(cy) rx=(rx) ry=(ry) {} }
}

fn path(d: &str) -> Markup {
    html! { path d=(d) {} }
}

fn caption(text: &str) -> Markup {
    html! {
        text x="330.23" y="1190" text-anchor="middle" font-size="28" fill=(OUTLINE) { (text) }
    }
}

/// Markup of the front view.
pub fn front_view(c: &FrontViewColors) -> String {
    html! {
        (silhouette())
        (pair("traps", "Traps", c.traps, path("M300 205 L245 228 L300 240 Z")))
        (pair("front-shoulders", "Front delts", c.front_shoulders, ellipse(207.0, 262.0, 42.0, 38.0)))
        (pair("upper-chest", "Upper chest", c.upper_chest, path("M248 245 L326 245 L326 300 L244 300 Z")))
        (pair("middle-chest", "Middle chest", c.middle_chest, path("M244 300 L326 300 L326 360 L262 370 Z")))
        (pair("biceps", "Biceps", c.biceps, ellipse(178.0, 370.0, 26.0, 62.0)))
        (pair("forearms", "Forearms", c.forearms, ellipse(155.0, 520.0, 22.0, 72.0)))
        (pair("obliques", "Obliques", c.obliques, path("M252 390 L286 385 L286 560 L248 545 Z")))
        (single("abs", "Abs", c.abs, html! {
            @for row in 0..3 {
                @for col in 0..2 {
                    rect x=((292.0 + col as f64 * 40.0)) y=((385.0 + row as f64 * 60.0))
                        width="36.46" height="54" rx="10" {}
                }
            }
        }))
        (pair("quads", "Quads", c.quads, ellipse(282.0, 760.0, 42.0, 140.0)))
        (pair("calves", "Calves", c.calves, ellipse(280.0, 1010.0, 28.0, 88.0)))
        (caption("Front"))
    }
    .into_string()
}

/// Markup of the back view.
pub fn back_view(c: &BackViewColors) -> String {
    html! {
        (silhouette())
        (single("traps", "Traps", c.traps, path("M330.23 190 L250 232 L410.46 232 Z")))
        (single("traps-middle", "Mid traps", c.traps_middle, path("M330.23 232 L280 262 L330.23 330 L380.46 262 Z")))
        (pair("rear-shoulders", "Rear delts", c.rear_shoulders, ellipse(207.0, 262.0, 42.0, 38.0)))
        (pair("lats", "Lats", c.lats, path("M255 270 L322 330 L322 470 L265 440 Z")))
        (single("lower-back", "Lower back", c.lower_back, html! {
            rect x="295" y="475" width="70.46" height="90" rx="14" {}
        }))
        (pair("triceps", "Triceps", c.triceps, ellipse(182.0, 370.0, 27.0, 64.0)))
        (pair("forearms", "Forearms", c.forearms, ellipse(155.0, 520.0, 22.0, 72.0)))
        (pair("glutes", "Glutes", c.glutes, ellipse(288.0, 640.0, 42.0, 50.0)))
        (pair("quads", "Outer quads", c.quads, ellipse(246.0, 790.0, 12.0, 80.0)))
        (pair("hamstrings", "Hamstrings", c.hamstrings, ellipse(284.0, 805.0, 38.0, 115.0)))
        (pair("calves", "Calves", c.calves, ellipse(280.0, 1010.0, 30.0, 92.0)))
        (caption("Back"))
    }
    .into_string()
}
