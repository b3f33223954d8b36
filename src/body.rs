use serde::{Deserialize, Serialize};

use crate::body_data::{BodyData, BodyDataPatch, BodyPart};
use crate::colors::{HeatColor, color_for_intensity};
use crate::intensity::IntensityNormalizer;
use crate::markup::{Container, Element, Node, SVG_NS, parse_fragment};
use crate::templates::{
    BackViewColors, FrontViewColors, VIEW_HEIGHT, VIEW_WIDTH, back_view, front_view,
};

/// Which side of the body is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyView {
    #[default]
    Front,
    Back,
}

impl BodyView {
    pub fn label(self) -> &'static str {
        match self {
            BodyView::Front => "Front",
            BodyView::Back => "Back",
        }
    }
}

/// Turns region values into per-region colors for one view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewDataPreparer {
    normalizer: IntensityNormalizer,
}

impl ViewDataPreparer {
    pub fn new(max_value: f64) -> Self {
        Self {
            normalizer: IntensityNormalizer::new(max_value),
        }
    }

    pub fn set_max_value(&mut self, max_value: f64) {
        self.normalizer.set_max_value(max_value);
    }

    pub fn max_value(&self) -> f64 {
        self.normalizer.max_value()
    }

    fn single(&self, data: &BodyData, part: BodyPart, field: &str) -> HeatColor {
        color_for_intensity(self.normalizer.normalize(data.value(part, field)))
    }

    fn bilateral(&self, data: &BodyData, part: BodyPart, left: &str, right: &str) -> HeatColor {
        color_for_intensity(
            self.normalizer
                .normalize_bilateral(data.value(part, left), data.value(part, right)),
        )
    }

    fn average(&self, data: &BodyData, part: BodyPart, fields: &[&str]) -> HeatColor {
        let values: Vec<f64> = fields.iter().map(|f| data.value(part, f)).collect();
        color_for_intensity(self.normalizer.normalize_average(&values))
    }

    pub fn prepare_front_view_data(&self, data: &BodyData) -> FrontViewColors {
        use BodyPart::*;
        FrontViewColors {
            traps: self.single(data, Back, "traps"),
            biceps: self.bilateral(data, Arms, "biceps_left", "biceps_right"),
            forearms: self.bilateral(data, Arms, "forearms_left", "forearms_right"),
            quads: self.bilateral(data, Legs, "quads_left", "quads_right"),
            calves: self.bilateral(data, Legs, "calves_left", "calves_right"),
            abs: self.single(data, Core, "abs"),
            obliques: self.single(data, Core, "obliques"),
            front_shoulders: self.bilateral(data, Shoulders, "front_left", "front_right"),
            upper_chest: self.single(data, Chest, "upper"),
            middle_chest: self.average(data, Chest, &["middle", "lower"]),
        }
    }

    pub fn prepare_back_view_data(&self, data: &BodyData) -> BackViewColors {
        use BodyPart::*;
        BackViewColors {
            lower_back: self.single(data, Back, "lower_back"),
            traps: self.single(data, Back, "traps"),
            traps_middle: self.single(data, Back, "traps_middle"),
            lats: self.single(data, Back, "lats"),
            triceps: self.bilateral(data, Arms, "triceps_left", "triceps_right"),
            forearms: self.bilateral(data, Arms, "forearms_left", "forearms_right"),
            glutes: self.bilateral(data, Legs, "glutes_left", "glutes_right"),
            quads: self.bilateral(data, Legs, "quads_left", "quads_right"),
            hamstrings: self.bilateral(data, Legs, "hamstrings_left", "hamstrings_right"),
            calves: self.bilateral(data, Legs, "calves_left", "calves_right"),
            rear_shoulders: self.bilateral(data, Shoulders, "rear_left", "rear_right"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyOptions {
    pub view: BodyView,
    pub show_labels: bool,
    pub max_value: f64,
}

impl Default for BodyOptions {
    fn default() -> Self {
        Self {
            view: BodyView::Front,
            show_labels: true,
            max_value: 1000.0,
        }
    }
}

/// Anatomical heat map of one body-data snapshot.
///
/// Every change re-renders the whole drawing into the container used by the
/// last [`Body::render`] call.
#[derive(Debug)]
pub struct Body {
    data: BodyData,
    options: BodyOptions,
    preparer: ViewDataPreparer,
    container: Option<Container>,
}

impl Body {
    pub fn new(data: BodyData, options: BodyOptions) -> Self {
        Self {
            data,
            preparer: ViewDataPreparer::new(options.max_value),
            options,
            container: None,
        }
    }

    /// Snapshot of the current region values.
    pub fn body_data(&self) -> BodyData {
        self.data.clone()
    }

    /// Replace the content of `container` with the current view.
    ///
    /// Malformed template output leaves an empty drawing behind and is only
    /// logged.
    pub fn render(&mut self, container: &Container) {
        self.container = Some(container.clone());
        let content = match self.options.view {
            BodyView::Front => front_view(&self.preparer.prepare_front_view_data(&self.data)),
            BodyView::Back => back_view(&self.preparer.prepare_back_view_data(&self.data)),
        };
        let content = if self.options.show_labels {
            content
        } else {
            strip_titles(&content)
        };
        draw_view(container, self.options.view, &content);
    }

    fn rerender(&mut self) {
        if let Some(container) = self.container.clone() {
            self.render(&container);
        }
    }

    pub fn set_view(&mut self, view: BodyView) {
        self.options.view = view;
        self.rerender();
    }

    pub fn set_max_value(&mut self, max_value: f64) {
        self.options.max_value = max_value;
        self.preparer.set_max_value(max_value);
        self.rerender();
    }

    /// Merge `patch` into the current data and redraw.
    pub fn update_body_data(&mut self, patch: &BodyDataPatch) {
        self.data.merge(patch);
        self.rerender();
    }
}

fn draw_view(container: &Container, view: BodyView, content: &str) {
    container.empty();
    container.add_class("body-visualization");

    let mut svg = Element::new("svg")
        .with_attr("xmlns", SVG_NS)
        .with_attr("viewBox", format!("0 0 {VIEW_WIDTH} {VIEW_HEIGHT}"))
        .with_attr("preserveAspectRatio", "xMidYMid meet")
        .with_attr("class", "body-svg");

    match parse_fragment(content) {
        Ok(nodes) => svg.children.extend(nodes),
        Err(e) => log::warn!("Discarding {} view: {e}", view.label()),
    }
    container.append(Node::Element(svg));
}

fn strip_titles(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;
    while let Some(start) = rest.find("<title>") {
        out.push_str(&rest[..start]);
        match rest[start..].find("</title>") {
            Some(end) => rest = &rest[start + end + "</title>".len()..],
            None => {
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::Rgb;

    fn svg_of(container: &Container) -> Element {
        container.first_element().expect("svg root")
    }

    fn fill_of(container: &Container, id: &str) -> String {
        svg_of(container)
            .find_by_id(id)
            .and_then(|e| e.attr("fill"))
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn all_zero_snapshot_renders_gray() {
        let data = BodyData::default();
        let mut body = Body::new(
            data.clone(),
            BodyOptions {
                max_value: data.max_value(),
                ..BodyOptions::default()
            },
        );
        let container = Container::new();
        body.render(&container);

        assert_eq!(container.len(), 1);
        let svg = svg_of(&container);
        assert_eq!(svg.attr("viewBox"), Some("0 0 660.46 1206.46"));
        assert_eq!(fill_of(&container, "abs"), "#e9ecef");
        assert_eq!(fill_of(&container, "quads"), "#e9ecef");
        assert!(container.has_class("body-visualization"));
    }

    #[test]
    fn outlier_scales_other_regions() {
        let mut data = BodyData::default();
        data.set_field(BodyPart::Core, "abs", 10_000.0);
        data.set_field(BodyPart::Arms, "biceps_left", 5_000.0);
        data.set_field(BodyPart::Arms, "biceps_right", 100.0);
        let mut body = Body::new(
            data.clone(),
            BodyOptions {
                max_value: data.max_value(),
                ..BodyOptions::default()
            },
        );
        let container = Container::new();
        body.render(&container);

        assert_eq!(fill_of(&container, "abs"), "rgb(155, 0, 0)");
        // 0.5 of the outlier
        assert_eq!(fill_of(&container, "biceps"), "rgb(255, 99, 59)");
    }

    #[test]
    fn set_view_rerenders_into_same_container() {
        let mut body = Body::new(BodyData::default(), BodyOptions::default());
        let container = Container::new();
        body.render(&container);
        assert!(svg_of(&container).find_by_id("upper-chest").is_some());

        body.set_view(BodyView::Back);
        assert_eq!(container.len(), 1);
        let svg = svg_of(&container);
        assert!(svg.find_by_id("upper-chest").is_none());
        assert!(svg.find_by_id("lats").is_some());
    }

    #[test]
    fn render_is_idempotent() {
        let mut body = Body::new(BodyData::default(), BodyOptions::default());
        let container = Container::new();
        body.render(&container);
        let first = container.to_markup();
        body.render(&container);
        assert_eq!(container.to_markup(), first);
    }

    #[test]
    fn update_body_data_merges_and_redraws() {
        let mut body = Body::new(
            BodyData::default(),
            BodyOptions {
                max_value: 100.0,
                ..BodyOptions::default()
            },
        );
        let container = Container::new();
        body.render(&container);
        body.update_body_data(&BodyDataPatch::new().set(BodyPart::Chest, "upper", 100.0));
        assert_eq!(fill_of(&container, "upper-chest"), "rgb(155, 0, 0)");
        assert_eq!(body.body_data().value(BodyPart::Chest, "upper"), 100.0);
    }

    #[test]
    fn middle_chest_averages_middle_and_lower() {
        let mut data = BodyData::default();
        data.set_field(BodyPart::Chest, "middle", 60.0);
        data.set_field(BodyPart::Chest, "lower", 0.0);
        let colors = ViewDataPreparer::new(100.0).prepare_front_view_data(&data);
        assert_eq!(colors.middle_chest, color_for_intensity(0.3));
        assert_eq!(colors.middle_chest.rgb(), Rgb::new(255, 150, 100));
    }

    #[test]
    fn labels_can_be_hidden() {
        let mut body = Body::new(
            BodyData::default(),
            BodyOptions {
                show_labels: false,
                ..BodyOptions::default()
            },
        );
        let container = Container::new();
        body.render(&container);
        assert!(!container.to_markup().contains("<title>"));
        assert!(svg_of(&container).find_by_id("abs").is_some());
    }

    #[test]
    fn set_max_value_rescales() {
        let mut data = BodyData::default();
        data.set_field(BodyPart::Chest, "upper", 100.0);
        let mut body = Body::new(data, BodyOptions::default());
        let container = Container::new();
        body.render(&container);
        assert_ne!(fill_of(&container, "upper-chest"), "rgb(155, 0, 0)");

        body.set_max_value(100.0);
        assert_eq!(fill_of(&container, "upper-chest"), "rgb(155, 0, 0)");
    }

    #[test]
    fn malformed_view_leaves_empty_svg() {
        let container = Container::new();
        container.append(Node::Text("stale".into()));
        draw_view(&container, BodyView::Front, "<g><path></g>");

        assert_eq!(container.len(), 1);
        let svg = svg_of(&container);
        assert_eq!(svg.name, "svg");
        assert_eq!(svg.attr("class"), Some("body-svg"));
        assert!(svg.children.is_empty());
        assert!(container.has_class("body-visualization"));
    }

    #[test]
    fn strips_titles() {
        assert_eq!(strip_titles("<g><title>x</title><path/></g>"), "<g><path/></g>");
        assert_eq!(strip_titles("<g><title>x"), "<g>");
    }
}
