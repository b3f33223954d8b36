//! Pipeline wiring: filter, aggregate, draw, analyze.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::aggregation::{LogEntry, MuscleVolumes, TimeFrame, aggregate, filter_by_time_frame_at};
use crate::balance::{ImbalanceAnalysis, render_info_panel};
use crate::body::{Body, BodyOptions, BodyView};
use crate::body_data::BodyData;
use crate::markup::{Container, Element, Node};
use crate::tag_resolver::TagResolver;
use crate::tag_source::TagSource;

pub const WIDGET_CLASS: &str = "workout-muscle-heatmap";
pub const CANVAS_CLASS: &str = "workout-heatmap-canvas-container";
pub const INFO_PANEL_CLASS: &str = "workout-heatmap-info-panel";

/// User-selectable controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeatMapOptions {
    pub time_frame: TimeFrame,
    pub view: BodyView,
}

/// Pipeline output computed for one ticket, not yet drawn.
#[derive(Debug, Clone)]
pub struct PreparedRender {
    ticket: u64,
    options: HeatMapOptions,
    entries_in_frame: usize,
    volumes: MuscleVolumes,
    body_data: BodyData,
}

/// What the last committed render showed.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub options: HeatMapOptions,
    pub entries_in_frame: usize,
    pub volumes: MuscleVolumes,
    pub analysis: ImbalanceAnalysis,
    /// Divisor used for the region colors.
    pub max_value: f64,
}

fn run_pipeline<S: TagSource>(
    resolver: &mut TagResolver<S>,
    entries: &[LogEntry],
    options: HeatMapOptions,
    now: NaiveDateTime,
) -> (usize, MuscleVolumes, BodyData) {
    let filtered = filter_by_time_frame_at(entries, options.time_frame, now);
    log::debug!(
        "Rendering {} view for {}: {} of {} entries in range",
        options.view.label(),
        options.time_frame.label(),
        filtered.len(),
        entries.len()
    );
    let volumes = aggregate(&filtered, resolver);
    let body_data = BodyData::from_muscle_volumes(&volumes);
    (filtered.len(), volumes, body_data)
}

fn draw(
    canvas: &Container,
    info: &Container,
    view: BodyView,
    volumes: &MuscleVolumes,
    body_data: BodyData,
) -> (ImbalanceAnalysis, f64) {
    let max_value = body_data.max_value();
    let mut body = Body::new(
        body_data,
        BodyOptions {
            view,
            show_labels: true,
            max_value,
        },
    );
    body.render(canvas);
    let analysis = render_info_panel(info, volumes);
    (analysis, max_value)
}

/// Heat map widget state kept for one session.
///
/// Every render takes a ticket from a monotonically increasing generation
/// counter. Results are only drawn while their ticket is still the newest, so
/// a slow render finishing after a newer one never overwrites it.
pub struct MuscleHeatMap<S> {
    resolver: TagResolver<S>,
    canvas: Container,
    info: Container,
    generation: u64,
    last: Option<RenderOutcome>,
}

impl<S: TagSource> MuscleHeatMap<S> {
    pub fn new(resolver: TagResolver<S>) -> Self {
        let canvas = Container::new();
        canvas.add_class(CANVAS_CLASS);
        let info = Container::new();
        info.add_class(INFO_PANEL_CLASS);
        Self {
            resolver,
            canvas,
            info,
            generation: 0,
            last: None,
        }
    }

    pub fn canvas(&self) -> &Container {
        &self.canvas
    }

    pub fn info_panel(&self) -> &Container {
        &self.info
    }

    pub fn resolver(&self) -> &TagResolver<S> {
        &self.resolver
    }

    /// Ticket of the newest render started so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_outcome(&self) -> Option<&RenderOutcome> {
        self.last.as_ref()
    }

    /// Drop cached tags so the next render re-reads exercise notes.
    pub fn clear_cache(&mut self) {
        self.resolver.clear_cache();
    }

    /// Start a render and run the pipeline without touching the containers.
    pub fn prepare(&mut self, entries: &[LogEntry], options: HeatMapOptions) -> PreparedRender {
        self.prepare_at(entries, options, Local::now().naive_local())
    }

    pub fn prepare_at(
        &mut self,
        entries: &[LogEntry],
        options: HeatMapOptions,
        now: NaiveDateTime,
    ) -> PreparedRender {
        self.generation += 1;
        let ticket = self.generation;
        log::debug!("Starting render {ticket}");
        let (entries_in_frame, volumes, body_data) =
            run_pipeline(&mut self.resolver, entries, options, now);
        PreparedRender {
            ticket,
            options,
            entries_in_frame,
            volumes,
            body_data,
        }
    }

    /// Draw `prepared` unless a newer render has started since. Returns
    /// whether anything was drawn.
    pub fn commit(&mut self, prepared: PreparedRender) -> bool {
        if prepared.ticket != self.generation {
            log::debug!(
                "Discarding stale render {} (latest is {})",
                prepared.ticket,
                self.generation
            );
            return false;
        }
        let PreparedRender {
            options,
            entries_in_frame,
            volumes,
            body_data,
            ..
        } = prepared;
        let (analysis, max_value) = draw(&self.canvas, &self.info, options.view, &volumes, body_data);
        self.last = Some(RenderOutcome {
            options,
            entries_in_frame,
            volumes,
            analysis,
            max_value,
        });
        true
    }

    /// Re-run the whole pipeline and replace the canvas and info panel.
    pub fn render(&mut self, entries: &[LogEntry], options: HeatMapOptions) -> bool {
        let prepared = self.prepare(entries, options);
        self.commit(prepared)
    }

    pub fn render_at(
        &mut self,
        entries: &[LogEntry],
        options: HeatMapOptions,
        now: NaiveDateTime,
    ) -> bool {
        let prepared = self.prepare_at(entries, options, now);
        self.commit(prepared)
    }

    /// Markup of the current drawing, empty before the first render.
    pub fn svg_markup(&self) -> String {
        self.canvas
            .first_element()
            .map(|svg| svg.to_markup())
            .unwrap_or_default()
    }
}

fn section(class: &str, content: &Container) -> Node {
    let mut div = Element::new("div").with_attr("class", class);
    div.children = content.children();
    Node::Element(div)
}

/// One-shot render of the whole widget into `container`.
///
/// The container ends up holding the body drawing followed by the info
/// panel. Nothing is returned and nothing fails: missing tags and broken
/// markup only degrade the output.
pub fn render<S: TagSource>(
    container: &Container,
    entries: &[LogEntry],
    options: HeatMapOptions,
    resolver: &mut TagResolver<S>,
) {
    render_at(container, entries, options, resolver, Local::now().naive_local());
}

pub fn render_at<S: TagSource>(
    container: &Container,
    entries: &[LogEntry],
    options: HeatMapOptions,
    resolver: &mut TagResolver<S>,
    now: NaiveDateTime,
) {
    let (_, volumes, body_data) = run_pipeline(resolver, entries, options, now);
    let canvas = Container::new();
    let info = Container::new();
    draw(&canvas, &info, options.view, &volumes, body_data);

    container.empty();
    container.add_class(WIDGET_CLASS);
    container.append(section(CANVAS_CLASS, &canvas));
    container.append(section(INFO_PANEL_CLASS, &info));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::{NO_DATA_PERIOD, NO_IMBALANCES};
    use crate::muscles::MuscleGroup;
    use crate::tag_map::TagMap;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn resolver() -> TagResolver<HashMap<String, Vec<String>>> {
        let source = HashMap::from([
            ("Bench Press".to_string(), vec!["chest".to_string(), "triceps".to_string()]),
            ("Deadlift".to_string(), vec!["back".to_string(), "hamstrings".to_string()]),
        ]);
        TagResolver::new(source, TagMap::default())
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn entries() -> Vec<LogEntry> {
        vec![
            LogEntry::new("2024-05-09T18:00:00", "Bench Press", 10, 80.0),
            LogEntry::new("2024-04-20", "Deadlift", 5, 200.0),
        ]
    }

    fn fill(map: &MuscleHeatMap<HashMap<String, Vec<String>>>, id: &str) -> String {
        map.canvas()
            .first_element()
            .and_then(|svg| svg.find_by_id(id).and_then(|e| e.attr("fill")).map(str::to_string))
            .unwrap_or_default()
    }

    #[test]
    fn week_render_only_counts_recent_entries() {
        let mut map = MuscleHeatMap::new(resolver());
        assert!(map.render_at(&entries(), HeatMapOptions::default(), now()));

        let outcome = map.last_outcome().unwrap();
        assert_eq!(outcome.entries_in_frame, 1);
        assert_eq!(outcome.volumes[&MuscleGroup::Chest].volume, 800.0);
        assert_eq!(outcome.volumes[&MuscleGroup::Back].volume, 0.0);
        // triceps 800 halved per side beats the 320 of the upper chest
        assert_eq!(outcome.max_value, 400.0);
        assert_eq!(
            fill(&map, "upper-chest"),
            crate::colors::color_for_intensity(0.8).to_string()
        );
        assert!(map.info_panel().text().contains(NO_IMBALANCES));
    }

    #[test]
    fn month_render_includes_older_entries() {
        let mut map = MuscleHeatMap::new(resolver());
        let options = HeatMapOptions {
            time_frame: TimeFrame::Month,
            view: BodyView::Back,
        };
        map.render_at(&entries(), options, now());
        let outcome = map.last_outcome().unwrap();
        assert_eq!(outcome.entries_in_frame, 2);
        assert_eq!(outcome.volumes[&MuscleGroup::Hamstrings].volume, 1000.0);
        assert!(map.canvas().first_element().unwrap().find_by_id("lats").is_some());
    }

    #[test]
    fn empty_window_renders_gray_body_and_empty_state() {
        let mut map = MuscleHeatMap::new(resolver());
        let later = now() + chrono::Duration::days(400);
        map.render_at(&entries(), HeatMapOptions::default(), later);
        assert_eq!(fill(&map, "upper-chest"), "#e9ecef");
        assert_eq!(map.info_panel().text(), NO_DATA_PERIOD);
        assert!(!map.last_outcome().unwrap().analysis.has_data);
    }

    #[test]
    fn stale_render_is_discarded() {
        let mut map = MuscleHeatMap::new(resolver());
        let week = map.prepare_at(&entries(), HeatMapOptions::default(), now());
        let back = map.prepare_at(
            &entries(),
            HeatMapOptions {
                time_frame: TimeFrame::Year,
                view: BodyView::Back,
            },
            now(),
        );
        assert_eq!(map.generation(), 2);

        assert!(map.commit(back));
        assert!(!map.commit(week));
        let outcome = map.last_outcome().unwrap();
        assert_eq!(outcome.options.view, BodyView::Back);
        assert!(map.canvas().first_element().unwrap().find_by_id("lats").is_some());
    }

    #[test]
    fn rerender_replaces_canvas() {
        let mut map = MuscleHeatMap::new(resolver());
        map.render_at(&entries(), HeatMapOptions::default(), now());
        map.render_at(&entries(), HeatMapOptions::default(), now());
        assert_eq!(map.canvas().len(), 1);
        assert!(map.svg_markup().starts_with("<svg"));
    }

    #[test]
    fn cache_survives_renders_until_cleared() {
        let mut map = MuscleHeatMap::new(resolver());
        map.render_at(&entries(), HeatMapOptions::default(), now());
        map.render_at(
            &entries(),
            HeatMapOptions {
                time_frame: TimeFrame::Year,
                ..HeatMapOptions::default()
            },
            now(),
        );
        assert_eq!(map.resolver().cached_exercises(), 2);
        map.clear_cache();
        assert_eq!(map.resolver().cached_exercises(), 0);
    }

    #[test]
    fn one_shot_render_fills_container() {
        let container = Container::new();
        let mut resolver = resolver();
        render_at(&container, &entries(), HeatMapOptions::default(), &mut resolver, now());

        assert!(container.has_class(WIDGET_CLASS));
        assert_eq!(container.len(), 2);
        let children = container.children();
        let canvas = children[0].as_element().unwrap();
        assert_eq!(canvas.attr("class"), Some(CANVAS_CLASS));
        assert!(canvas.find_by_id("abs").is_some());
        assert!(container.text().contains("Training analysis"));
    }
}
