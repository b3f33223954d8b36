//! Desktop host: loads a Hevy export and shows the muscle heat map.

use eframe::{App, Frame, NativeOptions, egui};
use rfd::FileDialog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{error, info};

use muscle_heat_map::aggregation::{ALL_TIME_FRAMES, LogEntry};
use muscle_heat_map::body::BodyView;
use muscle_heat_map::heat_map::{HeatMapOptions, MuscleHeatMap};
use muscle_heat_map::markup::{Container, Element, Node};
use muscle_heat_map::report::{self, Report};
use muscle_heat_map::settings::Settings;
use muscle_heat_map::tag_map::TagMap;
use muscle_heat_map::tag_resolver::TagResolver;
use muscle_heat_map::tag_source::NoteTagSource;

const LBS_TO_KG: f64 = 0.453_592;
const TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Deserialize, Clone, Serialize, Default)]
struct RawWorkoutRow {
    title: Option<String>,
    start_time: String,
    end_time: Option<String>,
    description: Option<String>,
    exercise_title: String,
    superset_id: Option<String>,
    exercise_notes: Option<String>,
    set_index: Option<u32>,
    set_type: Option<String>,
    weight_lbs: Option<f64>,
    weight_kg: Option<f64>,
    reps: Option<u32>,
    distance_miles: Option<f64>,
    duration_seconds: Option<f64>,
    rpe: Option<f64>,
}

impl RawWorkoutRow {
    fn custom_fields(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        let mut put = |key: &str, value: Option<String>| {
            if let Some(v) = value.filter(|v| !v.is_empty()) {
                fields.insert(key.to_string(), v);
            }
        };
        put("title", self.title.clone());
        put("end_time", self.end_time.clone());
        put("description", self.description.clone());
        put("superset_id", self.superset_id.clone());
        put("exercise_notes", self.exercise_notes.clone());
        put("set_index", self.set_index.map(|v| v.to_string()));
        put("set_type", self.set_type.clone());
        put("distance_miles", self.distance_miles.map(|v| v.to_string()));
        put("duration_seconds", self.duration_seconds.map(|v| v.to_string()));
        put("rpe", self.rpe.map(|v| v.to_string()));
        fields
    }
}

/// Parse a Hevy workout export into log entries with weights in kilograms.
///
/// Rows that fail to deserialize or carry an unreadable start time are
/// skipped.
fn parse_workout_csv<R: std::io::Read>(reader: R) -> Result<Vec<LogEntry>, csv::Error> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut entries = Vec::new();
    for raw in rdr.deserialize::<RawWorkoutRow>().flatten() {
        let Ok(dt) = chrono::NaiveDateTime::parse_from_str(&raw.start_time, "%d %b %Y, %H:%M")
        else {
            continue;
        };
        let weight = raw
            .weight_kg
            .or_else(|| raw.weight_lbs.map(|lbs| lbs * LBS_TO_KG))
            .unwrap_or(0.0);
        let mut entry = LogEntry::new(
            dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            raw.exercise_title.clone(),
            raw.reps.unwrap_or(0),
            weight,
        );
        entry.custom_fields = raw.custom_fields();
        entries.push(entry);
    }
    Ok(entries)
}

fn build_heat_map(settings: &Settings) -> MuscleHeatMap<NoteTagSource> {
    let tag_map = TagMap::load_or_default(settings.tag_map_csv.as_ref(), &settings.language);
    let source = NoteTagSource::new(settings.exercise_folder.clone());
    MuscleHeatMap::new(TagResolver::new(source, tag_map))
}

#[derive(Debug, Clone, PartialEq)]
enum PanelLine {
    Heading(String),
    Text(String),
    Alert(String),
    Success(String),
}

fn collect_panel_lines(element: &Element, in_warning: bool, out: &mut Vec<PanelLine>) {
    let class = element.attr("class").unwrap_or_default();
    let in_warning = in_warning || class.contains("feedback-warning");
    match element.name.as_str() {
        "h4" => out.push(PanelLine::Heading(element.text())),
        "strong" | "li" if in_warning => out.push(PanelLine::Alert(element.text())),
        "p" if class.is_empty() && !in_warning => out.push(PanelLine::Text(element.text())),
        "div" if class.contains("feedback-success") => {
            out.push(PanelLine::Success(element.text()))
        }
        _ => {
            for child in element.children.iter().filter_map(Node::as_element) {
                collect_panel_lines(child, in_warning, out);
            }
        }
    }
}

/// Flatten the info panel into display lines.
fn panel_lines(panel: &Container) -> Vec<PanelLine> {
    let mut out = Vec::new();
    for node in panel.children() {
        match node {
            Node::Element(e) => collect_panel_lines(&e, false, &mut out),
            Node::Text(t) => out.push(PanelLine::Text(t)),
        }
    }
    out
}

struct HeatMapApp {
    entries: Vec<LogEntry>,
    settings: Settings,
    options: HeatMapOptions,
    heat_map: MuscleHeatMap<NoteTagSource>,
    /// Current drawing as an image URI and its SVG bytes.
    svg: Option<(String, Arc<[u8]>)>,
    svg_revision: u64,
    last_loaded: Option<String>,
    toast: Option<(String, Instant)>,
    show_settings: bool,
    settings_dirty: bool,
}

impl HeatMapApp {
    fn new(cc: &eframe::CreationContext<'_>) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        let settings = Settings::load();
        let options = HeatMapOptions {
            time_frame: settings.time_frame,
            view: settings.view,
        };
        let mut app = Self {
            entries: Vec::new(),
            heat_map: build_heat_map(&settings),
            settings,
            options,
            svg: None,
            svg_revision: 0,
            last_loaded: None,
            toast: None,
            show_settings: false,
            settings_dirty: false,
        };

        if app.settings.auto_load_last {
            if let Some(path) = app.settings.last_file.clone() {
                let p = Path::new(&path);
                if p.exists() {
                    app.load_file(&cc.egui_ctx, p);
                }
            }
        }
        app.refresh(&cc.egui_ctx);
        app
    }

    fn notify(&mut self, message: impl Into<String>) {
        self.toast = Some((message.into(), Instant::now()));
    }

    fn load_file(&mut self, ctx: &egui::Context, path: &Path) {
        let parsed = File::open(path)
            .map_err(csv::Error::from)
            .and_then(parse_workout_csv);
        match parsed {
            Ok(entries) => {
                info!("Loaded {} entries from {}", entries.len(), path.display());
                self.entries = entries;
                self.settings.last_file = Some(path.display().to_string());
                self.settings_dirty = true;
                self.last_loaded = path.file_name().map(|f| f.to_string_lossy().to_string());
                let name = self.last_loaded.clone().unwrap_or_default();
                self.notify(format!("Loaded {name}"));
                self.refresh(ctx);
            }
            Err(e) => {
                error!("Failed to load {}: {e}", path.display());
                self.notify(format!("Failed to load {}", path.display()));
            }
        }
    }

    /// Re-run the pipeline and swap in the new drawing.
    fn refresh(&mut self, ctx: &egui::Context) {
        self.heat_map.render(&self.entries, self.options);
        if let Some((old, _)) = self.svg.take() {
            ctx.forget_image(&old);
        }
        let markup = self.heat_map.svg_markup();
        if markup.is_empty() {
            return;
        }
        self.svg_revision += 1;
        let uri = format!("bytes://muscle-heat-map-{}.svg", self.svg_revision);
        self.svg = Some((uri, Arc::from(markup.into_bytes())));
    }

    fn rebuild_pipeline(&mut self, ctx: &egui::Context) {
        self.heat_map = build_heat_map(&self.settings);
        self.refresh(ctx);
    }

    fn sync_settings_from_app(&mut self) {
        self.settings.time_frame = self.options.time_frame;
        self.settings.view = self.options.view;
    }

    fn export_report(&mut self) {
        let svg = self.heat_map.svg_markup();
        let Some(outcome) = self.heat_map.last_outcome() else {
            return;
        };
        let Some(path) = FileDialog::new()
            .add_filter("HTML", &["html"])
            .set_file_name("muscle_heat_map.html")
            .save_file()
        else {
            return;
        };
        let info_text = self.heat_map.info_panel().text();
        let result = report::export_html_report(
            &path,
            &Report {
                svg_markup: &svg,
                options: outcome.options,
                info_text: &info_text,
                volumes: &outcome.volumes,
            },
        );
        match result {
            Ok(()) => self.notify("Report exported"),
            Err(e) => {
                error!("Failed to export report: {e}");
                self.notify(format!("Export failed: {e}"));
            }
        }
    }

    fn export_svg(&mut self) {
        let Some(path) = FileDialog::new()
            .add_filter("SVG", &["svg"])
            .set_file_name("muscle_heat_map.svg")
            .save_file()
        else {
            return;
        };
        match report::save_svg(&path, &self.heat_map.svg_markup()) {
            Ok(()) => {
                info!("Saved drawing to {}", path.display());
                self.notify("SVG saved");
            }
            Err(e) => {
                error!("Failed to save SVG: {e}");
                self.notify(format!("Export failed: {e}"));
            }
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) -> bool {
        let mut changed = false;
        ui.horizontal(|ui| {
            for frame in ALL_TIME_FRAMES {
                changed |= ui
                    .selectable_value(&mut self.options.time_frame, frame, frame.label())
                    .changed();
            }
            ui.separator();
            for view in [BodyView::Front, BodyView::Back] {
                changed |= ui
                    .selectable_value(&mut self.options.view, view, view.label())
                    .changed();
            }
        });
        changed
    }

    fn settings_window(&mut self, ctx: &egui::Context) {
        let mut open = self.show_settings;
        let mut rebuild = false;
        egui::Window::new("Settings").open(&mut open).show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Exercise notes:");
                let folder = self
                    .settings
                    .exercise_folder
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "-".into());
                ui.label(folder);
                if ui.button("Choose…").clicked() {
                    if let Some(dir) = FileDialog::new().pick_folder() {
                        self.settings.exercise_folder = Some(dir);
                        rebuild = true;
                    }
                }
            });
            ui.horizontal(|ui| {
                ui.label("Tag table:");
                let csv = self
                    .settings
                    .tag_map_csv
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "built-in".into());
                ui.label(csv);
                if ui.button("Choose…").clicked() {
                    if let Some(file) = FileDialog::new().add_filter("CSV", &["csv"]).pick_file() {
                        self.settings.tag_map_csv = Some(file);
                        rebuild = true;
                    }
                }
                if self.settings.tag_map_csv.is_some() && ui.button("Reset").clicked() {
                    self.settings.tag_map_csv = None;
                    rebuild = true;
                }
            });
            ui.horizontal(|ui| {
                ui.label("Language:");
                if ui
                    .text_edit_singleline(&mut self.settings.language)
                    .lost_focus()
                {
                    rebuild = true;
                }
            });
            if ui
                .checkbox(&mut self.settings.auto_load_last, "Load last file on start")
                .changed()
            {
                self.settings_dirty = true;
            }
        });
        self.show_settings = open;
        if rebuild {
            self.settings_dirty = true;
            self.rebuild_pipeline(ctx);
        }
    }

    fn info_panel(&self, ui: &mut egui::Ui) {
        for line in panel_lines(self.heat_map.info_panel()) {
            match line {
                PanelLine::Heading(t) => {
                    ui.heading(t);
                }
                PanelLine::Text(t) => {
                    ui.label(t);
                }
                PanelLine::Alert(t) => {
                    ui.colored_label(egui::Color32::from_rgb(255, 140, 0), t);
                }
                PanelLine::Success(t) => {
                    ui.colored_label(egui::Color32::from_rgb(60, 170, 90), t);
                }
            }
        }
        if let Some(outcome) = self.heat_map.last_outcome() {
            ui.separator();
            ui.small(format!(
                "{} of {} entries in range",
                outcome.entries_in_frame,
                self.entries.len()
            ));
        }
    }
}

impl App for HeatMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        let dropped: Vec<_> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if let Some(path) = dropped.last() {
            self.load_file(ctx, path);
        }

        let mut refresh = false;
        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open CSV…").clicked() {
                        ui.close_menu();
                        if let Some(path) = FileDialog::new().add_filter("CSV", &["csv"]).pick_file() {
                            self.load_file(ctx, &path);
                        }
                    }
                    if ui.button("Export report…").clicked() {
                        ui.close_menu();
                        self.export_report();
                    }
                    if ui.button("Export SVG…").clicked() {
                        ui.close_menu();
                        self.export_svg();
                    }
                    if ui.button("Settings").clicked() {
                        ui.close_menu();
                        self.show_settings = true;
                    }
                });
                if ui.button("Clear tag cache").clicked() {
                    self.heat_map.clear_cache();
                    self.notify("Tag cache cleared");
                    refresh = true;
                }
                if let Some(name) = &self.last_loaded {
                    ui.label(name.clone());
                }
            });
            if self.controls(ui) {
                self.sync_settings_from_app();
                self.settings_dirty = true;
                refresh = true;
            }
        });
        if refresh {
            self.refresh(ctx);
        }

        egui::SidePanel::right("info_panel")
            .min_width(220.0)
            .show(ctx, |ui| self.info_panel(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.entries.is_empty() {
                ui.label("Open or drop a Hevy CSV export to begin.");
            }
            if let Some((uri, bytes)) = &self.svg {
                ui.add(
                    egui::Image::from_bytes(uri.clone(), bytes.clone())
                        .fit_to_exact_size(ui.available_size()),
                );
            }
        });

        if self.show_settings {
            self.settings_window(ctx);
        }

        if self
            .toast
            .as_ref()
            .is_some_and(|(_, start)| start.elapsed() >= TOAST_DURATION)
        {
            self.toast = None;
        }
        if let Some((message, _)) = &self.toast {
            egui::Area::new(egui::Id::new("toast"))
                .anchor(egui::Align2::RIGHT_BOTTOM, [-10.0, -10.0])
                .show(ctx, |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.label(message.as_str());
                    });
                });
            ctx.request_repaint_after(Duration::from_millis(200));
        }

        if self.settings_dirty {
            self.settings.save();
            self.settings_dirty = false;
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.sync_settings_from_app();
        self.settings.save();
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init();
    let options = NativeOptions::default();
    eframe::run_native(
        "Muscle Heat Map",
        options,
        Box::new(|cc| Box::new(HeatMapApp::new(cc))),
    )
}
