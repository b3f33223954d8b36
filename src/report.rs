use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::path::Path;

use crate::aggregation::MuscleVolumes;
use crate::heat_map::HeatMapOptions;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("nothing has been rendered yet")]
    Empty,
}

/// Content of an exported heat map report.
pub struct Report<'a> {
    pub svg_markup: &'a str,
    pub options: HeatMapOptions,
    pub info_text: &'a str,
    pub volumes: &'a MuscleVolumes,
}

trait FormatVolume {
    fn fmt_kg(self) -> String;
}

impl FormatVolume for f64 {
    fn fmt_kg(self) -> String {
        if self > 0.0 {
            format!("{:.0} kg", self)
        } else {
            "-".into()
        }
    }
}

pub fn export_html_report<P: AsRef<Path>>(path: P, report: &Report) -> Result<(), ReportError> {
    if report.svg_markup.is_empty() {
        return Err(ReportError::Empty);
    }
    let path = path.as_ref();
    std::fs::write(path, build_html(report).into_string())?;
    log::info!("Exported report to {}", path.display());
    Ok(())
}

/// Write the drawing alone as a standalone SVG file.
pub fn save_svg<P: AsRef<Path>>(path: P, svg_markup: &str) -> Result<(), ReportError> {
    if svg_markup.is_empty() {
        return Err(ReportError::Empty);
    }
    let mut data = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    data.push_str(svg_markup);
    std::fs::write(path, data)?;
    Ok(())
}

fn build_html(report: &Report) -> Markup {
    let mut rows: Vec<_> = report.volumes.values().collect();
    rows.sort_by(|a, b| b.volume.total_cmp(&a.volume));
    html! {
        (DOCTYPE)
        html {
            head { meta charset="utf-8"; title { "Muscle Heat Map" } }
            body {
                h1 { "Muscle Heat Map" }
                p {
                    "Time frame: " (report.options.time_frame.label())
                    " | View: " (report.options.view.label())
                }
                div class="body-visualization" { (PreEscaped(report.svg_markup)) }
                h2 { "Analysis" }
                p { (report.info_text) }
                h2 { "Volume by muscle group" }
                table border="1" {
                    tr { th { "Muscle group" } th { "Volume" } th { "Intensity" } th { "Exercises" } }
                    @for r in rows {
                        tr {
                            td { (r.name) }
                            td { (r.volume.fmt_kg()) }
                            td { (format!("{:.0}%", r.intensity * 100.0)) }
                            td { (r.exercises.len()) }
                        }
                    }
                }
            }
        }
    }
}
