//! Front/back balance analysis and the text panel shown next to the body.

use maud::{Markup, html};

use crate::aggregation::{MuscleVolumes, total_volume};
use crate::markup::{Container, Node, parse_fragment};
use crate::muscles::MuscleGroup;

/// Relative front/back difference above which an imbalance is reported.
pub const IMBALANCE_THRESHOLD: f64 = 0.3;

pub const FRONT_MUSCLES: [MuscleGroup; 4] = [
    MuscleGroup::Chest,
    MuscleGroup::Abs,
    MuscleGroup::Biceps,
    MuscleGroup::Quads,
];

pub const BACK_MUSCLES: [MuscleGroup; 4] = [
    MuscleGroup::Back,
    MuscleGroup::Triceps,
    MuscleGroup::Hamstrings,
    MuscleGroup::Glutes,
];

pub const TRAINING_ANALYSIS: &str = "Training analysis";
pub const NO_DATA_PERIOD: &str = "No workout data found for the selected time period.";
pub const IMBALANCE_ALERTS: &str = "⚠️ imbalance alerts";
pub const NO_IMBALANCES: &str = "✅ no major muscle imbalances detected";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImbalanceAnalysis {
    /// Mean volume over muscle groups that were trained at all.
    pub avg_volume: f64,
    pub imbalances: Vec<String>,
    pub has_data: bool,
}

/// Summarize `volumes` and flag a front/back imbalance.
pub fn analyze(volumes: &MuscleVolumes) -> ImbalanceAnalysis {
    let trained: Vec<f64> = volumes
        .values()
        .map(|r| r.volume)
        .filter(|v| *v > 0.0)
        .collect();
    if trained.is_empty() {
        return ImbalanceAnalysis::default();
    }

    let avg_volume = trained.iter().sum::<f64>() / trained.len() as f64;
    let mut imbalances = Vec::new();

    let front = total_volume(volumes, &FRONT_MUSCLES);
    let back = total_volume(volumes, &BACK_MUSCLES);
    let max = front.max(back);
    if max > 0.0 && (front - back).abs() / max > IMBALANCE_THRESHOLD {
        let dominant = if front > back { "Front" } else { "Back" };
        imbalances.push(format!(
            "Front-Back imbalance detected ({dominant} dominant)"
        ));
    }

    ImbalanceAnalysis {
        avg_volume,
        imbalances,
        has_data: true,
    }
}

fn panel_markup(analysis: &ImbalanceAnalysis) -> Markup {
    html! {
        @if !analysis.has_data {
            div class="feedback feedback-info" { p { (NO_DATA_PERIOD) } }
        } @else {
            h4 { (TRAINING_ANALYSIS) }
            p { "Average volume: " (format!("{:.0}", analysis.avg_volume)) " kg" }
            @if analysis.imbalances.is_empty() {
                div class="feedback feedback-success" { p { (NO_IMBALANCES) } }
            } @else {
                div class="feedback feedback-warning" {
                    strong { (IMBALANCE_ALERTS) }
                    ul {
                        @for message in &analysis.imbalances {
                            li { (message) }
                        }
                    }
                }
            }
        }
    }
}

/// Replace the content of `panel` with the analysis of `volumes`.
pub fn render_info_panel(panel: &Container, volumes: &MuscleVolumes) -> ImbalanceAnalysis {
    panel.empty();
    let analysis = analyze(volumes);
    match parse_fragment(&panel_markup(&analysis).into_string()) {
        Ok(nodes) => panel.append_all(nodes),
        Err(e) => {
            log::warn!("Failed to build info panel: {e}");
            panel.append(Node::Text(NO_DATA_PERIOD.to_string()));
        }
    }
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::MuscleGroupRecord;
    use crate::muscles::ALL_MUSCLE_GROUPS;
    use std::collections::BTreeSet;

    fn volumes(pairs: &[(MuscleGroup, f64)]) -> MuscleVolumes {
        ALL_MUSCLE_GROUPS
            .iter()
            .map(|m| {
                let volume = pairs
                    .iter()
                    .find(|(p, _)| p == m)
                    .map(|(_, v)| *v)
                    .unwrap_or(0.0);
                (
                    *m,
                    MuscleGroupRecord {
                        name: *m,
                        volume,
                        exercises: BTreeSet::new(),
                        intensity: 0.0,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn no_volume_means_no_data() {
        let a = analyze(&volumes(&[]));
        assert!(!a.has_data);
        assert!(a.imbalances.is_empty());
        assert_eq!(a.avg_volume, 0.0);
    }

    #[test]
    fn front_dominance_is_reported() {
        let a = analyze(&volumes(&[(MuscleGroup::Chest, 100.0), (MuscleGroup::Back, 50.0)]));
        assert!(a.has_data);
        assert_eq!(a.imbalances, vec!["Front-Back imbalance detected (Front dominant)"]);
        assert_eq!(a.avg_volume, 75.0);
    }

    #[test]
    fn back_dominance_is_reported() {
        let a = analyze(&volumes(&[(MuscleGroup::Quads, 20.0), (MuscleGroup::Glutes, 80.0)]));
        assert_eq!(a.imbalances, vec!["Front-Back imbalance detected (Back dominant)"]);
    }

    #[test]
    fn small_difference_is_balanced() {
        let a = analyze(&volumes(&[(MuscleGroup::Chest, 100.0), (MuscleGroup::Back, 80.0)]));
        assert!(a.has_data);
        assert!(a.imbalances.is_empty());
    }

    #[test]
    fn groups_outside_front_and_back_only_affect_average() {
        let a = analyze(&volumes(&[(MuscleGroup::Calves, 300.0)]));
        assert!(a.has_data);
        assert!(a.imbalances.is_empty());
        assert_eq!(a.avg_volume, 300.0);
    }

    #[test]
    fn panel_shows_empty_state() {
        let panel = Container::new();
        render_info_panel(&panel, &volumes(&[]));
        assert_eq!(panel.text(), NO_DATA_PERIOD);
    }

    #[test]
    fn panel_lists_alerts() {
        let panel = Container::new();
        render_info_panel(
            &panel,
            &volumes(&[(MuscleGroup::Chest, 100.4), (MuscleGroup::Back, 50.0)]),
        );
        let text = panel.text();
        assert!(text.starts_with("Training analysis"));
        assert!(text.contains("Average volume: 75 kg"));
        assert!(text.contains(IMBALANCE_ALERTS));
        assert!(text.contains("(Front dominant)"));
        assert!(!text.contains(NO_IMBALANCES));
    }

    #[test]
    fn panel_replaces_previous_content() {
        let panel = Container::new();
        render_info_panel(&panel, &volumes(&[]));
        render_info_panel(
            &panel,
            &volumes(&[(MuscleGroup::Chest, 100.0), (MuscleGroup::Back, 90.0)]),
        );
        let text = panel.text();
        assert!(text.contains(NO_IMBALANCES));
        assert!(!text.contains(NO_DATA_PERIOD));
    }
}
