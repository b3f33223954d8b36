//! Muscle heat map: turns logged sets into a color-coded body diagram and a
//! short front/back balance analysis.

pub mod aggregation;
pub mod balance;
pub mod body;
pub mod body_data;
pub mod colors;
pub mod heat_map;
pub mod intensity;
pub mod markup;
pub mod muscles;
pub mod report;
pub mod settings;
pub mod tag_map;
pub mod tag_resolver;
pub mod tag_source;
pub mod templates;

pub use aggregation::{LogEntry, MuscleGroupRecord, MuscleVolumes, TimeFrame, aggregate, filter_by_time_frame};
pub use balance::{ImbalanceAnalysis, analyze};
pub use body::{Body, BodyOptions, BodyView};
pub use colors::color_for_intensity;
pub use heat_map::{HeatMapOptions, MuscleHeatMap, render};
pub use muscles::MuscleGroup;
pub use tag_resolver::TagResolver;
