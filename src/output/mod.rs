pub mod formatter;

pub use formatter::{
    format_comparison, format_distance_km, format_json, format_personas, format_report,
    should_use_colors,
};
