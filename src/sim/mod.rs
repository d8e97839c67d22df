/// Per-step population statistics.
pub mod aggregate;
/// Step range for bounded and unbounded runs.
pub mod clock;
pub mod controller;
pub mod division;
pub mod environment;
/// Daily peak windows.
pub mod event;
pub mod hub;
pub mod kpi;
pub mod population;
/// Hourly-profile environment source.
pub mod profile;
pub mod types;
pub mod zones;
