// `rd-dashboard` library crate.
//
// The pipeline (load → filter → aggregate / smooth / forecast) is plain
// functions over plain values; the egui front-end in `app` and `ui`
// only draws what `pipeline::DashboardSnapshot` computes.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod forecast;
pub mod pipeline;
pub mod state;
pub mod ui;
