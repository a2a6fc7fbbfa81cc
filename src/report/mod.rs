//! Report rendering.

pub mod generator;

pub use generator::render_report;
