//! different utility modules used throughout the project
/// TOML configuration: backend address, layout geometry, sampler, analysis, logging, output
pub mod config;
/// console + file logger (simplelog)
pub mod logger;
/// plotters adapter writing the charts as SVG files
pub mod plots;
