//! examples of usage of RustedExprViz
/// recorded backend responses and a backend that replays them
pub mod sample_payloads;
/// numbered demos: compile views, object analysis tabs, PnC panel, live backend
pub mod viz_examples;
