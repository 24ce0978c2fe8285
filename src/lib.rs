// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
//! # RustedExprViz
//!
//! Presentation pipeline of an expression compiler front end. The compiler backend sends JSON: a
//! syntax tree, tokens, three-address code, calculus steps, object file analyses. This crate turns
//! those responses into things a screen can show:
//! - `presentation::display_tree` + `presentation::tree_layout`: syntax tree -> tidy tree drawing
//! - `presentation::sampler`: calculus steps -> plot series
//! - `presentation::view_orchestrator`: compile response -> visible panels and their view models
//! - `presentation::analysis_tabs`: build/analyze/compare actions, cached results, tab views
//! - `presentation::pnc_view`: probability and combinatorics results
//!
//! Drawing goes through `presentation::chart_surfaces::ChartBackend`; `Utils::plots` implements it with
//! plotters. `api` holds the wire types and the blocking HTTP client.
pub mod Examples;
pub mod Utils;
pub mod api;
pub mod presentation;
