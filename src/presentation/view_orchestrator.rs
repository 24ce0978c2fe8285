//! # View orchestrator
//!
//! Decides which result panels are visible after a compile and builds what each visible panel shows.
//!
//! `apply_result` is the pure part: response in, `ViewModel` out. Every call starts from all panels
//! hidden, so nothing from the previous expression leaks into the next one. A failed compile shows the
//! error panel and nothing else. `ViewOrchestrator` is the stateful wrapper which also pushes the
//! AST drawing and the calculus chart into their surfaces.
use crate::Utils::config::VizConfig;
use crate::api::client::CompilerBackend;
use crate::api::errors::TransportError;
use crate::api::wire::{CalculusType, CompileResponse};
use crate::presentation::chart_surfaces::{CalculusChart, ChartSpec, ChartSurfaces, SurfaceId};
use crate::presentation::display_tree::{normalize, number_label};
use crate::presentation::sampler::{PlotSeries, sample};
use crate::presentation::tree_layout::{TreeLayout, layout_with};
use log::{info, warn};
use std::collections::BTreeSet;
use strum_macros::{Display, EnumIter};

pub const COMPILE_FALLBACK_ERROR: &str = "Compilation failed";
pub const EMPTY_EXPRESSION_ERROR: &str = "Please enter an expression";
/// delay between two token badges of the reveal animation
pub const BADGE_STEP_MS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum Panel {
    Result,
    Tokens,
    Postfix,
    Ast,
    Intermediate,
    Calculus,
    Error,
}

/// set of visible panels; the error panel never shares the screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelVisibility {
    shown: BTreeSet<Panel>,
}

impl PanelVisibility {
    pub fn hide_all(&mut self) {
        self.shown.clear();
    }

    pub fn show(&mut self, panel: Panel) {
        if panel == Panel::Error {
            self.shown.clear();
        } else {
            self.shown.remove(&Panel::Error);
        }
        self.shown.insert(panel);
    }

    pub fn is_visible(&self, panel: Panel) -> bool {
        self.shown.contains(&panel)
    }

    /// visible panels in screen order
    pub fn visible(&self) -> Vec<Panel> {
        self.shown.iter().copied().collect()
    }
}

/// token or postfix entry as a badge
#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub text: String,
    /// token type caption, absent for bare postfix strings
    pub caption: Option<String>,
    pub reveal_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalculusView {
    pub kind: CalculusType,
    /// step descriptions, in the order the evaluator produced them
    pub steps: Vec<String>,
    pub warnings: Vec<bool>,
    pub chart: CalculusChart,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewModel {
    pub visibility: PanelVisibility,
    pub result: Option<String>,
    pub tokens: Vec<Badge>,
    pub postfix: Vec<Badge>,
    pub ast: Option<TreeLayout>,
    /// numbered lines, "1. t1 = 2 + 3"
    pub intermediate: Vec<String>,
    pub calculus: Option<CalculusView>,
    pub error: Option<String>,
}

impl ViewModel {
    pub fn error_only(message: &str) -> ViewModel {
        let mut view = ViewModel::default();
        view.visibility.show(Panel::Error);
        view.error = Some(message.to_string());
        view
    }

    pub fn is_visible(&self, panel: Panel) -> bool {
        self.visibility.is_visible(panel)
    }
}

/// Number as the result panel prints it: exponential with 6 fraction digits outside
/// `[1e-4, 1e6]`, otherwise 6 fixed digits with trailing zeros trimmed.
/// ```
/// use RustedExprViz::presentation::view_orchestrator::format_number;
/// assert_eq!(format_number(2.5), "2.5");
/// assert_eq!(format_number(12345678.0), "1.234568e+7");
/// assert_eq!(format_number(0.00001234), "1.234000e-5");
/// ```
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude < 1e-4 || magnitude > 1e6 {
        let formatted = format!("{:.6e}", value);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => format!("{}e+{}", mantissa, exponent),
            _ => formatted,
        };
    }
    let fixed = format!("{:.6}", value);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn badges<'a>(items: impl Iterator<Item = (&'a str, Option<&'a str>)>) -> Vec<Badge> {
    items
        .enumerate()
        .map(|(i, (text, caption))| Badge {
            text: text.to_string(),
            caption: caption.map(str::to_string),
            reveal_delay_ms: i as u64 * BADGE_STEP_MS,
        })
        .collect()
}

fn calculus_chart(series: PlotSeries, result: f64) -> CalculusChart {
    match series {
        PlotSeries::Differentiation { point, curve } => CalculusChart {
            title: "Function and Differentiation Point".to_string(),
            series_label: "f(x)".to_string(),
            marker_label: Some(format!("f'({}) = {:.4}", number_label(point.x), result)),
            x_label_decimals: 2,
            series: PlotSeries::Differentiation { point, curve },
        },
        PlotSeries::Integration { curve } => CalculusChart {
            title: format!("Integration Area = {:.6}", result),
            series_label: "f(x)".to_string(),
            marker_label: None,
            x_label_decimals: 3,
            series: PlotSeries::Integration { curve },
        },
    }
}

/// Builds the view for one compile response. Never touches a surface.
pub fn apply_result(response: &CompileResponse, config: &VizConfig) -> ViewModel {
    if !response.success {
        let message = response
            .error
            .as_deref()
            .filter(|msg| !msg.is_empty())
            .unwrap_or(COMPILE_FALLBACK_ERROR);
        return ViewModel::error_only(message);
    }

    let mut view = ViewModel::default();
    view.visibility.show(Panel::Result);
    view.result = response.result.map(format_number);

    if let Some(tokens) = &response.tokens {
        view.visibility.show(Panel::Tokens);
        view.tokens = badges(tokens.iter().map(|t| (t.value.as_str(), Some(t.kind.as_str()))));
    }
    if let Some(postfix) = &response.postfix {
        view.visibility.show(Panel::Postfix);
        view.postfix = badges(postfix.iter().map(|item| (item.label(), None)));
    }
    if let Some(tree) = normalize(response.ast.as_ref()) {
        view.visibility.show(Panel::Ast);
        view.ast = Some(layout_with(&tree, &config.layout));
    }
    if let Some(code) = &response.intermediate_code {
        view.visibility.show(Panel::Intermediate);
        view.intermediate = code
            .iter()
            .enumerate()
            .map(|(i, line)| format!("{}. {}", i + 1, line))
            .collect();
    }

    // only an explicit "none" hides the panel; a missing or unknown kind is drawn from its steps
    let kind = response.calculus_type.unwrap_or(CalculusType::Other);
    if let Some(steps) = &response.calculus_steps {
        if let Some(series) = sample(kind, steps, &config.sampler) {
            view.visibility.show(Panel::Calculus);
            view.calculus = Some(CalculusView {
                kind,
                steps: steps.iter().map(|s| s.description.clone()).collect(),
                warnings: steps.iter().map(|s| s.warning).collect(),
                chart: calculus_chart(series, response.result.unwrap_or(f64::NAN)),
            });
        }
    }
    view
}

/// Current result view plus the charts drawn for it
pub struct ViewOrchestrator {
    config: VizConfig,
    view: ViewModel,
}

impl ViewOrchestrator {
    pub fn new(config: VizConfig) -> Self {
        ViewOrchestrator {
            config,
            view: ViewModel::default(),
        }
    }

    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    /// Replaces the view with the one for `response` and redraws the AST and calculus surfaces.
    /// A surface whose panel is hidden is cleared. A chart that fails to draw is logged and skipped,
    /// the rest of the view stays usable.
    pub fn present(&mut self, response: &CompileResponse, surfaces: &mut ChartSurfaces) -> &ViewModel {
        self.view = apply_result(response, &self.config);
        match &self.view.ast {
            Some(tree) => {
                if let Err(e) = surfaces.render(SurfaceId::AstTree, &ChartSpec::SyntaxTree(tree.clone())) {
                    warn!("AST drawing failed: {}", e);
                }
            }
            None => surfaces.clear(SurfaceId::AstTree),
        }
        match &self.view.calculus {
            Some(calculus) => {
                if let Err(e) = surfaces.render(SurfaceId::Calculus, &ChartSpec::Calculus(calculus.chart.clone())) {
                    warn!("calculus chart failed: {}", e);
                }
            }
            None => surfaces.clear(SurfaceId::Calculus),
        }
        &self.view
    }

    pub fn show_error(&mut self, message: &str, surfaces: &mut ChartSurfaces) -> &ViewModel {
        surfaces.clear(SurfaceId::AstTree);
        surfaces.clear(SurfaceId::Calculus);
        self.view = ViewModel::error_only(message);
        &self.view
    }

    pub fn apply_transport_failure(&mut self, error: &TransportError, surfaces: &mut ChartSurfaces) -> &ViewModel {
        let message = format!("Network error: {}. Make sure the backend server is running.", error);
        self.show_error(&message, surfaces)
    }

    /// Sends `expression` to the compiler and shows whatever comes back. A blank expression is
    /// rejected before any request is made.
    pub fn compile(
        &mut self,
        backend: &dyn CompilerBackend,
        expression: &str,
        surfaces: &mut ChartSurfaces,
    ) -> &ViewModel {
        let expression = expression.trim();
        if expression.is_empty() {
            return self.show_error(EMPTY_EXPRESSION_ERROR, surfaces);
        }
        info!("compiling '{}'", expression);
        match backend.compile(expression) {
            Ok(response) => self.present(&response, surfaces),
            Err(e) => {
                warn!("compile request failed: {}", e);
                self.apply_transport_failure(&e, surfaces)
            }
        }
    }
}

//////////////////////////////////////////////////////////////////////////////////////
// TESTS
//////////////////////////////////////////////////////////////////////////////////////
