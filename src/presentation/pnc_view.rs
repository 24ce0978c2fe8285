//! # Probability and combinatorics panel
//!
//! Result view of `POST /api/analyze/pnc`: summary, a small text sketch of the expression tree, the
//! three-address code coloured by operation, numbered evaluation steps and, for probabilities, a
//! range check.
use crate::api::client::CompilerBackend;
use crate::api::errors::VizError;
use crate::api::wire::PncResponse;
use crate::presentation::analysis_tabs::group_thousands;
use log::{info, warn};
use regex::Regex;
use strum_macros::Display;

pub const EMPTY_PNC_EXPRESSION: &str = "Please enter a PnC expression";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PncKind {
    Probability,
    Combinatorics,
}

/// what a line of intermediate code does, decides its colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CodeTone {
    Factorial,
    Division,
    Product,
    Difference,
    Plain,
}

impl CodeTone {
    /// first match wins: a factorial call beats any operator on the same line
    pub fn classify(line: &str) -> CodeTone {
        if line.contains("fact") {
            CodeTone::Factorial
        } else if line.contains('/') {
            CodeTone::Division
        } else if line.contains('*') {
            CodeTone::Product
        } else if line.contains('-') {
            CodeTone::Difference
        } else {
            CodeTone::Plain
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            CodeTone::Factorial => "#3b82f6",
            CodeTone::Division => "#10b981",
            CodeTone::Product => "#f59e0b",
            CodeTone::Difference => "#ef4444",
            CodeTone::Plain => "#6b7280",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeLine {
    pub text: String,
    pub tone: CodeTone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PncStepView {
    /// 1-based
    pub number: usize,
    pub title: String,
    pub formula: Option<String>,
    pub value: String,
    pub warning: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityCheck {
    pub valid: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PncView {
    pub expression: String,
    pub result: String,
    pub kind: PncKind,
    pub ast_sketch: String,
    pub code: Vec<CodeLine>,
    pub steps: Vec<PncStepView>,
    pub probability: Option<ProbabilityCheck>,
}

/// integral values with thousands separators, everything else with 6 decimals
pub fn format_pnc_number(value: f64) -> String {
    if value.is_finite() && value == value.floor() {
        group_thousands(&format!("{:.0}", value))
    } else {
        format!("{:.6}", value)
    }
}

fn capture_pair(pattern: &str, expression: &str) -> Option<(String, String)> {
    let re = Regex::new(pattern).ok()?;
    let caps = re.captures(expression)?;
    Some((caps.get(1)?.as_str().to_string(), caps.get(2)?.as_str().to_string()))
}

fn ratio_sketch(operator: &str) -> String {
    format!(
        "        Division (/)\n       /           \\\n     {op}            {op}\n    /   \\          /   \\\n   n₁    r₁       n₂    r₂\n\nProbability = P(favorable) / P(total)",
        op = operator
    )
}

fn pair_sketch(operator: &str, n: &str, r: &str, formula: String) -> String {
    format!(
        "        {}\n       /   \\\n      {}     {}\n\nFormula: {}",
        operator, n, r, formula
    )
}

/// Text sketch of the tree for the usual shapes (`nCr(n,r)`, `nPr(n,r)`, `n!` and ratios of them),
/// pretty printed JSON of the tree for anything else.
pub fn ast_sketch(expression: &str, ast: Option<&serde_json::Value>) -> String {
    if expression.contains("nCr") {
        if expression.contains('/') {
            return ratio_sketch("nCr");
        }
        return match capture_pair(r"nCr\((\d+),(\d+)\)", expression) {
            Some((n, r)) => {
                let formula = format!("{}! / ({}! × ({}-{})!)", n, r, n, r);
                pair_sketch("nCr", &n, &r, formula)
            }
            None => expression.to_string(),
        };
    }
    if expression.contains("nPr") {
        if expression.contains('/') {
            return ratio_sketch("nPr");
        }
        return match capture_pair(r"nPr\((\d+),(\d+)\)", expression) {
            Some((n, r)) => {
                let formula = format!("{}! / ({}-{})!", n, n, r);
                pair_sketch("nPr", &n, &r, formula)
            }
            None => expression.to_string(),
        };
    }
    if expression.contains('!') {
        let n = Regex::new(r"(\d+)!")
            .ok()
            .and_then(|re| re.captures(expression).and_then(|c| c.get(1)).map(|m| m.as_str().to_string()));
        return match n {
            Some(n) => format!(
                "    Factorial (!)\n        |\n        {n}\n\nFormula: {n}! = 1 × 2 × 3 × ... × {n}",
                n = n
            ),
            None => expression.to_string(),
        };
    }
    serde_json::to_string_pretty(&ast.unwrap_or(&serde_json::Value::Null)).unwrap_or_default()
}

fn probability_check(result: f64, valid: bool) -> ProbabilityCheck {
    let message = if valid {
        format!("Valid Probability: result {:.6} is within the valid range [0, 1]", result)
    } else {
        format!(
            "Invalid Probability: result {:.6} is outside the valid range [0, 1]. This may indicate an error in the expression or a ratio that is not a probability.",
            result
        )
    };
    ProbabilityCheck { valid, message }
}

/// View for a PnC response, or the message to show when the server refused the expression
pub fn pnc_view(response: &PncResponse) -> Result<PncView, String> {
    if !response.success {
        let reason = response.error.as_deref().unwrap_or("Analysis failed");
        return Err(format!("Error: {}", reason));
    }
    let kind = if response.is_probability {
        PncKind::Probability
    } else {
        PncKind::Combinatorics
    };
    Ok(PncView {
        expression: response.expression.clone(),
        result: format_pnc_number(response.result),
        kind,
        ast_sketch: ast_sketch(&response.expression, response.ast.as_ref()),
        code: response
            .intermediate_code
            .iter()
            .map(|line| CodeLine {
                text: line.clone(),
                tone: CodeTone::classify(line),
            })
            .collect(),
        steps: response
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| PncStepView {
                number: i + 1,
                title: step.step.clone(),
                formula: step.formula.clone().filter(|f| !f.is_empty()),
                value: format!("= {}", format_pnc_number(step.value)),
                warning: step.warning,
            })
            .collect(),
        probability: (kind == PncKind::Probability)
            .then(|| probability_check(response.result, response.probability_valid)),
    })
}

/// PnC panel state: the last successful view
#[derive(Debug, Default)]
pub struct PncPanel {
    view: Option<PncView>,
}

impl PncPanel {
    pub fn view(&self) -> Option<&PncView> {
        self.view.as_ref()
    }

    /// Analyzes `expression`. Failures leave the previous view in place and come back as
    /// `VizError::Domain` carrying the message for the user.
    pub fn analyze(&mut self, backend: &dyn CompilerBackend, expression: &str) -> Result<&PncView, VizError> {
        let expression = expression.trim();
        if expression.is_empty() {
            return Err(VizError::Domain(EMPTY_PNC_EXPRESSION.to_string()));
        }
        info!("PnC analysis of '{}'", expression);
        let response = backend.analyze_pnc(expression).map_err(|e| {
            warn!("PnC request failed: {}", e);
            VizError::Domain(format!("Failed to analyze expression: {}", e))
        })?;
        let view = pnc_view(&response).map_err(VizError::Domain)?;
        Ok(self.view.insert(view))
    }
}
