//! JSON contracts of the compiler backend.
//!
//! Every struct mirrors one response body. Fields the server may leave out are `Option` or
//! `#[serde(default)]`: a missing field is "malformed data" and is handled by the views, never by
//! the decoder.
use crate::api::syntax_node::SyntaxNode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumIter, EnumString};

/// optimization level of an analyzed object file
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum OptLevel {
    #[default]
    O0,
    O2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculusType {
    #[default]
    #[serde(rename = "none")]
    NoCalculus,
    Differentiation,
    Integration,
    /// a kind this front end does not know; plotted like an integration
    #[serde(other)]
    Other,
}

/// lexer token as reported by the compiler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "numValue", default, skip_serializing_if = "Option::is_none")]
    pub num_value: Option<f64>,
}

/// postfix entries arrive either as plain strings or as full token objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostfixItem {
    Text(String),
    Token(Token),
}

impl PostfixItem {
    pub fn label(&self) -> &str {
        match self {
            PostfixItem::Text(text) => text,
            PostfixItem::Token(token) => &token.value,
        }
    }
}

/// one evaluated point of a derivative/integral computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculusStep {
    pub x: f64,
    pub fx: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub warning: bool,
}

/// `POST /api/compile`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResponse {
    #[serde(default)]
    pub success: bool,
    pub expression: Option<String>,
    pub result: Option<f64>,
    pub error: Option<String>,
    pub tokens: Option<Vec<Token>>,
    pub postfix: Option<Vec<PostfixItem>>,
    pub operator_stack: Option<Vec<String>>,
    pub ast: Option<SyntaxNode>,
    pub intermediate_code: Option<Vec<String>>,
    pub calculus_type: Option<CalculusType>,
    pub calculus_steps: Option<Vec<CalculusStep>>,
}

/// `{success, data?, error?}` wrapper used by the object analysis endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildReport {
    #[serde(default)]
    pub built: Vec<BuiltObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuiltObject {
    pub level: String,
    #[serde(default)]
    pub size: u64,
    pub file: Option<String>,
}

/// `GET /api/analyze/object?level=..`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisResult {
    pub disassembly: Option<DisassemblyReport>,
    pub symbols: Option<SymbolReport>,
    pub sections: Option<SectionReport>,
    pub size: Option<SizeReport>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisassemblyReport {
    pub error: Option<String>,
    #[serde(default)]
    pub functions: Vec<FunctionDisassembly>,
    #[serde(default)]
    pub total_functions: u64,
    #[serde(default)]
    pub total_instructions: u64,
    #[serde(default)]
    pub instruction_frequency: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FunctionDisassembly {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Instruction {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SymbolReport {
    pub error: Option<String>,
    #[serde(default)]
    pub symbols: SymbolTable,
    #[serde(default)]
    pub total_symbols: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SymbolTable {
    #[serde(default)]
    pub global: Vec<SymbolEntry>,
    #[serde(default)]
    pub local: Vec<SymbolEntry>,
    #[serde(default)]
    pub undefined: Vec<SymbolEntry>,
    #[serde(default)]
    pub weak: Vec<SymbolEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SymbolEntry {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectionReport {
    pub error: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionEntry>,
    #[serde(default)]
    pub total_sections: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionEntry {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub address: String,
    pub offset: Option<String>,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SizeReport {
    pub error: Option<String>,
    pub metrics: Option<SizeMetrics>,
}

/// section sizes in bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SizeMetrics {
    pub text: u64,
    pub data: u64,
    pub bss: u64,
    pub rodata: u64,
    pub total: u64,
}

/// `GET /api/analyze/optimization`. Sub-objects are `{}` when one of the levels failed to analyze.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ComparisonResult {
    pub disassembly: InstructionComparison,
    pub size: SizeComparison,
    pub symbols: Option<SymbolComparison>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InstructionComparison {
    #[serde(rename = "O0_instructions")]
    pub o0_instructions: u64,
    #[serde(rename = "O2_instructions")]
    pub o2_instructions: u64,
    pub reduction: i64,
    pub reduction_percent: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SizeComparison {
    #[serde(rename = "O0")]
    pub o0: SizeMetrics,
    #[serde(rename = "O2")]
    pub o2: SizeMetrics,
    pub reduction: i64,
    pub reduction_percent: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SymbolComparison {
    #[serde(rename = "O0_total")]
    pub o0_total: u64,
    #[serde(rename = "O2_total")]
    pub o2_total: u64,
}

/// `POST /api/analyze/pnc`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PncResponse {
    pub success: bool,
    pub expression: String,
    pub result: f64,
    pub is_probability: bool,
    pub probability_valid: bool,
    pub ast: Option<serde_json::Value>,
    pub intermediate_code: Vec<String>,
    pub steps: Vec<PncStep>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PncStep {
    pub step: String,
    pub formula: Option<String>,
    pub value: f64,
    pub warning: bool,
}

/// `GET /api/health`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HealthStatus {
    pub status: String,
    pub compiler_path: Option<String>,
    pub compiler_exists: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compile_response_minimal() {
        let response: CompileResponse =
            serde_json::from_value(json!({"success": false, "error": "bad token"})).unwrap();
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("bad token"));
        assert!(response.ast.is_none());
        assert!(response.calculus_steps.is_none());
    }

    #[test]
    fn test_compile_response_full() {
        let response: CompileResponse = serde_json::from_value(json!({
            "success": true,
            "result": 4.0,
            "tokens": [{"type": "NUMBER", "value": "2", "numValue": 2.0}],
            "postfix": ["2", {"type": "PLUS", "value": "+"}],
            "ast": {"type": "NUMBER", "value": 2},
            "intermediateCode": ["t1 = 2"],
            "calculusType": "differentiation",
            "calculusSteps": [{"x": 1.0, "fx": 1.0, "description": "f(1) = 1"}]
        }))
        .unwrap();
        assert_eq!(response.calculus_type, Some(CalculusType::Differentiation));
        let postfix = response.postfix.unwrap();
        assert_eq!(postfix[0].label(), "2");
        assert_eq!(postfix[1].label(), "+");
        assert_eq!(response.tokens.unwrap()[0].num_value, Some(2.0));
        assert!(!response.calculus_steps.unwrap()[0].warning);
    }

    #[test]
    fn test_empty_comparison_sections_default() {
        let envelope: Envelope<ComparisonResult> = serde_json::from_value(json!({
            "success": true,
            "data": {"disassembly": {}, "size": {"O0": {"text": 10, "total": 12}, "reduction": 2}, "symbols": {}}
        }))
        .unwrap();
        let data = envelope.data.unwrap();
        assert_eq!(data.disassembly.o0_instructions, 0);
        assert_eq!(data.size.o0.text, 10);
        assert_eq!(data.size.o2.total, 0);
        assert_eq!(data.size.reduction, 2);
    }

    #[test]
    fn test_unknown_calculus_type_still_decodes() {
        let response: CompileResponse = serde_json::from_value(json!({
            "success": true,
            "result": 1.0,
            "calculusType": "limit",
            "calculusSteps": [{"x": 0.0, "fx": 1.0}]
        }))
        .unwrap();
        assert_eq!(response.calculus_type, Some(CalculusType::Other));
        assert_eq!(response.result, Some(1.0));
    }

    #[test]
    fn test_opt_level_round_trips_through_strings() {
        assert_eq!("O2".parse::<OptLevel>().unwrap(), OptLevel::O2);
        assert_eq!(OptLevel::O0.to_string(), "O0");
        assert!("O3".parse::<OptLevel>().is_err());
    }
}
