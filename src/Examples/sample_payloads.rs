//! Response bodies captured from the compiler backend and a `CompilerBackend` that replays them.
//!
//! `CannedBackend` decodes its bodies with the same serde types the HTTP client uses, so a body that
//! the real server would send can be dropped in here as is. It also counts every request it serves,
//! which is what the tab tests use to check that switching tabs stays offline.
use crate::api::client::CompilerBackend;
use crate::api::errors::TransportError;
use crate::api::wire::{
    AnalysisResult, BuildReport, CompileResponse, ComparisonResult, Envelope, HealthStatus, OptLevel,
    PncResponse,
};
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::HashMap;
use strum_macros::{Display, EnumIter};

/// d/dx(x^2) at x = 1
pub const DIFFERENTIATION_RESPONSE: &str = r#"{
  "success": true,
  "expression": "diff(x^2, x, 1)",
  "result": 2.0000000000575113,
  "tokens": [
    {"type": "FUNCTION", "value": "diff"},
    {"type": "LPAREN", "value": "("},
    {"type": "VARIABLE", "value": "x"},
    {"type": "POWER", "value": "^"},
    {"type": "NUMBER", "value": "2", "numValue": 2},
    {"type": "COMMA", "value": ","},
    {"type": "VARIABLE", "value": "x"},
    {"type": "COMMA", "value": ","},
    {"type": "NUMBER", "value": "1", "numValue": 1},
    {"type": "RPAREN", "value": ")"},
    {"type": "END", "value": ""}
  ],
  "postfix": ["x", "2", "^", "diff"],
  "ast": {
    "type": "DIFF_NODE", "variable": "x", "point": 1,
    "expression": {
      "type": "BINARY_OP", "op": "^",
      "left": {"type": "VARIABLE", "name": "x"},
      "right": {"type": "NUMBER", "value": 2}
    }
  },
  "intermediateCode": ["t1 = x ^ 2", "t2 = diff(t1, x, 1)"],
  "calculusType": "differentiation",
  "calculusSteps": [
    {"x": 1.0001, "fx": 1.00020001, "description": "f(1.0001) = 1.0002"},
    {"x": 0.9999, "fx": 0.99980001, "description": "f(0.9999) = 0.9998"},
    {"x": 1, "fx": 2.0000000000575113, "description": "f'(1) ≈ [1.0002 - 0.9998] / 0.0002 = 2"}
  ]
}"#;

/// integral of x^2 over [0, 1] with the trapezoid rule
pub const INTEGRATION_RESPONSE: &str = r#"{
  "success": true,
  "expression": "integrate(x^2, x, 0, 1)",
  "result": 0.33335,
  "tokens": [
    {"type": "FUNCTION", "value": "integrate"},
    {"type": "LPAREN", "value": "("},
    {"type": "VARIABLE", "value": "x"},
    {"type": "POWER", "value": "^"},
    {"type": "NUMBER", "value": "2", "numValue": 2},
    {"type": "RPAREN", "value": ")"}
  ],
  "postfix": ["x", "2", "^", "integrate"],
  "ast": {
    "type": "INTEGRATE_NODE", "variable": "x", "lowerBound": 0, "upperBound": 1,
    "expression": {
      "type": "BINARY_OP", "op": "^",
      "left": {"type": "VARIABLE", "name": "x"},
      "right": {"type": "NUMBER", "value": 2}
    }
  },
  "intermediateCode": ["t1 = x ^ 2", "t2 = integrate(t1, x, 0, 1)"],
  "calculusType": "integration",
  "calculusSteps": [
    {"x": 0, "fx": 0, "description": "f(0) = 0"},
    {"x": 0.01, "fx": 0.0001, "description": "f(0.01) = 0.0001"},
    {"x": 0.02, "fx": 0.0004, "description": "f(0.02) = 0.0004"},
    {"x": 0.03, "fx": 0.0009, "description": "f(0.03) = 0.0009"},
    {"x": 0.04, "fx": 0.0016, "description": "f(0.04) = 0.0016"},
    {"x": 0.99, "fx": 0.9801, "description": "f(0.99) = 0.9801"},
    {"x": 1, "fx": 1, "description": "f(1) = 1"},
    {"x": 0, "fx": 0.33335, "description": "Integral ≈ (0.01/2) × 66.67 = 0.33335"}
  ]
}"#;

/// plain arithmetic, no calculus
pub const ARITHMETIC_RESPONSE: &str = r#"{
  "success": true,
  "expression": "(2 + 3) * sin(0)",
  "result": 0,
  "tokens": [
    {"type": "LPAREN", "value": "("},
    {"type": "NUMBER", "value": "2", "numValue": 2},
    {"type": "PLUS", "value": "+"},
    {"type": "NUMBER", "value": "3", "numValue": 3},
    {"type": "RPAREN", "value": ")"},
    {"type": "MULTIPLY", "value": "*"},
    {"type": "FUNCTION", "value": "sin"},
    {"type": "LPAREN", "value": "("},
    {"type": "NUMBER", "value": "0", "numValue": 0},
    {"type": "RPAREN", "value": ")"}
  ],
  "postfix": ["2", "3", "+", "0", "sin", "*"],
  "ast": {
    "type": "BINARY_OP", "op": "*",
    "left": {
      "type": "BINARY_OP", "op": "+",
      "left": {"type": "NUMBER", "value": 2},
      "right": {"type": "NUMBER", "value": 3}
    },
    "right": {"type": "FUNCTION_CALL", "name": "sin", "arguments": [{"type": "NUMBER", "value": 0}]}
  },
  "intermediateCode": ["t1 = 2 + 3", "t2 = sin(0)", "t3 = t1 * t2"],
  "calculusType": "none"
}"#;

pub const COMPILE_FAILURE_RESPONSE: &str = r#"{"success": false, "error": "Unexpected token ')' at position 4"}"#;

pub const BUILD_RESPONSE: &str = r#"{
  "success": true,
  "data": {
    "built": [
      {"level": "O0", "size": 18432, "file": "calc_O0.o"},
      {"level": "O2", "size": 12288, "file": "calc_O2.o"}
    ]
  }
}"#;

pub const OBJECT_O0_RESPONSE: &str = r#"{
  "success": true,
  "data": {
    "disassembly": {
      "functions": [
        {"address": "0000000000000000", "name": "main", "instructions": [
          {"address": "0", "code": "push   %rbp"},
          {"address": "1", "code": "mov    %rsp,%rbp"},
          {"address": "4", "code": "sub    $0x20,%rsp"},
          {"address": "8", "code": "mov    %edi,-0x14(%rbp)"},
          {"address": "b", "code": "call   20 <main+0x20>"},
          {"address": "10", "code": "leave"},
          {"address": "11", "code": "ret"}
        ]},
        {"address": "0000000000000020", "name": "evaluate", "instructions": [
          {"address": "20", "code": "push   %rbp"},
          {"address": "21", "code": "mov    %rsp,%rbp"},
          {"address": "24", "code": "pop    %rbp"},
          {"address": "25", "code": "ret"}
        ]}
      ],
      "total_functions": 2,
      "total_instructions": 11,
      "instruction_frequency": {"push": 2, "mov": 3, "sub": 1, "call": 1, "leave": 1, "ret": 2, "pop": 1}
    },
    "symbols": {
      "symbols": {
        "global": [
          {"name": "main", "type": "FUNC", "address": "0000000000000000"},
          {"name": "evaluate", "type": "FUNC", "address": "0000000000000020"}
        ],
        "local": [
          {"name": "calc.cpp", "type": "FILE", "address": "0"},
          {"name": ".text", "type": "SECTION", "address": "0000000000000000"}
        ],
        "undefined": [{"name": "printf", "type": "NOTYPE"}],
        "weak": []
      },
      "total_symbols": 5
    },
    "sections": {
      "sections": [
        {"name": ".text", "type": "PROGBITS", "address": "0000000000000000", "offset": "00000040", "size": 2048},
        {"name": ".data", "type": "PROGBITS", "address": "0000000000000000", "offset": "00000840", "size": 16},
        {"name": ".bss", "type": "NOBITS", "address": "0000000000000000", "offset": "00000850", "size": 8},
        {"name": ".rodata", "type": "PROGBITS", "address": "0000000000000000", "offset": "00000850", "size": 512}
      ],
      "total_sections": 4
    },
    "size": {"metrics": {"text": 2048, "data": 16, "bss": 8, "rodata": 512, "total": 2584}}
  }
}"#;

/// -O2 object: symbols came back with an error, the rest is fine
pub const OBJECT_O2_RESPONSE: &str = r#"{
  "success": true,
  "data": {
    "disassembly": {
      "functions": [
        {"address": "0000000000000000", "name": "main", "instructions": [
          {"address": "0", "code": "xor    %eax,%eax"},
          {"address": "2", "code": "ret"}
        ]}
      ],
      "total_functions": 1,
      "total_instructions": 2,
      "instruction_frequency": {"xor": 1, "ret": 1}
    },
    "symbols": {"error": "nm exited with status 1"},
    "sections": {
      "sections": [
        {"name": ".text", "type": "PROGBITS", "address": "0000000000000000", "offset": "00000040", "size": 1200}
      ],
      "total_sections": 1
    },
    "size": {"metrics": {"text": 1200, "data": 8, "bss": 0, "rodata": 256, "total": 1464}}
  }
}"#;

pub const COMPARISON_RESPONSE: &str = r#"{
  "success": true,
  "data": {
    "disassembly": {"O0_instructions": 11, "O2_instructions": 2, "reduction": 9, "reduction_percent": 81.82},
    "size": {
      "O0": {"text": 2048, "data": 16, "bss": 8, "rodata": 512, "total": 2584},
      "O2": {"text": 1200, "data": 8, "bss": 0, "rodata": 256, "total": 1464},
      "reduction": 1120,
      "reduction_percent": 43.34
    },
    "symbols": {"O0_total": 5, "O2_total": 3}
  }
}"#;

pub const PNC_RESPONSE: &str = r#"{
  "success": true,
  "expression": "nCr(5,2)",
  "result": 10,
  "isProbability": false,
  "probabilityValid": true,
  "ast": {"type": "FUNCTION_CALL", "name": "nCr", "arguments": [{"type": "NUMBER", "value": 5}, {"type": "NUMBER", "value": 2}]},
  "intermediateCode": ["t1 = fact(5)", "t2 = fact(2)", "t3 = fact(3)", "t4 = t2 * t3", "t5 = t1 / t4"],
  "steps": [
    {"step": "Compute 5!", "formula": "5!", "value": 120},
    {"step": "Compute 2! * 3!", "formula": "2! * 3!", "value": 12},
    {"step": "Divide", "formula": "120 / 12", "value": 10}
  ]
}"#;

pub const HEALTH_RESPONSE: &str =
    r#"{"status": "healthy", "compiler_path": "/opt/calc/compiler", "compiler_exists": true}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Endpoint {
    Compile,
    Build,
    ObjectO0,
    ObjectO2,
    Optimization,
    Pnc,
    Health,
}

impl Endpoint {
    pub fn object(level: OptLevel) -> Endpoint {
        match level {
            OptLevel::O0 => Endpoint::ObjectO0,
            OptLevel::O2 => Endpoint::ObjectO2,
        }
    }
}

/// `CompilerBackend` answering from memory
#[derive(Debug, Default)]
pub struct CannedBackend {
    bodies: HashMap<Endpoint, Result<String, TransportError>>,
    calls: RefCell<Vec<Endpoint>>,
}

impl CannedBackend {
    /// a backend with no answers at all: every request fails as unreachable
    pub fn empty() -> Self {
        CannedBackend::default()
    }

    /// every endpoint answered with the bodies above, compile answers the differentiation example
    pub fn offline() -> Self {
        CannedBackend::empty()
            .with_body(Endpoint::Compile, DIFFERENTIATION_RESPONSE)
            .with_body(Endpoint::Build, BUILD_RESPONSE)
            .with_body(Endpoint::ObjectO0, OBJECT_O0_RESPONSE)
            .with_body(Endpoint::ObjectO2, OBJECT_O2_RESPONSE)
            .with_body(Endpoint::Optimization, COMPARISON_RESPONSE)
            .with_body(Endpoint::Pnc, PNC_RESPONSE)
            .with_body(Endpoint::Health, HEALTH_RESPONSE)
    }

    pub fn with_body(mut self, endpoint: Endpoint, body: &str) -> Self {
        self.bodies.insert(endpoint, Ok(body.to_string()));
        self
    }

    pub fn with_failure(mut self, endpoint: Endpoint, error: TransportError) -> Self {
        self.bodies.insert(endpoint, Err(error));
        self
    }

    /// requests served so far, in order
    pub fn calls(&self) -> Vec<Endpoint> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn answer<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, TransportError> {
        self.calls.borrow_mut().push(endpoint);
        match self.bodies.get(&endpoint) {
            Some(Ok(body)) => Ok(serde_json::from_str(body)?),
            Some(Err(err)) => Err(err.clone()),
            None => Err(TransportError::Unreachable(format!("no canned answer for {}", endpoint))),
        }
    }
}

impl CompilerBackend for CannedBackend {
    fn compile(&self, _expression: &str) -> Result<CompileResponse, TransportError> {
        self.answer(Endpoint::Compile)
    }

    fn build_objects(&self) -> Result<Envelope<BuildReport>, TransportError> {
        self.answer(Endpoint::Build)
    }

    fn analyze_object(&self, level: OptLevel) -> Result<Envelope<AnalysisResult>, TransportError> {
        self.answer(Endpoint::object(level))
    }

    fn compare_optimizations(&self) -> Result<Envelope<ComparisonResult>, TransportError> {
        self.answer(Endpoint::Optimization)
    }

    fn analyze_pnc(&self, _expression: &str) -> Result<PncResponse, TransportError> {
        self.answer(Endpoint::Pnc)
    }

    fn health(&self) -> Result<HealthStatus, TransportError> {
        self.answer(Endpoint::Health)
    }
}
