//! # Object file analysis
//!
//! State machine behind the analysis page: four actions talking to the backend (build the object
//! files, analyze the -O0 or the -O2 object, compare the two) and five tabs showing what the actions
//! brought back.
//!
//! Rules:
//! - results live in `AnalysisCache` until replaced; they never expire and are only filled by an action
//!   (or `record_analysis`)
//! - switching tabs only reads the cache. `switch_tab` does not even get a backend, so it cannot
//!   reach the network
//! - an action disables its control for the duration of the request. A `BusyGuard` re-enables it when
//!   dropped, on every exit path
//! - analyze and compare stay locked until the first build succeeded
//! - a sub-object that is missing or carries an `error` renders as a placeholder in its own tab; the
//!   other tabs are unaffected
use crate::Utils::config::AnalysisSettings;
use crate::api::client::CompilerBackend;
use crate::api::errors::VizError;
use crate::api::wire::{
    AnalysisResult, ComparisonResult, DisassemblyReport, OptLevel, SectionReport, SizeMetrics, SizeReport,
    SymbolEntry, SymbolReport,
};
use crate::presentation::chart_surfaces::{BarChart, BarDataset, ChartSpec, ChartSurfaces, SurfaceId};
use crate::presentation::display_tree::number_label;
use itertools::Itertools;
use log::{info, warn};
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

pub const NO_DISASSEMBLY: &str = "No disassembly data";
pub const NO_SYMBOLS: &str = "No symbols";
pub const NO_SECTIONS: &str = "No sections data";
pub const NO_METRICS: &str = "No metrics data";
pub const NO_COMPARISON: &str = "No comparison data";

const BLUE: &str = "#3b82f6";
const GREEN: &str = "#10b981";
const AMBER: &str = "#f59e0b";
const PURPLE: &str = "#8b5cf6";
const RED: &str = "#ef4444";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum AnalysisTab {
    Disassembly,
    Symbols,
    Sections,
    Metrics,
    Comparison,
}

impl AnalysisTab {
    /// surfaces the tab draws into
    pub fn surfaces(&self) -> &'static [SurfaceId] {
        match self {
            AnalysisTab::Disassembly => &[SurfaceId::InstructionHistogram],
            AnalysisTab::Metrics => &[SurfaceId::SizeBreakdown],
            AnalysisTab::Comparison => &[SurfaceId::ComparisonInstructions, SurfaceId::ComparisonSize],
            AnalysisTab::Symbols | AnalysisTab::Sections => &[],
        }
    }
}

/// what the analysis actions brought back so far
#[derive(Debug, Clone, Default)]
pub struct AnalysisCache {
    o0: Option<AnalysisResult>,
    o2: Option<AnalysisResult>,
    comparison: Option<ComparisonResult>,
    current_level: OptLevel,
}

impl AnalysisCache {
    pub fn get(&self, level: OptLevel) -> Option<&AnalysisResult> {
        match level {
            OptLevel::O0 => self.o0.as_ref(),
            OptLevel::O2 => self.o2.as_ref(),
        }
    }

    /// stores `result` for `level` and makes `level` the current one
    pub fn store(&mut self, level: OptLevel, result: AnalysisResult) {
        match level {
            OptLevel::O0 => self.o0 = Some(result),
            OptLevel::O2 => self.o2 = Some(result),
        }
        self.current_level = level;
    }

    pub fn current_level(&self) -> OptLevel {
        self.current_level
    }

    pub fn current(&self) -> Option<&AnalysisResult> {
        self.get(self.current_level)
    }

    pub fn comparison(&self) -> Option<&ComparisonResult> {
        self.comparison.as_ref()
    }

    pub fn store_comparison(&mut self, comparison: ComparisonResult) {
        self.comparison = Some(comparison);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum AnalysisAction {
    Build,
    AnalyzeO0,
    AnalyzeO2,
    Compare,
}

impl AnalysisAction {
    pub fn analyze(level: OptLevel) -> AnalysisAction {
        match level {
            OptLevel::O0 => AnalysisAction::AnalyzeO0,
            OptLevel::O2 => AnalysisAction::AnalyzeO2,
        }
    }

    pub fn idle_label(&self) -> &'static str {
        match self {
            AnalysisAction::Build => "Build Object Files",
            AnalysisAction::AnalyzeO0 => "Analyze -O0",
            AnalysisAction::AnalyzeO2 => "Analyze -O2",
            AnalysisAction::Compare => "Compare Optimizations",
        }
    }

    pub fn busy_label(&self) -> &'static str {
        match self {
            AnalysisAction::Build => "Building...",
            AnalysisAction::AnalyzeO0 | AnalysisAction::AnalyzeO2 => "Analyzing...",
            AnalysisAction::Compare => "Comparing...",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ControlState {
    enabled: bool,
    busy: bool,
}

/// Button of one action. Clones share the same state.
#[derive(Debug, Clone)]
pub struct Control {
    action: AnalysisAction,
    state: Rc<Cell<ControlState>>,
}

impl Control {
    fn new(action: AnalysisAction, enabled: bool) -> Self {
        Control {
            action,
            state: Rc::new(Cell::new(ControlState { enabled, busy: false })),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state.get().enabled
    }

    pub fn is_busy(&self) -> bool {
        self.state.get().busy
    }

    pub fn label(&self) -> &'static str {
        if self.is_busy() {
            self.action.busy_label()
        } else {
            self.action.idle_label()
        }
    }

    fn set_enabled(&self, enabled: bool) {
        let state = self.state.get();
        self.state.set(ControlState { enabled, ..state });
    }

    /// disables the control until the returned guard is dropped
    pub fn begin(&self) -> BusyGuard {
        self.state.set(ControlState {
            enabled: false,
            busy: true,
        });
        BusyGuard {
            control: self.clone(),
        }
    }
}

/// Keeps a control disabled and labelled busy while alive
pub struct BusyGuard {
    control: Control,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.control.state.set(ControlState {
            enabled: true,
            busy: false,
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StatusTone {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub message: String,
    pub tone: StatusTone,
    /// success messages disappear by themselves after this many ms
    pub auto_hide_ms: Option<u64>,
}

impl StatusLine {
    pub fn is_visible_after(&self, elapsed_ms: u64) -> bool {
        self.auto_hide_ms.is_none_or(|limit| elapsed_ms < limit)
    }
}

/// How an action ended. The status line carries the human readable part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Done,
    /// `success: false` from the server
    Rejected,
    /// the request itself failed
    Unreachable,
    /// the control was disabled, nothing was sent
    Blocked,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisassemblyView {
    pub function_count: u64,
    pub instruction_count: u64,
    /// "<addr> <name>:" headers, each followed by indented "<addr>: <code>" lines
    pub listing: Vec<String>,
    /// most frequent mnemonics first
    pub histogram: Vec<(String, u64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolsView {
    pub global_count: usize,
    pub local_count: usize,
    pub global: Vec<String>,
    pub local: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionRow {
    pub name: String,
    pub kind: String,
    pub address: String,
    pub size: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsView {
    pub text: String,
    pub data: String,
    pub bss: String,
    pub total: String,
    pub breakdown: BarChart,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonView {
    pub instruction_reduction: String,
    pub size_reduction: String,
    pub reduction_percent: String,
    pub instructions: BarChart,
    pub sizes: BarChart,
}

/// content of the visible tab
#[derive(Debug, Clone, PartialEq)]
pub enum TabView {
    Disassembly(DisassemblyView),
    Symbols(SymbolsView),
    Sections(Vec<SectionRow>),
    Metrics(MetricsView),
    Comparison(ComparisonView),
    Placeholder(String),
}

impl TabView {
    pub fn placeholder(&self) -> Option<&str> {
        match self {
            TabView::Placeholder(message) => Some(message),
            _ => None,
        }
    }

    /// charts the view wants on screen
    pub fn charts(&self) -> Vec<(SurfaceId, ChartSpec)> {
        match self {
            TabView::Disassembly(view) => vec![(SurfaceId::InstructionHistogram, ChartSpec::Bars(histogram_chart(view)))],
            TabView::Metrics(view) => vec![(SurfaceId::SizeBreakdown, ChartSpec::Bars(view.breakdown.clone()))],
            TabView::Comparison(view) => vec![
                (SurfaceId::ComparisonInstructions, ChartSpec::Bars(view.instructions.clone())),
                (SurfaceId::ComparisonSize, ChartSpec::Bars(view.sizes.clone())),
            ],
            _ => Vec::new(),
        }
    }
}

/// groups the digits of an integer by three: "1234567" -> "1,234,567"
pub fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 + 1);
    out.push_str(sign);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn format_bytes(bytes: u64) -> String {
    group_thousands(&bytes.to_string())
}

/// sub-reports that can come back with an `error` instead of data
trait SubReport {
    fn error(&self) -> Option<&String>;
}

macro_rules! sub_report {
    ($($report:ty),*) => {
        $(impl SubReport for $report {
            fn error(&self) -> Option<&String> {
                self.error.as_ref()
            }
        })*
    };
}

sub_report!(DisassemblyReport, SymbolReport, SectionReport, SizeReport);

fn usable<T: SubReport>(report: Option<&T>) -> Option<&T> {
    report.filter(|r| r.error().is_none())
}

/// top `limit` mnemonics by count, ties by name
pub fn top_instructions(report: &DisassemblyReport, limit: usize) -> Vec<(String, u64)> {
    report
        .instruction_frequency
        .iter()
        .map(|(mnemonic, count)| (mnemonic.clone(), *count))
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .take(limit)
        .collect()
}

fn disassembly_view(report: Option<&DisassemblyReport>, settings: &AnalysisSettings) -> TabView {
    let Some(report) = usable(report) else {
        return TabView::Placeholder(NO_DISASSEMBLY.to_string());
    };
    if report.functions.is_empty() {
        return TabView::Placeholder(NO_DISASSEMBLY.to_string());
    }
    let listing = report
        .functions
        .iter()
        .flat_map(|function| {
            std::iter::once(format!("{} <{}>:", function.address, function.name)).chain(
                function
                    .instructions
                    .iter()
                    .map(|inst| format!("    {}: {}", inst.address, inst.code)),
            )
        })
        .collect();
    TabView::Disassembly(DisassemblyView {
        function_count: report.total_functions,
        instruction_count: report.total_instructions,
        listing,
        histogram: top_instructions(report, settings.histogram_top),
    })
}

fn histogram_chart(view: &DisassemblyView) -> BarChart {
    BarChart {
        title: "Instruction Frequency".to_string(),
        labels: view.histogram.iter().map(|(m, _)| m.clone()).collect(),
        datasets: vec![BarDataset {
            label: "Instruction Count".to_string(),
            values: view.histogram.iter().map(|(_, c)| *c as f64).collect(),
            colors: vec![BLUE],
        }],
    }
}

/// "<type> <name> @ <addr>", the address left out when absent or zero
pub fn symbol_line(symbol: &SymbolEntry) -> String {
    match symbol.address.as_deref() {
        Some(address) if !address.is_empty() && address != "0" => {
            format!("{} {} @ {}", symbol.kind, symbol.name, address)
        }
        _ => format!("{} {}", symbol.kind, symbol.name),
    }
}

fn symbol_lines(symbols: &[SymbolEntry]) -> Vec<String> {
    if symbols.is_empty() {
        return vec![NO_SYMBOLS.to_string()];
    }
    symbols.iter().map(symbol_line).collect()
}

fn symbols_view(report: Option<&SymbolReport>) -> TabView {
    let Some(report) = usable(report) else {
        return TabView::Placeholder(NO_SYMBOLS.to_string());
    };
    let table = &report.symbols;
    TabView::Symbols(SymbolsView {
        global_count: table.global.len(),
        local_count: table.local.len(),
        global: symbol_lines(&table.global),
        local: symbol_lines(&table.local),
    })
}

fn sections_view(report: Option<&SectionReport>) -> TabView {
    match usable(report) {
        Some(report) if !report.sections.is_empty() => TabView::Sections(
            report
                .sections
                .iter()
                .map(|section| SectionRow {
                    name: section.name.clone(),
                    kind: section.kind.clone(),
                    address: section.address.clone(),
                    size: format!("{} bytes", section.size),
                })
                .collect(),
        ),
        _ => TabView::Placeholder(NO_SECTIONS.to_string()),
    }
}

fn metrics_view(report: Option<&SizeReport>) -> TabView {
    let Some(metrics) = usable(report).and_then(|r| r.metrics.as_ref()) else {
        return TabView::Placeholder(NO_METRICS.to_string());
    };
    TabView::Metrics(MetricsView {
        text: format_bytes(metrics.text),
        data: format_bytes(metrics.data),
        bss: format_bytes(metrics.bss),
        total: format_bytes(metrics.total),
        breakdown: BarChart {
            title: "Size Breakdown".to_string(),
            labels: [".text", ".data", ".bss", ".rodata"].map(String::from).to_vec(),
            datasets: vec![BarDataset {
                label: "Bytes".to_string(),
                values: vec![
                    metrics.text as f64,
                    metrics.data as f64,
                    metrics.bss as f64,
                    metrics.rodata as f64,
                ],
                colors: vec![BLUE, GREEN, AMBER, PURPLE],
            }],
        },
    })
}

fn size_row(metrics: &SizeMetrics) -> Vec<f64> {
    vec![
        metrics.text as f64,
        metrics.data as f64,
        metrics.bss as f64,
        metrics.total as f64,
    ]
}

fn comparison_view(comparison: Option<&ComparisonResult>) -> TabView {
    let Some(comparison) = comparison else {
        return TabView::Placeholder(NO_COMPARISON.to_string());
    };
    let disassembly = &comparison.disassembly;
    let size = &comparison.size;
    TabView::Comparison(ComparisonView {
        instruction_reduction: format!("{} instructions", disassembly.reduction),
        size_reduction: format!("{} bytes", size.reduction),
        reduction_percent: format!("{}%", number_label(disassembly.reduction_percent)),
        instructions: BarChart {
            title: "Instruction Count".to_string(),
            labels: vec!["-O0".to_string(), "-O2".to_string()],
            datasets: vec![BarDataset {
                label: "Instruction Count".to_string(),
                values: vec![disassembly.o0_instructions as f64, disassembly.o2_instructions as f64],
                colors: vec![RED, GREEN],
            }],
        },
        sizes: BarChart {
            title: "Section Sizes".to_string(),
            labels: [".text", ".data", ".bss", "Total"].map(String::from).to_vec(),
            datasets: vec![
                BarDataset {
                    label: "-O0".to_string(),
                    values: size_row(&size.o0),
                    colors: vec![RED],
                },
                BarDataset {
                    label: "-O2".to_string(),
                    values: size_row(&size.o2),
                    colors: vec![GREEN],
                },
            ],
        },
    })
}

/// View of `tab` from the cache alone. Comparison reads the cached comparison whatever the level.
pub fn tab_view(tab: AnalysisTab, cache: &AnalysisCache, settings: &AnalysisSettings) -> TabView {
    if tab == AnalysisTab::Comparison {
        return comparison_view(cache.comparison());
    }
    let Some(result) = cache.current() else {
        return TabView::Placeholder(format!("No analysis data for {}", cache.current_level()));
    };
    match tab {
        AnalysisTab::Disassembly => disassembly_view(result.disassembly.as_ref(), settings),
        AnalysisTab::Symbols => symbols_view(result.symbols.as_ref()),
        AnalysisTab::Sections => sections_view(result.sections.as_ref()),
        AnalysisTab::Metrics => metrics_view(result.size.as_ref()),
        AnalysisTab::Comparison => comparison_view(cache.comparison()),
    }
}

pub struct AnalysisTabs {
    settings: AnalysisSettings,
    cache: AnalysisCache,
    active: AnalysisTab,
    view: TabView,
    status: Option<StatusLine>,
    controls: HashMap<AnalysisAction, Control>,
}

impl AnalysisTabs {
    pub fn new(settings: AnalysisSettings) -> Self {
        let controls = AnalysisAction::iter()
            .map(|action| (action, Control::new(action, action == AnalysisAction::Build)))
            .collect();
        let cache = AnalysisCache::default();
        let active = AnalysisTab::Disassembly;
        let view = tab_view(active, &cache, &settings);
        AnalysisTabs {
            settings,
            cache,
            active,
            view,
            status: None,
            controls,
        }
    }

    pub fn active_tab(&self) -> AnalysisTab {
        self.active
    }

    pub fn view(&self) -> &TabView {
        &self.view
    }

    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    pub fn control(&self, action: AnalysisAction) -> Control {
        match self.controls.get(&action) {
            Some(control) => control.clone(),
            // every action gets a control in `new`
            None => Control::new(action, false),
        }
    }

    fn set_status(&mut self, message: String, tone: StatusTone) {
        match tone {
            StatusTone::Error => warn!("{}", message),
            _ => info!("{}", message),
        }
        let auto_hide_ms = (tone == StatusTone::Success).then_some(self.settings.status_auto_hide_ms);
        self.status = Some(StatusLine {
            message,
            tone,
            auto_hide_ms,
        });
    }

    /// Shows `tab` rendered from the cache for the current level.
    pub fn switch_tab(&mut self, tab: AnalysisTab, surfaces: &mut ChartSurfaces) -> &TabView {
        self.active = tab;
        self.rerender(surfaces);
        &self.view
    }

    /// `switch_tab` by tab name ("disassembly", "symbols", ...)
    pub fn switch_tab_named(&mut self, name: &str, surfaces: &mut ChartSurfaces) -> Result<&TabView, VizError> {
        let tab = AnalysisTab::from_str(name).map_err(|_| VizError::Domain(format!("unknown analysis tab '{}'", name)))?;
        Ok(self.switch_tab(tab, surfaces))
    }

    /// stores an analysis result as if `analyze(level)` had returned it, without redrawing
    pub fn record_analysis(&mut self, level: OptLevel, result: AnalysisResult) {
        self.cache.store(level, result);
    }

    fn rerender(&mut self, surfaces: &mut ChartSurfaces) {
        self.view = tab_view(self.active, &self.cache, &self.settings);
        let charts = self.view.charts();
        for surface in self.active.surfaces() {
            match charts.iter().find(|(s, _)| s == surface) {
                Some((_, spec)) => {
                    if let Err(e) = surfaces.render(*surface, spec) {
                        warn!("chart for {} tab failed: {}", self.active, e);
                    }
                }
                None => surfaces.clear(*surface),
            }
        }
    }

    pub fn build(&mut self, backend: &dyn CompilerBackend) -> ActionOutcome {
        let control = self.control(AnalysisAction::Build);
        if !control.is_enabled() {
            return ActionOutcome::Blocked;
        }
        let _busy = control.begin();
        self.set_status("Building object files...".to_string(), StatusTone::Info);
        match backend.build_objects() {
            Ok(envelope) if envelope.success => {
                let built = envelope.data.unwrap_or_default().built;
                let mut message = format!("Successfully built {} object file(s):", built.len());
                for object in &built {
                    message.push_str(&format!("\n  {}: {} bytes", object.level, object.size));
                }
                self.set_status(message, StatusTone::Success);
                for action in [AnalysisAction::AnalyzeO0, AnalysisAction::AnalyzeO2, AnalysisAction::Compare] {
                    self.control(action).set_enabled(true);
                }
                ActionOutcome::Done
            }
            Ok(envelope) => {
                let reason = envelope.error.unwrap_or_else(|| "unknown error".to_string());
                self.set_status(format!("Build failed: {}", reason), StatusTone::Error);
                ActionOutcome::Rejected
            }
            Err(e) => {
                self.set_status(format!("Network error: {}", e), StatusTone::Error);
                ActionOutcome::Unreachable
            }
        }
    }

    pub fn analyze(
        &mut self,
        level: OptLevel,
        backend: &dyn CompilerBackend,
        surfaces: &mut ChartSurfaces,
    ) -> ActionOutcome {
        let control = self.control(AnalysisAction::analyze(level));
        if !control.is_enabled() {
            return ActionOutcome::Blocked;
        }
        let _busy = control.begin();
        self.set_status(format!("Analyzing {} object file...", level), StatusTone::Info);
        match backend.analyze_object(level) {
            Ok(envelope) if envelope.success => {
                // a successful envelope without data still counts, its tabs show placeholders
                self.cache.store(level, envelope.data.unwrap_or_default());
                self.set_status(format!("Analysis complete for {}", level), StatusTone::Success);
                self.rerender(surfaces);
                ActionOutcome::Done
            }
            Ok(envelope) => {
                let reason = envelope.error.unwrap_or_else(|| "unknown error".to_string());
                self.set_status(format!("Analysis failed: {}", reason), StatusTone::Error);
                ActionOutcome::Rejected
            }
            Err(e) => {
                self.set_status(format!("Network error: {}", e), StatusTone::Error);
                ActionOutcome::Unreachable
            }
        }
    }

    pub fn compare(&mut self, backend: &dyn CompilerBackend, surfaces: &mut ChartSurfaces) -> ActionOutcome {
        let control = self.control(AnalysisAction::Compare);
        if !control.is_enabled() {
            return ActionOutcome::Blocked;
        }
        let _busy = control.begin();
        self.set_status("Comparing optimization levels...".to_string(), StatusTone::Info);
        match backend.compare_optimizations() {
            Ok(envelope) if envelope.success => {
                self.cache.store_comparison(envelope.data.unwrap_or_default());
                self.set_status("Comparison complete".to_string(), StatusTone::Success);
                self.switch_tab(AnalysisTab::Comparison, surfaces);
                ActionOutcome::Done
            }
            Ok(envelope) => {
                let reason = envelope.error.unwrap_or_else(|| "unknown error".to_string());
                self.set_status(format!("Comparison failed: {}", reason), StatusTone::Error);
                ActionOutcome::Rejected
            }
            Err(e) => {
                self.set_status(format!("Network error: {}", e), StatusTone::Error);
                ActionOutcome::Unreachable
            }
        }
    }
}

//////////////////////////////////////////////////////////////////////////////////////
// TESTS
//////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests_analysis_tabs {
    use super::*;
    use crate::Examples::sample_payloads::{
        CannedBackend, Endpoint, OBJECT_O0_RESPONSE, OBJECT_O2_RESPONSE,
    };
    use crate::api::errors::TransportError;
    use crate::api::wire::Envelope;
    use crate::presentation::chart_surfaces::{RecordingBackend, RecordingProbe};

    fn surfaces() -> (ChartSurfaces, RecordingProbe) {
        let (recorder, probe) = RecordingBackend::new();
        (ChartSurfaces::new(Box::new(recorder)), probe)
    }

    fn object(body: &str) -> AnalysisResult {
        let envelope: Envelope<AnalysisResult> = serde_json::from_str(body).unwrap();
        envelope.data.unwrap()
    }

    fn ready_tabs(backend: &CannedBackend) -> AnalysisTabs {
        let mut tabs = AnalysisTabs::new(AnalysisSettings::default());
        assert_eq!(tabs.build(backend), ActionOutcome::Done);
        tabs
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(format_bytes(0), "0");
        assert_eq!(format_bytes(999), "999");
        assert_eq!(format_bytes(2048), "2,048");
        assert_eq!(format_bytes(1234567), "1,234,567");
        assert_eq!(group_thousands("-3628800"), "-3,628,800");
    }

    #[test]
    fn test_tab_names() {
        assert_eq!(AnalysisTab::from_str("metrics").unwrap(), AnalysisTab::Metrics);
        assert_eq!(AnalysisTab::Comparison.to_string(), "comparison");
        assert!(AnalysisTab::from_str("graphs").is_err());
    }

    #[test]
    fn test_controls_locked_until_build() {
        let backend = CannedBackend::offline();
        let (mut surfaces, _probe) = surfaces();
        let mut tabs = AnalysisTabs::new(AnalysisSettings::default());
        assert!(!tabs.control(AnalysisAction::AnalyzeO0).is_enabled());
        assert_eq!(tabs.analyze(OptLevel::O0, &backend, &mut surfaces), ActionOutcome::Blocked);
        assert_eq!(tabs.compare(&backend, &mut surfaces), ActionOutcome::Blocked);
        assert_eq!(backend.call_count(), 0);

        assert_eq!(tabs.build(&backend), ActionOutcome::Done);
        for action in AnalysisAction::iter() {
            let control = tabs.control(action);
            assert!(control.is_enabled());
            assert_eq!(control.label(), action.idle_label());
        }
        let status = tabs.status().unwrap();
        assert_eq!(status.tone, StatusTone::Success);
        assert_eq!(
            status.message,
            "Successfully built 2 object file(s):\n  O0: 18432 bytes\n  O2: 12288 bytes"
        );
        assert!(status.is_visible_after(4999));
        assert!(!status.is_visible_after(5000));
    }

    #[test]
    fn test_busy_guard_releases_control() {
        let tabs = AnalysisTabs::new(AnalysisSettings::default());
        let control = tabs.control(AnalysisAction::Build);
        {
            let _busy = control.begin();
            assert!(!tabs.control(AnalysisAction::Build).is_enabled());
            assert_eq!(tabs.control(AnalysisAction::Build).label(), "Building...");
        }
        assert!(control.is_enabled());
        assert_eq!(control.label(), "Build Object Files");
    }

    #[test]
    fn test_failures_reenable_controls() {
        let backend = CannedBackend::offline()
            .with_body(Endpoint::ObjectO2, r#"{"success": false, "error": "object file not found"}"#)
            .with_failure(Endpoint::Optimization, TransportError::Unreachable("connection reset".to_string()));
        let (mut surfaces, _probe) = surfaces();
        let mut tabs = ready_tabs(&backend);

        assert_eq!(tabs.analyze(OptLevel::O2, &backend, &mut surfaces), ActionOutcome::Rejected);
        assert_eq!(tabs.status().unwrap().message, "Analysis failed: object file not found");
        assert!(tabs.control(AnalysisAction::AnalyzeO2).is_enabled());
        assert!(tabs.cache().get(OptLevel::O2).is_none());

        assert_eq!(tabs.compare(&backend, &mut surfaces), ActionOutcome::Unreachable);
        let status = tabs.status().unwrap();
        assert_eq!(status.message, "Network error: connection reset");
        assert_eq!(status.tone, StatusTone::Error);
        assert_eq!(status.auto_hide_ms, None);
        assert!(tabs.control(AnalysisAction::Compare).is_enabled());
        assert!(!tabs.control(AnalysisAction::Compare).is_busy());
    }

    #[test]
    fn test_build_rejected_keeps_lock() {
        let backend = CannedBackend::offline().with_body(Endpoint::Build, r#"{"success": false, "error": "g++ not found"}"#);
        let mut tabs = AnalysisTabs::new(AnalysisSettings::default());
        assert_eq!(tabs.build(&backend), ActionOutcome::Rejected);
        assert_eq!(tabs.status().unwrap().message, "Build failed: g++ not found");
        assert!(tabs.control(AnalysisAction::Build).is_enabled());
        assert!(!tabs.control(AnalysisAction::Compare).is_enabled());
    }

    #[test]
    fn test_analyze_renders_active_tab() {
        let backend = CannedBackend::offline();
        let (mut surfaces, probe) = surfaces();
        let mut tabs = ready_tabs(&backend);
        assert_eq!(tabs.view().placeholder(), Some("No analysis data for O0"));

        assert_eq!(tabs.analyze(OptLevel::O0, &backend, &mut surfaces), ActionOutcome::Done);
        assert_eq!(tabs.status().unwrap().message, "Analysis complete for O0");
        let TabView::Disassembly(view) = tabs.view() else {
            panic!("expected disassembly, got {:?}", tabs.view());
        };
        assert_eq!(view.function_count, 2);
        assert_eq!(view.instruction_count, 11);
        assert_eq!(view.listing[0], "0000000000000000 <main>:");
        assert_eq!(view.listing[1], "    0: push   %rbp");
        // counts descending, ties by mnemonic
        let names: Vec<&str> = view.histogram.iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(names, vec!["mov", "push", "ret", "call", "leave", "pop", "sub"]);
        assert_eq!(probe.live_on(SurfaceId::InstructionHistogram), 1);
    }

    #[test]
    fn test_histogram_is_capped() {
        let mut report = DisassemblyReport::default();
        for i in 0..40u64 {
            report.instruction_frequency.insert(format!("op{:02}", i), i % 7);
        }
        let top = top_instructions(&report, 15);
        assert_eq!(top.len(), 15);
        assert!(top.windows(2).all(|w| w[0].1 > w[1].1 || (w[0].1 == w[1].1 && w[0].0 < w[1].0)));
        assert_eq!(top[0].1, 6);
    }

    #[test]
    fn test_tab_switching_is_offline() {
        let backend = CannedBackend::offline();
        let (mut surfaces, probe) = surfaces();
        let mut tabs = ready_tabs(&backend);
        tabs.analyze(OptLevel::O0, &backend, &mut surfaces);
        tabs.analyze(OptLevel::O2, &backend, &mut surfaces);
        let calls = backend.call_count();

        for tab in AnalysisTab::iter().chain(AnalysisTab::iter()) {
            tabs.switch_tab(tab, &mut surfaces);
            assert_eq!(tabs.active_tab(), tab);
        }
        tabs.switch_tab_named("sections", &mut surfaces).unwrap();
        assert!(tabs.switch_tab_named("graphs", &mut surfaces).is_err());
        assert_eq!(backend.call_count(), calls);
        for surface in [SurfaceId::InstructionHistogram, SurfaceId::SizeBreakdown] {
            assert!(probe.live_on(surface) <= 1);
        }
    }

    #[test]
    fn test_switch_renders_current_level() {
        let (mut surfaces, _probe) = surfaces();
        let mut tabs = AnalysisTabs::new(AnalysisSettings::default());
        tabs.record_analysis(OptLevel::O0, object(OBJECT_O0_RESPONSE));
        tabs.record_analysis(OptLevel::O2, object(OBJECT_O2_RESPONSE));
        assert_eq!(tabs.cache().current_level(), OptLevel::O2);

        // O2 symbols carry an error: placeholder there, other tabs fine
        assert_eq!(tabs.switch_tab(AnalysisTab::Symbols, &mut surfaces).placeholder(), Some(NO_SYMBOLS));
        let TabView::Sections(rows) = tabs.switch_tab(AnalysisTab::Sections, &mut surfaces) else {
            panic!("expected sections");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].size, "1200 bytes");

        tabs.record_analysis(OptLevel::O0, object(OBJECT_O0_RESPONSE));
        let TabView::Symbols(view) = tabs.switch_tab(AnalysisTab::Symbols, &mut surfaces) else {
            panic!("expected symbols");
        };
        assert_eq!((view.global_count, view.local_count), (2, 2));
        assert_eq!(view.global[0], "FUNC main @ 0000000000000000");
        assert_eq!(view.local[0], "FILE calc.cpp");

        let TabView::Metrics(metrics) = tabs.switch_tab(AnalysisTab::Metrics, &mut surfaces) else {
            panic!("expected metrics");
        };
        assert_eq!(metrics.text, "2,048");
        assert_eq!(metrics.total, "2,584");
        assert_eq!(metrics.breakdown.labels, vec![".text", ".data", ".bss", ".rodata"]);
    }

    #[test]
    fn test_placeholders_for_missing_data() {
        let mut cache = AnalysisCache::default();
        let settings = AnalysisSettings::default();
        assert_eq!(
            tab_view(AnalysisTab::Metrics, &cache, &settings).placeholder(),
            Some("No analysis data for O0")
        );
        assert_eq!(tab_view(AnalysisTab::Comparison, &cache, &settings).placeholder(), Some(NO_COMPARISON));
        cache.store(OptLevel::O0, AnalysisResult::default());
        assert_eq!(tab_view(AnalysisTab::Disassembly, &cache, &settings).placeholder(), Some(NO_DISASSEMBLY));
        assert_eq!(tab_view(AnalysisTab::Symbols, &cache, &settings).placeholder(), Some(NO_SYMBOLS));
        assert_eq!(tab_view(AnalysisTab::Sections, &cache, &settings).placeholder(), Some(NO_SECTIONS));
        assert_eq!(tab_view(AnalysisTab::Metrics, &cache, &settings).placeholder(), Some(NO_METRICS));
    }

    #[test]
    fn test_compare_switches_to_comparison() {
        let backend = CannedBackend::offline();
        let (mut surfaces, probe) = surfaces();
        let mut tabs = ready_tabs(&backend);
        assert_eq!(tabs.compare(&backend, &mut surfaces), ActionOutcome::Done);
        assert_eq!(tabs.active_tab(), AnalysisTab::Comparison);
        let TabView::Comparison(view) = tabs.view() else {
            panic!("expected comparison");
        };
        assert_eq!(view.instruction_reduction, "9 instructions");
        assert_eq!(view.size_reduction, "1120 bytes");
        assert_eq!(view.reduction_percent, "81.82%");
        assert_eq!(view.sizes.datasets[1].values, vec![1200.0, 8.0, 0.0, 1464.0]);
        assert_eq!(probe.live_on(SurfaceId::ComparisonInstructions), 1);
        assert_eq!(probe.live_on(SurfaceId::ComparisonSize), 1);

        // comparison does not depend on the per-level cache
        tabs.switch_tab(AnalysisTab::Disassembly, &mut surfaces);
        assert!(tabs.view().placeholder().is_some());
        assert!(tabs.switch_tab(AnalysisTab::Comparison, &mut surfaces).placeholder().is_none());
    }
}
