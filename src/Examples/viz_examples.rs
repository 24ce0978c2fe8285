use crate::Examples::sample_payloads::{
    ARITHMETIC_RESPONSE, CannedBackend, Endpoint, INTEGRATION_RESPONSE,
};
use crate::Utils::config::VizConfig;
use crate::Utils::plots::SvgChartBackend;
use crate::api::client::{CompilerBackend, HttpBackend};
use crate::api::wire::OptLevel;
use crate::presentation::analysis_tabs::{AnalysisTab, AnalysisTabs, TabView};
use crate::presentation::chart_surfaces::{ChartSurfaces, SurfaceId};
use crate::presentation::pnc_view::PncPanel;
use crate::presentation::view_orchestrator::{ViewModel, ViewOrchestrator};
use log::{error, info};
use strum::IntoEnumIterator;

fn svg_surfaces(config: &VizConfig) -> Option<ChartSurfaces> {
    match SvgChartBackend::new(&config.output.dir) {
        Ok(backend) => Some(ChartSurfaces::new(Box::new(backend))),
        Err(e) => {
            error!("cannot prepare chart directory {:?}: {}", config.output.dir, e);
            None
        }
    }
}

fn print_view(view: &ViewModel) {
    println!("visible panels: {:?}", view.visibility.visible());
    if let Some(message) = &view.error {
        println!("error: {}", message);
        return;
    }
    if let Some(result) = &view.result {
        println!("result: {}", result);
    }
    let tokens: Vec<&str> = view.tokens.iter().map(|b| b.text.as_str()).collect();
    println!("tokens: {}", tokens.join(" "));
    let postfix: Vec<&str> = view.postfix.iter().map(|b| b.text.as_str()).collect();
    println!("postfix: {}", postfix.join(" "));
    for line in &view.intermediate {
        println!("  {}", line);
    }
    if let Some(tree) = &view.ast {
        println!("syntax tree: {} nodes, {:.0} x {:.0}", tree.nodes.len(), tree.width, tree.height);
    }
    if let Some(calculus) = &view.calculus {
        println!("{} ({} samples)", calculus.chart.title, calculus.chart.curve().len());
        for (step, warning) in calculus.steps.iter().zip(&calculus.warnings) {
            println!("  {}{}", if *warning { "! " } else { "" }, step);
        }
    }
}

fn print_tab(tab: AnalysisTab, view: &TabView) {
    println!("--- {} ---", tab);
    match view {
        TabView::Placeholder(text) => println!("{}", text),
        TabView::Disassembly(d) => {
            println!("{} functions, {} instructions", d.function_count, d.instruction_count);
            for line in &d.listing {
                println!("{}", line);
            }
            for (mnemonic, count) in &d.histogram {
                println!("{:<8} {}", mnemonic, count);
            }
        }
        TabView::Symbols(s) => {
            println!("global ({}):", s.global_count);
            for line in &s.global {
                println!("  {}", line);
            }
            println!("local ({}):", s.local_count);
            for line in &s.local {
                println!("  {}", line);
            }
        }
        TabView::Sections(rows) => {
            for row in rows {
                println!("{:<12} {:<10} {:>10} {:>12}", row.name, row.kind, row.address, row.size);
            }
        }
        TabView::Metrics(m) => {
            println!("text  {}\ndata  {}\nbss   {}\ntotal {}", m.text, m.data, m.bss, m.total);
        }
        TabView::Comparison(c) => {
            println!(
                "saved {} ({}) and {}",
                c.instruction_reduction, c.reduction_percent, c.size_reduction
            );
        }
    }
}

/// Runs the numbered demo. 0..=3 stay offline on recorded responses, 4 talks to the backend named in the config.
pub fn viz_examples(example: usize, config: &VizConfig) {
    match example {
        0 => {
            // differentiation: result, tokens, postfix, three-address code, AST and the tangent chart
            let Some(mut surfaces) = svg_surfaces(config) else {
                return;
            };
            let backend = CannedBackend::offline();
            let mut orchestrator = ViewOrchestrator::new(config.clone());
            let view = orchestrator.compile(&backend, "diff(x^2, x, 1)", &mut surfaces);
            print_view(view);
            info!("charts live after compile: {}", surfaces.live_count());
        }
        1 => {
            // integration fills the area under the curve; a plain expression then removes the calculus chart
            let Some(mut surfaces) = svg_surfaces(config) else {
                return;
            };
            let integration = CannedBackend::empty().with_body(Endpoint::Compile, INTEGRATION_RESPONSE);
            let arithmetic = CannedBackend::empty().with_body(Endpoint::Compile, ARITHMETIC_RESPONSE);
            let mut orchestrator = ViewOrchestrator::new(config.clone());
            print_view(orchestrator.compile(&integration, "integrate(x^2, x, 0, 1)", &mut surfaces));
            println!(
                "calculus chart live: {}",
                surfaces.live_chart(SurfaceId::Calculus).is_some()
            );
            print_view(orchestrator.compile(&arithmetic, "2 + 3 * 4", &mut surfaces));
            println!(
                "calculus chart live: {}",
                surfaces.live_chart(SurfaceId::Calculus).is_some()
            );
        }
        2 => {
            // object file analysis: build, analyze both levels, compare, then walk all tabs
            let Some(mut surfaces) = svg_surfaces(config) else {
                return;
            };
            let backend = CannedBackend::offline();
            let mut tabs = AnalysisTabs::new(config.analysis.clone());
            println!("build: {:?}", tabs.build(&backend));
            println!("analyze O0: {:?}", tabs.analyze(OptLevel::O0, &backend, &mut surfaces));
            println!("analyze O2: {:?}", tabs.analyze(OptLevel::O2, &backend, &mut surfaces));
            println!("compare: {:?}", tabs.compare(&backend, &mut surfaces));
            if let Some(status) = tabs.status() {
                println!("status: {}", status.message);
            }
            for tab in AnalysisTab::iter() {
                let view = tabs.switch_tab(tab, &mut surfaces).clone();
                print_tab(tab, &view);
            }
            println!("requests sent: {}", backend.call_count());
        }
        3 => {
            // permutations and combinations
            let backend = CannedBackend::offline();
            let mut panel = PncPanel::default();
            match panel.analyze(&backend, "nCr(5,2)") {
                Ok(view) => {
                    println!("{} = {}", view.expression, view.result);
                    println!("{}", view.ast_sketch);
                    for line in &view.code {
                        println!("  {}", line.text);
                    }
                    for step in &view.steps {
                        println!("{}. {} {}", step.number, step.title, step.value);
                    }
                }
                Err(e) => println!("{}", e),
            }
        }
        4 => {
            // live backend: health check first, then one compile
            let Some(mut surfaces) = svg_surfaces(config) else {
                return;
            };
            let backend = HttpBackend::new(&config.backend.base_url);
            match backend.health() {
                Ok(health) => info!("backend at {} is {}", backend.base_url(), health.status),
                Err(e) => error!("backend at {} is not answering: {}", backend.base_url(), e),
            }
            let mut orchestrator = ViewOrchestrator::new(config.clone());
            print_view(orchestrator.compile(&backend, "diff(sin(x) * x, x, 0.5)", &mut surfaces));
        }
        _ => {
            println!("no example {}, try 0..=4", example);
        }
    }
}
