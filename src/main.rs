#![allow(non_snake_case)]
use RustedExprViz::Examples::viz_examples::viz_examples;
use RustedExprViz::Utils::config::VizConfig;
use RustedExprViz::Utils::logger::init_logger;
use std::path::Path;

fn main() {
    // cargo run -- <example> [config.toml]
    let args: Vec<String> = std::env::args().collect();
    let example = args.get(1).and_then(|a| a.parse::<usize>().ok()).unwrap_or(0);
    let config_path = args.get(2).map(String::as_str).unwrap_or("viz.toml");

    let config = match VizConfig::load_or_default(Path::new(config_path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = init_logger(&config.logging) {
        eprintln!("logger not started: {}", e);
    }
    viz_examples(example, &config);
}
