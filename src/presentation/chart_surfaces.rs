//! # Chart surfaces
//!
//! A surface is a drawable target that owns at most one live chart at a time. Rendering into a surface
//! that already holds a chart destroys the old chart first and only then creates the new one; no stale
//! chart survives a re-render.
//!
//! `ChartSpec` is a plain description of what to draw; `ChartBackend` is the adapter that turns it into a
//! real chart object (`Utils::plots::SvgChartBackend` writes SVG files, tests use a recording backend).
use crate::api::errors::VizError;
use crate::presentation::sampler::{PlotSeries, SamplePoint};
use crate::presentation::tree_layout::TreeLayout;
use log::debug;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use strum_macros::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum SurfaceId {
    AstTree,
    Calculus,
    InstructionHistogram,
    SizeBreakdown,
    ComparisonInstructions,
    ComparisonSize,
}

/// handle of a live chart object, issued by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartHandle(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct CalculusChart {
    pub title: String,
    pub series_label: String,
    pub series: PlotSeries,
    /// legend entry of the differentiation marker
    pub marker_label: Option<String>,
    /// precision of the x axis labels
    pub x_label_decimals: usize,
}

impl CalculusChart {
    pub fn curve(&self) -> &[SamplePoint] {
        self.series.curve()
    }

    pub fn fills_area(&self) -> bool {
        matches!(self.series, PlotSeries::Integration { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarDataset {
    pub label: String,
    pub values: Vec<f64>,
    /// one colour for the whole dataset, or one per bar
    pub colors: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<BarDataset>,
}

impl BarChart {
    pub fn max_value(&self) -> f64 {
        self.datasets
            .iter()
            .flat_map(|d| d.values.iter().copied())
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    SyntaxTree(TreeLayout),
    Calculus(CalculusChart),
    Bars(BarChart),
}

pub trait ChartBackend {
    /// build a live chart for `spec` on `surface`
    fn create(&mut self, surface: SurfaceId, spec: &ChartSpec) -> Result<ChartHandle, VizError>;
    /// tear a chart down; called exactly once per handle
    fn destroy(&mut self, surface: SurfaceId, handle: ChartHandle);
}

/// the chart slot of every surface plus the backend drawing into them
pub struct ChartSurfaces {
    slots: HashMap<SurfaceId, ChartHandle>,
    backend: Box<dyn ChartBackend>,
}

impl ChartSurfaces {
    pub fn new(backend: Box<dyn ChartBackend>) -> Self {
        ChartSurfaces {
            slots: HashMap::new(),
            backend,
        }
    }

    /// Dispose whatever `surface` holds, then create the chart for `spec`. When creation fails the
    /// surface stays empty.
    pub fn render(&mut self, surface: SurfaceId, spec: &ChartSpec) -> Result<ChartHandle, VizError> {
        self.clear(surface);
        let handle = self.backend.create(surface, spec)?;
        debug!("surface {} now owns chart {:?}", surface, handle);
        self.slots.insert(surface, handle);
        Ok(handle)
    }

    /// destroy the chart of `surface`, if any. Clearing an empty surface does nothing.
    pub fn clear(&mut self, surface: SurfaceId) {
        if let Some(old) = self.slots.remove(&surface) {
            debug!("disposing chart {:?} of surface {}", old, surface);
            self.backend.destroy(surface, old);
        }
    }

    pub fn live_chart(&self, surface: SurfaceId) -> Option<ChartHandle> {
        self.slots.get(&surface).copied()
    }

    pub fn live_count(&self) -> usize {
        self.slots.len()
    }
}

impl Drop for ChartSurfaces {
    fn drop(&mut self) {
        for (surface, handle) in self.slots.drain() {
            self.backend.destroy(surface, handle);
        }
    }
}

/// Backend that draws nothing and only keeps track of the charts it handed out. Handy for headless
/// runs and for checking the ownership rules.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    next: u64,
    live: Rc<RefCell<Vec<(SurfaceId, ChartHandle)>>>,
    created: Rc<Cell<usize>>,
}

/// read side of a `RecordingBackend` that stays usable after the backend moved into `ChartSurfaces`
#[derive(Debug, Clone)]
pub struct RecordingProbe {
    live: Rc<RefCell<Vec<(SurfaceId, ChartHandle)>>>,
    created: Rc<Cell<usize>>,
}

impl RecordingBackend {
    pub fn new() -> (Self, RecordingProbe) {
        let backend = RecordingBackend::default();
        let probe = RecordingProbe {
            live: backend.live.clone(),
            created: backend.created.clone(),
        };
        (backend, probe)
    }
}

impl RecordingProbe {
    /// charts alive on `surface` right now
    pub fn live_on(&self, surface: SurfaceId) -> usize {
        self.live.borrow().iter().filter(|(s, _)| *s == surface).count()
    }

    pub fn live_total(&self) -> usize {
        self.live.borrow().len()
    }

    pub fn created_total(&self) -> usize {
        self.created.get()
    }
}

impl ChartBackend for RecordingBackend {
    fn create(&mut self, surface: SurfaceId, _spec: &ChartSpec) -> Result<ChartHandle, VizError> {
        self.next += 1;
        let handle = ChartHandle(self.next);
        self.live.borrow_mut().push((surface, handle));
        self.created.set(self.created.get() + 1);
        Ok(handle)
    }

    fn destroy(&mut self, _surface: SurfaceId, handle: ChartHandle) {
        self.live.borrow_mut().retain(|(_, h)| *h != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars() -> ChartSpec {
        ChartSpec::Bars(BarChart {
            title: "t".to_string(),
            labels: vec!["a".to_string()],
            datasets: vec![BarDataset {
                label: "d".to_string(),
                values: vec![3.0],
                colors: vec!["#3b82f6"],
            }],
        })
    }

    struct FailingBackend;

    impl ChartBackend for FailingBackend {
        fn create(&mut self, _surface: SurfaceId, _spec: &ChartSpec) -> Result<ChartHandle, VizError> {
            Err(VizError::Render("no canvas".to_string()))
        }
        fn destroy(&mut self, _surface: SurfaceId, _handle: ChartHandle) {}
    }

    #[test]
    fn test_rerender_disposes_previous_chart() {
        let (backend, probe) = RecordingBackend::new();
        let mut surfaces = ChartSurfaces::new(Box::new(backend));
        let first = surfaces.render(SurfaceId::Calculus, &bars()).unwrap();
        let second = surfaces.render(SurfaceId::Calculus, &bars()).unwrap();
        assert_ne!(first, second);
        assert_eq!(probe.live_on(SurfaceId::Calculus), 1);
        assert_eq!(probe.created_total(), 2);
        assert_eq!(surfaces.live_chart(SurfaceId::Calculus), Some(second));
    }

    #[test]
    fn test_surfaces_are_independent() {
        let (backend, probe) = RecordingBackend::new();
        let mut surfaces = ChartSurfaces::new(Box::new(backend));
        surfaces.render(SurfaceId::InstructionHistogram, &bars()).unwrap();
        surfaces.render(SurfaceId::SizeBreakdown, &bars()).unwrap();
        surfaces.render(SurfaceId::SizeBreakdown, &bars()).unwrap();
        assert_eq!(probe.live_total(), 2);
        surfaces.clear(SurfaceId::InstructionHistogram);
        surfaces.clear(SurfaceId::InstructionHistogram);
        assert_eq!(probe.live_on(SurfaceId::InstructionHistogram), 0);
        assert_eq!(surfaces.live_count(), 1);
        drop(surfaces);
        assert_eq!(probe.live_total(), 0);
    }

    #[test]
    fn test_failed_create_leaves_surface_empty() {
        let mut surfaces = ChartSurfaces::new(Box::new(FailingBackend));
        assert!(surfaces.render(SurfaceId::AstTree, &bars()).is_err());
        assert_eq!(surfaces.live_chart(SurfaceId::AstTree), None);
    }

    #[test]
    fn test_surface_names() {
        assert_eq!(SurfaceId::AstTree.to_string(), "ast_tree");
        assert_eq!(SurfaceId::ComparisonSize.to_string(), "comparison_size");
    }
}
