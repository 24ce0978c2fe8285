//! # Numeric sampler
//!
//! Turns the evaluation steps of a calculus result into something a chart can draw.
//!
//! ## Differentiation
//! The evaluator reports a handful of `(x, f(x))` steps around the differentiation point. The point
//! itself is the `x` of the middle step (`steps[len / 2]`). The plot covers the window
//! `[point - W/2, point + W/2)` with `N` evenly spaced samples (`W = 4`, `N = 100` by default) and every
//! sample takes `f(x)` of the nearest step; on a tie the step that comes first wins.
//!
//! The curve is therefore piecewise constant at the resolution of the supplied steps. This is the
//! documented behaviour of the panel, not a resampling of the real function: drawing a smoother curve
//! would mean interpolating between steps, which may come later as an option.
//!
//! ## Integration
//! The steps already trace the integrand over the integration interval, so they are used one to one as
//! the series, in the order received, and the chart fills the area under it.
//!
//! One step is enough for both kinds; no steps at all means no series.
use crate::Utils::config::SamplerSettings;
use crate::api::wire::{CalculusStep, CalculusType};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlotSeries {
    Differentiation {
        /// the differentiation point and f there, drawn as a marker
        point: SamplePoint,
        curve: Vec<SamplePoint>,
    },
    Integration {
        /// drawn with the area under the curve filled
        curve: Vec<SamplePoint>,
    },
}

impl PlotSeries {
    pub fn curve(&self) -> &[SamplePoint] {
        match self {
            PlotSeries::Differentiation { curve, .. } => curve,
            PlotSeries::Integration { curve } => curve,
        }
    }
}

/// step whose `x` is closest to `x`; the lowest index wins a tie
pub fn nearest_step(steps: &[CalculusStep], x: f64) -> Option<&CalculusStep> {
    steps.iter().reduce(|best, candidate| {
        if (candidate.x - x).abs() < (best.x - x).abs() {
            candidate
        } else {
            best
        }
    })
}

/// Sample series for a calculus result, `None` when there is nothing to plot
pub fn sample(kind: CalculusType, steps: &[CalculusStep], settings: &SamplerSettings) -> Option<PlotSeries> {
    if steps.is_empty() {
        return None;
    }
    match kind {
        CalculusType::Differentiation => Some(sample_differentiation(steps, settings)),
        CalculusType::Integration | CalculusType::Other => Some(sample_integration(steps)),
        CalculusType::NoCalculus => None,
    }
}

fn sample_differentiation(steps: &[CalculusStep], settings: &SamplerSettings) -> PlotSeries {
    let center = &steps[steps.len() / 2];
    let samples = settings.samples.max(1);
    let start = center.x - settings.window / 2.0;
    let curve = (0..samples)
        .map(|i| {
            let x = start + (i as f64 / samples as f64) * settings.window;
            // steps is not empty, so there always is a nearest one
            let y = nearest_step(steps, x).map_or(center.fx, |step| step.fx);
            SamplePoint { x, y }
        })
        .collect();
    PlotSeries::Differentiation {
        point: SamplePoint {
            x: center.x,
            y: center.fx,
        },
        curve,
    }
}

fn sample_integration(steps: &[CalculusStep]) -> PlotSeries {
    PlotSeries::Integration {
        curve: steps
            .iter()
            .map(|step| SamplePoint { x: step.x, y: step.fx })
            .collect(),
    }
}

//////////////////////////////////////////////////////////////////////////////////////
// TESTS
//////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests_sampler {
    use super::*;
    use approx::assert_relative_eq;

    fn step(x: f64, fx: f64) -> CalculusStep {
        CalculusStep {
            x,
            fx,
            description: format!("f({}) = {}", x, fx),
            warning: false,
        }
    }

    fn parabola_steps() -> Vec<CalculusStep> {
        vec![step(0.0, 0.0), step(1.0, 1.0), step(2.0, 4.0)]
    }

    #[test]
    fn test_nearest_neighbour() {
        let steps = parabola_steps();
        assert_eq!(nearest_step(&steps, 0.4).unwrap().fx, 0.0);
        assert_eq!(nearest_step(&steps, 1.6).unwrap().fx, 4.0);
        // equidistant from x=0 and x=1: first step wins
        assert_eq!(nearest_step(&steps, 0.5).unwrap().fx, 0.0);
        assert_eq!(nearest_step(&steps, 100.0).unwrap().fx, 4.0);
        assert!(nearest_step(&[], 1.0).is_none());
    }

    #[test]
    fn test_differentiation_window() {
        let steps = parabola_steps();
        let series = sample(CalculusType::Differentiation, &steps, &SamplerSettings::default()).unwrap();
        let PlotSeries::Differentiation { point, curve } = series else {
            panic!("expected a differentiation series");
        };
        assert_eq!(point, SamplePoint { x: 1.0, y: 1.0 });
        assert_eq!(curve.len(), 100);
        // [point - 2, point + 2) in steps of 4/100
        assert_relative_eq!(curve[0].x, -1.0, epsilon = 1e-12);
        assert_relative_eq!(curve[99].x, 2.96, epsilon = 1e-12);
        for pair in curve.windows(2) {
            assert_relative_eq!(pair[1].x - pair[0].x, 0.04, epsilon = 1e-12);
        }
        for sample_point in &curve {
            let expected = nearest_step(&steps, sample_point.x).unwrap().fx;
            assert_eq!(sample_point.y, expected);
        }
        // piecewise constant, no interpolation: only step values appear
        assert!(curve.iter().all(|p| [0.0, 1.0, 4.0].contains(&p.y)));
    }

    #[test]
    fn test_differentiation_custom_settings() {
        let settings = SamplerSettings {
            window: 2.0,
            samples: 4,
        };
        let steps = parabola_steps();
        let series = sample(CalculusType::Differentiation, &steps, &settings).unwrap();
        let xs: Vec<f64> = series.curve().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 0.5, 1.0, 1.5]);
        let ys: Vec<f64> = series.curve().iter().map(|p| p.y).collect();
        // 0.5 ties between steps 0 and 1, 1.5 ties between steps 1 and 2
        assert_eq!(ys, vec![0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_middle_step_is_point_for_even_length() {
        let steps = vec![step(0.0, 0.0), step(1.0, 1.0), step(2.0, 4.0), step(3.0, 9.0)];
        let series = sample(CalculusType::Differentiation, &steps, &SamplerSettings::default()).unwrap();
        match series {
            PlotSeries::Differentiation { point, .. } => assert_eq!(point.x, 2.0),
            other => panic!("unexpected series {:?}", other),
        }
    }

    #[test]
    fn test_integration_is_one_to_one() {
        let steps = vec![step(0.0, 1.0), step(0.5, 0.25), step(0.25, 3.0)];
        let series = sample(CalculusType::Integration, &steps, &SamplerSettings::default()).unwrap();
        let curve = series.curve();
        assert_eq!(curve.len(), steps.len());
        for (point, step) in curve.iter().zip(&steps) {
            assert_eq!((point.x, point.y), (step.x, step.fx));
        }
    }

    #[test]
    fn test_single_step() {
        let steps = vec![step(3.0, 7.0)];
        let diff = sample(CalculusType::Differentiation, &steps, &SamplerSettings::default()).unwrap();
        assert_eq!(diff.curve().len(), 100);
        assert!(diff.curve().iter().all(|p| p.y == 7.0));
        let integral = sample(CalculusType::Integration, &steps, &SamplerSettings::default()).unwrap();
        assert_eq!(integral.curve(), &[SamplePoint { x: 3.0, y: 7.0 }]);
    }

    #[test]
    fn test_nothing_to_plot() {
        assert!(sample(CalculusType::Integration, &[], &SamplerSettings::default()).is_none());
        assert!(sample(CalculusType::NoCalculus, &parabola_steps(), &SamplerSettings::default()).is_none());
    }

    #[test]
    fn test_unknown_kind_plots_steps_as_given() {
        let steps = parabola_steps();
        let series = sample(CalculusType::Other, &steps, &SamplerSettings::default()).unwrap();
        assert!(matches!(series, PlotSeries::Integration { .. }));
        assert_eq!(series.curve().len(), 3);
    }
}
