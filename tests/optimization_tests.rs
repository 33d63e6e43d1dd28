//! End-to-end properties of the sizing model against real backends.
#![cfg(any(feature = "highs", feature = "microlp"))]

use solarsizer::application::builder::{BATTERY_CAPACITY, SOLAR_SIZE_CHOICE};
use solarsizer::application::{Optimizer, ResultExtractor};
use solarsizer::domain::{ParameterOverrides, ParameterSet, SolarSizeTable, SolveStatus, Summary};
use solarsizer::error::{ExtractionError, Result};
use solarsizer::infrastructure::config::SolverConfig;
use solarsizer::infrastructure::factory::{build_optimizer, build_runner};

const TOLERANCE: f64 = 1e-6;

fn approx(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < TOLERANCE
}

fn assert_summary(actual: Summary, expected: Summary) {
    assert!(
        approx(actual.solar_capacity, expected.solar_capacity)
            && approx(actual.battery_capacity, expected.battery_capacity)
            && approx(actual.off_peak_grid_usage, expected.off_peak_grid_usage)
            && approx(actual.peak_grid_consumption, expected.peak_grid_consumption),
        "expected {expected:?}, got {actual:?}"
    );
}

fn with(overrides: ParameterOverrides) -> ParameterSet {
    ParameterSet::merged(&overrides)
}

async fn optimize(params: &ParameterSet) -> Result<solarsizer::application::Optimization> {
    build_optimizer(&SolverConfig::default()).optimize(params).await
}

#[tokio::test]
async fn default_parameters_pick_largest_installation_with_battery() {
    let outcome = optimize(&ParameterSet::default()).await.unwrap();

    assert_eq!(outcome.status, SolveStatus::Solved);
    assert_eq!(outcome.selected_size, Some(12));
    assert_summary(
        outcome.summary.unwrap(),
        Summary {
            solar_capacity: 12.0,
            battery_capacity: 2.0,
            off_peak_grid_usage: 18.0,
            peak_grid_consumption: 0.0,
        },
    );
    assert!(approx(outcome.objective.unwrap(), 8.904));
}

#[tokio::test]
async fn peak_above_largest_size_forces_no_battery() {
    let params = with(ParameterOverrides {
        peak_consumption: Some(15.0),
        ..Default::default()
    });
    let outcome = optimize(&params).await.unwrap();

    assert_summary(
        outcome.summary.unwrap(),
        Summary {
            solar_capacity: 12.0,
            battery_capacity: 0.0,
            off_peak_grid_usage: 20.0,
            peak_grid_consumption: 3.0,
        },
    );
}

#[tokio::test]
async fn single_size_catalogue_is_used() {
    let params = with(ParameterOverrides {
        solar_installation_sizes: Some([(5, 0.1)].into_iter().collect()),
        ..Default::default()
    });
    let outcome = optimize(&params).await.unwrap();

    assert_eq!(outcome.selected_size, Some(5));
    assert_summary(
        outcome.summary.unwrap(),
        Summary {
            solar_capacity: 5.0,
            battery_capacity: 0.0,
            off_peak_grid_usage: 20.0,
            peak_grid_consumption: 5.0,
        },
    );
}

#[tokio::test]
async fn size_beyond_capacity_bound_is_infeasible() {
    let params = with(ParameterOverrides {
        solar_installation_sizes: Some([(150, 0.1)].into_iter().collect()),
        ..Default::default()
    });
    let outcome = optimize(&params).await.unwrap();

    assert_eq!(outcome.status, SolveStatus::Infeasible);
    assert!(outcome.summary.is_none());
    assert!(outcome.solver.is_some());
}

#[tokio::test]
async fn battery_is_zero_whenever_solar_misses_peak() {
    for peak in [4.0, 7.0, 9.5, 11.0, 14.0] {
        let params = with(ParameterOverrides {
            peak_consumption: Some(peak),
            ..Default::default()
        });
        let summary = optimize(&params).await.unwrap().summary.unwrap();

        assert!(summary.battery_capacity <= 4.0 + TOLERANCE);
        if summary.solar_capacity < peak - TOLERANCE {
            assert!(approx(summary.battery_capacity, 0.0), "peak {peak}: {summary:?}");
        } else {
            assert!(
                summary.battery_capacity <= summary.solar_capacity - peak + TOLERANCE,
                "peak {peak}: {summary:?}"
            );
        }
        assert!(summary.peak_grid_consumption + summary.solar_capacity >= peak - TOLERANCE);
        assert!(summary.off_peak_grid_usage + summary.battery_capacity >= 20.0 - TOLERANCE);
    }
}

#[test]
fn solved_model_selects_exactly_one_size() {
    let model = Optimizer::prepare(&ParameterSet::default()).unwrap();
    let runner = build_runner(&SolverConfig::default());
    let (status, model) = runner.solve_blocking(model, "highs", "microlp").unwrap();
    assert_eq!(status, SolveStatus::Solved);

    let choice = model.choice(SOLAR_SIZE_CHOICE).unwrap();
    let active = choice
        .flags
        .iter()
        .filter(|flag| model.value(**flag).unwrap() > 0.5)
        .count();
    assert_eq!(active, 1);

    let record = &model.transformed_disjunctions()[0];
    let indicators: f64 = record
        .indicators
        .iter()
        .map(|(_, id)| model.value(*id).unwrap())
        .sum();
    assert!(approx(indicators, 1.0));

    let battery = model.find_variable(BATTERY_CAPACITY).unwrap();
    assert!(model.value(battery).unwrap() >= -TOLERANCE);
}

#[test]
fn extraction_requires_a_solve() {
    let model = Optimizer::prepare(&ParameterSet::default()).unwrap();
    assert_eq!(
        ResultExtractor::extract(&model),
        Err(ExtractionError::NotSolved {
            status: SolveStatus::NotSolved
        })
    );
}

#[test]
fn overriding_sizes_replaces_whole_table() {
    let params = with(ParameterOverrides {
        peak_price: Some(0.6),
        solar_installation_sizes: Some(SolarSizeTable::parse_pairs("8=0.2").unwrap()),
        ..Default::default()
    });
    assert_eq!(params.peak_price, 0.6);
    assert_eq!(params.off_peak_price, ParameterSet::default().off_peak_price);
    assert_eq!(params.solar_installation_sizes.sizes().collect::<Vec<_>>(), vec![8]);
}

#[tokio::test]
async fn repeated_runs_agree() {
    let first = optimize(&ParameterSet::default()).await.unwrap();
    let second = optimize(&ParameterSet::default()).await.unwrap();
    assert_eq!(first.summary, second.summary);
    assert_eq!(first.selected_size, second.selected_size);
}
