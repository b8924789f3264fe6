//! Integration tests for the fermentation engine.
//!
//! Exercises: Parameters → SimulationEngine → step / introduce_contaminant
//! → History, checking the invariants every run must hold.
//!
//! All tests are pure logic, no presentation layer.

use kombucha_logic::engine::SimulationEngine;
use kombucha_logic::error::EngineError;
use kombucha_logic::growth::barrier_block;
use kombucha_logic::history::Quantity;
use kombucha_logic::integrator::compute_deltas;
use kombucha_logic::params::{validate_params, Parameters};
use kombucha_logic::state::SimulationState;

const DEFAULT_PARAMS_JSON: &str = include_str!("../../../data/default_params.json");

// ── Helpers ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Op {
    Step(i64),
    Introduce(&'static str),
}

/// A mixed script of steps and introductions covering a long run.
fn script() -> Vec<Op> {
    vec![
        Op::Step(3),
        Op::Introduce("mold"),
        Op::Step(1),
        Op::Introduce("mold"),
        Op::Step(10),
        Op::Introduce("harmful_bacteria"),
        Op::Step(40),
        Op::Introduce("mold"),
        Op::Step(150),
    ]
}

fn run(engine: &mut SimulationEngine, ops: &[Op]) {
    for op in ops {
        match *op {
            Op::Step(days) => {
                engine.step(days).unwrap();
            }
            Op::Introduce(kind) => {
                engine.introduce_contaminant(kind).unwrap();
            }
        }
    }
}

/// Parameter variants that stress the clamps in different ways.
fn parameter_variants() -> Vec<Parameters> {
    let base = Parameters::default();

    let mut overshoot = base.clone();
    overshoot.scoby_growth_rate = 2.5;

    let mut starved = base.clone();
    starved.oxygen_decay = 5.0;
    starved.ph_decay = 1.0;

    let mut bare = base.clone();
    bare.initial.scoby_size = 0.0;

    let mut crowded = base.clone();
    crowded.competition_coefficient = 0.2;

    let mut small_vessel = base.clone();
    small_vessel.carrying_capacity = 5.0;

    vec![base, overshoot, starved, bare, crowded, small_vessel]
}

fn assert_valid(state: &SimulationState, params: &Parameters) {
    assert!(
        (0.0..=params.carrying_capacity).contains(&state.scoby_size),
        "day {}: scoby {} outside [0, {}]",
        state.day,
        state.scoby_size,
        params.carrying_capacity
    );
    assert!(state.oxygen >= 0.0, "day {}: oxygen {}", state.day, state.oxygen);
    assert!(state.bacteria >= 0.0, "day {}: bacteria {}", state.day, state.bacteria);
    assert!(state.yeast >= 0.0, "day {}: yeast {}", state.day, state.yeast);
    assert!(state.ph >= params.ph_floor, "day {}: pH {}", state.day, state.ph);
    for (kind, &pop) in &state.contaminants {
        assert!(pop >= 0.0, "day {}: {} = {}", state.day, kind, pop);
    }
}

// ── Invariants ─────────────────────────────────────────────────────────

#[test]
fn state_stays_in_bounds_for_all_variants() {
    for params in parameter_variants() {
        assert!(validate_params(&params).is_empty());
        let mut engine = SimulationEngine::with_params(params.clone()).unwrap();
        run(&mut engine, &script());
        for snapshot in engine.history().iter() {
            assert_valid(snapshot, &params);
        }
    }
}

#[test]
fn ph_never_rises() {
    for params in parameter_variants() {
        let mut engine = SimulationEngine::with_params(params).unwrap();
        run(&mut engine, &script());
        let ph = engine.history().series(Quantity::Ph);
        for pair in ph.windows(2) {
            assert!(pair[1] <= pair[0], "pH rose from {} to {}", pair[0], pair[1]);
        }
    }
}

#[test]
fn day_advances_by_step_count() {
    let mut engine = SimulationEngine::new();
    engine.step(4).unwrap();
    assert_eq!(engine.state().day, 4);
    engine.introduce_contaminant("mold").unwrap();
    assert_eq!(engine.state().day, 4);
    engine.step(6).unwrap();
    assert_eq!(engine.state().day, 10);
}

#[test]
fn history_index_is_day() {
    let mut engine = SimulationEngine::new();
    run(&mut engine, &script());
    for (i, snapshot) in engine.history().iter().enumerate() {
        assert_eq!(snapshot.day, i as u64);
    }
    assert_eq!(engine.history().latest(), Some(engine.state()));
}

// ── Determinism ────────────────────────────────────────────────────────

#[test]
fn independent_engines_replay_identically() {
    let mut a = SimulationEngine::new();
    let mut b = SimulationEngine::new();
    run(&mut a, &script());
    run(&mut b, &script());
    assert_eq!(a.history(), b.history());
}

#[test]
fn reset_then_replay_reproduces_run() {
    let mut engine = SimulationEngine::new();
    run(&mut engine, &script());
    let first = engine.history().clone();
    engine.reset();
    run(&mut engine, &script());
    assert_eq!(engine.history(), &first);
}

#[test]
fn multi_day_step_equals_single_steps() {
    let mut bulk = SimulationEngine::new();
    let mut single = SimulationEngine::new();
    bulk.introduce_contaminant("harmful_bacteria").unwrap();
    single.introduce_contaminant("harmful_bacteria").unwrap();

    bulk.step(25).unwrap();
    for _ in 0..25 {
        single.step(1).unwrap();
    }
    assert_eq!(bulk.state(), single.state());
    assert_eq!(bulk.history(), single.history());
}

// ── Contaminant lifecycle ──────────────────────────────────────────────

#[test]
fn introduction_into_bare_culture() {
    let mut params = Parameters::default();
    params.initial.scoby_size = 0.0;
    let mut engine = SimulationEngine::with_params(params).unwrap();

    let state = engine.introduce_contaminant("mold").unwrap();
    assert_eq!(state.scoby_size, 0.0);
    assert_eq!(state.contaminant("mold"), 0.5);
    assert_eq!(engine.barrier_block(), 0.0);
}

#[test]
fn established_contaminant_not_reseeded() {
    let mut engine = SimulationEngine::new();
    engine.introduce_contaminant("mold").unwrap();
    engine.step(5).unwrap();
    let before = engine.state().clone();
    assert!(before.contaminant("mold") > 0.5);

    engine.introduce_contaminant("mold").unwrap();
    assert_eq!(engine.state(), &before);
}

#[test]
fn unknown_contaminant_changes_nothing() {
    let mut engine = SimulationEngine::new();
    engine.step(3).unwrap();
    let state_before = engine.state().clone();
    let history_before = engine.history().clone();

    let err = engine.introduce_contaminant("wild_yeast").unwrap_err();
    assert!(matches!(err, EngineError::UnknownContaminant { ref kind } if kind == "wild_yeast"));
    assert_eq!(engine.state(), &state_before);
    assert_eq!(engine.history(), &history_before);
}

#[test]
fn contaminant_entries_persist() {
    let mut engine = SimulationEngine::new();
    engine.introduce_contaminant("mold").unwrap();
    engine.step(100).unwrap();
    assert!(engine.state().contaminants.contains_key("mold"));
    assert_eq!(
        engine.history().contaminant_series("mold").len(),
        engine.history().len()
    );
}

#[test]
fn new_contaminant_kind_needs_only_config() {
    let mut params = Parameters::default();
    let mut wild = params.contaminants["mold"];
    wild.organism.growth_rate = 0.8;
    wild.inoculum = 2.0;
    params.contaminants.insert("wild_yeast".to_string(), wild);

    let mut engine = SimulationEngine::with_params(params).unwrap();
    engine.introduce_contaminant("wild_yeast").unwrap();
    engine.step(2).unwrap();
    assert!(engine.state().contaminant("wild_yeast") > 2.0);
}

// ── Reference scenario ─────────────────────────────────────────────────

#[test]
fn first_day_from_reset() {
    let mut engine = SimulationEngine::new();
    let start = engine.reset().clone();
    assert_eq!(start.scoby_size, 1.0);
    assert_eq!(start.ph, 5.0);
    assert_eq!(start.oxygen, 10.0);
    assert_eq!(start.bacteria, 1.0);
    assert_eq!(start.yeast, 1.0);
    assert_eq!(engine.params().carrying_capacity, 100.0);

    let next = engine.step(1).unwrap();
    assert_eq!(next.day, 1);
    assert!(next.scoby_size > start.scoby_size);
    assert!(next.ph < start.ph);
}

#[test]
fn mature_mat_blocks_contaminant_growth() {
    let mut engine = SimulationEngine::new();
    engine.step(120).unwrap();
    let params = engine.params().clone();
    let state = engine.state().clone();

    assert!(state.scoby_size > 0.99 * params.carrying_capacity);
    assert!(engine.barrier_block() > 0.97);

    // Same environment with and without the mat.
    let mut protected = state.clone();
    protected.contaminants.insert("harmful_bacteria".into(), 1.0);
    let mut bare = protected.clone();
    bare.scoby_size = 0.0;

    let with_mat = compute_deltas(&protected, &params).contaminants["harmful_bacteria"];
    let without_mat = compute_deltas(&bare, &params).contaminants["harmful_bacteria"];
    assert!(with_mat >= 0.0);
    assert!(with_mat <= 0.03 * without_mat);
}

#[test]
fn barrier_approaches_one_with_large_capacity() {
    let mut params = Parameters::default();
    params.carrying_capacity = 10_000.0;
    params.scoby_growth_rate = 1.0;
    let mut engine = SimulationEngine::with_params(params.clone()).unwrap();
    engine.step(60).unwrap();

    let p = engine.barrier_block();
    assert!(p > 0.999, "P_block = {}", p);
    assert_eq!(
        p,
        barrier_block(engine.state().scoby_size, params.barrier_half_saturation)
    );
}

// ── Errors ─────────────────────────────────────────────────────────────

#[test]
fn invalid_step_leaves_state_unchanged() {
    let mut engine = SimulationEngine::new();
    engine.step(5).unwrap();
    let before = engine.state().clone();
    assert!(matches!(
        engine.step(0),
        Err(EngineError::InvalidArgument { .. })
    ));
    assert!(matches!(
        engine.step(-7),
        Err(EngineError::InvalidArgument { .. })
    ));
    assert_eq!(engine.state(), &before);
    assert_eq!(engine.history().len(), 6);
}

// ── Configuration ──────────────────────────────────────────────────────

#[test]
fn bundled_params_file_is_valid() {
    let params: Parameters = serde_json::from_str(DEFAULT_PARAMS_JSON).unwrap();
    assert!(validate_params(&params).is_empty());
    assert_eq!(params, Parameters::default());
}

#[test]
fn state_view_json_shape() {
    let mut engine = SimulationEngine::new();
    engine.introduce_contaminant("mold").unwrap();
    engine.step(2).unwrap();
    let json = serde_json::to_value(engine.get_state()).unwrap();

    assert_eq!(json["current"]["day"], 2);
    assert!(json["current"]["contaminants"]["mold"].as_f64().unwrap() > 0.5);
    let history = json["history"].as_array().unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0]["contaminants"]["mold"], 0.5);
}
