//! Kombucha Headless Simulation Harness
//!
//! Validates the fermentation engine without any dashboard or web layer.
//! Runs entirely in-process: no HTTP, no rendering.
//!
//! Usage:
//!   cargo run -p kombucha-simtest
//!   cargo run -p kombucha-simtest -- --verbose --days 300
//!   cargo run -p kombucha-simtest -- --params my_params.json --dump-json

use kombucha_logic::engine::{parse_step_count, SimulationEngine};
use kombucha_logic::error::EngineError;
use kombucha_logic::growth::barrier_block;
use kombucha_logic::history::Quantity;
use kombucha_logic::params::{validate_params, Parameters};
use kombucha_logic::state::SimulationState;

// ── Default parameters (same values as Parameters::default) ─────────────
const DEFAULT_PARAMS_JSON: &str = include_str!("../../../data/default_params.json");

const DEFAULT_SWEEP_DAYS: i64 = 200;

/// Longest accepted `--days`. Bacteria and yeast have no carrying capacity,
/// so under the default parameters they overflow to `inf` after roughly
/// 2,900 days.
const MAX_SWEEP_DAYS: i64 = 1000;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    dump_json: bool,
    days: i64,
    params_path: Option<String>,
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut opts = Options {
        verbose: false,
        dump_json: false,
        days: DEFAULT_SWEEP_DAYS,
        params_path: None,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--verbose" => opts.verbose = true,
            "--dump-json" => opts.dump_json = true,
            "--days" => {
                let raw = iter.next().ok_or("--days needs a value")?;
                opts.days = parse_step_count(raw).map_err(|e| e.to_string())?;
                if opts.days > MAX_SWEEP_DAYS {
                    return Err(format!(
                        "--days must be at most {}, got {}",
                        MAX_SWEEP_DAYS, opts.days
                    ));
                }
            }
            "--params" => {
                let path = iter.next().ok_or("--params needs a path")?;
                opts.params_path = Some(path.clone());
            }
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }
    Ok(opts)
}

fn main() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let opts = match parse_options(&args) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("usage: kombucha-simtest [--verbose] [--days N] [--params PATH] [--dump-json]");
            std::process::exit(2);
        }
    };

    println!("=== Kombucha Fermentation Harness ===\n");

    let mut results = Vec::new();

    // 1. Parameter loading and validation
    let params = match load_params(&opts, &mut results) {
        Some(p) => p,
        None => {
            report(&results, opts.verbose);
            std::process::exit(1);
        }
    };

    // 2. Baseline fermentation
    results.extend(validate_baseline(&params, opts.verbose));

    // 3. Long-run invariant sweep with contaminants
    let (sweep_results, sweep_engine) = validate_invariants(&params, opts.days, opts.verbose);
    results.extend(sweep_results);

    // 4. SCOBY barrier effect
    results.extend(validate_barrier(&params, opts.verbose));

    // 5. Determinism and decomposability
    results.extend(validate_determinism(&params, opts.verbose));

    // 6. Error handling
    results.extend(validate_errors(&params, opts.verbose));

    if opts.dump_json {
        if let Some(engine) = &sweep_engine {
            match serde_json::to_string_pretty(&engine.get_state()) {
                Ok(json) => println!("{}", json),
                Err(e) => log::error!("failed to serialize final state: {}", e),
            }
        }
    }

    if !report(&results, opts.verbose) {
        std::process::exit(1);
    }
}

/// Print the summary. Returns true if everything passed.
fn report(results: &[TestResult], verbose: bool) -> bool {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );
    failed == 0
}

fn engine_for(params: &Parameters) -> Result<SimulationEngine, EngineError> {
    SimulationEngine::with_params(params.clone())
}

/// A failed result carrying the engine error that stopped a section.
fn failure(name: &str, err: EngineError) -> TestResult {
    TestResult {
        name: name.into(),
        passed: false,
        detail: err.to_string(),
    }
}

// ── 1. Parameters ───────────────────────────────────────────────────────

fn load_params(opts: &Options, results: &mut Vec<TestResult>) -> Option<Parameters> {
    println!("--- Parameters ---");

    let (source, text) = match &opts.params_path {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(t) => (path.clone(), t),
            Err(e) => {
                results.push(TestResult {
                    name: "params_read".into(),
                    passed: false,
                    detail: format!("cannot read {}: {}", path, e),
                });
                return None;
            }
        },
        None => ("bundled defaults".to_string(), DEFAULT_PARAMS_JSON.to_string()),
    };

    let params: Parameters = match serde_json::from_str(&text) {
        Ok(p) => p,
        Err(e) => {
            results.push(TestResult {
                name: "params_parse".into(),
                passed: false,
                detail: format!("JSON parse error in {}: {}", source, e),
            });
            return None;
        }
    };
    log::info!("loaded parameters from {}", source);

    let errors = validate_params(&params);
    results.push(TestResult {
        name: "params_valid".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            format!(
                "{} contaminant kinds configured ({})",
                params.contaminants.len(),
                params.contaminant_kinds().collect::<Vec<_>>().join(", ")
            )
        } else {
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        },
    });

    if opts.verbose {
        println!(
            "  K={} r_s={} S_half={} pH floor={}",
            params.carrying_capacity,
            params.scoby_growth_rate,
            params.barrier_half_saturation,
            params.ph_floor
        );
    }

    if errors.is_empty() {
        Some(params)
    } else {
        None
    }
}

// ── 2. Baseline ─────────────────────────────────────────────────────────

fn validate_baseline(params: &Parameters, verbose: bool) -> Vec<TestResult> {
    println!("--- Baseline Fermentation ---");
    let mut results = Vec::new();
    let mut engine = match engine_for(params) {
        Ok(engine) => engine,
        Err(e) => {
            results.push(failure("baseline_setup", e));
            return results;
        }
    };

    let start = engine.state().clone();
    let day1 = match engine.step(1) {
        Ok(s) => s.clone(),
        Err(e) => {
            results.push(failure("baseline_step", e));
            return results;
        }
    };

    results.push(TestResult {
        name: "day_one_scoby_grows".into(),
        // A mat already at capacity (or absent) has nothing to grow.
        passed: day1.scoby_size > start.scoby_size
            || start.scoby_size >= params.carrying_capacity
            || start.scoby_size == 0.0,
        detail: format!("{:.3} -> {:.3}", start.scoby_size, day1.scoby_size),
    });
    results.push(TestResult {
        name: "day_one_acidifies".into(),
        passed: day1.ph <= start.ph,
        detail: format!("pH {:.3} -> {:.3}", start.ph, day1.ph),
    });
    results.push(TestResult {
        name: "day_one_counter".into(),
        passed: day1.day == 1,
        detail: format!("day = {}", day1.day),
    });

    if let Err(e) = engine.step(29) {
        results.push(failure("baseline_30d", e));
        return results;
    }
    let scoby = engine.history().series(Quantity::ScobySize);
    let monotone = scoby.windows(2).all(|w| w[1] >= w[0]);
    results.push(TestResult {
        name: "scoby_monotone_30d".into(),
        passed: monotone,
        detail: format!(
            "SCOBY after 30 days: {:.2} / {}",
            engine.state().scoby_size,
            params.carrying_capacity
        ),
    });

    if verbose {
        let s = engine.state();
        println!(
            "  day 30: scoby={:.2} pH={:.2} O2={:.2} B={:.2} Y={:.2} status={:?}",
            s.scoby_size,
            s.ph,
            s.oxygen,
            s.bacteria,
            s.yeast,
            engine.status().health
        );
    }

    results
}

// ── 3. Invariant sweep ──────────────────────────────────────────────────

fn invariant_violations(state: &SimulationState, params: &Parameters) -> Vec<String> {
    let mut v = Vec::new();
    if !(0.0..=params.carrying_capacity).contains(&state.scoby_size) {
        v.push(format!("day {}: scoby {}", state.day, state.scoby_size));
    }
    if state.oxygen < 0.0 {
        v.push(format!("day {}: oxygen {}", state.day, state.oxygen));
    }
    if state.bacteria < 0.0 || state.yeast < 0.0 {
        v.push(format!(
            "day {}: B={} Y={}",
            state.day, state.bacteria, state.yeast
        ));
    }
    for (kind, &pop) in &state.contaminants {
        if pop < 0.0 {
            v.push(format!("day {}: {}={}", state.day, kind, pop));
        }
    }
    v
}

/// Introduce every configured kind at staggered days across the sweep.
fn staggered_sweep(params: &Parameters, days: i64) -> Result<SimulationEngine, EngineError> {
    let mut engine = engine_for(params)?;
    let kinds: Vec<String> = engine.configured_kinds().map(String::from).collect();
    let stride = (days / (kinds.len() as i64 + 1)).max(1);
    let mut remaining = days;
    for kind in &kinds {
        let chunk = stride.min(remaining);
        if chunk > 0 {
            engine.step(chunk)?;
            remaining -= chunk;
        }
        engine.introduce_contaminant(kind)?;
    }
    if remaining > 0 {
        engine.step(remaining)?;
    }
    Ok(engine)
}

fn validate_invariants(
    params: &Parameters,
    days: i64,
    verbose: bool,
) -> (Vec<TestResult>, Option<SimulationEngine>) {
    println!("--- Invariant Sweep ({} days) ---", days);
    let mut results = Vec::new();
    let engine = match staggered_sweep(params, days) {
        Ok(engine) => engine,
        Err(e) => {
            results.push(failure("sweep_run", e));
            return (results, None);
        }
    };

    let violations: Vec<String> = engine
        .history()
        .iter()
        .flat_map(|s| invariant_violations(s, params))
        .collect();
    results.push(TestResult {
        name: "bounds_hold".into(),
        passed: violations.is_empty(),
        detail: if violations.is_empty() {
            format!("{} snapshots within bounds", engine.history().len())
        } else {
            format!("{} violations, first: {}", violations.len(), violations[0])
        },
    });

    let ph = engine.history().series(Quantity::Ph);
    let rises = ph.windows(2).filter(|w| w[1] > w[0]).count();
    results.push(TestResult {
        name: "ph_non_increasing".into(),
        passed: rises == 0,
        detail: format!(
            "pH {:.2} -> {:.2}, {} rises",
            ph.first().copied().unwrap_or_default(),
            ph.last().copied().unwrap_or_default(),
            rises
        ),
    });

    let days_ok = engine.state().day == days as u64;
    results.push(TestResult {
        name: "day_counter".into(),
        passed: days_ok && engine.history().len() as u64 == engine.state().day + 1,
        detail: format!(
            "day {} with {} snapshots",
            engine.state().day,
            engine.history().len()
        ),
    });

    if verbose {
        for kind in engine.configured_kinds() {
            let series = engine.history().contaminant_series(kind);
            println!(
                "  {}: final population {:.3}",
                kind,
                series.last().copied().unwrap_or_default()
            );
        }
        println!("  final status: {:?}", engine.status());
    }

    (results, Some(engine))
}

// ── 4. Barrier effect ───────────────────────────────────────────────────

fn validate_barrier(params: &Parameters, verbose: bool) -> Vec<TestResult> {
    println!("--- SCOBY Barrier ---");
    let mut results = Vec::new();

    // P_block rises with mat size.
    let sizes = [0.0, 0.5, 2.0, 10.0, 100.0, 1000.0];
    let blocks: Vec<f64> = sizes
        .iter()
        .map(|&s| barrier_block(s, params.barrier_half_saturation))
        .collect();
    results.push(TestResult {
        name: "barrier_monotone".into(),
        passed: blocks[0] == 0.0 && blocks.windows(2).all(|w| w[1] > w[0]) && blocks[5] < 1.0,
        detail: format!(
            "P_block at S=0..1000: {}",
            blocks
                .iter()
                .map(|b| format!("{:.3}", b))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    });

    // Same environment, two mat sizes: bigger mat, slower contaminant growth.
    let Some(kind) = params.contaminant_kinds().next().map(String::from) else {
        return results;
    };
    let seeded = engine_for(params).and_then(|mut engine| {
        engine.introduce_contaminant(&kind)?;
        Ok(engine)
    });
    let engine = match seeded {
        Ok(engine) => engine,
        Err(e) => {
            results.push(failure("barrier_setup", e));
            return results;
        }
    };
    let mut young = engine.state().clone();
    young.scoby_size = params.barrier_half_saturation * 0.1;
    let mut mature = young.clone();
    mature.scoby_size = params.carrying_capacity;

    let growth = |s: &SimulationState| {
        kombucha_logic::integrator::compute_deltas(s, params)
            .contaminants
            .get(&kind)
            .copied()
            .unwrap_or_default()
    };
    let (g_young, g_mature) = (growth(&young), growth(&mature));
    results.push(TestResult {
        name: "mature_mat_suppresses".into(),
        passed: g_mature <= g_young,
        detail: format!(
            "{} daily growth: young mat {:.4}, mature mat {:.4}",
            kind, g_young, g_mature
        ),
    });

    if verbose {
        println!(
            "  mature-mat P_block = {:.4}",
            barrier_block(params.carrying_capacity, params.barrier_half_saturation)
        );
    }

    results
}

// ── 5. Determinism ──────────────────────────────────────────────────────

fn scripted_run(params: &Parameters) -> Result<SimulationEngine, EngineError> {
    let mut engine = engine_for(params)?;
    let kinds: Vec<String> = engine.configured_kinds().map(String::from).collect();
    engine.step(5)?;
    for kind in &kinds {
        engine.introduce_contaminant(kind)?;
        engine.step(7)?;
    }
    engine.step(30)?;
    Ok(engine)
}

fn bulk_and_single(
    params: &Parameters,
) -> Result<(SimulationEngine, SimulationEngine), EngineError> {
    let mut bulk = engine_for(params)?;
    let mut single = engine_for(params)?;
    bulk.step(40)?;
    for _ in 0..40 {
        single.step(1)?;
    }
    Ok((bulk, single))
}

fn validate_determinism(params: &Parameters, _verbose: bool) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let mut results = Vec::new();

    match scripted_run(params).and_then(|a| Ok((a, scripted_run(params)?))) {
        Ok((a, b)) => results.push(TestResult {
            name: "replay_identical".into(),
            passed: a.history() == b.history(),
            detail: format!("{} snapshots compared", a.history().len()),
        }),
        Err(e) => results.push(failure("replay_identical", e)),
    }

    match bulk_and_single(params) {
        Ok((bulk, single)) => results.push(TestResult {
            name: "step_decomposes".into(),
            passed: bulk.state() == single.state(),
            detail: "step(40) vs 40 x step(1)".into(),
        }),
        Err(e) => results.push(failure("step_decomposes", e)),
    }

    match scripted_run(params).and_then(|replay| Ok((replay, engine_for(params)?))) {
        Ok((mut replay, fresh)) => {
            replay.reset();
            results.push(TestResult {
                name: "reset_restores_initial".into(),
                passed: replay.state() == fresh.state() && replay.history().len() == 1,
                detail: format!("history length after reset: {}", replay.history().len()),
            });
        }
        Err(e) => results.push(failure("reset_restores_initial", e)),
    }

    results
}

// ── 6. Errors ───────────────────────────────────────────────────────────

fn validate_errors(params: &Parameters, _verbose: bool) -> Vec<TestResult> {
    println!("--- Error Handling ---");
    let mut results = Vec::new();
    let warmed = engine_for(params).and_then(|mut engine| {
        engine.step(3)?;
        Ok(engine)
    });
    let mut engine = match warmed {
        Ok(engine) => engine,
        Err(e) => {
            results.push(failure("errors_setup", e));
            return results;
        }
    };
    let before = engine.state().clone();

    let zero = engine.step(0);
    results.push(TestResult {
        name: "zero_step_rejected".into(),
        passed: matches!(zero, Err(EngineError::InvalidArgument { .. })),
        detail: describe(zero.map(|s| s.day)),
    });

    let fractional = parse_step_count("2.5");
    results.push(TestResult {
        name: "fractional_step_rejected".into(),
        passed: matches!(fractional, Err(EngineError::InvalidArgument { .. })),
        detail: describe(fractional),
    });

    let unknown = engine.introduce_contaminant("not_a_contaminant");
    results.push(TestResult {
        name: "unknown_kind_rejected".into(),
        passed: matches!(unknown, Err(EngineError::UnknownContaminant { .. })),
        detail: describe(unknown.map(|s| s.day)),
    });

    results.push(TestResult {
        name: "errors_leave_state".into(),
        passed: engine.state() == &before,
        detail: format!("still on day {}", engine.state().day),
    });

    results
}

fn describe<T: std::fmt::Debug>(r: Result<T, EngineError>) -> String {
    match r {
        Ok(v) => format!("unexpectedly accepted: {:?}", v),
        Err(e) => e.to_string(),
    }
}
