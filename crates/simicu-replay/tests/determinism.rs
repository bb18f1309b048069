//! Determinism verification through recorded replays.
//!
//! Each test: build a config → run N ticks recording to
//! `ReplayWriter<Vec<u8>>` → rebuild the config → replay through a fresh
//! `IcuWorld` via `ReplayReader<&[u8]>` → compare ward hashes per tick.

use proptest::prelude::*;
use simicu_bench::{reference_config, scripted_decision, stress_config};
use simicu_core::{Action, Decision, PatientId};
use simicu_engine::{DecisionSource, ExtendedParams, GreedyPolicy, IcuConfig, IcuEnv, IcuWorld};
use simicu_replay::hash::ward_hash;
use simicu_replay::{
    compare_wards, config_hash, replay_and_compare, BuildMetadata, InitDescriptor, ReplayError,
    ReplayReader, ReplayWriter,
};
use simicu_test_utils::fixtures::arb_decision;

// ── Helpers ─────────────────────────────────────────────────────

fn test_metadata() -> BuildMetadata {
    BuildMetadata {
        toolchain: env!("CARGO_PKG_VERSION").to_string(),
        target_triple: "test".to_string(),
        simicu_version: "0.1.0".to_string(),
        compile_flags: "test".to_string(),
    }
}

fn fingerprint(cfg: &IcuConfig) -> u64 {
    let l = &cfg.lifecycle;
    let mut params = vec![
        cfg.arrival_rate,
        cfg.initial_condition.0,
        cfg.initial_condition.1,
        l.wait_decay,
        l.wait_accel,
        l.wait_accel_block as f64,
        l.bed_rate,
        l.vent_rate,
        l.bed_setup_ticks as f64,
        l.vent_setup_ticks as f64,
    ];
    if let Some(ext) = &cfg.extended {
        params.push(ext.discharge_delay_ticks as f64);
    }
    config_hash(
        cfg.seed,
        [cfg.num_nurses, cfg.num_beds, cfg.num_ventilators],
        &params,
    )
}

fn init_for(cfg: &IcuConfig) -> InitDescriptor {
    InitDescriptor {
        seed: cfg.seed,
        config_hash: fingerprint(cfg),
        pool_sizes: [cfg.num_nurses, cfg.num_beds, cfg.num_ventilators],
    }
}

/// Record `ticks` steps of a fresh world, choosing each decision with `pick`.
fn record(
    cfg: &IcuConfig,
    ticks: u64,
    pick: &mut dyn FnMut(&IcuWorld, u64) -> Decision,
) -> Vec<u8> {
    let mut world = IcuWorld::new(cfg.clone()).unwrap();
    let mut buf = Vec::new();
    let mut writer = ReplayWriter::new(&mut buf, &test_metadata(), &init_for(cfg)).unwrap();
    for tick in 0..ticks {
        let decision = pick(&world, tick);
        world.step(decision).unwrap();
        writer.write_frame(decision, &world).unwrap();
    }
    assert_eq!(writer.frames_written(), ticks);
    buf
}

/// Replay a recording through a fresh world built from `cfg`.
fn replay(buf: &[u8], cfg: &IcuConfig) -> Option<simicu_replay::DivergenceReport> {
    let reader = ReplayReader::open(buf).unwrap();
    reader.check_config(fingerprint(cfg)).unwrap();
    let mut world = IcuWorld::new(cfg.clone()).unwrap();
    replay_and_compare(reader, &mut |decision| {
        world
            .step(decision)
            .map_err(|e| ReplayError::Step {
                tick_id: world.current_tick().0,
                detail: e.to_string(),
            })?;
        Ok(ward_hash(&world))
    })
    .unwrap()
}

// ── Scenarios ───────────────────────────────────────────────────

#[test]
fn idle_run_replays_exactly() {
    let cfg = reference_config(1);
    let buf = record(&cfg, 200, &mut |_: &IcuWorld, _: u64| Decision::idle());
    assert!(replay(&buf, &cfg).is_none());
}

#[test]
fn scripted_run_replays_exactly() {
    let cfg = reference_config(2);
    let buf = record(&cfg, 300, &mut |w: &IcuWorld, _: u64| scripted_decision(w));
    assert!(replay(&buf, &cfg).is_none());
}

#[test]
fn stress_run_replays_exactly() {
    let cfg = stress_config(3);
    let buf = record(&cfg, 500, &mut |w: &IcuWorld, _: u64| scripted_decision(w));
    assert!(replay(&buf, &cfg).is_none());
}

#[test]
fn extended_variant_replays_exactly() {
    let cfg = IcuConfig {
        extended: Some(ExtendedParams::default()),
        ..reference_config(4)
    };
    let buf = record(&cfg, 300, &mut |w: &IcuWorld, _: u64| scripted_decision(w));
    assert!(replay(&buf, &cfg).is_none());
}

#[test]
fn rejected_and_stale_decisions_replay_exactly() {
    let cfg = reference_config(5);
    // Targets ids that may not exist yet or are long terminal.
    let buf = record(&cfg, 150, &mut |_: &IcuWorld, tick: u64| {
        let action = if tick % 2 == 0 {
            Action::AdmitVentilator
        } else {
            Action::AdmitBed
        };
        Decision::new(PatientId(tick % 7), action)
    });
    assert!(replay(&buf, &cfg).is_none());
}

#[test]
fn different_seed_diverges() {
    let cfg = reference_config(6);
    let buf = record(&cfg, 200, &mut |w: &IcuWorld, _: u64| scripted_decision(w));

    let reader = ReplayReader::open(buf.as_slice()).unwrap();
    let other = reference_config(7);
    assert!(matches!(
        reader.check_config(fingerprint(&other)),
        Err(ReplayError::ConfigMismatch { .. })
    ));

    // Driving it anyway reports the first diverging tick.
    let mut world = IcuWorld::new(other).unwrap();
    let report = replay_and_compare(reader, &mut |d| {
        world.step(d).unwrap();
        Ok(ward_hash(&world))
    })
    .unwrap()
    .expect("different arrival streams must diverge");
    assert!(report.tick_id >= 1);
}

#[test]
fn compare_wards_pinpoints_condition_drift() {
    let cfg = reference_config(8);
    let mut a = IcuWorld::new(cfg.clone()).unwrap();
    let mut b = IcuWorld::new(cfg).unwrap();
    let id = a.inject_patient(50.0, None);
    b.inject_patient(49.0, None);
    a.step(Decision::idle()).unwrap();
    b.step(Decision::idle()).unwrap();

    let report = compare_wards(&b, ward_hash(&a), 1, Some(&a)).unwrap();
    assert!(report
        .divergences
        .iter()
        .any(|d| d.patient == Some(id) && d.field == "condition"));
}

#[test]
fn env_driven_episode_replays_through_world() {
    let mut env = IcuEnv::new(simicu_bench::reference_env_config(9)).unwrap();
    let cfg = env.config().icu.clone();
    let (mut obs, _) = env.reset(9).unwrap();

    // Warmup ticks are the idle decisions applied by reset.
    let mut buf = Vec::new();
    let mut writer = ReplayWriter::new(&mut buf, &test_metadata(), &init_for(&cfg)).unwrap();
    let mut shadow = IcuWorld::new(cfg.clone()).unwrap();
    for _ in 0..env.world().current_tick().0 {
        shadow.step(Decision::idle()).unwrap();
        writer.write_frame(Decision::idle(), &shadow).unwrap();
    }
    assert_eq!(ward_hash(&shadow), ward_hash(env.world()));

    let mut policy = GreedyPolicy::new(*env.encoder().layout());
    while !env.is_done() {
        let (slot, action) = policy.decide(&obs);
        let step = env.step(slot, action.code()).unwrap();
        writer.write_frame(step.receipt.decision, env.world()).unwrap();
        obs = step.observation;
    }
    drop(writer);

    let reader = ReplayReader::open(buf.as_slice()).unwrap();
    reader.check_config(fingerprint(&cfg)).unwrap();
    let mut world = IcuWorld::new(cfg).unwrap();
    let result = replay_and_compare(reader, &mut |d| {
        world.step(d).unwrap();
        Ok(ward_hash(&world))
    })
    .unwrap();
    assert!(result.is_none());
    assert_eq!(world.score(), env.world().score());
}

// ── Property: arbitrary decision sequences replay exactly ───────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn arbitrary_decisions_replay_exactly(
        seed in 0u64..1_000,
        decisions in prop::collection::vec(arb_decision(40), 1..120),
    ) {
        let cfg = IcuConfig {
            seed,
            arrival_rate: 0.3,
            ..IcuConfig::default()
        };
        let mut pick = |_: &IcuWorld, t: u64| decisions[t as usize];
        let buf = record(&cfg, decisions.len() as u64, &mut pick);
        prop_assert!(replay(&buf, &cfg).is_none());
    }
}
