//! End-to-end episode example.
//!
//! Builds an environment, runs the greedy heuristic and the idle baseline
//! over a few seeds, and prints the outcomes side by side.

use simicu_bench::reference_env_config;
use simicu_engine::{run_episode, GreedyPolicy, IcuEnv, IdlePolicy};

fn main() {
    println!("=== SimICU greedy vs idle ===\n");

    let mut env = IcuEnv::new(reference_env_config(0)).unwrap();
    let mut greedy = GreedyPolicy::new(*env.encoder().layout());

    for seed in 0..5u64 {
        let g = run_episode(&mut env, &mut greedy, seed).unwrap();
        let greedy_return = env.episode_return();
        let i = run_episode(&mut env, &mut IdlePolicy, seed).unwrap();
        let idle_return = env.episode_return();

        println!("seed {seed}");
        println!("  greedy: {}  return {greedy_return:.1}", g.score);
        println!("  idle:   {}  return {idle_return:.1}", i.score);
    }
}
