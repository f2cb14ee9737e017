//! Epsilon-Greedy multi-armed bandit for A/B page variant selection.
//!
//! The agent starts with a balanced, shuffled warm-up sequence so every arm is
//! shown equally often before any estimate is trusted. Afterwards it explores
//! a uniformly random arm with probability `epsilon` and otherwise exploits
//! the arm(s) with the highest running mean reward.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, info};
use utoipa::ToSchema;
use variant_core::config::AgentConfig;
use variant_core::{Arm, VariantError, VariantResult};

/// Point-in-time copy of the per-arm statistics.
///
/// Serialized as `{"q": {...}, "n": {...}}`, the shape the landing page reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AgentState {
    /// Running mean reward per arm.
    #[serde(rename = "q")]
    pub value_estimate: BTreeMap<Arm, f64>,
    /// Number of feedback events per arm.
    #[serde(rename = "n")]
    pub count: BTreeMap<Arm, u64>,
}

#[derive(Debug, Clone, Default)]
struct ArmStats {
    value_estimate: f64,
    count: u64,
}

/// Which branch of the policy produced a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    ColdStart,
    Explore,
    Exploit,
}

struct AgentInner<R> {
    /// Indexed like `EpsilonGreedyAgent::arms`.
    stats: Vec<ArmStats>,
    /// Arm indices still to be served during warm-up; never refilled.
    cold_start: VecDeque<usize>,
    rng: R,
}

/// Thread-safe epsilon-greedy agent over a fixed arm set.
///
/// A single mutex guards statistics, warm-up queue and random source, so
/// `choose`, `update` and `state` never observe each other half-applied.
pub struct EpsilonGreedyAgent<R = StdRng> {
    epsilon: f64,
    arms: Vec<Arm>,
    inner: Mutex<AgentInner<R>>,
}

impl EpsilonGreedyAgent<StdRng> {
    /// Build an agent seeded from `config.seed`, or from OS entropy when unset.
    pub fn new(config: &AgentConfig) -> VariantResult<Self> {
        match config.seed {
            Some(seed) => Self::with_seed(config, seed),
            None => Self::with_rng(config, StdRng::from_entropy()),
        }
    }

    /// Build an agent whose shuffles and draws are reproducible.
    pub fn with_seed(config: &AgentConfig, seed: u64) -> VariantResult<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> EpsilonGreedyAgent<R> {
    /// Build an agent drawing all randomness from `rng`.
    pub fn with_rng(config: &AgentConfig, mut rng: R) -> VariantResult<Self> {
        config.validate()?;

        let arms: Vec<Arm> = config.arms.iter().map(|a| Arm::new(a.as_str())).collect();
        let copies = config.cold_start_size / arms.len();

        let mut cold_start: Vec<usize> = (0..copies).flat_map(|_| 0..arms.len()).collect();
        cold_start.shuffle(&mut rng);

        info!(
            epsilon = config.epsilon,
            arms = ?config.arms,
            cold_start = cold_start.len(),
            "Epsilon-greedy agent initialized"
        );

        Ok(Self {
            epsilon: config.epsilon,
            inner: Mutex::new(AgentInner {
                stats: vec![ArmStats::default(); arms.len()],
                cold_start: cold_start.into(),
                rng,
            }),
            arms,
        })
    }

    /// Select the arm to show the next visitor.
    pub fn choose(&self) -> Arm {
        let mut guard = self.inner.lock();
        let AgentInner {
            stats,
            cold_start,
            rng,
        } = &mut *guard;

        let (idx, branch) = if let Some(idx) = cold_start.pop_front() {
            (idx, Branch::ColdStart)
        } else if rng.gen::<f64>() < self.epsilon {
            (rng.gen_range(0..self.arms.len()), Branch::Explore)
        } else {
            let best_q = stats
                .iter()
                .map(|s| s.value_estimate)
                .fold(f64::NEG_INFINITY, f64::max);
            // Exact equality: identical update histories must tie.
            let tied: Vec<usize> = stats
                .iter()
                .enumerate()
                .filter(|(_, s)| s.value_estimate == best_q)
                .map(|(i, _)| i)
                .collect();
            let idx = tied
                .choose(rng)
                .copied()
                .unwrap_or_else(|| rng.gen_range(0..self.arms.len()));
            (idx, Branch::Exploit)
        };

        let arm = self.arms[idx].clone();
        debug!(arm = %arm, branch = ?branch, "Arm chosen");
        arm
    }

    /// Record `reward` for `arm` and fold it into the arm's running mean.
    ///
    /// Unknown arms are rejected without touching any statistics.
    pub fn update(&self, arm: &Arm, reward: f64) -> VariantResult<()> {
        let idx = self
            .index_of(arm)
            .ok_or_else(|| VariantError::InvalidArm(arm.to_string()))?;

        let mut inner = self.inner.lock();
        let stats = &mut inner.stats[idx];
        stats.count += 1;
        stats.value_estimate += (reward - stats.value_estimate) / stats.count as f64;

        debug!(
            arm = %arm,
            reward,
            count = stats.count,
            value_estimate = stats.value_estimate,
            "Arm updated"
        );
        Ok(())
    }

    pub fn state(&self) -> AgentState {
        let inner = self.inner.lock();
        let mut value_estimate = BTreeMap::new();
        let mut count = BTreeMap::new();
        for (arm, stats) in self.arms.iter().zip(&inner.stats) {
            value_estimate.insert(arm.clone(), stats.value_estimate);
            count.insert(arm.clone(), stats.count);
        }
        AgentState {
            value_estimate,
            count,
        }
    }

    /// Warm-up choices left before the epsilon-greedy policy takes over.
    pub fn cold_start_remaining(&self) -> usize {
        self.inner.lock().cold_start.len()
    }
}

impl<R> EpsilonGreedyAgent<R> {
    pub fn arms(&self) -> &[Arm] {
        &self.arms
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn contains(&self, arm: &Arm) -> bool {
        self.index_of(arm).is_some()
    }

    /// Resolve a raw label to one of this agent's arms.
    pub fn parse_arm(&self, label: &str) -> VariantResult<Arm> {
        self.arms
            .iter()
            .find(|a| a.as_str() == label)
            .cloned()
            .ok_or_else(|| VariantError::InvalidArm(label.to_string()))
    }

    fn index_of(&self, arm: &Arm) -> Option<usize> {
        self.arms.iter().position(|a| a == arm)
    }
}
