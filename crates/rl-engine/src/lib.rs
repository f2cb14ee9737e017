//! Reinforcement Learning engine — epsilon-greedy multi-armed bandit that
//! picks which page variant a visitor sees and learns from conversion feedback.

pub mod bandits;

pub use bandits::{AgentState, EpsilonGreedyAgent};
