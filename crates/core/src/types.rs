//! Shared domain types with enforced invariants.
//!
//! - Player: the two signed sides, `X = +1` and `O = -1`
//! - GameOutcome: terminal result from one player's perspective
//! - ActionMask: legal-action bitmask over the flattened action space
//! - Policy: probability distribution summing to 1.0
//! - Value: game value in range [-1, 1]

use crate::{GameError, Result};
use std::fmt;

/// Tolerance for policy sum validation.
const POLICY_SUM_TOLERANCE: f32 = 1e-5;

/// Backup value of a drawn game.
///
/// Kept distinguishable from exact zero, which means "not decided yet".
pub const DRAW_VALUE: f32 = 1e-4;

/// One of the two sides. The discriminant is the side's sign, so negating a
/// board flips the perspective.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[repr(i8)]
pub enum Player {
    X = 1,
    O = -1,
}

impl Player {
    /// Get the opposing player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Signed unit value of this side.
    pub fn sign(self) -> i8 {
        self as i8
    }

    /// Player for a signed unit value, `None` for anything else.
    pub fn from_sign(sign: i8) -> Option<Self> {
        match sign {
            1 => Some(Player::X),
            -1 => Some(Player::O),
            _ => None,
        }
    }
}

impl std::ops::Neg for Player {
    type Output = Player;

    fn neg(self) -> Self::Output {
        self.opponent()
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::X => write!(f, "X"),
            Player::O => write!(f, "O"),
        }
    }
}

/// Result of a game from one player's perspective.
///
/// Compare variants, not [`GameOutcome::value`] against zero: a draw's
/// value is a small positive number.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum GameOutcome {
    Ongoing,
    Win,
    Loss,
    Draw,
}

impl GameOutcome {
    /// Numeric value used for backup: 0, +1, -1 or [`DRAW_VALUE`].
    pub fn value(self) -> f32 {
        match self {
            GameOutcome::Ongoing => 0.0,
            GameOutcome::Win => 1.0,
            GameOutcome::Loss => -1.0,
            GameOutcome::Draw => DRAW_VALUE,
        }
    }

    /// The same result seen by the other player.
    pub fn flip(self) -> Self {
        match self {
            GameOutcome::Win => GameOutcome::Loss,
            GameOutcome::Loss => GameOutcome::Win,
            other => other,
        }
    }

    pub fn is_terminal(self) -> bool {
        self != GameOutcome::Ongoing
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::Ongoing => write!(f, "ongoing"),
            GameOutcome::Win => write!(f, "win"),
            GameOutcome::Loss => write!(f, "loss"),
            GameOutcome::Draw => write!(f, "draw"),
        }
    }
}

/// Legal actions over a flattened action space.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ActionMask(Vec<bool>);

impl ActionMask {
    /// A mask of `size` actions with nothing set.
    pub fn empty(size: usize) -> Self {
        Self(vec![false; size])
    }

    /// A mask with only the last (pass) action set.
    pub fn pass_only(size: usize) -> Self {
        let mut mask = Self::empty(size);
        if let Some(last) = mask.0.last_mut() {
            *last = true;
        }
        mask
    }

    pub fn set(&mut self, action: usize) {
        self.0[action] = true;
    }

    /// Whether `action` is legal. Out-of-range indices are not.
    pub fn is_set(&self, action: usize) -> bool {
        self.0.get(action).copied().unwrap_or(false)
    }

    /// Size of the action space this mask covers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of legal actions.
    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&b| b).count()
    }

    /// Legal action indices in ascending order.
    pub fn iter_set(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b)
            .map(|(i, _)| i)
    }

    /// True when the pass slot is the only legal action.
    pub fn is_pass_only(&self) -> bool {
        let n = self.0.len();
        n > 0 && self.0[n - 1] && self.0[..n - 1].iter().all(|&b| !b)
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

/// A probability distribution over actions.
///
/// Invariant: All values are non-negative and sum to 1.0 (±1e-5).
///
/// # Example
/// ```
/// use uttt_core::Policy;
///
/// let policy = Policy::new(vec![0.3, 0.5, 0.2]).unwrap();
/// assert!((policy.sum() - 1.0).abs() < 1e-5);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Policy(Vec<f32>);

impl Policy {
    /// Create a new policy from a probability distribution.
    ///
    /// # Errors
    /// Returns `GameError::InvalidPolicy` if:
    /// - Any value is negative
    /// - Values don't sum to 1.0 (±1e-5)
    /// - Vector is empty
    pub fn new(probs: Vec<f32>) -> Result<Self> {
        if probs.is_empty() {
            return Err(GameError::InvalidPolicy(
                "policy cannot be empty".to_string(),
            ));
        }

        if probs.iter().any(|&p| p < 0.0) {
            return Err(GameError::InvalidPolicy(
                "policy contains negative values".to_string(),
            ));
        }

        let sum: f32 = probs.iter().sum();
        if (sum - 1.0).abs() > POLICY_SUM_TOLERANCE {
            return Err(GameError::InvalidPolicy(format!(
                "policy sum {} is not 1.0 (tolerance {})",
                sum, POLICY_SUM_TOLERANCE
            )));
        }

        Ok(Self(probs))
    }

    /// Create a policy from raw values, normalizing them to sum to 1.0.
    ///
    /// # Errors
    /// Returns error if any value is negative or the total mass is zero.
    pub fn from_unnormalized(values: Vec<f32>) -> Result<Self> {
        if values.is_empty() {
            return Err(GameError::InvalidPolicy(
                "policy cannot be empty".to_string(),
            ));
        }

        if values.iter().any(|&v| v < 0.0 || v.is_nan()) {
            return Err(GameError::InvalidPolicy(
                "policy contains negative or NaN values".to_string(),
            ));
        }

        let sum: f32 = values.iter().sum();
        if sum <= f32::EPSILON || !sum.is_finite() {
            return Err(GameError::InvalidPolicy(
                "cannot normalize: total mass is zero".to_string(),
            ));
        }

        let normalized: Vec<f32> = values.iter().map(|&v| v / sum).collect();
        Ok(Self(normalized))
    }

    /// Uniform distribution over the set actions of `mask`; zero elsewhere.
    ///
    /// # Errors
    /// Returns error if the mask has no legal action.
    pub fn uniform_over(mask: &ActionMask) -> Result<Self> {
        let legal = mask.count();
        if legal == 0 {
            return Err(GameError::InvalidPolicy(
                "cannot create uniform policy with 0 legal actions".to_string(),
            ));
        }

        let prob = 1.0 / legal as f32;
        Ok(Self(
            mask.as_slice()
                .iter()
                .map(|&b| if b { prob } else { 0.0 })
                .collect(),
        ))
    }

    /// Get the probability at the given index, returning 0 if out of bounds.
    pub fn get_or_zero(&self, index: usize) -> f32 {
        self.0.get(index).copied().unwrap_or(0.0)
    }

    /// Get the number of actions in this policy.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the sum of all probabilities (should be ~1.0).
    pub fn sum(&self) -> f32 {
        self.0.iter().sum()
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl std::ops::Index<usize> for Policy {
    type Output = f32;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// A game value estimate.
///
/// Invariant: Value is in range [-1, 1] where:
/// - +1 means the player to move is winning
/// - -1 means the player to move is losing
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Value(f32);

impl Value {
    /// Create a new value.
    ///
    /// # Errors
    /// Returns `GameError::InvalidValue` if the value is outside [-1, 1].
    pub fn new(value: f32) -> Result<Self> {
        if !(-1.0..=1.0).contains(&value) {
            return Err(GameError::InvalidValue(format!(
                "value {} is outside range [-1, 1]",
                value
            )));
        }
        Ok(Self(value))
    }

    /// Create a value by clamping to [-1, 1]. NaN maps to 0.
    pub fn clamped(value: f32) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(-1.0, 1.0))
    }

    pub fn get(self) -> f32 {
        self.0
    }

    /// Negate the value (for opponent's perspective).
    pub fn negate(self) -> Self {
        Self(-self.0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl From<Value> for f32 {
    fn from(v: Value) -> f32 {
        v.0
    }
}
