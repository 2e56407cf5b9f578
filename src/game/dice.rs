use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Number of dice in every roll
pub const DICE_COUNT: usize = 3;

/// Faces on each die
pub const DIE_SIDES: u8 = 6;

/// Smallest possible total (all ones)
pub const MIN_TOTAL: u8 = DICE_COUNT as u8;

/// Largest possible total (all sixes)
pub const MAX_TOTAL: u8 = DICE_COUNT as u8 * DIE_SIDES;

/// Three die faces, each in 1..=6
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "[u8; 3]", into = "[u8; 3]")]
pub struct Roll([u8; DICE_COUNT]);

impl Roll {
    /// Build a roll, rejecting faces outside 1..=6
    pub fn new(faces: [u8; DICE_COUNT]) -> Option<Self> {
        if faces.iter().all(|&face| (1..=DIE_SIDES).contains(&face)) {
            Some(Self(faces))
        } else {
            None
        }
    }

    pub fn faces(&self) -> [u8; DICE_COUNT] {
        self.0
    }

    /// Sum of the three faces, always in 3..=18
    pub fn total(&self) -> u8 {
        self.0.iter().sum()
    }
}

impl TryFrom<[u8; DICE_COUNT]> for Roll {
    type Error = String;

    fn try_from(faces: [u8; DICE_COUNT]) -> Result<Self, Self::Error> {
        Roll::new(faces).ok_or_else(|| format!("die faces must be in 1..={}: {:?}", DIE_SIDES, faces))
    }
}

impl From<Roll> for [u8; DICE_COUNT] {
    fn from(roll: Roll) -> Self {
        roll.0
    }
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "{} + {} + {} = {}", a, b, c, self.total())
    }
}

/// Source of dice outcomes, called once per resolved roll
pub trait DiceRoller {
    fn roll(&mut self) -> Roll;
}

/// Fair dice backed by any `rand` generator
pub struct RandomRoller<G: Rng> {
    rng: G,
}

impl RandomRoller<rand::rngs::StdRng> {
    /// Fair dice seeded from the operating system
    pub fn from_entropy() -> Self {
        use rand::SeedableRng;
        Self::new(rand::rngs::StdRng::from_entropy())
    }
}

impl<G: Rng> RandomRoller<G> {
    pub fn new(rng: G) -> Self {
        Self { rng }
    }
}

impl<G: Rng> DiceRoller for RandomRoller<G> {
    fn roll(&mut self) -> Roll {
        let mut faces = [0u8; DICE_COUNT];
        for face in faces.iter_mut() {
            *face = self.rng.gen_range(1..=DIE_SIDES);
        }
        Roll(faces)
    }
}

/// Replays a fixed sequence of rolls, then falls back to a generator
///
/// Used by tests and reproducible demos. Once the script runs out, the
/// fallback roller takes over.
pub struct ScriptedRoller<F: DiceRoller = RandomRoller<rand::rngs::StdRng>> {
    script: VecDeque<Roll>,
    fallback: F,
}

impl ScriptedRoller {
    pub fn new(script: impl IntoIterator<Item = Roll>) -> Self {
        Self::with_fallback(script, RandomRoller::from_entropy())
    }
}

impl<F: DiceRoller> ScriptedRoller<F> {
    pub fn with_fallback(script: impl IntoIterator<Item = Roll>, fallback: F) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback,
        }
    }

    /// Queue another roll at the end of the script
    pub fn push(&mut self, roll: Roll) {
        self.script.push_back(roll);
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl<F: DiceRoller> DiceRoller for ScriptedRoller<F> {
    fn roll(&mut self) -> Roll {
        match self.script.pop_front() {
            Some(roll) => roll,
            None => self.fallback.roll(),
        }
    }
}

impl<R: DiceRoller + ?Sized> DiceRoller for Box<R> {
    fn roll(&mut self) -> Roll {
        (**self).roll()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_roll_rejects_bad_faces() {
        assert!(Roll::new([0, 3, 4]).is_none());
        assert!(Roll::new([1, 7, 4]).is_none());
        assert_eq!(Roll::new([6, 6, 6]).map(|r| r.total()), Some(18));
    }

    #[test]
    fn test_random_rolls_stay_in_bounds() {
        let mut roller = RandomRoller::new(rand::rngs::StdRng::seed_from_u64(7));
        for _ in 0..10_000 {
            let roll = roller.roll();
            assert!(roll.faces().iter().all(|f| (1..=6).contains(f)));
            assert!((MIN_TOTAL..=MAX_TOTAL).contains(&roll.total()));
        }
    }

    #[test]
    fn test_random_rolls_cover_every_face() {
        let mut roller = RandomRoller::new(rand::rngs::StdRng::seed_from_u64(42));
        let mut seen = [0usize; 6];
        for _ in 0..6_000 {
            for face in roller.roll().faces() {
                seen[(face - 1) as usize] += 1;
            }
        }
        // 18k faces, ~3k expected each
        assert!(seen.iter().all(|&count| count > 2_500 && count < 3_500), "{:?}", seen);
    }

    #[test]
    fn test_scripted_roller_replays_then_falls_back() {
        let first = Roll::new([1, 2, 3]).unwrap();
        let second = Roll::new([6, 5, 4]).unwrap();
        let mut roller = ScriptedRoller::new([first, second]);

        assert_eq!(roller.roll(), first);
        assert_eq!(roller.roll(), second);
        assert_eq!(roller.remaining(), 0);
        let total = roller.roll().total();
        assert!((3..=18).contains(&total));
    }

    #[test]
    fn test_roll_serde_rejects_bad_faces() {
        let roll: Roll = serde_json::from_str("[2,2,5]").unwrap();
        assert_eq!(roll.total(), 9);
        assert!(serde_json::from_str::<Roll>("[2,9,5]").is_err());
    }
}
