//! Random number generation for level building
//!
//! Uses a seeded ChaCha RNG so that a seed and a configuration always produce
//! the same level.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Game random number generator
///
/// Wraps ChaCha8Rng for reproducible random number generation.
/// Note: RNG state is not serialized - a restored generator restarts from its seed.
#[derive(Debug, Clone)]
pub struct GameRng {
    rng: ChaCha8Rng,
    seed: u64,
}

// Custom serialization - only serialize seed, recreate RNG on deserialize
impl Serialize for GameRng {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.seed.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GameRng {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seed = u64::deserialize(deserializer)?;
        Ok(GameRng::new(seed))
    }
}

/// Standard normal distribution table, scaled so that the last entry is
/// 32768 at 4 standard deviations (each entry is 1/64 of a deviation).
const RANDNOR_TABLE: [i32; 256] = [
    206, 613, 1022, 1430, 1838, 2245, 2652, 3058, 3463, 3867, 4271, 4673, 5075,
    5475, 5874, 6271, 6667, 7061, 7454, 7845, 8234, 8621, 9006, 9389, 9770,
    10148, 10524, 10898, 11269, 11638, 12004, 12367, 12727, 13085, 13440,
    13792, 14140, 14486, 14828, 15168, 15504, 15836, 16166, 16492, 16814,
    17133, 17449, 17761, 18069, 18374, 18675, 18972, 19266, 19556, 19842,
    20124, 20403, 20678, 20949, 21216, 21479, 21738, 21994, 22245, 22493,
    22737, 22977, 23213, 23446, 23674, 23899, 24120, 24336, 24550, 24759,
    24965, 25166, 25365, 25559, 25750, 25937, 26120, 26300, 26476, 26649,
    26818, 26983, 27146, 27304, 27460, 27612, 27760, 27906, 28048, 28187,
    28323, 28455, 28585, 28711, 28835, 28955, 29073, 29188, 29299, 29409,
    29515, 29619, 29720, 29818, 29914, 30007, 30098, 30186, 30272, 30356,
    30437, 30516, 30593, 30668, 30740, 30810, 30879, 30945, 31010, 31072,
    31133, 31192, 31249, 31304, 31358, 31410, 31460, 31509, 31556, 31601,
    31646, 31688, 31730, 31770, 31808, 31846, 31882, 31917, 31950, 31983,
    32014, 32044, 32074, 32102, 32129, 32155, 32180, 32205, 32228, 32251,
    32273, 32294, 32314, 32333, 32352, 32370, 32387, 32404, 32420, 32435,
    32450, 32464, 32477, 32490, 32503, 32515, 32526, 32537, 32548, 32558,
    32568, 32577, 32586, 32595, 32603, 32611, 32618, 32625, 32632, 32639,
    32645, 32651, 32657, 32662, 32667, 32672, 32677, 32682, 32686, 32690,
    32694, 32698, 32702, 32705, 32708, 32711, 32714, 32717, 32720, 32722,
    32725, 32727, 32729, 32731, 32733, 32735, 32737, 32739, 32740, 32742,
    32743, 32745, 32746, 32747, 32748, 32749, 32750, 32751, 32752, 32753,
    32754, 32755, 32756, 32757, 32757, 32758, 32758, 32759, 32760, 32760,
    32761, 32761, 32761, 32762, 32762, 32763, 32763, 32763, 32764, 32764,
    32764, 32764, 32765, 32765, 32765, 32765, 32766, 32766, 32766, 32766,
    32767,
];

/// Width of one table step, in 1/64 standard deviations
const RANDNOR_STEP: i32 = 64;

impl GameRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a new RNG with a random seed
    pub fn from_entropy() -> Self {
        let seed = rand::random();
        Self::new(seed)
    }

    /// Get the seed used to create this RNG
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns 0..n-1
    ///
    /// Returns 0 if n is not positive.
    pub fn randint0(&mut self, n: i32) -> i32 {
        if n <= 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// Returns 1..n
    ///
    /// Returns 0 if n is not positive.
    pub fn randint1(&mut self, n: i32) -> i32 {
        if n <= 0 {
            return 0;
        }
        self.rng.gen_range(1..=n)
    }

    /// Returns a value in the inclusive range lo..=hi
    ///
    /// Returns lo if the range is empty.
    pub fn rand_range(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    /// Returns a value within d of a
    pub fn rand_spread(&mut self, a: i32, d: i32) -> i32 {
        self.rand_range(a - d, a + d)
    }

    /// Roll n dice with m sides
    pub fn dice(&mut self, n: i32, m: i32) -> i32 {
        (0..n.max(0)).map(|_| self.randint1(m)).sum()
    }

    /// Returns true with probability 1/n
    pub fn one_in(&mut self, n: i32) -> bool {
        self.randint0(n) == 0
    }

    /// Returns true with probability percent/100
    pub fn percent(&mut self, percent: i32) -> bool {
        self.randint0(100) < percent
    }

    /// Normal distribution with the given mean and standard deviation,
    /// computed from a fixed table so results depend only on the seed
    pub fn rand_normal(&mut self, mean: i32, stand: i32) -> i32 {
        if stand < 1 {
            return mean;
        }

        let tmp = self.randint0(32768);

        // Binary search
        let mut low = 0usize;
        let mut high = RANDNOR_TABLE.len();
        while low < high {
            let mid = (low + high) >> 1;
            if RANDNOR_TABLE[mid] < tmp {
                low = mid + 1;
            } else {
                high = mid;
            }
        }

        let offset = (stand * low as i32) / RANDNOR_STEP;

        if self.one_in(2) {
            mean - offset
        } else {
            mean + offset
        }
    }

    /// Bonus roll that grows with level, used for object enchantment
    pub fn m_bonus(&mut self, max: i32, level: i32) -> i32 {
        let level = level.min(crate::MAX_DEPTH - 1);
        let bonus = (max * level) / crate::MAX_DEPTH;
        let extra = (max * level) % crate::MAX_DEPTH;
        let bonus = if self.randint0(crate::MAX_DEPTH) < extra {
            bonus + 1
        } else {
            bonus
        };
        let stand = max / 4;
        let extra = max % 4;
        let stand = if self.randint0(4) < extra { stand + 1 } else { stand };
        self.rand_normal(bonus, stand).clamp(0, max)
    }

    /// Choose a random element from a slice
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.randint0(items.len() as i32) as usize])
        }
    }

    /// Shuffle a slice in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.randint0(i as i32 + 1) as usize;
            items.swap(i, j);
        }
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
