use crate::error::NetworkParseError;
use std::fmt;
use std::str::FromStr;

/// Compare-exchange on inputs `i < j`: when input `i` is clear and input `j`
/// is set the two are exchanged, so set bits migrate toward lower indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Swap {
    i: u8,
    j: u8,
}

impl Swap {
    /// Panics unless `i < j`.
    pub const fn new(i: u8, j: u8) -> Self {
        assert!(i < j, "swap requires i < j");
        Self { i, j }
    }

    /// Checked constructor for user input.
    pub fn try_new(i: usize, j: usize, arity: usize) -> Result<Self, NetworkParseError> {
        if i >= j {
            return Err(NetworkParseError::Unordered { i, j });
        }
        if j >= arity || j > u8::MAX as usize {
            return Err(NetworkParseError::OutOfRange { i, j, arity });
        }
        Ok(Self {
            i: i as u8,
            j: j as u8,
        })
    }

    #[inline]
    pub const fn i(self) -> u8 {
        self.i
    }

    #[inline]
    pub const fn j(self) -> u8 {
        self.j
    }

    /// Distance between a pattern with `(bit i, bit j) = (0, 1)` and the same
    /// pattern after the exchange: `2^j - 2^i`.
    #[inline]
    pub const fn shift_delta(self) -> usize {
        (1usize << self.j) - (1usize << self.i)
    }

    /// Applies the swap to one input pattern.
    #[inline]
    pub const fn apply(self, pattern: u32) -> u32 {
        let low = (pattern >> self.i) & 1;
        let high = (pattern >> self.j) & 1;
        if low == 0 && high == 1 {
            pattern - (1u32 << self.j) + (1u32 << self.i)
        } else {
            pattern
        }
    }

    /// True when the swap can alter this pattern.
    #[inline]
    pub const fn affects(self, pattern: u32) -> bool {
        (pattern >> self.i) & 1 == 0 && (pattern >> self.j) & 1 == 1
    }

    /// Position of this swap in the lexicographic order of all pairs.
    pub fn index(self, arity: usize) -> usize {
        let i = self.i as usize;
        let j = self.j as usize;
        debug_assert!(j < arity);
        i * (2 * arity - i - 1) / 2 + (j - i - 1)
    }

    /// Number of distinct swaps over `arity` inputs.
    pub const fn pair_count(arity: usize) -> usize {
        arity * arity.saturating_sub(1) / 2
    }

    /// Every swap over `arity` inputs in lexicographic `(i, j)` order.
    pub fn pairs(arity: usize) -> impl Iterator<Item = Swap> {
        let arity = arity.min(u8::MAX as usize + 1) as u16;
        (0..arity).flat_map(move |i| {
            (i + 1..arity).map(move |j| Swap {
                i: i as u8,
                j: j as u8,
            })
        })
    }
}

impl fmt::Display for Swap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.i, self.j)
    }
}

impl From<Swap> for (usize, usize) {
    fn from(swap: Swap) -> Self {
        (swap.i as usize, swap.j as usize)
    }
}

impl FromStr for Swap {
    type Err = NetworkParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('(')
            .and_then(|t| t.strip_suffix(')'))
            .unwrap_or(trimmed);
        let (a, b) = inner
            .split_once(|c| c == '-' || c == ',')
            .ok_or_else(|| NetworkParseError::Malformed(s.to_string()))?;
        let parse = |t: &str| {
            t.trim()
                .parse::<usize>()
                .map_err(|_| NetworkParseError::BadIndex(t.trim().to_string()))
        };
        let (i, j) = (parse(a)?, parse(b)?);
        Swap::try_new(i, j, u8::MAX as usize + 1)
    }
}
