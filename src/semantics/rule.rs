//! Target predicates and the terminal bit-tests that replace them.
//!
//! A life-like rule decides the next cell state from the cell's current state
//! and its live-neighbour count. Once a network has sorted the neighbour bits
//! (set bits at the low indices), "count >= c" is just input `c - 1`, so every
//! count window `[lo, hi]` becomes a test on at most two inputs. The search
//! looks for the shortest network after which that test agrees with the rule
//! on every reachable pattern, which usually needs far fewer swaps than a
//! full sort.

use crate::bits::BitSet;
use crate::error::RuleParseError;
use std::fmt;
use std::str::FromStr;

/// Set of neighbour counts, one bit per count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CountSet(u32);

impl CountSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn from_counts(counts: &[usize]) -> Self {
        let mut set = Self::empty();
        for &count in counts {
            set.insert(count);
        }
        set
    }

    pub fn insert(&mut self, count: usize) {
        assert!(count < 32, "neighbour count {} out of range", count);
        self.0 |= 1 << count;
    }

    pub const fn contains(self, count: usize) -> bool {
        count < 32 && (self.0 >> count) & 1 == 1
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn max(self) -> Option<usize> {
        (self.0 != 0).then(|| 31 - self.0.leading_zeros() as usize)
    }

    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..32).filter(move |&c| self.contains(c))
    }

    /// Maximal runs of consecutive counts within `0..=arity`.
    pub fn windows(self, arity: usize) -> Vec<CountWindow> {
        let mut windows = Vec::new();
        let mut start: Option<usize> = None;
        for count in 0..=arity + 1 {
            let inside = count <= arity && self.contains(count);
            match (inside, start) {
                (true, None) => start = Some(count),
                (false, Some(lo)) => {
                    windows.push(CountWindow { lo, hi: count - 1 });
                    start = None;
                }
                _ => {}
            }
        }
        windows
    }
}

impl fmt::Display for CountSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for count in self.iter() {
            write!(f, "{}", count)?;
        }
        Ok(())
    }
}

/// Inclusive range of neighbour counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CountWindow {
    pub lo: usize,
    pub hi: usize,
}

impl CountWindow {
    /// Evaluates the window on a pattern as if its set bits were sorted to
    /// the low indices: `count >= lo` is input `lo - 1`, `count <= hi` is the
    /// negation of input `hi`.
    pub fn matches(self, pattern: u32, arity: usize) -> bool {
        let bit = |i: usize| (pattern >> i) & 1 == 1;
        let lower = self.lo == 0 || bit(self.lo - 1);
        let upper = self.hi >= arity || !bit(self.hi);
        lower && upper
    }

    fn terms(self, arity: usize) -> Vec<String> {
        let mut terms = Vec::with_capacity(2);
        if self.lo > 0 {
            terms.push(format!("n{}", self.lo - 1));
        }
        if self.hi < arity {
            terms.push(format!("!n{}", self.hi));
        }
        terms
    }
}

/// Life-like rule in B/S notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LifeRule {
    pub birth: CountSet,
    pub survive: CountSet,
}

impl LifeRule {
    /// Conway's Game of Life, B3/S23.
    pub fn conway() -> Self {
        Self {
            birth: CountSet::from_counts(&[3]),
            survive: CountSet::from_counts(&[2, 3]),
        }
    }

    pub fn next_state(&self, alive: bool, count: usize) -> bool {
        if alive {
            self.survive.contains(count)
        } else {
            self.birth.contains(count)
        }
    }

    /// Rejects counts that cannot occur with `arity` neighbours.
    pub fn validate(&self, arity: usize) -> Result<(), RuleParseError> {
        let largest = self.birth.max().max(self.survive.max());
        match largest {
            Some(count) if count > arity => Err(RuleParseError::CountOutOfRange { count, arity }),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for LifeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}/S{}", self.birth, self.survive)
    }
}

impl FromStr for LifeRule {
    type Err = RuleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        if lowered == "conway" || lowered == "life" {
            return Ok(Self::conway());
        }
        let malformed = || RuleParseError::Malformed(s.to_string());
        let (birth, survive) = lowered.split_once('/').ok_or_else(malformed)?;
        let digits = |part: &str, prefix: char| -> Result<CountSet, RuleParseError> {
            let body = part.strip_prefix(prefix).ok_or_else(malformed)?;
            let mut set = CountSet::empty();
            for c in body.chars() {
                let count = c.to_digit(10).ok_or_else(malformed)?;
                set.insert(count as usize);
            }
            Ok(set)
        };
        Ok(Self {
            birth: digits(birth, 'b')?,
            survive: digits(survive, 's')?,
        })
    }
}

/// Bit-test evaluated on the network's output for a life rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalTest {
    arity: usize,
    birth: Vec<CountWindow>,
    survive: Vec<CountWindow>,
}

impl TerminalTest {
    pub fn for_rule(rule: &LifeRule, arity: usize) -> Self {
        Self {
            arity,
            birth: rule.birth.windows(arity),
            survive: rule.survive.windows(arity),
        }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Next cell state read off an output pattern.
    pub fn eval(&self, pattern: u32, alive: bool) -> bool {
        let windows = if alive { &self.survive } else { &self.birth };
        windows.iter().any(|w| w.matches(pattern, self.arity))
    }

    fn fmt_windows(&self, f: &mut fmt::Formatter<'_>, windows: &[CountWindow]) -> fmt::Result {
        if windows.is_empty() {
            return f.write_str("0");
        }
        let grouped = windows.len() > 1;
        for (idx, window) in windows.iter().enumerate() {
            if idx > 0 {
                f.write_str(" | ")?;
            }
            let terms = window.terms(self.arity);
            match terms.len() {
                0 => f.write_str("1")?,
                1 => f.write_str(&terms[0])?,
                _ if grouped => write!(f, "({})", terms.join(" & "))?,
                _ => f.write_str(&terms.join(" & "))?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for TerminalTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("birth: ")?;
        self.fmt_windows(f, &self.birth)?;
        f.write_str("; survive: ")?;
        self.fmt_windows(f, &self.survive)
    }
}

/// Fixed Conway test on the low four outputs. Once those are sorted it gives
/// birth on exactly three neighbours and survival on two or three.
pub const CLASSIC_CONWAY_TEST: &str = "(n2 & !n3) | (n0 & n1 & !n3 & alive)";

/// Evaluates [`CLASSIC_CONWAY_TEST`] on an output pattern.
pub fn classic_conway_test(pattern: u32, alive: bool) -> bool {
    let n = |i: u32| (pattern >> i) & 1 == 1;
    (n(2) && !n(3)) || (n(0) && n(1) && !n(3) && alive)
}

/// Predicate the network's outputs must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The rule's terminal test must agree with the rule, for both cell
    /// states, on every reachable output.
    Life { rule: LifeRule, test: TerminalTest },
    /// Conway's rule read through [`CLASSIC_CONWAY_TEST`] instead of the
    /// windowed test. Its forbidden set differs from the `B3/S23` one, since
    /// survival also needs `n0`.
    ConwayClassic { arity: usize },
    /// Every reachable output must have its lower half of inputs all set or
    /// its upper half all clear.
    EvacuateTop { arity: usize },
}

impl Target {
    pub fn life(rule: LifeRule, arity: usize) -> Result<Self, RuleParseError> {
        rule.validate(arity)?;
        Ok(Target::Life {
            rule,
            test: TerminalTest::for_rule(&rule, arity),
        })
    }

    pub fn evacuate_top(arity: usize) -> Self {
        Target::EvacuateTop { arity }
    }

    /// The classic test reads inputs `n0` to `n3`.
    pub fn conway_classic(arity: usize) -> Result<Self, RuleParseError> {
        if arity < 4 {
            return Err(RuleParseError::TooFewInputs { needed: 4, arity });
        }
        Ok(Target::ConwayClassic { arity })
    }

    /// Parses `conway`, `life`, `B3/S23`-style rules, `conway-classic` or
    /// `evacuate-top`.
    pub fn parse(name: &str, arity: usize) -> Result<Self, RuleParseError> {
        let lowered = name.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "evacuate-top" | "evacuate_top" => return Ok(Self::evacuate_top(arity)),
            "conway-classic" | "conway_classic" => return Self::conway_classic(arity),
            _ => {}
        }
        let rule = lowered.parse::<LifeRule>().map_err(|err| match err {
            RuleParseError::Malformed(_) if !lowered.contains('/') => {
                RuleParseError::Unknown(name.to_string())
            }
            other => other,
        })?;
        Self::life(rule, arity)
    }

    pub fn arity(&self) -> usize {
        match self {
            Target::Life { test, .. } => test.arity(),
            Target::ConwayClassic { arity } | Target::EvacuateTop { arity } => *arity,
        }
    }

    /// Rule the outputs are checked against, for life-like targets.
    pub fn rule(&self) -> Option<LifeRule> {
        match self {
            Target::Life { rule, .. } => Some(*rule),
            Target::ConwayClassic { .. } => Some(LifeRule::conway()),
            Target::EvacuateTop { .. } => None,
        }
    }

    /// Next cell state the terminal test reads off an output pattern.
    pub fn read_state(&self, pattern: u32, alive: bool) -> Option<bool> {
        match self {
            Target::Life { test, .. } => Some(test.eval(pattern, alive)),
            Target::ConwayClassic { .. } => Some(classic_conway_test(pattern, alive)),
            Target::EvacuateTop { .. } => None,
        }
    }

    /// True when an output pattern satisfies the target.
    pub fn allows(&self, pattern: u32) -> bool {
        if let Target::EvacuateTop { arity } = self {
            let half = arity / 2;
            let low = (1u32 << half) - 1;
            return pattern & low == low || pattern >> half == 0;
        }
        let rule = self.rule();
        let count = pattern.count_ones() as usize;
        [false, true].iter().all(|&alive| {
            self.read_state(pattern, alive) == rule.map(|rule| rule.next_state(alive, count))
        })
    }

    /// Human-readable terminal test, if the target has one.
    pub fn describe_test(&self) -> Option<String> {
        match self {
            Target::Life { test, .. } => Some(test.to_string()),
            Target::ConwayClassic { .. } => Some(CLASSIC_CONWAY_TEST.to_string()),
            Target::EvacuateTop { .. } => None,
        }
    }

    /// Patterns the finished network must never produce.
    pub fn violation_template<B: BitSet>(&self) -> B {
        template_from_fn(self.arity(), |pattern| !self.allows(pattern))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Life { rule, .. } => write!(f, "{}", rule),
            Target::ConwayClassic { .. } => f.write_str("conway-classic"),
            Target::EvacuateTop { .. } => f.write_str("evacuate-top"),
        }
    }
}

/// Template with bit `p` set wherever `is_violation(p)` holds.
pub fn template_from_fn<B, F>(arity: usize, is_violation: F) -> B
where
    B: BitSet,
    F: Fn(u32) -> bool,
{
    let domain = 1usize << arity;
    B::from_indices(
        domain,
        (0..domain).filter(|&p| is_violation(p as u32)),
    )
}
