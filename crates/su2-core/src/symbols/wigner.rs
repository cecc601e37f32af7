use super::spin::{is_admissible_triad, Spin};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wigner3jInput {
    pub j1: Spin,
    pub j2: Spin,
    pub j3: Spin,
    pub two_m1: i32,
    pub two_m2: i32,
    pub two_m3: i32,
}

impl Wigner3jInput {
    pub fn new(j1: Spin, j2: Spin, j3: Spin, two_m1: i32, two_m2: i32, two_m3: i32) -> Self {
        Self {
            j1,
            j2,
            j3,
            two_m1,
            two_m2,
            two_m3,
        }
    }
}

/// `{j1 j2 j3; j4 j5 j6}` in argument order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wigner6jInput {
    pub spins: [Spin; 6],
}

impl Wigner6jInput {
    pub fn new(j1: Spin, j2: Spin, j3: Spin, j4: Spin, j5: Spin, j6: Spin) -> Self {
        Self {
            spins: [j1, j2, j3, j4, j5, j6],
        }
    }
}

/// 9j symbol in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wigner9jInput {
    pub spins: [Spin; 9],
}

impl Wigner9jInput {
    pub fn new(spins: [Spin; 9]) -> Self {
        Self { spins }
    }
}

pub trait WignerSymbolsApi {
    fn wigner_3j(&self, input: Wigner3jInput) -> f64;
    fn wigner_6j(&self, input: Wigner6jInput) -> f64;
    fn wigner_9j(&self, input: Wigner9jInput) -> f64;
}

/// Explicit log-factorial Racah summation in binary64.
#[derive(Debug, Clone, Copy, Default)]
pub struct RacahSummation;

impl WignerSymbolsApi for RacahSummation {
    fn wigner_3j(&self, input: Wigner3jInput) -> f64 {
        wigner_3j(input)
    }

    fn wigner_6j(&self, input: Wigner6jInput) -> f64 {
        wigner_6j(input)
    }

    fn wigner_9j(&self, input: Wigner9jInput) -> f64 {
        wigner_9j(input)
    }
}

/// Computes the Wigner 3j coefficient.
///
/// Projections are doubled (`two_m = 3` means `m = 3/2`). Selection-rule
/// violations return `0`.
pub fn wigner_3j(input: Wigner3jInput) -> f64 {
    let j1 = i64::from(input.j1.twice());
    let j2 = i64::from(input.j2.twice());
    let j3 = i64::from(input.j3.twice());
    let (m1, m2, m3) = (
        i64::from(input.two_m1),
        i64::from(input.two_m2),
        i64::from(input.two_m3),
    );

    if m1 + m2 + m3 != 0 {
        return 0.0;
    }
    if m1.abs() > j1 || m2.abs() > j2 || m3.abs() > j3 {
        return 0.0;
    }
    if (j1 - m1).rem_euclid(2) != 0 || (j2 - m2).rem_euclid(2) != 0 || (j3 - m3).rem_euclid(2) != 0
    {
        return 0.0;
    }
    if !is_admissible_triad(input.j1, input.j2, input.j3) {
        return 0.0;
    }

    let k1 = (j1 + j2 - j3) / 2;
    let k2 = (j1 - m1) / 2;
    let k3 = (j2 + m2) / 2;
    let k4 = (j3 - j2 + m1) / 2;
    let k5 = (j3 - j1 - m2) / 2;
    let t_min = 0.max(-k4).max(-k5);
    let t_max = k1.min(k2).min(k3);
    if t_min > t_max {
        return 0.0;
    }

    let table = LogFactorial::new();
    let mut log_prefactor = log_triangle_coefficient(&table, j1, j2, j3);
    for (j, m) in [(j1, m1), (j2, m2), (j3, m3)] {
        log_prefactor += 0.5 * (table.value((j + m) / 2) + table.value((j - m) / 2));
    }

    let mut result = 0.0;
    for t in t_min..=t_max {
        let log_denominator = table.value(t)
            + table.value(k4 + t)
            + table.value(k5 + t)
            + table.value(k1 - t)
            + table.value(k2 - t)
            + table.value(k3 - t);
        result += alternating(t) * (log_prefactor - log_denominator).exp();
    }

    alternating((j1 - j2 - m3) / 2) * result
}

/// Computes `{j1 j2 j3; j4 j5 j6}` by Racah's single sum.
///
/// Any inadmissible triad makes the symbol vanish.
pub fn wigner_6j(input: Wigner6jInput) -> f64 {
    let [s1, s2, s3, s4, s5, s6] = input.spins;
    let triads = [(s1, s2, s3), (s1, s5, s6), (s4, s2, s6), (s4, s5, s3)];
    if !triads.iter().all(|&(a, b, c)| is_admissible_triad(a, b, c)) {
        return 0.0;
    }

    let [j1, j2, j3, j4, j5, j6] = input.spins.map(|spin| i64::from(spin.twice()));
    let triad_sums = [
        (j1 + j2 + j3) / 2,
        (j1 + j5 + j6) / 2,
        (j4 + j2 + j6) / 2,
        (j4 + j5 + j3) / 2,
    ];
    let pair_sums = [
        (j1 + j2 + j4 + j5) / 2,
        (j2 + j3 + j5 + j6) / 2,
        (j3 + j1 + j6 + j4) / 2,
    ];

    let z_min = triad_sums.iter().copied().max().unwrap_or(0);
    let z_max = pair_sums.iter().copied().min().unwrap_or(-1);

    let table = LogFactorial::new();
    let log_prefactor = log_triangle_coefficient(&table, j1, j2, j3)
        + log_triangle_coefficient(&table, j1, j5, j6)
        + log_triangle_coefficient(&table, j4, j2, j6)
        + log_triangle_coefficient(&table, j4, j5, j3);

    let mut result = 0.0;
    for z in z_min..=z_max {
        let log_denominator = triad_sums
            .iter()
            .map(|sum| table.value(z - sum))
            .chain(pair_sums.iter().map(|sum| table.value(sum - z)))
            .sum::<f64>();
        result += alternating(z) * (log_prefactor + table.value(z + 1) - log_denominator).exp();
    }

    result
}

/// Computes a 9j symbol as a contraction of three 6j symbols over the
/// intermediate spin `x`.
pub fn wigner_9j(input: Wigner9jInput) -> f64 {
    let [j1, j2, j3, j4, j5, j6, j7, j8, j9] = input.spins;
    let lines = [
        (j1, j2, j3),
        (j4, j5, j6),
        (j7, j8, j9),
        (j1, j4, j7),
        (j2, j5, j8),
        (j3, j6, j9),
    ];
    if !lines.iter().all(|&(a, b, c)| is_admissible_triad(a, b, c)) {
        return 0.0;
    }

    let twice = |spin: Spin| u64::from(spin.twice());
    let lower = twice(j1)
        .abs_diff(twice(j9))
        .max(twice(j4).abs_diff(twice(j8)))
        .max(twice(j2).abs_diff(twice(j6)));
    let upper = (twice(j1) + twice(j9))
        .min(twice(j4) + twice(j8))
        .min(twice(j2) + twice(j6))
        .min(u64::from(u32::MAX));

    let mut result = 0.0;
    for two_x in (lower..=upper).step_by(2) {
        let Ok(two_x) = u32::try_from(two_x) else {
            break;
        };
        let x = Spin::from_twice(two_x);
        let product = wigner_6j(Wigner6jInput::new(j1, j4, j7, j8, j9, x))
            * wigner_6j(Wigner6jInput::new(j2, j5, j8, j4, x, j6))
            * wigner_6j(Wigner6jInput::new(j3, j6, j9, x, j1, j2));
        result += alternating(i64::from(two_x)) * x.dimension() as f64 * product;
    }

    result
}

fn alternating(exponent: i64) -> f64 {
    if exponent.rem_euclid(2) == 0 {
        1.0
    } else {
        -1.0
    }
}

/// `ln Δ(a b c)` for doubled spins of an admissible triad.
fn log_triangle_coefficient(table: &LogFactorial, a: i64, b: i64, c: i64) -> f64 {
    0.5 * (table.value((a + b - c) / 2) + table.value((a - b + c) / 2) + table.value((b + c - a) / 2)
        - table.value((a + b + c) / 2 + 1))
}

/// `ln(n!)`: exact running sums up to [`LogFactorial::TABLE_LIMIT`], Stirling's
/// series above it.
#[derive(Debug, Clone)]
struct LogFactorial {
    values: Vec<f64>,
}

impl LogFactorial {
    const TABLE_LIMIT: usize = 256;

    fn new() -> Self {
        let mut values = Vec::with_capacity(Self::TABLE_LIMIT + 1);
        values.push(0.0);
        for n in 1..=Self::TABLE_LIMIT {
            values.push(values[n - 1] + (n as f64).ln());
        }
        Self { values }
    }

    /// Negative arguments read as `ln(0!)`.
    fn value(&self, n: i64) -> f64 {
        let n = usize::try_from(n).unwrap_or(0);
        match self.values.get(n) {
            Some(value) => *value,
            None => stirling_log_factorial(n as f64),
        }
    }
}

fn stirling_log_factorial(n: f64) -> f64 {
    let inverse = n.recip();
    let inverse_squared = inverse * inverse;
    let correction =
        inverse * (1.0 / 12.0 - inverse_squared * (1.0 / 360.0 - inverse_squared / 1260.0));
    n * n.ln() - n + 0.5 * (std::f64::consts::TAU * n).ln() + correction
}
