//! Fuzzification of the numeric lifestyle attributes
//!
//! This module holds the membership function catalog and the fuzzifier:
//! - Triangular membership functions evaluated over a numeric universe
//! - A flat, declarative catalog of the five fuzzified variables
//! - A pure fuzzifier mapping a numeric record to 14 named degrees
//!
//! The catalog is data, not code: each variable is a universe plus named
//! triangular parameters, evaluated by one shared function. The same table
//! serves training and serving, so the two contexts cannot drift apart.
//!
//! # Example
//!
//! ```rust,ignore
//! use stresscast::fuzzy::{membership, fuzzify, NumericInputs};
//!
//! let degree = membership("Age", "young", 29.0).unwrap(); // 0.5
//! let features = fuzzify(&NumericInputs {
//!     age: 33.0,
//!     sleep_duration: 7.5,
//!     quality_of_sleep: 8.0,
//!     heart_rate: 75.0,
//!     daily_steps: 8000.0,
//! });
//! assert_eq!(features.degrees.len(), 14);
//! ```

// ============================================================================
// Membership functions
// ============================================================================

/// A triangular membership function with vertices `a <= b <= c`.
///
/// Degree rises linearly from 0 at `a` to 1 at `b`, then falls linearly
/// back to 0 at `c`. Degenerate shapes (`a == b` or `b == c`) still peak
/// at 1 exactly at `b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangular {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Triangular {
    pub const fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    /// Evaluate the membership degree for a crisp value.
    ///
    /// The peak check comes first so degenerate sets like (4, 4, 6) and
    /// (8.8, 9, 9) return 1 at their vertex instead of tripping the
    /// outside-the-support check. No clamping: values beyond `a` or `c`
    /// simply evaluate to 0.
    pub fn evaluate(&self, x: f64) -> f64 {
        if x == self.b {
            1.0
        } else if x <= self.a || x >= self.c {
            0.0
        } else if x < self.b {
            (x - self.a) / (self.b - self.a)
        } else {
            (self.c - x) / (self.c - self.b)
        }
    }

    /// The support interval (where membership can exceed 0)
    pub fn support(&self) -> (f64, f64) {
        (self.a, self.c)
    }
}

/// The numeric domain over which a variable's membership functions are
/// defined. `step` documents the granularity the sets were tuned at; it is
/// not used for evaluation (membership is continuous, not sampled).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Universe {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Universe {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Whether a value lies inside the universe bounds
    pub fn contains(&self, x: f64) -> bool {
        x >= self.min && x <= self.max
    }
}

/// A named fuzzy set within a variable
#[derive(Debug, Clone, Copy)]
pub struct FuzzySet {
    /// Term name (e.g. "young", "adequate")
    pub name: &'static str,
    /// Triangular parameters
    pub mf: Triangular,
}

impl FuzzySet {
    pub const fn new(name: &'static str, a: f64, b: f64, c: f64) -> Self {
        Self {
            name,
            mf: Triangular::new(a, b, c),
        }
    }
}

/// A fuzzified input variable: a universe plus its named sets
#[derive(Debug, Clone, Copy)]
pub struct Variable {
    /// Variable name, matching the raw dataset column
    pub name: &'static str,
    pub universe: Universe,
    pub sets: &'static [FuzzySet],
}

// ============================================================================
// Catalog
// ============================================================================

static AGE_SETS: [FuzzySet; 2] = [
    FuzzySet::new("young", 25.0, 33.0, 40.0),
    FuzzySet::new("middle", 38.0, 44.0, 59.0),
];

static SLEEP_DURATION_SETS: [FuzzySet; 3] = [
    FuzzySet::new("short", 5.5, 6.2, 7.0),
    FuzzySet::new("adequate", 6.8, 8.0, 9.0),
    FuzzySet::new("long", 8.8, 9.0, 9.0),
];

static QUALITY_OF_SLEEP_SETS: [FuzzySet; 3] = [
    FuzzySet::new("poor", 4.0, 4.0, 6.0),
    FuzzySet::new("average", 5.0, 6.5, 8.0),
    FuzzySet::new("excellent", 7.0, 9.0, 10.0),
];

static HEART_RATE_SETS: [FuzzySet; 3] = [
    FuzzySet::new("normal_low", 65.0, 68.0, 72.0),
    FuzzySet::new("normal_mid", 70.0, 75.0, 80.0),
    FuzzySet::new("normal_high", 78.0, 82.0, 86.0),
];

static DAILY_STEPS_SETS: [FuzzySet; 3] = [
    FuzzySet::new("low", 3000.0, 4500.0, 6000.0),
    FuzzySet::new("moderate", 5500.0, 7800.0, 9000.0),
    FuzzySet::new("high", 8500.0, 9500.0, 10000.0),
];

/// The membership function catalog: the five fuzzified variables in the
/// order their degrees appear in the feature vector.
pub static CATALOG: [Variable; 5] = [
    Variable {
        name: "Age",
        universe: Universe::new(25.0, 60.0, 1.0),
        sets: &AGE_SETS,
    },
    Variable {
        name: "Sleep Duration",
        universe: Universe::new(5.5, 9.0, 0.1),
        sets: &SLEEP_DURATION_SETS,
    },
    Variable {
        name: "Quality of Sleep",
        universe: Universe::new(4.0, 10.0, 1.0),
        sets: &QUALITY_OF_SLEEP_SETS,
    },
    Variable {
        name: "Heart Rate",
        universe: Universe::new(65.0, 86.0, 1.0),
        sets: &HEART_RATE_SETS,
    },
    Variable {
        name: "Daily Steps",
        universe: Universe::new(3000.0, 10000.0, 100.0),
        sets: &DAILY_STEPS_SETS,
    },
];

/// Look up a variable in the catalog by name
pub fn variable(name: &str) -> Option<&'static Variable> {
    CATALOG.iter().find(|v| v.name == name)
}

/// Evaluate one membership degree from the catalog.
///
/// Returns `None` when the variable or set name is unknown. Values outside
/// the variable's universe are not rejected; the triangular law floors
/// them to 0 past the outer vertices.
pub fn membership(var: &str, set: &str, value: f64) -> Option<f64> {
    let var = variable(var)?;
    let set = var.sets.iter().find(|s| s.name == set)?;
    Some(set.mf.evaluate(value))
}

// ============================================================================
// Fuzzifier
// ============================================================================

/// Number of fuzzy degrees produced per record
pub const DEGREE_COUNT: usize = 14;

/// Feature-vector column names of the 14 degrees, in their fixed order
pub const DEGREE_NAMES: [&str; DEGREE_COUNT] = [
    "Age_young",
    "Age_middle",
    "SD_short",
    "SD_adequate",
    "SD_long",
    "QoS_poor",
    "QoS_average",
    "QoS_excellent",
    "HR_normal_low",
    "HR_normal_mid",
    "HR_normal_high",
    "DS_low",
    "DS_moderate",
    "DS_high",
];

/// The five crisp numeric attributes, after coercion and fill
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericInputs {
    pub age: f64,
    pub sleep_duration: f64,
    pub quality_of_sleep: f64,
    pub heart_rate: f64,
    pub daily_steps: f64,
}

impl NumericInputs {
    /// Values in catalog order
    fn values(&self) -> [f64; 5] {
        [
            self.age,
            self.sleep_duration,
            self.quality_of_sleep,
            self.heart_rate,
            self.daily_steps,
        ]
    }
}

/// The fuzzified record: 14 named degrees in fixed order, plus the names
/// of any variables whose value fell outside its universe.
///
/// An out-of-universe value is not an error. All of that variable's
/// degrees floor to 0 and the condition is reported for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyFeatures {
    /// Degrees in the order of [`DEGREE_NAMES`], each in [0, 1]
    pub degrees: [f64; DEGREE_COUNT],
    /// Catalog variables whose input fell outside the universe bounds
    pub out_of_universe: Vec<&'static str>,
}

impl FuzzyFeatures {
    /// Iterate `(column name, degree)` pairs in fixed order
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        DEGREE_NAMES.iter().copied().zip(self.degrees.iter().copied())
    }
}

/// Fuzzify a numeric record into the 14 fixed-order membership degrees.
///
/// Pure and stateless; records can be fuzzified independently in parallel.
pub fn fuzzify(inputs: &NumericInputs) -> FuzzyFeatures {
    let mut degrees = [0.0; DEGREE_COUNT];
    let mut out_of_universe = Vec::new();
    let values = inputs.values();

    let mut i = 0;
    for (var, value) in CATALOG.iter().zip(values) {
        if !var.universe.contains(value) {
            out_of_universe.push(var.name);
        }
        for set in var.sets {
            degrees[i] = set.mf.evaluate(value);
            i += 1;
        }
    }
    debug_assert_eq!(i, DEGREE_COUNT);

    FuzzyFeatures {
        degrees,
        out_of_universe,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-3;

    #[test]
    fn test_triangular_shape_law() {
        let mf = Triangular::new(25.0, 33.0, 40.0);

        assert!((mf.evaluate(25.0) - 0.0).abs() < TOL);
        assert!((mf.evaluate(33.0) - 1.0).abs() < TOL);
        assert!((mf.evaluate(29.0) - 0.5).abs() < TOL);
        assert!((mf.evaluate(40.0) - 0.0).abs() < TOL);

        // Zero at and beyond the support
        assert_eq!(mf.evaluate(20.0), 0.0);
        assert_eq!(mf.evaluate(45.0), 0.0);

        // Monotonic non-decreasing on [a, b], non-increasing on [b, c]
        let mut prev = 0.0;
        for i in 0..=80 {
            let x = 25.0 + (i as f64) * 0.1;
            let d = mf.evaluate(x);
            assert!(d >= prev - TOL);
            prev = d;
        }
        for i in 0..=70 {
            let x = 33.0 + (i as f64) * 0.1;
            let d = mf.evaluate(x);
            assert!(d <= prev + TOL);
            prev = d;
        }
    }

    #[test]
    fn test_degenerate_sets_peak_at_one() {
        // poor(4, 4, 6): left vertex coincides with the peak
        let poor = Triangular::new(4.0, 4.0, 6.0);
        assert_eq!(poor.evaluate(4.0), 1.0);
        assert!((poor.evaluate(5.0) - 0.5).abs() < TOL);
        assert_eq!(poor.evaluate(6.0), 0.0);

        // long(8.8, 9, 9): right vertex coincides with the peak
        let long = Triangular::new(8.8, 9.0, 9.0);
        assert_eq!(long.evaluate(9.0), 1.0);
        assert!((long.evaluate(8.9) - 0.5).abs() < TOL);
        assert_eq!(long.evaluate(8.8), 0.0);
    }

    #[test]
    fn test_membership_is_deterministic() {
        let first = membership("Sleep Duration", "adequate", 7.5).unwrap();
        for _ in 0..100 {
            let again = membership("Sleep Duration", "adequate", 7.5).unwrap();
            assert_eq!(first.to_bits(), again.to_bits());
        }
    }

    #[test]
    fn test_membership_unknown_names() {
        assert!(membership("Age", "old", 50.0).is_none());
        assert!(membership("Blood Pressure", "high", 120.0).is_none());
    }

    #[test]
    fn test_catalog_degree_names_align() {
        let names: Vec<String> = CATALOG
            .iter()
            .flat_map(|v| v.sets.iter().map(|s| s.name))
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names.len(), DEGREE_COUNT);
        // Spot-check the prefix mapping
        assert_eq!(names[0], "young");
        assert!(DEGREE_NAMES[0].ends_with("young"));
        assert!(DEGREE_NAMES[13].ends_with("high"));
    }

    #[test]
    fn test_fuzzify_reference_record() {
        // {Age: 33, SD: 7.5, QoS: 8, HR: 75, DS: 8000}
        let features = fuzzify(&NumericInputs {
            age: 33.0,
            sleep_duration: 7.5,
            quality_of_sleep: 8.0,
            heart_rate: 75.0,
            daily_steps: 8000.0,
        });

        let expected = [
            ("Age_young", 1.0),
            ("Age_middle", 0.0),
            ("SD_short", 0.0),
            ("SD_adequate", 0.5833),
            ("SD_long", 0.0),
            ("QoS_poor", 0.0),
            ("QoS_average", 0.0),
            ("QoS_excellent", 0.5),
            ("HR_normal_low", 0.0),
            ("HR_normal_mid", 1.0),
            ("HR_normal_high", 0.0),
            ("DS_low", 0.0),
            ("DS_moderate", 0.8333),
            ("DS_high", 0.0),
        ];

        for ((name, degree), (want_name, want)) in features.named().zip(expected) {
            assert_eq!(name, want_name);
            assert!(
                (degree - want).abs() < TOL,
                "{}: got {}, want {}",
                name,
                degree,
                want
            );
        }
        assert!(features.out_of_universe.is_empty());
    }

    #[test]
    fn test_fuzzify_degrees_in_unit_interval() {
        let features = fuzzify(&NumericInputs {
            age: 45.0,
            sleep_duration: 6.9,
            quality_of_sleep: 6.0,
            heart_rate: 71.0,
            daily_steps: 5700.0,
        });

        assert_eq!(features.degrees.len(), DEGREE_COUNT);
        for (name, degree) in features.named() {
            assert!((0.0..=1.0).contains(&degree), "{} out of range", name);
        }
    }

    #[test]
    fn test_out_of_universe_heart_rate() {
        let features = fuzzify(&NumericInputs {
            age: 33.0,
            sleep_duration: 7.5,
            quality_of_sleep: 8.0,
            heart_rate: 150.0,
            daily_steps: 8000.0,
        });

        assert_eq!(features.out_of_universe, vec!["Heart Rate"]);

        // All three HR degrees floor to zero, nothing else is disturbed
        let hr: Vec<f64> = features
            .named()
            .filter(|(name, _)| name.starts_with("HR_"))
            .map(|(_, d)| d)
            .collect();
        assert_eq!(hr, vec![0.0, 0.0, 0.0]);

        let age_young = features.named().find(|(n, _)| *n == "Age_young").unwrap().1;
        assert_eq!(age_young, 1.0);
    }

    #[test]
    fn test_universe_contains() {
        let u = Universe::new(65.0, 86.0, 1.0);
        assert!(u.contains(65.0));
        assert!(u.contains(86.0));
        assert!(!u.contains(64.9));
        assert!(!u.contains(150.0));
    }
}
