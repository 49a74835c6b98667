//! Health metrics calculations module
//!
//! Provides BMI, Navy-method body fat and Mifflin-St Jeor TDEE calculations
//! for the member dashboard calculators.
//!
//! Every function here is pure and total: degenerate inputs do not panic or
//! return errors, they propagate as NaN/Infinity. Callers turn those into a
//! placeholder once, at display time, via [`format_metric`].

use serde::{Deserialize, Serialize};

/// Calorie deficit applied for the cutting target
pub const CUTTING_OFFSET_KCAL: i64 = 400;

/// Calorie surplus applied for the bulking target
pub const BULKING_OFFSET_KCAL: i64 = 300;

/// Placeholder shown for values that cannot be displayed
pub const NO_RESULT: &str = "—";

// ============================================================================
// Input Types
// ============================================================================

/// Gender used by the physiological formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            _ => Err(format!("Unknown gender: {}", s)),
        }
    }
}

/// Activity level for TDEE calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    /// Desk job, little or no exercise
    Sedentary,
    /// Light exercise 1-3 days/week
    Light,
    /// Moderate exercise 3-5 days/week
    #[default]
    Moderate,
    /// Hard exercise 6-7 days/week
    Active,
    /// Twice-a-day training or a physical job
    Athlete,
}

impl ActivityLevel {
    /// Every level, least to most active
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::Athlete,
    ];

    /// Get the activity multiplier for TDEE calculation
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::Athlete => 1.9,
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Desk job, little or no exercise",
            ActivityLevel::Light => "Light exercise 1-3 days/week",
            ActivityLevel::Moderate => "Moderate exercise 3-5 days/week",
            ActivityLevel::Active => "Hard exercise 6-7 days/week",
            ActivityLevel::Athlete => "Athlete, training twice a day",
        }
    }
}

impl std::str::FromStr for ActivityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "active" => Ok(ActivityLevel::Active),
            "athlete" => Ok(ActivityLevel::Athlete),
            _ => Err(format!("Unknown activity level: {}", s)),
        }
    }
}

/// One snapshot of the calculator form
///
/// Every field is typed; the form never carries an untyped bag of values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropometricInput {
    pub height_cm: f64,
    pub weight_kg: f64,
    pub waist_cm: f64,
    pub neck_cm: f64,
    /// Only read by the female body fat formula
    #[serde(default)]
    pub hip_cm: Option<f64>,
    pub age_years: u32,
    pub gender: Gender,
    #[serde(default)]
    pub activity_level: ActivityLevel,
}

// ============================================================================
// BMI Calculations
// ============================================================================

/// BMI category classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BmiCategory {
    Underweight,
    Healthy,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Get a human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Healthy => "Healthy",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

/// Calculate BMI from height and weight, rounded to one decimal
///
/// Formula: BMI = weight(kg) / height(m)²
///
/// A non-positive height has no BMI and yields NaN.
pub fn compute_bmi(height_cm: f64, weight_kg: f64) -> f64 {
    if height_cm <= 0.0 {
        return f64::NAN;
    }
    let height_m = height_cm / 100.0;
    round_to(weight_kg / (height_m * height_m), 1)
}

/// Classify BMI into category
pub fn classify_bmi(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Healthy
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Weights that put a given height in the healthy BMI band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthyWeightRange {
    pub min_kg: f64,
    pub max_kg: f64,
}

/// Healthy weight range (BMI 18.5-25) shown next to the BMI card
///
/// `None` for a non-positive or non-finite height.
pub fn healthy_weight_range_kg(height_cm: f64) -> Option<HealthyWeightRange> {
    if !height_cm.is_finite() || height_cm <= 0.0 {
        return None;
    }
    let height_m = height_cm / 100.0;
    let height_m_sq = height_m * height_m;
    Some(HealthyWeightRange {
        min_kg: round_to(18.5 * height_m_sq, 1),
        max_kg: round_to(25.0 * height_m_sq, 1),
    })
}

// ============================================================================
// Body Fat Estimation
// ============================================================================

/// Estimate body fat percentage with the U.S. Navy circumference method
///
/// Men: 495 / (1.0324 − 0.19077·log10(waist − neck) + 0.15456·log10(height)) − 450
/// Women: 495 / (1.29579 − 0.35004·log10(waist + hip − neck) + 0.221·log10(height)) − 450
///
/// Every log10 argument is clamped to at least 1, so impossible measurements
/// (e.g. neck wider than waist) give a finite but meaningless number rather
/// than NaN from a negative logarithm.
pub fn compute_body_fat(
    gender: Gender,
    waist_cm: f64,
    neck_cm: f64,
    hip_cm: f64,
    height_cm: f64,
) -> f64 {
    let body_fat = match gender {
        Gender::Male => {
            495.0
                / (1.0324 - 0.19077 * clamped_log10(waist_cm - neck_cm)
                    + 0.15456 * clamped_log10(height_cm))
                - 450.0
        }
        Gender::Female => {
            495.0
                / (1.29579 - 0.35004 * clamped_log10(waist_cm + hip_cm - neck_cm)
                    + 0.221 * clamped_log10(height_cm))
                - 450.0
        }
    };
    round_to(body_fat, 1)
}

fn clamped_log10(value: f64) -> f64 {
    value.max(1.0).log10()
}

// ============================================================================
// BMR and TDEE Calculations
// ============================================================================

/// Calculate Basal Metabolic Rate using Mifflin-St Jeor equation
///
/// Men: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) + 5
/// Women: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) - 161
pub fn compute_bmr(weight_kg: f64, height_cm: f64, age_years: u32, gender: Gender) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age_years);
    match gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

/// Calculate Total Daily Energy Expenditure in whole kcal
///
/// TDEE = BMR × activity multiplier. NaN becomes 0; a product beyond the
/// `i64` range clamps to `i64::MIN` or `i64::MAX`.
pub fn compute_tdee(
    weight_kg: f64,
    height_cm: f64,
    age_years: u32,
    gender: Gender,
    activity_level: ActivityLevel,
) -> i64 {
    let bmr = compute_bmr(weight_kg, height_cm, age_years, gender);
    (bmr * activity_level.multiplier()).round() as i64
}

/// Daily calories for a cut, saturating at the `i64` bounds
#[inline]
pub fn cutting_target(tdee_kcal: i64) -> i64 {
    tdee_kcal.saturating_sub(CUTTING_OFFSET_KCAL)
}

/// Daily calories for a bulk, saturating at the `i64` bounds
#[inline]
pub fn bulking_target(tdee_kcal: i64) -> i64 {
    tdee_kcal.saturating_add(BULKING_OFFSET_KCAL)
}

// ============================================================================
// Combined Result
// ============================================================================

/// Everything the calculator page shows for one form snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    pub bmi: f64,
    /// `None` when the BMI itself is not a number
    pub bmi_category: Option<BmiCategory>,
    /// `None` when the height is not positive
    pub healthy_weight_kg: Option<HealthyWeightRange>,
    pub body_fat_percent: f64,
    pub tdee_kcal: i64,
    pub cutting_target_kcal: i64,
    pub bulking_target_kcal: i64,
}

/// Compute every metric for a form snapshot
pub fn compute_metrics(input: &AnthropometricInput) -> MetricsResult {
    let bmi = compute_bmi(input.height_cm, input.weight_kg);
    let bmi_category = bmi.is_finite().then(|| classify_bmi(bmi));

    let body_fat_percent = compute_body_fat(
        input.gender,
        input.waist_cm,
        input.neck_cm,
        input.hip_cm.unwrap_or(0.0),
        input.height_cm,
    );

    let tdee_kcal = compute_tdee(
        input.weight_kg,
        input.height_cm,
        input.age_years,
        input.gender,
        input.activity_level,
    );

    MetricsResult {
        bmi,
        bmi_category,
        healthy_weight_kg: healthy_weight_range_kg(input.height_cm),
        body_fat_percent,
        tdee_kcal,
        cutting_target_kcal: cutting_target(tdee_kcal),
        bulking_target_kcal: bulking_target(tdee_kcal),
    }
}

// ============================================================================
// Display Helpers
// ============================================================================

/// Format a metric for display, substituting the placeholder for NaN/Infinity
pub fn format_metric(value: f64, decimals: usize) -> String {
    if value.is_finite() {
        format!("{:.*}", decimals, value)
    } else {
        NO_RESULT.to_string()
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn sample_input() -> AnthropometricInput {
        AnthropometricInput {
            height_cm: 170.0,
            weight_kg: 70.0,
            waist_cm: 82.0,
            neck_cm: 40.0,
            hip_cm: None,
            age_years: 28,
            gender: Gender::Male,
            activity_level: ActivityLevel::Moderate,
        }
    }

    // =========================================================================
    // BMI Tests
    // =========================================================================

    #[test]
    fn test_bmi_calculation() {
        // 70kg, 175cm -> 22.857.. -> 22.9
        assert_eq!(compute_bmi(175.0, 70.0), 22.9);
    }

    #[test]
    fn test_bmi_non_positive_height_is_nan() {
        assert!(compute_bmi(0.0, 70.0).is_nan());
        assert!(compute_bmi(-150.0, 70.0).is_nan());
    }

    #[rstest]
    #[case(18.49, BmiCategory::Underweight)]
    #[case(18.5, BmiCategory::Healthy)]
    #[case(24.99, BmiCategory::Healthy)]
    #[case(25.0, BmiCategory::Overweight)]
    #[case(29.99, BmiCategory::Overweight)]
    #[case(30.0, BmiCategory::Obese)]
    fn test_bmi_band_boundaries(#[case] bmi: f64, #[case] expected: BmiCategory) {
        assert_eq!(classify_bmi(bmi), expected);
    }

    #[test]
    fn test_healthy_weight_range() {
        // 18.5 * 1.75² = 56.656, 25 * 1.75² = 76.5625
        let range = healthy_weight_range_kg(175.0).unwrap();
        assert_eq!(range.min_kg, 56.7);
        assert_eq!(range.max_kg, 76.6);

        assert_eq!(healthy_weight_range_kg(0.0), None);
        assert_eq!(healthy_weight_range_kg(f64::NAN), None);
    }

    #[test]
    fn test_metrics_carry_healthy_weight_range() {
        let result = compute_metrics(&sample_input());
        assert_eq!(result.healthy_weight_kg, healthy_weight_range_kg(170.0));

        let flat = compute_metrics(&AnthropometricInput {
            height_cm: 0.0,
            ..sample_input()
        });
        assert_eq!(flat.healthy_weight_kg, None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Heavier weight = higher-or-equal BMI (same height)
        #[test]
        fn prop_bmi_increases_with_weight(
            weight1 in 40.0f64..100.0,
            extra in 2.0f64..80.0,
            height in 150.0f64..200.0
        ) {
            let bmi1 = compute_bmi(height, weight1);
            let bmi2 = compute_bmi(height, weight1 + extra);
            prop_assert!(bmi2 > bmi1);
        }

        /// Taller height = lower-or-equal BMI (same weight)
        #[test]
        fn prop_bmi_decreases_with_height(
            weight in 60.0f64..100.0,
            height1 in 150.0f64..170.0,
            height2 in 180.0f64..200.0
        ) {
            let bmi1 = compute_bmi(height1, weight);
            let bmi2 = compute_bmi(height2, weight);
            prop_assert!(bmi1 > bmi2);
        }

        /// Any finite positive height/weight gives a finite BMI and a category
        #[test]
        fn prop_bmi_always_classifies(weight in 1.0f64..500.0, height in 50.0f64..250.0) {
            let input = AnthropometricInput {
                height_cm: height,
                weight_kg: weight,
                ..sample_input()
            };
            let result = compute_metrics(&input);
            prop_assert!(result.bmi.is_finite());
            prop_assert_eq!(result.bmi_category, Some(classify_bmi(result.bmi)));
        }
    }

    // =========================================================================
    // Body Fat Tests
    // =========================================================================

    #[test]
    fn test_male_body_fat() {
        let bf = compute_body_fat(Gender::Male, 82.0, 40.0, 0.0, 170.0);
        assert!((bf - 13.7).abs() < 0.2, "got {}", bf);
    }

    #[test]
    fn test_female_body_fat_uses_hip() {
        let bf = compute_body_fat(Gender::Female, 70.0, 32.0, 95.0, 165.0);
        assert!(bf > 15.0 && bf < 35.0, "got {}", bf);

        let without_hip = compute_body_fat(Gender::Female, 70.0, 32.0, 0.0, 165.0);
        assert_ne!(bf, without_hip);
    }

    #[test]
    fn test_male_body_fat_ignores_hip() {
        let a = compute_body_fat(Gender::Male, 82.0, 40.0, 0.0, 170.0);
        let b = compute_body_fat(Gender::Male, 82.0, 40.0, 110.0, 170.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_body_fat_clamps_non_positive_log_argument() {
        // neck wider than waist: log10 argument would be negative
        let bf = compute_body_fat(Gender::Male, 40.0, 82.0, 0.0, 170.0);
        assert!(bf.is_finite());
        assert!(bf < 0.0);

        let bf = compute_body_fat(Gender::Female, 0.0, 0.0, 0.0, 0.0);
        assert!(bf.is_finite());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Clamping keeps the result finite for any non-negative measurements
        #[test]
        fn prop_body_fat_finite(
            waist in 0.0f64..200.0,
            neck in 0.0f64..100.0,
            hip in 0.0f64..200.0,
            height in 0.0f64..250.0
        ) {
            prop_assert!(compute_body_fat(Gender::Male, waist, neck, hip, height).is_finite());
            prop_assert!(compute_body_fat(Gender::Female, waist, neck, hip, height).is_finite());
        }
    }

    // =========================================================================
    // BMR/TDEE Tests
    // =========================================================================

    #[test]
    fn test_bmr_mifflin() {
        // 10*70 + 6.25*170 - 5*28 + 5 = 1627.5
        assert_eq!(compute_bmr(70.0, 170.0, 28, Gender::Male), 1627.5);
        assert_eq!(compute_bmr(70.0, 170.0, 28, Gender::Female), 1461.5);
    }

    #[test]
    fn test_tdee_and_targets() {
        // round(1627.5 * 1.55) = round(2522.625) = 2523
        let tdee = compute_tdee(70.0, 170.0, 28, Gender::Male, ActivityLevel::Moderate);
        assert_eq!(tdee, 2523);
        assert_eq!(cutting_target(tdee), 2123);
        assert_eq!(bulking_target(tdee), 2823);
    }

    #[rstest]
    #[case(1e300)]
    #[case(-1e300)]
    #[case(f64::INFINITY)]
    #[case(f64::NEG_INFINITY)]
    fn test_extreme_weight_never_overflows(#[case] weight_kg: f64) {
        let result = compute_metrics(&AnthropometricInput {
            weight_kg,
            ..sample_input()
        });

        let bound = if weight_kg > 0.0 { i64::MAX } else { i64::MIN };
        assert_eq!(result.tdee_kcal, bound);
        assert!(result.cutting_target_kcal <= result.tdee_kcal);
        assert!(result.bulking_target_kcal >= result.tdee_kcal);
        assert_eq!(cutting_target(i64::MIN), i64::MIN);
        assert_eq!(bulking_target(i64::MAX), i64::MAX);
    }

    #[test]
    fn test_tdee_non_finite_saturates() {
        let tdee = compute_tdee(f64::NAN, 170.0, 28, Gender::Male, ActivityLevel::Light);
        assert_eq!(tdee, 0);
    }

    #[test]
    fn test_activity_multipliers_increase() {
        let levels = [
            ActivityLevel::Sedentary,
            ActivityLevel::Light,
            ActivityLevel::Moderate,
            ActivityLevel::Active,
            ActivityLevel::Athlete,
        ];
        for pair in levels.windows(2) {
            assert!(pair[0].multiplier() < pair[1].multiplier());
        }
    }

    #[test]
    fn test_activity_level_parsing() {
        assert_eq!("athlete".parse::<ActivityLevel>().unwrap(), ActivityLevel::Athlete);
        assert_eq!("Light".parse::<ActivityLevel>().unwrap(), ActivityLevel::Light);
        assert!("couch".parse::<ActivityLevel>().is_err());
    }

    // =========================================================================
    // Combined Result Tests
    // =========================================================================

    #[test]
    fn test_compute_metrics() {
        let result = compute_metrics(&sample_input());
        assert_eq!(result.bmi, 24.2);
        assert_eq!(result.bmi_category, Some(BmiCategory::Healthy));
        assert_eq!(result.tdee_kcal, 2523);
        assert_eq!(result.cutting_target_kcal, 2123);
        assert_eq!(result.bulking_target_kcal, 2823);
    }

    #[test]
    fn test_compute_metrics_zero_height_has_no_category() {
        let input = AnthropometricInput {
            height_cm: 0.0,
            ..sample_input()
        };
        let result = compute_metrics(&input);
        assert!(result.bmi.is_nan());
        assert_eq!(result.bmi_category, None);
        assert_eq!(format_metric(result.bmi, 1), NO_RESULT);
    }

    #[test]
    fn test_input_deserializes_from_form_json() {
        let input: AnthropometricInput = serde_json::from_str(
            r#"{"height_cm":165,"weight_kg":60,"waist_cm":70,"neck_cm":32,
                "hip_cm":95,"age_years":30,"gender":"female","activity_level":"athlete"}"#,
        )
        .unwrap();
        assert_eq!(input.gender, Gender::Female);
        assert_eq!(input.activity_level, ActivityLevel::Athlete);
        assert_eq!(input.hip_cm, Some(95.0));
    }

    #[test]
    fn test_format_metric() {
        assert_eq!(format_metric(22.857, 1), "22.9");
        assert_eq!(format_metric(f64::INFINITY, 1), NO_RESULT);
        assert_eq!(format_metric(f64::NAN, 0), NO_RESULT);
    }
}
