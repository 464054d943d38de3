//! Gender-balance check over records with a recognised `M`/`F` value.

use super::{BiasCategory, CheckResult, percent};
use crate::config::GenderCheckConfig;
use crate::roster::{PatientRecord, Sex};
use tracing::info;

pub fn check_gender_bias(patients: &[PatientRecord], config: &GenderCheckConfig) -> CheckResult {
    if patients.is_empty() {
        return CheckResult::pass();
    }

    let (male, female) = patients
        .iter()
        .fold((0usize, 0usize), |(m, f), p| match p.sex() {
            Sex::Male => (m + 1, f),
            Sex::Female => (m, f + 1),
            Sex::Unrecognized => (m, f),
        });
    let total = male + female;
    if total == 0 {
        return CheckResult::pass();
    }

    let male_pct = percent(male, total);
    let female_pct = percent(female, total);
    info!("Gender check: M:{:.1}% F:{:.1}%", male_pct, female_pct);

    if male_pct < config.min_male_pct || male_pct > config.max_male_pct {
        return CheckResult::fail(
            BiasCategory::Gender,
            format!("{:.1}% male, {:.1}% female", male_pct, female_pct),
        );
    }
    CheckResult::pass()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn roster(males: usize, females: usize) -> Vec<PatientRecord> {
        let mut patients = vec![PatientRecord::new(50.0, "M"); males];
        patients.extend(vec![PatientRecord::new(50.0, "F"); females]);
        patients
    }

    fn check(patients: &[PatientRecord]) -> CheckResult {
        check_gender_bias(patients, &GenderCheckConfig::default())
    }

    #[test]
    fn test_empty_roster_passes() {
        assert!(check(&[]).passed);
    }

    #[test]
    fn test_ninety_percent_male_rejected() {
        let result = check(&roster(9, 1));
        assert!(!result.passed);
        assert_eq!(
            result.reason.as_deref(),
            Some("GENDER BIAS: 90.0% male, 10.0% female")
        );
    }

    #[test]
    fn test_eighty_percent_male_passes() {
        assert!(check(&roster(8, 2)).passed);
    }

    #[test]
    fn test_twenty_percent_male_passes() {
        assert!(check(&roster(2, 8)).passed);
    }

    #[test]
    fn test_mostly_female_rejected() {
        let result = check(&roster(1, 9));
        assert!(!result.passed);
        assert!(result.reason.unwrap().contains("10.0% male, 90.0% female"));
    }

    #[test]
    fn test_unrecognised_values_pass() {
        let patients = vec![PatientRecord::new(50.0, "X"); 10];
        assert!(check(&patients).passed);
    }

    #[test]
    fn test_unrecognised_values_excluded_from_denominator() {
        let mut patients = roster(1, 1);
        patients.extend(vec![PatientRecord::new(50.0, "other"); 20]);
        patients.push(PatientRecord::default());
        assert!(check(&patients).passed);
    }

    #[test]
    fn test_lowercase_values_recognised() {
        let mut patients = vec![PatientRecord::new(50.0, "m"); 9];
        patients.push(PatientRecord::new(50.0, "f"));
        assert!(!check(&patients).passed);
    }
}
