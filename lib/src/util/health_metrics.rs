// lib/src/util/health_metrics.rs
use chrono::{Datelike, NaiveDate};

/// Whole years completed on `today`; zero for dates in the future.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

/// Body-mass index to one decimal place; 0 when either input is missing or zero.
pub fn bmi(height_cm: Option<f64>, weight_kg: Option<f64>) -> f64 {
    match (height_cm, weight_kg) {
        (Some(h), Some(w)) if h > 0.0 && w > 0.0 => {
            let metres = h / 100.0;
            (w / (metres * metres) * 10.0).round() / 10.0
        }
        _ => 0.0,
    }
}

pub fn bmi_category(bmi: f64) -> &'static str {
    if bmi < 18.5 {
        "Underweight"
    } else if bmi < 25.0 {
        "Normal weight"
    } else if bmi < 30.0 {
        "Overweight"
    } else {
        "Obese"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn should_count_birthday_only_once_reached() {
        assert_eq!(age_on(date(1990, 6, 15), date(2025, 6, 14)), 34);
        assert_eq!(age_on(date(1990, 6, 15), date(2025, 6, 15)), 35);
        assert_eq!(age_on(date(2030, 1, 1), date(2025, 1, 1)), 0);
    }

    #[test]
    fn should_round_bmi_to_one_decimal() {
        assert_eq!(bmi(Some(175.0), Some(70.0)), 22.9);
        assert_eq!(bmi(None, Some(70.0)), 0.0);
        assert_eq!(bmi(Some(0.0), Some(70.0)), 0.0);
        assert_eq!(bmi_category(22.9), "Normal weight");
        assert_eq!(bmi_category(18.4), "Underweight");
        assert_eq!(bmi_category(29.99), "Overweight");
        assert_eq!(bmi_category(30.0), "Obese");
    }
}
