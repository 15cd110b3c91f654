// lib/src/util/sa_id.rs
//! South African identity numbers: `YYMMDD SSSS C A Z`, where `SSSS` below
//! 5000 means female, `C` is 0 for citizens and `Z` is a Luhn-style check digit.

use std::fmt;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use super::health_metrics::age_on;

pub const SA_ID_LENGTH: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Citizenship {
    SouthAfrican,
    Foreign,
}

impl fmt::Display for Citizenship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Citizenship::SouthAfrican => "South African",
            Citizenship::Foreign => "Foreign",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaIdInfo {
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub citizenship: Citizenship,
    pub age: u32,
}

fn digits(id_number: &str) -> Option<Vec<u32>> {
    if id_number.len() != SA_ID_LENGTH || !id_number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(id_number.bytes().map(|b| u32::from(b - b'0')).collect())
}

pub(crate) fn check_digit(first_twelve: &[u32]) -> u32 {
    let sum: u32 = first_twelve
        .iter()
        .take(12)
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 0 {
                d
            } else {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            }
        })
        .sum();
    (10 - sum % 10) % 10
}

pub fn validate_sa_id_number(id_number: &str) -> bool {
    match digits(id_number) {
        Some(d) => check_digit(&d[..12]) == d[12],
        None => false,
    }
}

/// Details encoded in a valid ID number. Two-digit years at or below the
/// current two-digit year belong to this century, the rest to the previous one.
pub fn extract_sa_id_info(id_number: &str, today: NaiveDate) -> Option<SaIdInfo> {
    if !validate_sa_id_number(id_number) {
        return None;
    }
    let d = digits(id_number)?;
    let yy = (d[0] * 10 + d[1]) as i32;
    let month = d[2] * 10 + d[3];
    let day = d[4] * 10 + d[5];
    let sequence = d[6] * 1000 + d[7] * 100 + d[8] * 10 + d[9];

    let century = today.year() / 100 * 100;
    let year = if yy <= today.year() % 100 { century + yy } else { century - 100 + yy };
    let date_of_birth = NaiveDate::from_ymd_opt(year, month, day)?;

    Some(SaIdInfo {
        date_of_birth,
        gender: if sequence < 5000 { Gender::Female } else { Gender::Male },
        citizenship: if d[10] == 0 { Citizenship::SouthAfrican } else { Citizenship::Foreign },
        age: age_on(date_of_birth, today),
    })
}
