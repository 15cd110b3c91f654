// lib/src/util/formatting.rs
use chrono::NaiveDate;
use models::medical::appointment::parse_clock;
use models::Appointment;

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    grouped
}

/// South African rand: `R 1 234,50`, negatives as `-R 5,00`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}R {},{:02}", sign, group_thousands(cents / 100), cents % 100)
}

/// Local numbers as `(082) 123-4567`, international ones as `+27 (821) 234-567`.
/// Anything else is returned unchanged.
pub fn format_phone_number(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(char::is_ascii_digit).collect();
    if cleaned.len() == 10 && cleaned.starts_with('0') {
        format!("({}) {}-{}", &cleaned[..3], &cleaned[3..6], &cleaned[6..])
    } else if cleaned.len() == 11 && cleaned.starts_with("27") {
        format!("+{} ({}) {}-{}", &cleaned[..2], &cleaned[2..5], &cleaned[5..8], &cleaned[8..])
    } else {
        raw.to_string()
    }
}

pub fn format_appointment_date(date: NaiveDate) -> String {
    date.format("%a, %d %b %Y").to_string()
}

/// `09:00:00` and `09:00` both render as `09:00`; unparseable input is kept.
pub fn format_appointment_time(raw: &str) -> String {
    parse_clock(raw)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| raw.trim().to_string())
}

pub fn format_appointment_datetime(appointment: &Appointment) -> String {
    format!(
        "{} at {}",
        format_appointment_date(appointment.appointment_date),
        format_appointment_time(&appointment.start_time)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_format_rand_amounts() {
        assert_eq!(format_currency(1234.5), "R 1 234,50");
        assert_eq!(format_currency(-5.0), "-R 5,00");
        assert_eq!(format_currency(0.0), "R 0,00");
        assert_eq!(format_currency(1_000_000.0), "R 1 000 000,00");
        assert_eq!(format_currency(450.0), "R 450,00");
    }

    #[test]
    fn should_format_local_and_international_numbers() {
        assert_eq!(format_phone_number("0821234567"), "(082) 123-4567");
        assert_eq!(format_phone_number("082 123 4567"), "(082) 123-4567");
        assert_eq!(format_phone_number("27821234567"), "+27 (821) 234-567");
        assert_eq!(format_phone_number("12345"), "12345");
    }

    #[test]
    fn should_render_appointment_date_and_time() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(format_appointment_date(date), "Fri, 14 Mar 2025");
        assert_eq!(format_appointment_time("09:30:00"), "09:30");
        assert_eq!(format_appointment_time("soon"), "soon");
    }
}
