//! Checksum validators for pattern matches
//!
//! A pattern recognizer with a validator promotes a validated match to full
//! confidence and drops a match that fails validation.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Validation applied to the matched text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validator {
    /// Luhn mod-10 checksum (payment card numbers)
    Luhn,
    /// ISO 13616 IBAN: country length and mod-97 checksum
    Iban,
    /// Parses as an IPv4 or IPv6 address
    IpAddress,
}

impl Validator {
    /// Validate a matched substring
    pub fn validate(&self, matched: &str) -> bool {
        match self {
            Self::Luhn => luhn_valid(matched),
            Self::Iban => iban_valid(matched),
            Self::IpAddress => matched.trim().parse::<IpAddr>().is_ok(),
        }
    }
}

/// Luhn checksum over the digits of `value`, ignoring spaces and dashes
pub fn luhn_valid(value: &str) -> bool {
    let mut digits = Vec::with_capacity(value.len());
    for c in value.chars() {
        match c {
            ' ' | '-' => continue,
            _ => match c.to_digit(10) {
                Some(d) => digits.push(d),
                None => return false,
            },
        }
    }
    if digits.len() < 12 {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

/// IBAN validation: known country length plus mod-97 == 1
pub fn iban_valid(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if compact.len() < 15 || !compact.is_ascii() {
        return false;
    }

    let country = &compact[..2];
    match iban_length(country) {
        Some(expected) if expected == compact.len() => {}
        _ => return false,
    }

    // Move the first four characters to the end, map letters to 10..35
    let rearranged = format!("{}{}", &compact[4..], &compact[..4]);
    let mut remainder: u32 = 0;
    for c in rearranged.chars() {
        let value = match c {
            '0'..='9' => c as u32 - '0' as u32,
            'A'..='Z' => c as u32 - 'A' as u32 + 10,
            _ => return false,
        };
        remainder = if value >= 10 {
            (remainder * 100 + value) % 97
        } else {
            (remainder * 10 + value) % 97
        };
    }

    remainder == 1
}

/// Registered IBAN length per country
fn iban_length(country: &str) -> Option<usize> {
    let length = match country {
        "AD" => 24,
        "AE" => 23,
        "AL" => 28,
        "AT" => 20,
        "AZ" => 28,
        "BA" => 20,
        "BE" => 16,
        "BG" => 22,
        "BH" => 22,
        "BR" => 29,
        "CH" => 21,
        "CR" => 22,
        "CY" => 28,
        "CZ" => 24,
        "DE" => 22,
        "DK" => 18,
        "DO" => 28,
        "EE" => 20,
        "EG" => 29,
        "ES" => 24,
        "FI" => 18,
        "FO" => 18,
        "FR" => 27,
        "GB" => 22,
        "GE" => 22,
        "GI" => 23,
        "GL" => 18,
        "GR" => 27,
        "GT" => 28,
        "HR" => 21,
        "HU" => 28,
        "IE" => 22,
        "IL" => 23,
        "IS" => 26,
        "IT" => 27,
        "JO" => 30,
        "KW" => 30,
        "KZ" => 20,
        "LB" => 28,
        "LI" => 21,
        "LT" => 20,
        "LU" => 20,
        "LV" => 21,
        "MC" => 27,
        "MD" => 24,
        "ME" => 22,
        "MK" => 19,
        "MR" => 27,
        "MT" => 31,
        "MU" => 30,
        "NL" => 18,
        "NO" => 15,
        "PK" => 24,
        "PL" => 28,
        "PS" => 29,
        "PT" => 25,
        "QA" => 29,
        "RO" => 24,
        "RS" => 22,
        "SA" => 24,
        "SE" => 24,
        "SI" => 19,
        "SK" => 24,
        "SM" => 27,
        "TN" => 24,
        "TR" => 26,
        "UA" => 29,
        "VG" => 24,
        "XK" => 20,
        _ => return None,
    };
    Some(length)
}
