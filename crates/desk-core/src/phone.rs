//! # Saudi Phone Normalisation
//!
//! Client records store phone numbers the way staff typed them: local
//! (`0551234567`), bare (`551234567`), international (`+966 55 123 4567`)
//! or with a stray trunk zero after the country code (`9660551234567`).
//! WhatsApp deep links need the international form without `+` or leading
//! zero, so every number goes through [`normalize_saudi_phone`] first.
//!
//! ## Invariants
//!
//! - The output never starts with `0`.
//! - The output never carries the country code twice.
//! - A number already in `966XXXXXXXXX` form is returned unchanged.

use crate::error::DeskError;

/// Saudi Arabia's international dialling code.
pub const SAUDI_COUNTRY_CODE: &str = "966";

/// Length of a Saudi national significant number (e.g. `551234567`).
const NATIONAL_NUMBER_LEN: usize = 9;

/// Normalise a phone number to `966XXXXXXXXX` form.
///
/// Numbers that are neither local Saudi numbers nor already prefixed are
/// returned as digits only, so foreign numbers still produce a usable link.
///
/// # Errors
///
/// Returns `DeskError::InvalidPhone` when the input has no digits or contains
/// characters other than digits, spaces, dashes, dots, parentheses and a
/// leading `+`.
pub fn normalize_saudi_phone(input: &str) -> Result<String, DeskError> {
    let reject = |reason: &str| DeskError::InvalidPhone {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let compact: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')' | '.'))
        .collect();
    let compact = compact.strip_prefix('+').unwrap_or(&compact);
    let compact = compact.strip_prefix("00").unwrap_or(compact);

    if compact.is_empty() {
        return Err(reject("no digits"));
    }
    if !compact.chars().all(|c| c.is_ascii_digit()) {
        return Err(reject("unexpected characters"));
    }

    let mut digits = compact;
    loop {
        let rest = if let Some(rest) = digits.strip_prefix(SAUDI_COUNTRY_CODE) {
            rest.trim_start_matches('0')
        } else if digits.starts_with('0') {
            digits.trim_start_matches('0')
        } else if digits.len() == NATIONAL_NUMBER_LEN {
            return Ok(format!("{SAUDI_COUNTRY_CODE}{digits}"));
        } else {
            return Ok(digits.to_string());
        };

        if rest.is_empty() {
            return Err(reject("no subscriber number"));
        }
        // A second country code (`966966...`, `0966...`) is peeled off again.
        if rest.starts_with(SAUDI_COUNTRY_CODE) {
            digits = rest;
            continue;
        }
        return Ok(format!("{SAUDI_COUNTRY_CODE}{rest}"));
    }
}

/// Build a `wa.me` deep link for a client's phone number.
///
/// The optional message is form-urlencoded into the `text` parameter.
pub fn whatsapp_link(phone: &str, message: Option<&str>) -> Result<String, DeskError> {
    let number = normalize_saudi_phone(phone)?;
    let mut link = format!("https://wa.me/{number}");
    if let Some(message) = message.filter(|m| !m.is_empty()) {
        let encoded: String = url::form_urlencoded::byte_serialize(message.as_bytes()).collect();
        link.push_str("?text=");
        link.push_str(&encoded);
    }
    Ok(link)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_number_with_trunk_zero() {
        assert_eq!(normalize_saudi_phone("0551234567").unwrap(), "966551234567");
    }

    #[test]
    fn bare_national_number() {
        assert_eq!(normalize_saudi_phone("551234567").unwrap(), "966551234567");
    }

    #[test]
    fn already_prefixed_passes_through() {
        assert_eq!(normalize_saudi_phone("966551234567").unwrap(), "966551234567");
        assert_eq!(normalize_saudi_phone("+966 55 123 4567").unwrap(), "966551234567");
        assert_eq!(normalize_saudi_phone("00966551234567").unwrap(), "966551234567");
    }

    #[test]
    fn stray_zero_after_country_code_is_dropped() {
        assert_eq!(normalize_saudi_phone("9660551234567").unwrap(), "966551234567");
    }

    #[test]
    fn duplicated_prefix_collapses() {
        assert_eq!(normalize_saudi_phone("966966551234567").unwrap(), "966551234567");
    }

    #[test]
    fn punctuation_is_ignored() {
        assert_eq!(normalize_saudi_phone("(055) 123-4567").unwrap(), "966551234567");
    }

    #[test]
    fn foreign_numbers_keep_their_digits() {
        assert_eq!(normalize_saudi_phone("+44 20 7946 0958").unwrap(), "442079460958");
    }

    #[test]
    fn rejects_empty_and_non_numeric() {
        assert!(normalize_saudi_phone("").is_err());
        assert!(normalize_saudi_phone("  - ").is_err());
        assert!(normalize_saudi_phone("055-CALL-ME").is_err());
        assert!(normalize_saudi_phone("0000").is_err());
    }

    #[test]
    fn whatsapp_link_encodes_message() {
        let link = whatsapp_link("0551234567", Some("Invoice #12 is due")).unwrap();
        assert_eq!(link, "https://wa.me/966551234567?text=Invoice+%2312+is+due");
    }

    #[test]
    fn whatsapp_link_without_message() {
        let link = whatsapp_link("551234567", None).unwrap();
        assert_eq!(link, "https://wa.me/966551234567");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Local and bare national numbers always land on the same canonical form.
        #[test]
        fn local_and_bare_agree(national in "5[0-9]{8}") {
            let bare = normalize_saudi_phone(&national).unwrap();
            let local = normalize_saudi_phone(&format!("0{national}")).unwrap();
            let intl = normalize_saudi_phone(&format!("966{national}")).unwrap();
            prop_assert_eq!(&bare, &local);
            prop_assert_eq!(&bare, &intl);
            prop_assert_eq!(bare, format!("966{national}"));
        }

        /// Normalisation is idempotent.
        #[test]
        fn normalisation_is_idempotent(raw in "[+]?[0-9 ]{1,15}") {
            if let Ok(once) = normalize_saudi_phone(&raw) {
                let twice = normalize_saudi_phone(&once).unwrap();
                prop_assert_eq!(once, twice);
            }
        }

        /// Output never starts with a zero and never repeats the country code.
        #[test]
        fn output_shape(raw in "[0-9]{1,14}") {
            if let Ok(out) = normalize_saudi_phone(&raw) {
                prop_assert!(!out.starts_with('0'));
                prop_assert!(!out.starts_with("966966"));
            }
        }
    }
}
