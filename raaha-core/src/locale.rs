//! Display formatting for English and Arabic
//!
//! Covers the dynamic strings a ride display shows (ETA, distance, fares).
//! Static page copy is not handled here.

use crate::metrics::Eta;
use crate::units::Kilometers;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const ARABIC_DIGITS: [char; 10] = ['٠', '١', '٢', '٣', '٤', '٥', '٦', '٧', '٨', '٩'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    pub fn direction(&self) -> TextDirection {
        match self {
            Language::En => TextDirection::Ltr,
            Language::Ar => TextDirection::Rtl,
        }
    }

    fn localize_digits(&self, text: &str) -> String {
        match self {
            Language::En => text.to_string(),
            Language::Ar => to_arabic_numerals(text),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ar" => Ok(Language::Ar),
            other => Err(format!("unsupported language: {}", other)),
        }
    }
}

pub fn to_arabic_numerals(text: &str) -> String {
    text.chars()
        .map(|c| match c.to_digit(10) {
            Some(d) if c.is_ascii_digit() => ARABIC_DIGITS[d as usize],
            _ => c,
        })
        .collect()
}

pub fn to_western_numerals(text: &str) -> String {
    text.chars()
        .map(|c| match ARABIC_DIGITS.iter().position(|&d| d == c) {
            Some(i) => char::from(b'0' + i as u8),
            None => c,
        })
        .collect()
}

pub fn format_eta(eta: Eta, lang: Language) -> String {
    match (eta, lang) {
        (Eta::Minutes(m), Language::En) => format!("{} min", m),
        (Eta::Minutes(m), Language::Ar) => format!("{} دقيقة", to_arabic_numerals(&m.to_string())),
        (Eta::Arrived, Language::En) => "Arrived".to_string(),
        (Eta::Arrived, Language::Ar) => "وصلت".to_string(),
        (Eta::Unavailable, _) => "--".to_string(),
    }
}

pub fn format_distance(distance: Kilometers, lang: Language) -> String {
    if distance.0 <= 0.0 {
        return match lang {
            Language::En => "Destination reached".to_string(),
            Language::Ar => "تم الوصول إلى الوجهة".to_string(),
        };
    }

    let value = lang.localize_digits(&format!("{:.1}", distance.0));
    match lang {
        Language::En => format!("{} km remaining", value),
        Language::Ar => format!("متبقي {} كم", value),
    }
}

pub fn format_currency(amount: f64, lang: Language) -> String {
    let value = lang.localize_digits(&format!("{:.2}", amount));
    match lang {
        Language::En => format!("AED {}", value),
        Language::Ar => format!("{} د.إ", value),
    }
}
