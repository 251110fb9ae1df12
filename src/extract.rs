//! Heuristic signal extraction from free-text bank notifications.
//!
//! Mobile banking apps word their push notifications in locale-specific,
//! inconsistent ways, so everything here is best effort: an ordered list of
//! rules, first valid match wins, and absence of a match degrades to `None`
//! rather than an error. Extraction never fails and must never block the
//! ingestion path.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Credit,
    Debit,
}

/// Best-effort structured data pulled out of one notification.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct Signal {
    pub amount: Option<Decimal>,
    pub card_last4: Option<String>,
    pub operation: Option<OperationKind>,
}

/// Amount rules in priority order: currency-symbol suffix, RUB suffix,
/// labelled prefixes, abbreviated and full-word ruble suffixes. The captured
/// number allows thousands groups separated by spaces or NBSP and a
/// two-digit decimal part with either separator.
static AMOUNT_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(\d{1,3}(?:[\s\x{a0}]?\d{3})*(?:[.,]\d{2})?)\s*[₽руб]",
        r"(?i)(\d{1,3}(?:[\s\x{a0}]?\d{3})*(?:[.,]\d{2})?)\s*RUB",
        r"(?i)сумма[:\s]+(\d{1,3}(?:[\s\x{a0}]?\d{3})*(?:[.,]\d{2})?)",
        r"(?i)на сумму\s+(\d{1,3}(?:[\s\x{a0}]?\d{3})*(?:[.,]\d{2})?)",
        r"(?i)перевод[:\s]+(\d{1,3}(?:[\s\x{a0}]?\d{3})*(?:[.,]\d{2})?)",
        r"(?i)зачисление[:\s]+(\d{1,3}(?:[\s\x{a0}]?\d{3})*(?:[.,]\d{2})?)",
        r"(?i)(\d+(?:[.,]\d{2})?)\s*р\.?(?:\s|$)",
        r"(?i)(\d+(?:[.,]\d{2})?)\s*рублей",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("amount rule must compile"))
    .collect()
});

/// Masked-card rules in priority order. The leading-asterisks rule tolerates
/// a single space before the digits ("**** 4532").
static CARD_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\*{1,4}\s?(\d{4})",
        r"(?i)карт[аы]?\s*\*?(\d{4})",
        r"(\d{4})\s*\*{4}",
        r"(?i)карта[:\s]+\S*(\d{4})",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("card rule must compile"))
    .collect()
});

const CREDIT_KEYWORDS: &[&str] = &[
    "зачисление",
    "пополнение",
    "получен",
    "входящий",
    "поступление",
    "перевод от",
    "вам перевели",
];

const DEBIT_KEYWORDS: &[&str] = &[
    "списание",
    "покупка",
    "оплата",
    "перевод",
    "снятие",
    "оплачен",
    "платеж",
];

/// Extracts a `Signal` from a notification's title and body.
///
/// Pure and deterministic; unmatched fields come back as `None`.
pub fn extract(title: &str, text: &str) -> Signal {
    let buffer = format!("{title} {text}");
    Signal {
        amount: extract_amount(&buffer),
        card_last4: extract_card_last4(&buffer),
        operation: classify_operation(&buffer),
    }
}

fn extract_amount(buffer: &str) -> Option<Decimal> {
    for rule in AMOUNT_RULES.iter() {
        let Some(caps) = rule.captures(buffer) else {
            continue;
        };
        let normalized: String = caps[1]
            .chars()
            .filter(|c| !matches!(c, ' ' | '\u{a0}'))
            .map(|c| if c == ',' { '.' } else { c })
            .collect();
        // A match that does not parse to a positive value is skipped, not
        // treated as a final failure; later rules still get their chance.
        if let Ok(value) = normalized.parse::<Decimal>()
            && value > Decimal::ZERO
        {
            return Some(value);
        }
    }
    None
}

fn extract_card_last4(buffer: &str) -> Option<String> {
    CARD_RULES
        .iter()
        .find_map(|rule| rule.captures(buffer))
        .map(|caps| caps[1].to_string())
}

fn classify_operation(buffer: &str) -> Option<OperationKind> {
    let lower = buffer.to_lowercase();
    // Credit keywords win over debit keywords: a notification carrying both
    // kinds of wording ("перевод от ...") classifies as credit.
    if CREDIT_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        Some(OperationKind::Credit)
    } else if DEBIT_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        Some(OperationKind::Debit)
    } else {
        None
    }
}
