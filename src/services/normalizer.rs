use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::date_utils::parse_date_value;
use crate::models::{NormalizedTransaction, RawTransaction, UNCATEGORIZED};

/// Date-bearing fields, probed in priority order.
pub const DATE_FIELDS: &[&str] = &[
    "date",
    "transaction_date",
    "transactionDate",
    "posted_date",
    "postedDate",
    "posted_at",
    "postedAt",
    "created_at",
    "createdAt",
    "timestamp",
];

pub const AMOUNT_FIELDS: &[&str] = &["amount", "value", "total"];

pub const CATEGORY_FIELDS: &[&str] = &[
    "category",
    "category_name",
    "categoryName",
    "description",
    "payee",
];

/// Keys replaced by the canonical fields of a normalized record.
const CANONICAL_FIELDS: &[&str] = &["date", "amount", "category"];

/// Normalize whatever the input feed delivered.
///
/// Anything other than a JSON array is treated as an empty feed.
pub fn normalize_transactions(input: &Value) -> Vec<NormalizedTransaction> {
    match input.as_array() {
        Some(items) => normalize_iter(items.iter()),
        None => {
            trace!("Input is not an array, treating as empty");
            Vec::new()
        }
    }
}

fn normalize_iter<'a>(items: impl Iterator<Item = &'a Value>) -> Vec<NormalizedTransaction> {
    let mut normalized = Vec::new();
    let mut dropped = 0usize;

    for item in items {
        match normalize_value(item) {
            Some(tx) => normalized.push(tx),
            None => dropped += 1,
        }
    }

    // Stable: records on the same instant keep their input order.
    normalized.sort_by_key(|tx| tx.date);

    debug!(
        kept = normalized.len(),
        dropped, "Normalized transactions"
    );
    normalized
}

/// Normalize a single record. Returns `None` when no date field parses.
pub fn normalize_record(record: &RawTransaction) -> Option<NormalizedTransaction> {
    normalize_value(&record.0)
}

fn normalize_value(value: &Value) -> Option<NormalizedTransaction> {
    let obj = value.as_object()?;

    let date = DATE_FIELDS
        .iter()
        .filter_map(|field| obj.get(*field))
        .find_map(parse_date_value)?;

    // Numeric fields win over strings anywhere in the list.
    let candidates = || AMOUNT_FIELDS.iter().filter_map(|field| obj.get(*field));
    let amount = candidates()
        .find_map(numeric_amount)
        .or_else(|| candidates().find_map(coerce_amount))
        .unwrap_or(0.0);

    let category = CATEGORY_FIELDS
        .iter()
        .filter_map(|field| obj.get(*field))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(UNCATEGORIZED)
        .to_string();

    let extra: Map<String, Value> = obj
        .iter()
        .filter(|(key, _)| !CANONICAL_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Some(NormalizedTransaction {
        date,
        amount,
        category,
        extra,
    })
}

/// Coerce an amount to a finite number, falling back to `0.0`.
pub fn resolve_amount(value: &Value) -> f64 {
    numeric_amount(value)
        .or_else(|| coerce_amount(value))
        .unwrap_or(0.0)
}

fn numeric_amount(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

fn coerce_amount(value: &Value) -> Option<f64> {
    let cleaned = clean_amount(value.as_str()?)?;
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_currency_symbol(c: char) -> bool {
    matches!(c, '$' | '€' | '£' | '¥' | '₹' | '¢' | '₩' | '₽') || c.is_whitespace()
}

/// Strip currency symbols and thousands separators. When both `.` and `,`
/// appear, the last one is the decimal separator.
///
/// Returns `None` for anything that is not a plain amount: letters, stray
/// signs or other characters between the digits, or a second minus sign.
fn clean_amount(amount: &str) -> Option<String> {
    let amount = amount.trim();
    let first = amount.find(|c: char| c.is_ascii_digit() || c == '.' || c == ',')?;
    let last = amount.rfind(|c: char| c.is_ascii_digit())?;
    if last < first {
        return None;
    }
    let (prefix, body, suffix) = (&amount[..first], &amount[first..=last], &amount[last + 1..]);

    if !prefix.chars().all(|c| matches!(c, '-' | '+') || is_currency_symbol(c))
        || !suffix.chars().all(is_currency_symbol)
        || !body
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    {
        return None;
    }
    let negative = match prefix.matches('-').count() {
        0 => false,
        1 => true,
        _ => return None,
    };

    let last_dot = body.rfind('.');
    let last_comma = body.rfind(',');
    let decimal_at = match (last_dot, last_comma) {
        (Some(d), Some(c)) => Some(d.max(c)),
        // A separator that repeats only ever groups thousands.
        (Some(d), None) if body.matches('.').count() == 1 => Some(d),
        (None, Some(c)) if body.matches(',').count() == 1 => {
            // A lone comma followed by exactly three digits groups thousands.
            if body.len() - c - 1 == 3 {
                None
            } else {
                Some(c)
            }
        }
        (Some(_), None) | (None, Some(_)) => None,
        (None, None) => None,
    };

    let mut result = String::with_capacity(body.len() + 1);
    if negative {
        result.push('-');
    }
    for (i, c) in body.char_indices() {
        if c.is_ascii_digit() {
            result.push(c);
        } else if Some(i) == decimal_at {
            result.push('.');
        }
    }

    Some(result)
}
