//! FILENAME: core/view-engine/src/compare.rs
//! Natural ordering for display strings and typed ordering for cell values.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

use attrview::ValueData;

/// Natural comparison: digit runs compare by numeric value, everything else
/// compares case-insensitively. Exact byte order breaks remaining ties so the
/// ordering is total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();
    loop {
        let (l, r) = match (left.peek(), right.peek()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(&l), Some(&r)) => (l, r),
        };

        if l.is_ascii_digit() && r.is_ascii_digit() {
            let ord = cmp_digit_runs(&take_digits(&mut left), &take_digits(&mut right));
            if ord != Ordering::Equal {
                return ord;
            }
        } else {
            let ord = l.to_lowercase().cmp(r.to_lowercase());
            if ord != Ordering::Equal {
                return ord;
            }
            left.next();
            right.next();
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
        .then_with(|| a.len().cmp(&b.len()))
}

/// Orders two non-empty payloads of the same key. Numbers and dates compare
/// numerically, checkboxes unchecked-first, everything else naturally by
/// display text.
pub fn compare_values(a: &ValueData, b: &ValueData) -> Ordering {
    if let (Some(x), Some(y)) = (a.number(), b.number()) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    if let (Some(x), Some(y)) = (a.date_millis(), b.date_millis()) {
        return x.cmp(&y);
    }
    if let (ValueData::Checkbox { checked: x }, ValueData::Checkbox { checked: y }) = (a, b) {
        return x.cmp(y);
    }
    natural_cmp(&a.display_text(), &b.display_text())
}
