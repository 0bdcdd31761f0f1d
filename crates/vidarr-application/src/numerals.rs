// SPDX-License-Identifier: GPL-3.0-or-later

//! Numeral token conversion for season/episode extraction. Release subtitles
//! mix ASCII digits with Chinese numerals ("第三季", "全十二集"), so every
//! captured token goes through [`parse_numeral`] before range handling.

/// Convert a numeric token to an integer. Accepts ASCII digits and Chinese
/// numerals up to the thousands (零一二三四五六七八九十百千, plus 两).
/// Returns `None` for anything else; the callers treat that as a false
/// positive rather than an error.
pub fn parse_numeral(token: &str) -> Option<u32> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if token.chars().all(|c| c.is_ascii_digit()) {
        return token.parse().ok();
    }

    let mut total: u32 = 0;
    let mut current: u32 = 0;
    let mut seen_any = false;
    for c in token.chars() {
        match c {
            '零' => {}
            '一' | '二' | '三' | '四' | '五' | '六' | '七' | '八' | '九' | '两' => {
                current = digit_value(c)?;
                seen_any = true;
            }
            '0'..='9' => {
                current = current
                    .checked_mul(10)?
                    .checked_add(c.to_digit(10)?)?;
                seen_any = true;
            }
            '十' => {
                let multiplier = if current == 0 { 1 } else { current };
                total = total.checked_add(multiplier.checked_mul(10)?)?;
                current = 0;
                seen_any = true;
            }
            '百' => {
                let multiplier = if current == 0 { 1 } else { current };
                total = total.checked_add(multiplier.checked_mul(100)?)?;
                current = 0;
                seen_any = true;
            }
            '千' => {
                let multiplier = if current == 0 { 1 } else { current };
                total = total.checked_add(multiplier.checked_mul(1000)?)?;
                current = 0;
                seen_any = true;
            }
            _ => return None,
        }
    }
    if !seen_any {
        return None;
    }
    total.checked_add(current)
}

fn digit_value(c: char) -> Option<u32> {
    Some(match c {
        '一' => 1,
        '二' | '两' => 2,
        '三' => 3,
        '四' => 4,
        '五' => 5,
        '六' => 6,
        '七' => 7,
        '八' => 8,
        '九' => 9,
        _ => return None,
    })
}
