// src/common/format.rs

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// Formata um valor monetário conforme o formato configurado nas settings.
///
/// "BRL" produz `R$ 1.234,56`, "USD" produz `$1,234.56`; qualquer outro
/// formato cai no agrupamento americano sem símbolo. Valores ausentes
/// viram "N/A" para que o placeholder no template nunca fique vazio.
pub fn format_currency(value: Option<Decimal>, currency_format: &str) -> String {
    let Some(value) = value else {
        return "N/A".to_string();
    };

    let raw = format!("{:.2}", value.round_dp(2));
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    match currency_format {
        "BRL" => format!("R$ {}{},{}", sign, group_thousands(int_part, '.'), frac_part),
        "USD" => format!("${}{}.{}", sign, group_thousands(int_part, ','), frac_part),
        _ => format!("{}{}.{}", sign, group_thousands(int_part, ','), frac_part),
    }
}

/// Formata uma data conforme o formato configurado ("DD/MM/YYYY" é o padrão).
pub fn format_date(date: Option<NaiveDateTime>, date_format: &str) -> String {
    let Some(date) = date else {
        return "N/A".to_string();
    };
    match date_format {
        "YYYY-MM-DD" => date.format("%Y-%m-%d").to_string(),
        _ => date.format("%d/%m/%Y").to_string(),
    }
}

// Agrupa os dígitos da parte inteira de três em três, da direita para a esquerda.
fn group_thousands(digits: &str, separator: char) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let mut out = String::with_capacity(chars.len() + chars.len() / 3);
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(*c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dec(value: i64, scale: u32) -> Decimal {
        Decimal::new(value, scale)
    }

    #[test]
    fn brl_uses_dot_for_thousands_and_comma_for_cents() {
        assert_eq!(format_currency(Some(dec(123456, 2)), "BRL"), "R$ 1.234,56");
        assert_eq!(format_currency(Some(dec(50, 0)), "BRL"), "R$ 50,00");
        assert_eq!(format_currency(Some(dec(1234567890, 2)), "BRL"), "R$ 12.345.678,90");
    }

    #[test]
    fn usd_uses_comma_for_thousands() {
        assert_eq!(format_currency(Some(dec(123456, 2)), "USD"), "$1,234.56");
    }

    #[test]
    fn unknown_format_falls_back_to_plain_grouping() {
        assert_eq!(format_currency(Some(dec(123456, 2)), "EUR"), "1,234.56");
    }

    #[test]
    fn negative_values_keep_the_sign_before_the_digits() {
        assert_eq!(format_currency(Some(dec(-123456, 2)), "BRL"), "R$ -1.234,56");
    }

    #[test]
    fn missing_value_renders_na() {
        assert_eq!(format_currency(None, "BRL"), "N/A");
        assert_eq!(format_date(None, "DD/MM/YYYY"), "N/A");
    }

    #[test]
    fn date_formats() {
        let dt = NaiveDate::from_ymd_opt(2025, 1, 10)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(format_date(Some(dt), "DD/MM/YYYY"), "10/01/2025");
        assert_eq!(format_date(Some(dt), "YYYY-MM-DD"), "2025-01-10");
        // formato desconhecido cai no padrão brasileiro
        assert_eq!(format_date(Some(dt), "MM-DD"), "10/01/2025");
    }
}
