// src/common/validation.rs

/// Telefone válido: 8 a 15 dígitos, `+` inicial opcional.
/// Espaços e hífens são descartados antes da checagem.
pub fn is_valid_phone_number(phone: &str) -> bool {
    let cleaned: String = phone.chars().filter(|c| *c != ' ' && *c != '-').collect();
    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    (8..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

/// Checagem de forma de e-mail: `local@dominio.tld`, sem espaços.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_accepts_digits_with_optional_plus() {
        assert!(is_valid_phone_number("5511999998888"));
        assert!(is_valid_phone_number("+55 11 99999-8888"));
        assert!(is_valid_phone_number("11 3333-4444"));
    }

    #[test]
    fn phone_rejects_short_long_and_alpha() {
        assert!(!is_valid_phone_number(""));
        assert!(!is_valid_phone_number("1234567"));
        assert!(!is_valid_phone_number("1234567890123456"));
        assert!(!is_valid_phone_number("telefone"));
        assert!(!is_valid_phone_number("55(11)9999"));
    }

    #[test]
    fn email_shape_checks() {
        assert!(is_valid_email("maria@email.com"));
        assert!(is_valid_email("  maria@sub.email.com.br "));
        assert!(!is_valid_email("maria@email"));
        assert!(!is_valid_email("@email.com"));
        assert!(!is_valid_email("maria@.com"));
        assert!(!is_valid_email("maria silva@email.com"));
        assert!(!is_valid_email(""));
    }
}
