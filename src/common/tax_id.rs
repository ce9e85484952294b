// src/common/tax_id.rs
//
// Validação estrutural de identificadores fiscais (DNI/NIF, NIE, CIF e VAT europeu).

use validator::ValidationError;

const DNI_LETTERS: &[u8; 23] = b"TRWAGMYFPDXBNJZSQVHLCKE";
const CIF_ORG_LETTERS: &str = "ABCDEFGHJNPQRSUVW";

// Prefixos do VIES (Grécia = EL, Irlanda do Norte = XI)
const EU_VAT_COUNTRIES: [&str; 28] = [
    "AT", "BE", "BG", "CY", "CZ", "DE", "DK", "EE", "EL", "ES", "FI", "FR", "HR", "HU",
    "IE", "IT", "LT", "LU", "LV", "MT", "NL", "PL", "PT", "RO", "SE", "SI", "SK", "XI",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxIdKind {
    Nif,
    Nie,
    Cif,
    EuVat,
}

/// Maiúsculas, sem espaços, hífens ou pontos.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '.')
        .flat_map(char::to_uppercase)
        .collect()
}

/// Classifica um identificador JÁ normalizado. `None` = formato inválido.
pub fn classify(value: &str) -> Option<TaxIdKind> {
    if !value.is_ascii() {
        return None;
    }

    if is_valid_nif(value) {
        return Some(TaxIdKind::Nif);
    }
    if is_valid_nie(value) {
        return Some(TaxIdKind::Nie);
    }
    if is_valid_cif(value) {
        return Some(TaxIdKind::Cif);
    }
    if is_valid_eu_vat(value) {
        return Some(TaxIdKind::EuVat);
    }
    None
}

// Usado pelo `#[validate(custom(...))]` do formulário
pub fn validate_tax_id(value: &str) -> Result<(), ValidationError> {
    if classify(&normalize(value)).is_some() {
        return Ok(());
    }
    let mut err = ValidationError::new("invalid_tax_id");
    err.message = Some("invalid_tax_id".into());
    Err(err)
}

fn dni_letter(number: u32) -> char {
    DNI_LETTERS[(number % 23) as usize] as char
}

// 8 dígitos + letra de controle (mod 23)
fn is_valid_nif(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 9 || !bytes[..8].iter().all(u8::is_ascii_digit) {
        return false;
    }
    match value[..8].parse::<u32>() {
        Ok(number) => dni_letter(number) == bytes[8] as char,
        Err(_) => false,
    }
}

// X/Y/Z + 7 dígitos + letra. O prefixo vale 0/1/2 no cálculo.
fn is_valid_nie(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 9 || !bytes[1..8].iter().all(u8::is_ascii_digit) {
        return false;
    }
    let prefix = match bytes[0] {
        b'X' => '0',
        b'Y' => '1',
        b'Z' => '2',
        _ => return false,
    };
    let digits = format!("{}{}", prefix, &value[1..8]);
    match digits.parse::<u32>() {
        Ok(number) => dni_letter(number) == bytes[8] as char,
        Err(_) => false,
    }
}

// Letra da entidade + 7 dígitos + controle.
// O tipo de controle (letra ou dígito) depende da entidade; o valor do
// controle não é conferido.
fn is_valid_cif(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 9 || !bytes[1..8].iter().all(u8::is_ascii_digit) {
        return false;
    }
    let org = bytes[0] as char;
    if !CIF_ORG_LETTERS.contains(org) {
        return false;
    }
    let control = bytes[8];
    match org {
        'P' | 'Q' | 'R' | 'S' | 'N' | 'W' => (b'A'..=b'J').contains(&control),
        'A' | 'B' | 'E' | 'H' => control.is_ascii_digit(),
        _ => control.is_ascii_digit() || (b'A'..=b'J').contains(&control),
    }
}

// Prefixo de país da UE + 2..=12 alfanuméricos. "ES" tem que ser um NIF/NIE/CIF válido.
fn is_valid_eu_vat(value: &str) -> bool {
    if value.len() < 4 {
        return false;
    }
    let (country, rest) = value.split_at(2);
    if !EU_VAT_COUNTRIES.contains(&country) {
        return false;
    }
    if country == "ES" {
        return is_valid_nif(rest) || is_valid_nie(rest) || is_valid_cif(rest);
    }
    (2..=12).contains(&rest.len())
        && rest.bytes().all(|b| b.is_ascii_alphanumeric())
        && rest.bytes().any(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_dni_with_correct_letter() {
        assert_eq!(classify("12345678Z"), Some(TaxIdKind::Nif));
        assert_eq!(classify("87654321X"), Some(TaxIdKind::Nif));
    }

    #[test]
    fn rejects_dni_with_wrong_letter() {
        assert_eq!(classify("12345678A"), None);
    }

    #[test]
    fn accepts_nie() {
        assert_eq!(classify("X1234567L"), Some(TaxIdKind::Nie));
        assert_eq!(classify("X1234567T"), None);
    }

    #[test]
    fn cif_control_kind_depends_on_entity() {
        assert_eq!(classify("B12345678"), Some(TaxIdKind::Cif));
        assert_eq!(classify("P1234567D"), Some(TaxIdKind::Cif));
        // Entidade P exige letra
        assert_eq!(classify("P12345678"), None);
        // Entidade B exige dígito
        assert_eq!(classify("B1234567A"), None);
    }

    #[test]
    fn eu_vat_numbers() {
        assert_eq!(classify("ESB12345678"), Some(TaxIdKind::EuVat));
        assert_eq!(classify("FR40303265045"), Some(TaxIdKind::EuVat));
        assert_eq!(classify("DE123456789"), Some(TaxIdKind::EuVat));
        assert_eq!(classify("EL094259216"), Some(TaxIdKind::EuVat));
        // Prefixo ES com documento espanhol inválido
        assert_eq!(classify("ES12345678A"), None);
    }

    #[test]
    fn eu_vat_prefix_must_be_a_member_state() {
        for value in ["ZZ12", "QQ00", "XY1234567", "AB1234567", "US123456789"] {
            assert_eq!(classify(value), None, "{value:?} deveria ser inválido");
        }
        assert!(validate_tax_id("ZZ12").is_err());
    }

    #[test]
    fn rejects_garbage() {
        for value in ["", "ABC", "B1234567", "123", "ÑB1234567", "ZZZZZZZZ"] {
            assert_eq!(classify(value), None, "{value:?} deveria ser inválido");
        }
    }

    #[test]
    fn normalization_strips_separators_and_uppercases() {
        assert_eq!(normalize(" 12.345.678-z "), "12345678Z");
        assert_eq!(normalize("es b-12345678"), "ESB12345678");
    }

    #[test]
    fn validator_hook_uses_normalized_value() {
        assert!(validate_tax_id("12345678-z").is_ok());
        let err = validate_tax_id("not a tax id").unwrap_err();
        assert_eq!(err.code, "invalid_tax_id");
    }
}
