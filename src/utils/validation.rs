//! Utilidades de validación
//!
//! Funciones helper usadas por los `#[validate(custom = ...)]` de los
//! borradores de carreras y gastos, y saneamiento de entradas numéricas.

use rust_decimal::Decimal;
use std::str::FromStr;
use validator::ValidationError;

/// Validar que un decimal no sea negativo
pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un string no esté vacío (ignorando espacios)
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_blank");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Convierte texto libre a decimal no negativo; lo inválido vale 0.
///
/// Acepta coma como separador decimal ("12,50").
pub fn sanitize_decimal(input: &str) -> Decimal {
    let normalized = input.trim().replace(',', ".");
    match Decimal::from_str(&normalized) {
        Ok(value) if value >= Decimal::ZERO => value,
        _ => Decimal::ZERO,
    }
}

/// Convierte texto libre a minutos enteros no negativos; lo inválido vale 0
pub fn sanitize_minutes(input: &str) -> u32 {
    input.trim().parse::<u32>().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative(&Decimal::new(5, 0)).is_ok());
        assert!(validate_non_negative(&Decimal::ZERO).is_ok());
        assert!(validate_non_negative(&Decimal::new(-1, 2)).is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Gasolina").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }

    #[test]
    fn test_sanitize_decimal() {
        assert_eq!(sanitize_decimal("12,50"), Decimal::new(1250, 2));
        assert_eq!(sanitize_decimal(" 7.3 "), Decimal::new(73, 1));
        assert_eq!(sanitize_decimal("abc"), Decimal::ZERO);
        assert_eq!(sanitize_decimal("-4"), Decimal::ZERO);
        assert_eq!(sanitize_decimal(""), Decimal::ZERO);
    }

    #[test]
    fn test_sanitize_minutes() {
        assert_eq!(sanitize_minutes("40"), 40);
        assert_eq!(sanitize_minutes("-3"), 0);
        assert_eq!(sanitize_minutes("4.5"), 0);
    }
}
