//! Utilidades JWT
//!
//! El proveedor de identidad emite un access token JWT; aquí solo se
//! decodifica para saber quién es el usuario (`sub`) y hasta cuándo vale
//! (`exp`). La firma se verifica cuando hay secreto configurado.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::utils::errors::AppError;

/// Claims del access token de sesión
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // user_id
    pub exp: i64,    // expiration timestamp
    #[serde(default)]
    pub email: Option<String>,
}

/// Decodificar el token; verifica la firma solo si hay secreto
pub fn decode_session_token(token: &str, secret: Option<&str>) -> Result<SessionClaims, AppError> {
    validate_token_format(token)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_aud = false;

    let key = match secret {
        Some(secret) => DecodingKey::from_secret(secret.as_bytes()),
        None => {
            validation.insecure_disable_signature_validation();
            DecodingKey::from_secret(&[])
        }
    };

    let token_data = decode::<SessionClaims>(token, &key, &validation)
        .map_err(|e| AppError::Jwt(format!("Token inválido: {}", e)))?;

    Ok(token_data.claims)
}

/// Verificar si un token ha expirado
pub fn is_token_expired(claims: &SessionClaims) -> bool {
    claims.exp <= chrono::Utc::now().timestamp()
}

/// Obtener tiempo restante de un token, en segundos
pub fn get_token_remaining_time(claims: &SessionClaims) -> i64 {
    (claims.exp - chrono::Utc::now().timestamp()).max(0)
}

/// Validar formato de token (básico)
pub fn validate_token_format(token: &str) -> Result<(), AppError> {
    if token.is_empty() {
        return Err(AppError::Jwt("Token no puede estar vacío".to_string()));
    }

    if token.split('.').count() != 3 {
        return Err(AppError::Jwt("Token debe tener 3 partes separadas por puntos".to_string()));
    }

    Ok(())
}

/// Quitar el prefijo "Bearer " si viene incluido
pub fn strip_bearer_prefix(raw: &str) -> &str {
    raw.trim().strip_prefix("Bearer ").unwrap_or(raw.trim()).trim()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    pub(crate) fn make_token(sub: &str, exp_offset_secs: i64, secret: &str) -> String {
        let claims = SessionClaims {
            sub: sub.to_string(),
            exp: chrono::Utc::now().timestamp() + exp_offset_secs,
            email: None,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_decode_with_secret() {
        let token = make_token("user-1", 3600, "s3cret");
        let claims = decode_session_token(&token, Some("s3cret")).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert!(!is_token_expired(&claims));
        assert!(get_token_remaining_time(&claims) > 3500);
    }

    #[test]
    fn test_decode_with_wrong_secret_fails() {
        let token = make_token("user-1", 3600, "s3cret");
        assert!(decode_session_token(&token, Some("other")).is_err());
    }

    #[test]
    fn test_decode_without_secret_reads_claims() {
        let token = make_token("user-2", -10, "whatever");
        let claims = decode_session_token(&token, None).unwrap();
        assert_eq!(claims.sub, "user-2");
        assert!(is_token_expired(&claims));
        assert_eq!(get_token_remaining_time(&claims), 0);
    }

    #[test]
    fn test_validate_token_format() {
        assert!(validate_token_format("").is_err());
        assert!(validate_token_format("abc").is_err());
        assert!(validate_token_format("a.b.c").is_ok());
    }

    #[test]
    fn test_strip_bearer_prefix() {
        assert_eq!(strip_bearer_prefix("Bearer abc.def.ghi"), "abc.def.ghi");
        assert_eq!(strip_bearer_prefix(" abc.def.ghi "), "abc.def.ghi");
    }
}
