//! Bearer-token authentication. Tokens are HS256 JWTs; the claims carry the
//! user id, the role and, for store administrators, the store id.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::caller::{CallerContext, Role};
use crate::domain::errors::DomainError;
use crate::errors::AppError;

const NAME_IDENTIFIER_URI: &str =
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier";
const ROLE_URI: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role";

#[derive(Clone)]
pub struct JwtSettings {
    key: DecodingKey,
    validation: Validation,
}

impl JwtSettings {
    pub fn new(secret: &str, issuer: Option<&str>, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        match audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: Option<String>,
    nameid: Option<String>,
    #[serde(rename = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier")]
    name_identifier: Option<String>,
    role: Option<String>,
    #[serde(rename = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role")]
    role_uri: Option<String>,
    #[serde(rename = "StoreId")]
    store_id: Option<String>,
}

fn unauthorized(msg: impl Into<String>) -> DomainError {
    DomainError::Unauthorized(msg.into())
}

pub fn decode_caller(token: &str, settings: &JwtSettings) -> Result<CallerContext, DomainError> {
    let claims = decode::<Claims>(token, &settings.key, &settings.validation)
        .map_err(|e| unauthorized(e.to_string()))?
        .claims;

    let user_id = claims
        .sub
        .or(claims.nameid)
        .or(claims.name_identifier)
        .ok_or_else(|| unauthorized(format!("token has no user id (sub, nameid or {NAME_IDENTIFIER_URI})")))?;
    let user_id = Uuid::parse_str(&user_id).map_err(|_| unauthorized("user id is not a UUID"))?;

    let role: Role = claims
        .role
        .or(claims.role_uri)
        .ok_or_else(|| unauthorized(format!("token has no role (role or {ROLE_URI})")))?
        .parse()?;

    let store_id = match claims.store_id.filter(|s| !s.is_empty()) {
        Some(raw) => Some(Uuid::parse_str(&raw).map_err(|_| unauthorized("StoreId is not a UUID"))?),
        None => None,
    };

    Ok(CallerContext::new(user_id, role, store_id))
}

fn caller_from_request(req: &HttpRequest) -> Result<CallerContext, AppError> {
    let settings = req
        .app_data::<web::Data<JwtSettings>>()
        .ok_or_else(|| AppError::Internal("JWT settings are not registered".to_string()))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| unauthorized("missing bearer token"))?;

    decode_caller(token, settings).map_err(|e| {
        log::warn!("Rejected token for {} {}: {}", req.method(), req.path(), e);
        AppError::from(e)
    })
}

impl FromRequest for CallerContext {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(caller_from_request(req))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::{json, Value};

    use super::*;

    const SECRET: &str = "unit-test-secret";

    fn token(claims: Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn exp() -> i64 {
        chrono::Utc::now().timestamp() + 600
    }

    fn settings() -> JwtSettings {
        JwtSettings::new(SECRET, None, None)
    }

    #[test]
    fn decodes_short_claim_names() {
        let user_id = Uuid::new_v4();
        let store_id = Uuid::new_v4();
        let caller = decode_caller(
            &token(json!({
                "sub": user_id.to_string(),
                "role": "StoreAdmin",
                "StoreId": store_id.to_string(),
                "exp": exp(),
            })),
            &settings(),
        )
        .unwrap();

        assert_eq!(caller, CallerContext::new(user_id, Role::StoreAdmin, Some(store_id)));
    }

    #[test]
    fn decodes_long_claim_uris() {
        let user_id = Uuid::new_v4();
        let caller = decode_caller(
            &token(json!({
                NAME_IDENTIFIER_URI: user_id.to_string(),
                ROLE_URI: "User",
                "exp": exp(),
            })),
            &settings(),
        )
        .unwrap();

        assert_eq!(caller.user_id, user_id);
        assert_eq!(caller.role, Role::User);
        assert_eq!(caller.store_id, None);
    }

    #[test]
    fn rejects_wrong_secret_and_expired_tokens() {
        let claims = json!({ "sub": Uuid::new_v4().to_string(), "role": "User", "exp": exp() });
        let other = JwtSettings::new("another-secret", None, None);
        assert!(matches!(
            decode_caller(&token(claims), &other),
            Err(DomainError::Unauthorized(_))
        ));

        let expired = json!({
            "sub": Uuid::new_v4().to_string(),
            "role": "User",
            "exp": chrono::Utc::now().timestamp() - 3600,
        });
        assert!(decode_caller(&token(expired), &settings()).is_err());
    }

    #[test]
    fn rejects_unknown_role_and_missing_user() {
        let unknown = json!({ "sub": Uuid::new_v4().to_string(), "role": "Janitor", "exp": exp() });
        assert!(matches!(
            decode_caller(&token(unknown), &settings()),
            Err(DomainError::Unauthorized(_))
        ));

        let anonymous = json!({ "role": "User", "exp": exp() });
        assert!(matches!(
            decode_caller(&token(anonymous), &settings()),
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[test]
    fn enforces_configured_audience() {
        let settings = JwtSettings::new(SECRET, Some("retail-auth"), Some("retail-api"));
        let good = json!({
            "sub": Uuid::new_v4().to_string(),
            "role": "User",
            "iss": "retail-auth",
            "aud": "retail-api",
            "exp": exp(),
        });
        assert!(decode_caller(&token(good), &settings).is_ok());

        let wrong = json!({
            "sub": Uuid::new_v4().to_string(),
            "role": "User",
            "iss": "retail-auth",
            "aud": "someone-else",
            "exp": exp(),
        });
        assert!(decode_caller(&token(wrong), &settings).is_err());
    }

    #[actix_web::test]
    async fn extractor_reads_bearer_header() {
        let user_id = Uuid::new_v4();
        let bearer = token(json!({ "sub": user_id.to_string(), "role": "SuperAdmin", "exp": exp() }));
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, format!("Bearer {bearer}")))
            .app_data(web::Data::new(settings()))
            .to_http_request();

        let caller = CallerContext::extract(&req).await.unwrap();
        assert_eq!(caller.user_id, user_id);
        assert_eq!(caller.role, Role::SuperAdmin);
    }

    #[actix_web::test]
    async fn extractor_requires_header() {
        let req = TestRequest::default()
            .app_data(web::Data::new(settings()))
            .to_http_request();

        let err = CallerContext::extract(&req).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
