//! Signed bearer tokens.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::domain::{models::UserId, ActorContext, Role, TimesheetError, TimesheetResult};

/// Claims carried by every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The user id.
    pub sub: UserId,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn actor(&self) -> ActorContext {
        ActorContext::new(self.sub, self.role)
    }
}

/// A freshly signed token and its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: OffsetDateTime,
}

/// Creates and validates HS256 tokens.
#[derive(Clone)]
pub struct JwtIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtIssuer {
    /// Longest accepted token lifetime: one year.
    pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

    pub fn new(secret: &str, ttl_minutes: i64) -> TimesheetResult<Self> {
        if !(1..=Self::MAX_TTL_MINUTES).contains(&ttl_minutes) {
            return Err(TimesheetError::validation(format!(
                "token lifetime must be between 1 and {} minutes, got {ttl_minutes}",
                Self::MAX_TTL_MINUTES
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes),
        })
    }

    pub fn issue(&self, actor: &ActorContext) -> TimesheetResult<IssuedToken> {
        let now = OffsetDateTime::now_utc();
        let expires_at = now
            .checked_add(self.ttl)
            .ok_or_else(|| TimesheetError::internal("token expiry is out of range"))?;
        let claims = Claims {
            sub: actor.user_id,
            role: actor.role,
            iat: now.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "failed to sign token");
            TimesheetError::internal("failed to sign token")
        })?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Validate signature and expiry.
    pub fn verify(&self, token: &str) -> TimesheetResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected bearer token");
                TimesheetError::AuthenticationFailed
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies() {
        let issuer = JwtIssuer::new("test-secret", 60).unwrap();
        let actor = ActorContext::manager(7);

        let issued = issuer.issue(&actor).unwrap();
        let claims = issuer.verify(&issued.token).unwrap();

        assert_eq!(claims.actor(), actor);
        assert!(issued.expires_at > OffsetDateTime::now_utc());
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = JwtIssuer::new("one", 60)
            .unwrap()
            .issue(&ActorContext::employee(1))
            .unwrap()
            .token;

        assert_eq!(
            JwtIssuer::new("two", 60).unwrap().verify(&token).unwrap_err(),
            TimesheetError::AuthenticationFailed
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = JwtIssuer::new("test-secret", 60).unwrap();
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: 1.into(),
            role: Role::Employee,
            iat: (now - Duration::minutes(10)).unix_timestamp(),
            exp: (now - Duration::minutes(5)).unix_timestamp(),
        };
        let token = encode(&Header::default(), &claims, &issuer.encoding_key).unwrap();

        assert_eq!(
            issuer.verify(&token).unwrap_err(),
            TimesheetError::AuthenticationFailed
        );
    }

    #[test]
    fn lifetime_outside_range_is_rejected() {
        for ttl in [0, -5, JwtIssuer::MAX_TTL_MINUTES + 1, i64::MAX] {
            assert!(
                matches!(JwtIssuer::new("s", ttl), Err(TimesheetError::Validation(_))),
                "{ttl}"
            );
        }

        let longest = JwtIssuer::new("s", JwtIssuer::MAX_TTL_MINUTES).unwrap();
        assert!(longest.issue(&ActorContext::employee(1)).is_ok());
    }

    #[test]
    fn garbage_is_rejected() {
        let issuer = JwtIssuer::new("test-secret", 60).unwrap();
        assert!(issuer.verify("not.a.token").is_err());
    }
}
