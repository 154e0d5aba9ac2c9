use base64ct::{Base64, Encoding};
use rand::{rngs::OsRng, RngCore};
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::users::repo::{self, User};

/// Entropy of a bearer token before text encoding.
const TOKEN_BYTES: usize = 24;

/// A token this close to expiring is replaced instead of reused on login.
const REISSUE_MARGIN: Duration = Duration::seconds(60);

pub fn generate() -> String {
    let mut raw = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut raw);
    Base64::encode_string(&raw)
}

pub fn is_live(expiration: Option<OffsetDateTime>, now: OffsetDateTime) -> bool {
    expiration.map(|exp| exp > now).unwrap_or(false)
}

/// The stored token, if it will stay valid past the reissue margin.
/// Debounces rapid repeat logins.
fn reusable_token(user: &User, now: OffsetDateTime) -> Option<&str> {
    match (&user.token, user.token_expiration) {
        (Some(token), Some(exp)) if exp > now + REISSUE_MARGIN => Some(token),
        _ => None,
    }
}

/// Returns the user's current token, minting and persisting a fresh one
/// unless the stored token is still comfortably valid. At most one token
/// string is valid per user at any instant; a reissue overwrites the old one.
pub async fn issue(db: &PgPool, user: &User, ttl_seconds: i64) -> Result<String, sqlx::Error> {
    let now = OffsetDateTime::now_utc();
    if let Some(token) = reusable_token(user, now) {
        debug!(user_id = %user.user_id, "reusing live token");
        return Ok(token.to_string());
    }

    let token = generate();
    let expiration = now + Duration::seconds(ttl_seconds);
    sqlx::query("UPDATE users SET token = $2, token_expiration = $3 WHERE user_id = $1")
        .bind(user.user_id)
        .bind(&token)
        .bind(expiration)
        .execute(db)
        .await?;
    debug!(user_id = %user.user_id, "issued new token");
    Ok(token)
}

/// Expires the token immediately; the string itself stays in place and
/// simply fails the expiration check from now on.
pub async fn revoke(db: &PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    let expired_at = OffsetDateTime::now_utc() - Duration::seconds(1);
    sqlx::query("UPDATE users SET token_expiration = $2 WHERE user_id = $1")
        .bind(user_id)
        .bind(expired_at)
        .execute(db)
        .await?;
    Ok(())
}

/// Exact-match lookup plus expiration check. A pure read; never renews.
pub async fn resolve(db: &PgPool, token: &str) -> Result<Option<User>, sqlx::Error> {
    if token.is_empty() {
        return Ok(None);
    }
    let user = repo::find_by_token(db, token).await?;
    let now = OffsetDateTime::now_utc();
    Ok(user.filter(|u| is_live(u.token_expiration, now)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_token(token: Option<&str>, expiration: Option<OffsetDateTime>) -> User {
        User {
            user_id: Uuid::new_v4(),
            username: "sjobs".into(),
            email: None,
            password_hash: "hash".into(),
            first_name: None,
            last_name: None,
            birth_date: None,
            token: token.map(str::to_string),
            token_expiration: expiration,
        }
    }

    #[test]
    fn generated_tokens_are_distinct_and_opaque() {
        let a = generate();
        let b = generate();
        assert_ne!(a, b);
        // 24 bytes of entropy encode to 32 base64 characters.
        assert_eq!(a.len(), 32);
        assert!(Base64::decode_vec(&a).is_ok());
    }

    #[test]
    fn expired_or_missing_expiration_is_not_live() {
        let now = OffsetDateTime::now_utc();
        assert!(!is_live(None, now));
        assert!(!is_live(Some(now - Duration::seconds(1)), now));
        assert!(is_live(Some(now + Duration::seconds(1)), now));
    }

    #[test]
    fn token_reused_only_beyond_the_margin() {
        let now = OffsetDateTime::now_utc();

        let fresh = user_with_token(Some("tok"), Some(now + Duration::seconds(3600)));
        assert_eq!(reusable_token(&fresh, now), Some("tok"));

        let nearly_expired = user_with_token(Some("tok"), Some(now + Duration::seconds(30)));
        assert_eq!(reusable_token(&nearly_expired, now), None);

        let revoked = user_with_token(Some("tok"), Some(now - Duration::seconds(1)));
        assert_eq!(reusable_token(&revoked, now), None);

        let never_logged_in = user_with_token(None, None);
        assert_eq!(reusable_token(&never_logged_in, now), None);
    }
}
