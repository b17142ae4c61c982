use std::{collections::HashMap, convert::Infallible};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderValue, header, request::Parts},
    response::{IntoResponseParts, ResponseParts},
};
use cookie::{Cookie, SameSite, time::Duration};

use crate::{config::AppConfig, session::SessionStorage};

/// CookieStorage
///
/// Session storage backed by the browser's cookie jar. Reads come from the request's
/// `Cookie` headers; writes are queued and sent back as `Set-Cookie` headers when the
/// storage is returned as part of a response.
#[derive(Debug, Clone)]
pub struct CookieStorage {
    values: HashMap<String, String>,
    pending: Vec<Cookie<'static>>,
    max_age_secs: u64,
    secure: bool,
}

impl CookieStorage {
    pub fn new(max_age_secs: u64, secure: bool) -> Self {
        Self {
            values: HashMap::new(),
            pending: Vec::new(),
            max_age_secs,
            secure,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.session_max_age_secs, config.secure_cookies)
    }

    /// Loads every cookie from the given `Cookie` header values, percent-decoding them.
    /// Later duplicates win; pairs that fail to parse are skipped.
    pub fn with_cookie_headers<'a>(mut self, headers: impl IntoIterator<Item = &'a str>) -> Self {
        for header in headers {
            for cookie in Cookie::split_parse_encoded(header).flatten() {
                self.values
                    .insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }
        self
    }

    /// The cookies queued for `Set-Cookie` so far.
    pub fn pending(&self) -> &[Cookie<'static>] {
        &self.pending
    }

    fn session_cookie(&self, key: &str, value: &str) -> Cookie<'static> {
        let max_age = i64::try_from(self.max_age_secs).unwrap_or(i64::MAX);
        Cookie::build((key.to_string(), value.to_string()))
            .path("/")
            .max_age(Duration::seconds(max_age))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build()
    }
}

impl SessionStorage for CookieStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        let cookie = self.session_cookie(key, value);
        self.pending.push(cookie);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
        let mut cookie = self.session_cookie(key, "");
        cookie.make_removal();
        self.pending.push(cookie);
    }
}

impl<S> FromRequestParts<S> for CookieStorage
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        let headers = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok());

        Ok(CookieStorage::from_config(&config).with_cookie_headers(headers))
    }
}

impl IntoResponseParts for CookieStorage {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        for cookie in self.pending {
            match HeaderValue::from_str(&cookie.encoded().to_string()) {
                Ok(value) => {
                    res.headers_mut().append(header::SET_COOKIE, value);
                }
                Err(e) => tracing::warn!("dropping unencodable cookie {}: {}", cookie.name(), e),
            }
        }
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ROLE_KEY, TOKEN_KEY};

    #[test]
    fn reads_pairs_from_multiple_headers() {
        let storage = CookieStorage::new(60, false)
            .with_cookie_headers(["token=abc; theme=dark", "user_type=vendor"]);

        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("abc"));
        assert_eq!(storage.get(ROLE_KEY).as_deref(), Some("vendor"));
        assert_eq!(storage.get("missing"), None);
    }

    #[test]
    fn set_queues_an_http_only_session_cookie() {
        let mut storage = CookieStorage::new(86400, true);
        storage.set(TOKEN_KEY, "abc");

        let cookie = &storage.pending()[0];
        assert_eq!(cookie.name(), TOKEN_KEY);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(86400)));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn remove_queues_an_expired_cookie() {
        let mut storage = CookieStorage::new(86400, false)
            .with_cookie_headers(["user_type=vendor"]);
        storage.remove(ROLE_KEY);

        assert_eq!(storage.get(ROLE_KEY), None);
        let cookie = &storage.pending()[0];
        assert_eq!(cookie.name(), ROLE_KEY);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_ne!(cookie.secure(), Some(true));
    }

    #[test]
    fn unsafe_characters_survive_a_browser_round_trip() {
        let mut storage = CookieStorage::new(60, false);
        storage.set(ROLE_KEY, "odd; value, 100%");

        let header = storage.pending()[0].encoded().to_string();
        let sent = header.split(';').next().unwrap().to_string();
        let echoed = CookieStorage::new(60, false).with_cookie_headers([sent.as_str()]);
        assert_eq!(echoed.get(ROLE_KEY).as_deref(), Some("odd; value, 100%"));
    }
}
