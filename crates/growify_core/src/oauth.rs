//! crates/growify_core/src/oauth.rs
//!
//! Builds the "continue with Google/GitHub" redirect URLs. The client ids are
//! placeholders, so following these URLs does not complete a real sign-in.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    GitHub,
}

impl OAuthProvider {
    fn authorize_endpoint(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "https://accounts.google.com/o/oauth2/v2/auth",
            OAuthProvider::GitHub => "https://github.com/login/oauth/authorize",
        }
    }

    fn scope(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "openid email profile",
            OAuthProvider::GitHub => "read:user user:email",
        }
    }
}

pub fn authorization_url(provider: OAuthProvider, client_id: &str, redirect_uri: &str) -> String {
    let mut url = format!(
        "{}?client_id={}&redirect_uri={}&scope={}",
        provider.authorize_endpoint(),
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(provider.scope()),
    );
    if provider == OAuthProvider::Google {
        url.push_str("&response_type=code");
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_url_is_encoded() {
        let url = authorization_url(
            OAuthProvider::Google,
            "YOUR_GOOGLE_CLIENT_ID",
            "http://localhost:3000/auth/callback",
        );
        assert_eq!(
            url,
            "https://accounts.google.com/o/oauth2/v2/auth?client_id=YOUR_GOOGLE_CLIENT_ID\
             &redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fcallback\
             &scope=openid%20email%20profile&response_type=code"
        );
    }

    #[test]
    fn github_url_has_no_response_type() {
        let url = authorization_url(OAuthProvider::GitHub, "abc", "app://cb");
        assert!(url.starts_with("https://github.com/login/oauth/authorize?client_id=abc"));
        assert!(url.contains("scope=read%3Auser%20user%3Aemail"));
        assert!(!url.contains("response_type"));
    }
}
