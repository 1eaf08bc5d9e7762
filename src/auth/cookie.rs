use cookie::{Cookie, SameSite};

use super::token::TOKEN_EXPIRY_SECONDS;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "token";

/// Build the session cookie carrying `token`
///
/// httpOnly, `SameSite=Strict`, scoped to `/`, lives as long as the token.
/// `secure` should be on whenever the service sits behind TLS.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(TOKEN_EXPIRY_SECONDS as i64))
        .build()
}

/// Expired, empty session cookie
///
/// Added to the response unconditionally so the browser drops its copy even
/// when the request carried no session.
pub fn session_cookie_removal(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .build();
    cookie.make_removal();
    cookie
}
