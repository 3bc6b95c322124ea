use std::fmt;

/// Jenkins API token. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

/// User name and API token pair used for HTTP basic auth.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub token: Token,
}

impl Credentials {
    /// Returns credentials only when both halves are present.
    pub fn from_parts(user: Option<&str>, token: Option<&str>) -> Option<Self> {
        match (user, token) {
            (Some(user), Some(token)) if !user.is_empty() && !token.is_empty() => Some(Self {
                user: user.to_string(),
                token: Token::from(token),
            }),
            _ => None,
        }
    }
}
