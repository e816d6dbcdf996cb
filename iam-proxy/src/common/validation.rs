use regex::Regex;
use std::sync::OnceLock;

/// Longest user name IAM accepts
pub const MAX_USERNAME_LENGTH: usize = 64;

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9+=,.@_-]+$").expect("username pattern is a valid regex")
    })
}

/// Check a name against IAM's user name rules: 1 to 64 characters drawn from
/// ASCII letters, digits and `+=,.@_-`.
pub fn is_valid_username(username: &str) -> bool {
    (1..=MAX_USERNAME_LENGTH).contains(&username.len()) && username_pattern().is_match(username)
}
