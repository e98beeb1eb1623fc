use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A member with a prepaid credit balance in integer minor currency units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub nick_name: Option<String>,
    pub section: String,
    pub credit: i64,
    pub is_membership: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn with_credit(&self, credit: i64, now: DateTime<Utc>) -> User {
        User {
            credit,
            updated_at: now,
            ..self.clone()
        }
    }

    /// Name shown on the order: the nickname when one exists, otherwise
    /// "first last", normalized either way.
    pub fn display_name(&self) -> String {
        match &self.nick_name {
            Some(nick) => capitalize(nick),
            None => capitalize(&format!(
                "{} {}",
                self.first_name.trim().to_lowercase(),
                self.last_name.trim().to_lowercase()
            )),
        }
    }
}

/// Trim, lowercase, then uppercase the first letter. Applied to every
/// free-text name before it is stored or displayed.
pub fn capitalize(s: &str) -> String {
    let lowered = s.trim().to_lowercase();
    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => lowered,
    }
}
