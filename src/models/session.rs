// SPDX-License-Identifier: MIT

//! Per-user session state.
//!
//! The session travels as a signed cookie; handlers receive it as an
//! immutable value and hand back an updated copy when they change
//! navigation state or tokens. Nothing here is shared mutable state.

use serde::{Deserialize, Serialize};

use crate::models::streams::MapBounds;
use crate::models::view::CalendarView;

/// Strava OAuth tokens held in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token expiry, Unix epoch seconds
    pub expires_at: i64,
}

/// All per-user state persisted between requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Strava athlete ID
    pub athlete_id: u64,
    pub firstname: String,
    pub profile_picture: Option<String>,
    pub tokens: SessionTokens,
    /// Currently selected calendar view
    pub view: CalendarView,
    /// Bounds of the last rendered activity map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_bounds: Option<MapBounds>,
}

impl Session {
    /// Fresh session after OAuth, starting at the current year.
    pub fn new(
        athlete_id: u64,
        firstname: String,
        profile_picture: Option<String>,
        tokens: SessionTokens,
    ) -> Self {
        Self {
            athlete_id,
            firstname,
            profile_picture,
            tokens,
            view: CalendarView::current_year(),
            map_bounds: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_serde_roundtrip() {
        let session = Session::new(
            42,
            "Ada".to_string(),
            Some("https://example.com/pic.jpg".to_string()),
            SessionTokens {
                access_token: "at".to_string(),
                refresh_token: "rt".to_string(),
                expires_at: 1_900_000_000,
            },
        );

        let json = serde_json::to_string(&session).unwrap();
        let decoded: Session = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.athlete_id, 42);
        assert_eq!(decoded.tokens, session.tokens);
        assert_eq!(decoded.view, session.view);
        assert!(decoded.map_bounds.is_none());
    }
}
