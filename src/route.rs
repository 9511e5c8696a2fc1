use std::fmt;

/// Screen addresses. Paths mirror the API client's web routes so a route can
/// be passed on the command line (`/results`, `/match/123`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Fixtures,
    Results,
    MatchDetail { match_id: String },
}

impl Route {
    /// Unknown or malformed paths fall back to the fixtures list.
    pub fn parse(raw: &str) -> Self {
        let path = raw
            .trim()
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["results"] => Route::Results,
            ["match", id] => Route::MatchDetail {
                match_id: (*id).to_string(),
            },
            _ => Route::Fixtures,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Fixtures => "/".to_string(),
            Route::Results => "/results".to_string(),
            Route::MatchDetail { match_id } => format!("/match/{match_id}"),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Route::Fixtures | Route::Results)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
