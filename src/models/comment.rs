use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored comment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: String,
    pub text: String,
    /// Author display name
    pub user: String,
    pub user_id: String,
    pub movie_id: Option<String>,
    /// Assigned by the store; `None` until the server timestamp resolves
    pub created_at: Option<DateTime<Utc>>,
}

/// A comment about to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub text: String,
    pub user: String,
    pub user_id: String,
    pub movie_id: Option<String>,
}

/// Orders comments newest first. Unstamped comments count as newest.
pub fn sort_newest_first(comments: &mut [Comment]) {
    comments.sort_by(|a, b| match (&a.created_at, &b.created_at) {
        (None, None) => std::cmp::Ordering::Equal,
        (None, Some(_)) => std::cmp::Ordering::Less,
        (Some(_), None) => std::cmp::Ordering::Greater,
        (Some(a), Some(b)) => b.cmp(a),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn comment(id: &str, created_at: Option<DateTime<Utc>>) -> Comment {
        Comment {
            id: id.to_string(),
            text: "text".to_string(),
            user: "user".to_string(),
            user_id: "uid".to_string(),
            movie_id: None,
            created_at,
        }
    }

    #[test]
    fn test_sort_newest_first() {
        let older = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut comments = vec![
            comment("older", Some(older)),
            comment("newer", Some(newer)),
            comment("pending", None),
        ];

        sort_newest_first(&mut comments);

        let ids: Vec<_> = comments.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["pending", "newer", "older"]);
    }
}
