//! Comment types.

use serde::{Deserialize, Serialize};

/// A stored comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "ID")]
    pub id: i64,
    /// Item the comment belongs to.
    #[serde(rename = "newsID")]
    pub news_id: i64,
    /// Comment this one replies to, if any.
    #[serde(rename = "parentID", skip_serializing_if = "Option::is_none", default)]
    pub parent_id: Option<i64>,
    pub content: String,
    /// Creation time in seconds since the Unix epoch.
    #[serde(rename = "pubTime")]
    pub pub_time: i64,
}

/// A comment to be created.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub news_id: i64,
    pub parent_id: Option<i64>,
    pub content: String,
}

impl NewComment {
    pub fn new(news_id: i64, content: impl Into<String>) -> Self {
        Self {
            news_id,
            parent_id: None,
            content: content.into(),
        }
    }

    /// Make this comment a reply.
    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_json_names() {
        let comment = Comment {
            id: 1,
            news_id: 2,
            parent_id: None,
            content: "hi".to_string(),
            pub_time: 10,
        };
        let json = serde_json::to_value(&comment).unwrap();
        assert_eq!(json["ID"], 1);
        assert_eq!(json["newsID"], 2);
        assert_eq!(json["content"], "hi");
        assert_eq!(json["pubTime"], 10);
        assert!(json.get("parentID").is_none());

        let reply = Comment {
            parent_id: Some(1),
            ..comment
        };
        assert_eq!(serde_json::to_value(&reply).unwrap()["parentID"], 1);
    }
}
