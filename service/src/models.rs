use chrono::{DateTime, Utc};
use omci_parser::query::{MessageFilter, DEFAULT_SUGGESTION_LIMIT};
use omci_parser::{AnalysisResult, Direction, Message};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMeta {
    pub session_id: String,
    pub filename: String,
    pub parser: String,
    pub created_at: DateTime<Utc>,
    pub message_count: usize,
    pub error_count: usize,
    pub class_count: usize,
    pub link_count: usize,
    pub first_index: Option<u64>,
    pub last_index: Option<u64>,
}

impl SessionMeta {
    pub fn from_analysis(session_id: &str, filename: &str, parser: &str, analysis: &AnalysisResult) -> Self {
        Self {
            session_id: session_id.to_string(),
            filename: filename.to_string(),
            parser: parser.to_string(),
            created_at: Utc::now(),
            message_count: analysis.messages.len(),
            error_count: analysis.error_count(),
            class_count: analysis.stats.len(),
            link_count: analysis.service_model.len(),
            first_index: analysis.messages.first().map(|m| m.index),
            last_index: analysis.messages.last().map(|m| m.index),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub parser: String,
    pub message_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagesQuery {
    /// `olt`, `onu` or `both`
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub errors: bool,
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub cursor: usize,
}

fn default_limit() -> usize {
    1_000
}

impl Default for MessagesQuery {
    fn default() -> Self {
        Self {
            direction: None,
            errors: false,
            q: String::new(),
            limit: default_limit(),
            cursor: 0,
        }
    }
}

impl MessagesQuery {
    pub fn to_filter(&self) -> Result<MessageFilter, String> {
        let direction = match self.direction.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("") | Some("both") => None,
            Some("olt") => Some(Direction::OltToOnu),
            Some("onu") => Some(Direction::OnuToOlt),
            Some(other) => return Err(format!("Invalid direction: {}", other)),
        };

        Ok(MessageFilter {
            direction,
            only_errors: self.errors,
            search: self.q.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagesPage<'a> {
    pub total: usize,
    pub cursor: usize,
    pub next_cursor: Option<usize>,
    pub messages: Vec<&'a Message>,
}

impl<'a> MessagesPage<'a> {
    pub fn slice(matching: Vec<&'a Message>, cursor: usize, limit: usize) -> Self {
        let total = matching.len();
        let messages: Vec<&Message> = matching.into_iter().skip(cursor).take(limit).collect();
        let end = cursor.saturating_add(messages.len());

        Self {
            total,
            cursor,
            next_cursor: (end < total).then_some(end),
            messages,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_suggestion_limit")]
    pub limit: usize,
}

fn default_suggestion_limit() -> usize {
    DEFAULT_SUGGESTION_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_query_mapping() {
        let query = |d: Option<&str>| MessagesQuery {
            direction: d.map(String::from),
            ..Default::default()
        };

        assert_eq!(query(None).to_filter().unwrap().direction, None);
        assert_eq!(query(Some("both")).to_filter().unwrap().direction, None);
        assert_eq!(query(Some("OLT")).to_filter().unwrap().direction, Some(Direction::OltToOnu));
        assert_eq!(query(Some("onu")).to_filter().unwrap().direction, Some(Direction::OnuToOlt));
        assert!(query(Some("sideways")).to_filter().is_err());
    }

    #[test]
    fn test_meta_from_analysis() {
        let analysis = omci_parser::parse(
            "No. Time Source\n3 0.5 OMCI\nOMCI Protocol, ONU< Get Response - ONT-G\nResult: Failed to process\n\
             No. Time Source\n9 0.9 OMCI\nOMCI Protocol, OLT> Get - ONT-G\n",
        );
        let meta = SessionMeta::from_analysis("abc", "capture.txt", "omci-text", &analysis);

        assert_eq!(meta.message_count, 2);
        assert_eq!(meta.error_count, 1);
        assert_eq!(meta.class_count, 1);
        assert_eq!(meta.link_count, 0);
        assert_eq!(meta.first_index, Some(3));
        assert_eq!(meta.last_index, Some(9));
    }

    #[test]
    fn test_page_slicing() {
        let analysis = omci_parser::parse(
            "No. Time Source\n1 0.1 OMCI\nNo. Time Source\n2 0.2 OMCI\nNo. Time Source\n3 0.3 OMCI\n",
        );
        let all: Vec<&Message> = analysis.messages.iter().collect();

        let page = MessagesPage::slice(all.clone(), 0, 2);
        assert_eq!(page.total, 3);
        assert_eq!(page.messages.len(), 2);
        assert_eq!(page.next_cursor, Some(2));

        let last = MessagesPage::slice(all, 2, 2);
        assert_eq!(last.messages.len(), 1);
        assert_eq!(last.next_cursor, None);
    }
}
