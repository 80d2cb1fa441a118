use std::fmt;

use serde::{Deserialize, Serialize};

/// 队列任务，序列化为 `{"type": "fetch", "index": 2}` / `{"type": "count", "nid": 7}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Job {
    Fetch { index: u64 },
    Count { nid: i64 },
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::Fetch { index } => write!(f, "fetch{{index={}}}", index),
            Job::Count { nid } => write!(f, "count{{nid={}}}", nid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_wire_format() {
        let json = serde_json::to_string(&Job::Fetch { index: 2 }).unwrap();
        assert_eq!(json, r#"{"type":"fetch","index":2}"#);

        let job: Job = serde_json::from_str(r#"{"type":"count","nid":7}"#).unwrap();
        assert_eq!(job, Job::Count { nid: 7 });
    }

    #[test]
    fn test_job_display() {
        assert_eq!(Job::Fetch { index: 2 }.to_string(), "fetch{index=2}");
        assert_eq!(Job::Count { nid: 15 }.to_string(), "count{nid=15}");
    }

    #[test]
    fn test_unknown_job_type_rejected() {
        assert!(serde_json::from_str::<Job>(r#"{"type":"purge"}"#).is_err());
    }
}
