use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Answer {
    #[default]
    Undecided,
    Yes,
    No,
}

impl Answer {
    pub fn as_wire(self) -> Option<&'static str> {
        match self {
            Answer::Undecided => None,
            Answer::Yes => Some("yes"),
            Answer::No => Some("no"),
        }
    }

    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            Some("yes") => Answer::Yes,
            Some("no") => Answer::No,
            _ => Answer::Undecided,
        }
    }
}

/// Per-session journey progress. Mirrored by the backend; the backend copy
/// is the source of truth across launches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ProgressRecord {
    pub quiz_done: bool,
    pub memory_done: bool,
    pub answer: Answer,
}

impl ProgressRecord {
    /// Marks the quiz finished. Returns true only on the transition, so the
    /// caller knows whether a save is due. The flag never goes back to false.
    pub fn complete_quiz(&mut self) -> bool {
        if self.quiz_done {
            return false;
        }
        self.quiz_done = true;
        true
    }

    /// Marks the memory game finished. Same transition contract as
    /// [`complete_quiz`](Self::complete_quiz).
    pub fn complete_memory(&mut self) -> bool {
        if self.memory_done {
            return false;
        }
        self.memory_done = true;
        true
    }

    /// Records the proposal answer. Only the first Yes/No sticks; after that
    /// the answer is terminal for the session and further calls are ignored.
    pub fn record_answer(&mut self, answer: Answer) -> bool {
        if self.answer != Answer::Undecided || answer == Answer::Undecided {
            return false;
        }
        self.answer = answer;
        true
    }
}

#[derive(Serialize)]
pub struct SessionRequest<'a> {
    #[serde(rename = "sessionId")]
    pub session_id: &'a str,
}

#[derive(Deserialize)]
pub struct SessionResponse {
    #[serde(default)]
    pub game1_completed: u8,
    #[serde(default)]
    pub game2_completed: u8,
    #[serde(default)]
    pub answer: Option<String>,
}

impl SessionResponse {
    pub fn into_record(self) -> ProgressRecord {
        ProgressRecord {
            quiz_done: self.game1_completed == 1,
            memory_done: self.game2_completed == 1,
            answer: Answer::from_wire(self.answer.as_deref()),
        }
    }
}

#[derive(Serialize)]
pub struct UpdateRequest<'a> {
    #[serde(rename = "sessionId")]
    pub session_id: &'a str,
    pub game1: bool,
    pub game2: bool,
    pub answer: Option<&'static str>,
}

impl<'a> UpdateRequest<'a> {
    pub fn new(session_id: &'a str, record: &ProgressRecord) -> Self {
        UpdateRequest {
            session_id,
            game1: record.quiz_done,
            game2: record.memory_done,
            answer: record.answer.as_wire(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_record_is_all_defaults() {
        let record = ProgressRecord::default();
        assert!(!record.quiz_done);
        assert!(!record.memory_done);
        assert_eq!(record.answer, Answer::Undecided);
    }

    #[test]
    fn quiz_completion_reports_transition_once() {
        let mut record = ProgressRecord::default();
        assert!(record.complete_quiz());
        assert!(!record.complete_quiz());
        assert!(record.quiz_done);
    }

    #[test]
    fn memory_completion_reports_transition_once() {
        let mut record = ProgressRecord::default();
        assert!(record.complete_memory());
        assert!(!record.complete_memory());
        assert!(record.memory_done);
    }

    #[test]
    fn answer_is_terminal_after_first_decision() {
        let mut record = ProgressRecord::default();
        assert!(record.record_answer(Answer::No));
        assert!(!record.record_answer(Answer::Yes));
        assert_eq!(record.answer, Answer::No);
    }

    #[test]
    fn recording_undecided_is_ignored() {
        let mut record = ProgressRecord::default();
        assert!(!record.record_answer(Answer::Undecided));
        assert_eq!(record.answer, Answer::Undecided);
    }

    #[test]
    fn session_response_maps_wire_fields() {
        let raw = r#"{"game1_completed":1,"game2_completed":0,"answer":null}"#;
        let response: SessionResponse = serde_json::from_str(raw).unwrap();
        let record = response.into_record();
        assert!(record.quiz_done);
        assert!(!record.memory_done);
        assert_eq!(record.answer, Answer::Undecided);
    }

    #[test]
    fn session_response_tolerates_missing_fields() {
        let response: SessionResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.into_record(), ProgressRecord::default());
    }

    #[test]
    fn session_response_maps_terminal_answer() {
        let raw = r#"{"game1_completed":1,"game2_completed":1,"answer":"yes"}"#;
        let response: SessionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.into_record().answer, Answer::Yes);
    }

    #[test]
    fn update_request_serializes_backend_shape() {
        let mut record = ProgressRecord::default();
        record.complete_quiz();
        record.record_answer(Answer::Yes);
        let body = serde_json::to_value(UpdateRequest::new("session_1_abc", &record)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "sessionId": "session_1_abc",
                "game1": true,
                "game2": false,
                "answer": "yes",
            })
        );
    }

    #[test]
    fn update_request_uses_null_for_undecided() {
        let record = ProgressRecord::default();
        let body = serde_json::to_value(UpdateRequest::new("id", &record)).unwrap();
        assert!(body["answer"].is_null());
    }
}
