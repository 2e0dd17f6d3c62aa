use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;

use super::progress::{Answer, ProgressRecord};
use super::state::AppState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Quiz,
    Photo1,
    Photo2,
    MemoryGame,
    Proposal,
    Celebration,
    Heartbreak,
}

impl Screen {
    pub fn name(self) -> &'static str {
        match self {
            Screen::Welcome => "welcome",
            Screen::Quiz => "quiz",
            Screen::Photo1 => "photo1",
            Screen::Photo2 => "photo2",
            Screen::MemoryGame => "memory",
            Screen::Proposal => "proposal",
            Screen::Celebration => "celebration",
            Screen::Heartbreak => "heartbreak",
        }
    }
}

/// Picks the screen a session resumes on. First match wins; a terminal
/// answer outranks everything, then the first unfinished step.
pub fn decide_initial_screen(record: &ProgressRecord) -> Screen {
    if record.answer == Answer::No {
        return Screen::Heartbreak;
    }
    if record.answer == Answer::Yes {
        return Screen::Celebration;
    }
    if !record.quiz_done {
        Screen::Welcome
    } else if !record.memory_done {
        Screen::MemoryGame
    } else {
        Screen::Proposal
    }
}

/// Makes `screen` the single visible stack child. Direct jump, no back
/// stack; showing the already-visible screen is a no-op.
pub fn show_screen(state: &Rc<RefCell<AppState>>, screen: Screen) {
    let st = state.borrow();
    if let Some(stack) = &st.view_stack {
        stack.set_transition_type(gtk::StackTransitionType::SlideLeft);
        stack.set_visible_child_name(screen.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(quiz: bool, memory: bool, answer: Answer) -> ProgressRecord {
        ProgressRecord {
            quiz_done: quiz,
            memory_done: memory,
            answer,
        }
    }

    #[test]
    fn fresh_session_starts_at_welcome() {
        assert_eq!(
            decide_initial_screen(&ProgressRecord::default()),
            Screen::Welcome
        );
    }

    #[test]
    fn quiz_done_resumes_at_memory_game() {
        assert_eq!(
            decide_initial_screen(&record(true, false, Answer::Undecided)),
            Screen::MemoryGame
        );
    }

    #[test]
    fn both_games_done_resumes_at_proposal() {
        assert_eq!(
            decide_initial_screen(&record(true, true, Answer::Undecided)),
            Screen::Proposal
        );
    }

    #[test]
    fn no_answer_outranks_game_flags() {
        for (quiz, memory) in [(false, false), (true, false), (true, true)] {
            assert_eq!(
                decide_initial_screen(&record(quiz, memory, Answer::No)),
                Screen::Heartbreak
            );
        }
    }

    #[test]
    fn yes_answer_outranks_game_flags() {
        for (quiz, memory) in [(false, false), (true, false), (true, true)] {
            assert_eq!(
                decide_initial_screen(&record(quiz, memory, Answer::Yes)),
                Screen::Celebration
            );
        }
    }

    #[test]
    fn decision_is_a_pure_function_of_the_record() {
        let sample = record(true, false, Answer::Undecided);
        let first = decide_initial_screen(&sample);
        for _ in 0..10 {
            assert_eq!(decide_initial_screen(&sample), first);
        }
    }
}
