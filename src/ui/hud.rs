use super::game;
use super::screen::Screen;
use super::state::AppState;

pub(super) fn subtitle_for(screen: Screen) -> &'static str {
    match screen {
        Screen::Welcome => "A little journey for you",
        Screen::Quiz => "Game 1 · Us",
        Screen::Photo1 | Screen::Photo2 => "Remember this?",
        Screen::MemoryGame => "Game 2 · Memory match",
        Screen::Proposal => "One question",
        Screen::Celebration => "She said yes!",
        Screen::Heartbreak => "",
    }
}

pub(super) fn set_subtitle(st: &AppState, screen: Screen) {
    if let Some(label) = &st.subtitle_label {
        label.set_text(subtitle_for(screen));
    }
}

pub(super) fn update_pairs_subtitle(st: &AppState) {
    if let Some(label) = &st.subtitle_label {
        label.set_text(&format!(
            "Game 2 · Pairs found {}/{}",
            st.board.matched_pairs,
            game::PAIR_COUNT
        ));
    }
}
