use std::path::PathBuf;

use gtk4 as gtk;

use super::capture::CaptureSession;
use super::game::Board;
use super::progress::ProgressRecord;
use super::sync::ProgressClient;

pub struct AppState {
    pub view_stack: Option<gtk::Stack>,
    pub subtitle_label: Option<gtk::Label>,
    pub quiz_content: Option<gtk::Box>,
    pub quiz_result: Option<gtk::Box>,
    pub memory_board_box: Option<gtk::Box>,
    pub memory_result: Option<gtk::Box>,
    pub card_buttons: Vec<gtk::Button>,
    pub confetti_layer: Option<gtk::Fixed>,
    pub no_button_area: Option<gtk::Fixed>,
    pub no_button: Option<gtk::Button>,

    // Session state
    pub session_id: String,
    pub progress: ProgressRecord,
    pub client: ProgressClient,

    // Memory game state
    pub board: Board,
    /// Bumped on every board regeneration so a stale scheduled evaluation
    /// can recognize it outlived its board and bail out.
    pub board_id: u64,

    pub no_button_dodges: u8,
    pub capture: Option<CaptureSession>,
}

impl AppState {
    pub fn new(session_id: String, client: ProgressClient) -> Self {
        AppState {
            view_stack: None,
            subtitle_label: None,
            quiz_content: None,
            quiz_result: None,
            memory_board_box: None,
            memory_result: None,
            card_buttons: Vec::new(),
            confetti_layer: None,
            no_button_area: None,
            no_button: None,
            session_id,
            progress: ProgressRecord::default(),
            client,
            board: Board::shuffled(),
            board_id: 0,
            no_button_dodges: 0,
            capture: None,
        }
    }

    /// Fresh shuffled board; the old one and any timers keyed to it are
    /// abandoned via the generation bump.
    pub fn reset_board(&mut self) {
        self.board = Board::shuffled();
        self.board_id = self.board_id.wrapping_add(1);
    }

    pub fn save_progress(&self) {
        self.client.save_progress(&self.session_id, &self.progress);
    }

    /// Ends any running recording and hands back the file it was written
    /// to, so the caller can tell the player where it landed.
    pub fn stop_capture(&mut self) -> Option<PathBuf> {
        self.capture.take().map(CaptureSession::stop)
    }
}
