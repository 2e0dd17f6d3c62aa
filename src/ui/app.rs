use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gtk4 as gtk;
use gtk4::glib;
use gtk4::prelude::*;
use libadwaita as adw;
use adw::prelude::*;
use gio::SimpleAction;
use rand::Rng;

use super::board::{self, build_board_grid};
use super::capture::CaptureSession;
use super::dialogs::{
    show_about_dialog, show_consent_dialog, show_recording_saved, show_recording_unavailable,
};
use super::game::{COMPLETE_DELAY_MS, Evaluation, FlipOutcome, GRID_COLS, GRID_ROWS, MATCH_EVAL_DELAY_MS};
use super::hud;
use super::progress::Answer;
use super::screen::{Screen, decide_initial_screen, show_screen};
use super::session;
use super::state::AppState;
use super::sync::ProgressClient;

const CONTENT_MARGIN: i32 = 12;

const CONFETTI_COUNT: usize = 50;
const CONFETTI_LIFETIME_MS: u64 = 5000;
const CONFETTI_GLYPHS: [&str; 4] = ["🎉", "✨", "💕", "💖"];

const NO_BUTTON_DODGE_LIMIT: u8 = 3;
const NO_BUTTON_BASE_X: f64 = 190.0;
const NO_BUTTON_BASE_Y: f64 = 56.0;

pub fn run() {
    glib::set_prgname(Some("io.github.evermore"));
    let app = adw::Application::builder()
        .application_id("io.github.evermore")
        .build();

    app.connect_activate(move |app| {
        load_css();

        let session_id = session::get_or_create_session_id();
        tracing::debug!("session id {session_id}");
        let state = Rc::new(RefCell::new(AppState::new(
            session_id,
            ProgressClient::from_env(),
        )));

        let about_action = SimpleAction::new("about", None);
        about_action.connect_activate({
            let app = app.clone();
            move |_, _| {
                show_about_dialog(&app);
            }
        });
        app.add_action(&about_action);

        let quit_action = SimpleAction::new("quit", None);
        quit_action.connect_activate({
            let app = app.clone();
            move |_, _| app.quit()
        });
        app.add_action(&quit_action);

        let title_box = gtk::Box::new(gtk::Orientation::Vertical, 0);
        title_box.set_valign(gtk::Align::Center);
        title_box.set_halign(gtk::Align::Center);

        let title_main = gtk::Label::builder()
            .label("Evermore")
            .halign(gtk::Align::Center)
            .css_classes(vec!["app-title-main"])
            .build();

        let subtitle = gtk::Label::builder()
            .label("")
            .halign(gtk::Align::Center)
            .css_classes(vec!["app-title-subtitle", "caption"])
            .build();

        title_box.append(&title_main);
        title_box.append(&subtitle);

        let header = adw::HeaderBar::builder().title_widget(&title_box).build();
        header.add_css_class("app-header");
        header.add_css_class("flat");

        let menu_model = gio::Menu::new();
        menu_model.append(Some("About Evermore"), Some("app.about"));
        menu_model.append(Some("Quit"), Some("app.quit"));
        let menu_button = gtk::MenuButton::builder()
            .icon_name("open-menu-symbolic")
            .menu_model(&menu_model)
            .build();
        header.pack_end(&menu_button);

        let view_stack = gtk::Stack::new();
        view_stack.set_hexpand(true);
        view_stack.set_vexpand(true);
        view_stack.set_transition_type(gtk::StackTransitionType::SlideLeft);
        view_stack.set_transition_duration(300);

        view_stack.add_named(&build_welcome_view(&state), Some(Screen::Welcome.name()));
        view_stack.add_named(&build_quiz_view(&state), Some(Screen::Quiz.name()));
        view_stack.add_named(
            &build_photo_view(&state, "🌅", "The day everything started.", "Keep going", Screen::Photo2),
            Some(Screen::Photo1.name()),
        );
        view_stack.add_named(
            &build_photo_view(&state, "🥂", "And every day since.", "One more game", Screen::MemoryGame),
            Some(Screen::Photo2.name()),
        );
        view_stack.add_named(&build_memory_view(&state), Some(Screen::MemoryGame.name()));
        view_stack.add_named(&build_proposal_view(&state), Some(Screen::Proposal.name()));
        view_stack.add_named(&build_celebration_view(&state), Some(Screen::Celebration.name()));
        view_stack.add_named(&build_heartbreak_view(), Some(Screen::Heartbreak.name()));
        view_stack.set_visible_child_name(Screen::Welcome.name());

        let toolbar = adw::ToolbarView::new();
        toolbar.set_hexpand(true);
        toolbar.set_vexpand(true);
        toolbar.add_top_bar(&header);
        toolbar.set_content(Some(&view_stack));

        let win = adw::ApplicationWindow::builder()
            .application(app)
            .title("Evermore")
            .default_width(720)
            .default_height(640)
            .content(&toolbar)
            .build();
        win.set_size_request(360, 560);
        win.add_css_class("app-window");

        {
            let mut st = state.borrow_mut();
            st.view_stack = Some(view_stack.clone());
            st.subtitle_label = Some(subtitle);
        }

        win.connect_close_request({
            let state = state.clone();
            move |_| {
                state.borrow_mut().stop_capture();
                gtk::glib::Propagation::Proceed
            }
        });

        win.present();
        begin_journey(&state, app);
    });

    app.run();
}

fn load_css() {
    let Some(display) = gtk::gdk::Display::default() else {
        return;
    };
    let provider = gtk::CssProvider::new();
    provider.load_from_data(include_str!("../../data/style.css"));
    gtk::style_context_add_provider_for_display(
        &display,
        &provider,
        gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}

/// Loads remote progress off the main thread, then asks for camera consent
/// and resumes wherever the record says. The fetch is the only awaited
/// network call in the whole flow.
fn begin_journey(state: &Rc<RefCell<AppState>>, app: &adw::Application) {
    let state = state.clone();
    let app = app.clone();
    glib::spawn_future_local(async move {
        let (session_id, client) = {
            let st = state.borrow();
            (st.session_id.clone(), st.client.clone())
        };
        let record = gio::spawn_blocking(move || client.fetch_progress(&session_id))
            .await
            .unwrap_or_default();
        state.borrow_mut().progress = record;

        let dialog = show_consent_dialog(&app);
        let state_response = state.clone();
        let app_response = app.clone();
        dialog.connect_response(None, move |_, response| {
            if response == "record" {
                match CaptureSession::start() {
                    Ok(session) => state_response.borrow_mut().capture = Some(session),
                    Err(err) => {
                        tracing::warn!("recording unavailable: {err}");
                        show_recording_unavailable(&app_response);
                    }
                }
            }
            let screen = decide_initial_screen(&state_response.borrow().progress);
            enter_screen(&state_response, screen);
        });
    });
}

/// Navigates to `screen`, running its entry hook where one exists. The
/// memory board is regenerated on every entry; the quiz and proposal views
/// reset their in-screen state.
pub(super) fn enter_screen(state: &Rc<RefCell<AppState>>, screen: Screen) {
    match screen {
        Screen::Quiz => {
            let st = state.borrow();
            if let (Some(content), Some(result)) = (&st.quiz_content, &st.quiz_result) {
                content.set_visible(true);
                result.set_visible(false);
            }
            hud::set_subtitle(&st, screen);
        }
        Screen::MemoryGame => {
            let mut st = state.borrow_mut();
            st.reset_board();
            if let (Some(board_box), Some(result)) = (&st.memory_board_box, &st.memory_result) {
                board_box.set_visible(true);
                result.set_visible(false);
            }
            board::refresh_cards(&st);
            hud::update_pairs_subtitle(&st);
        }
        Screen::Proposal => {
            let mut st = state.borrow_mut();
            st.no_button_dodges = 0;
            if let (Some(area), Some(button)) = (&st.no_button_area, &st.no_button) {
                area.move_(button, NO_BUTTON_BASE_X, NO_BUTTON_BASE_Y);
            }
            hud::set_subtitle(&st, screen);
        }
        _ => {
            hud::set_subtitle(&state.borrow(), screen);
        }
    }
    show_screen(state, screen);
}

pub fn handle_card_click(state: &Rc<RefCell<AppState>>, index: usize) {
    let mut st = state.borrow_mut();
    match st.board.flip(index) {
        FlipOutcome::Ignored => {}
        FlipOutcome::FirstUp => {
            if let Some(button) = st.card_buttons.get(index) {
                button.add_css_class("active");
                board::redraw_button_child(button);
            }
        }
        FlipOutcome::AwaitEvaluation => {
            if let Some(button) = st.card_buttons.get(index) {
                button.add_css_class("active");
                board::redraw_button_child(button);
            }
            let board_id = st.board_id;
            drop(st);
            schedule_evaluation(state, board_id);
        }
    }
}

fn schedule_evaluation(state: &Rc<RefCell<AppState>>, board_id: u64) {
    let state_eval = state.clone();
    glib::timeout_add_local_once(Duration::from_millis(MATCH_EVAL_DELAY_MS), move || {
        let mut st = state_eval.borrow_mut();
        if st.board_id != board_id {
            return;
        }
        let evaluation = st.board.evaluate();
        board::refresh_cards(&st);
        if let Evaluation::Matched { board_complete } = evaluation {
            hud::update_pairs_subtitle(&st);
            if board_complete {
                drop(st);
                schedule_memory_completion(&state_eval, board_id);
            }
        }
    });
}

fn schedule_memory_completion(state: &Rc<RefCell<AppState>>, board_id: u64) {
    let state_done = state.clone();
    glib::timeout_add_local_once(Duration::from_millis(COMPLETE_DELAY_MS), move || {
        let mut st = state_done.borrow_mut();
        if st.board_id != board_id {
            return;
        }
        // Only the first completion transition produces a write.
        if st.progress.complete_memory() {
            st.save_progress();
        }
        if let (Some(board_box), Some(result)) = (&st.memory_board_box, &st.memory_result) {
            board_box.set_visible(false);
            result.set_visible(true);
        }
    });
}

fn answer_quiz(state: &Rc<RefCell<AppState>>) {
    // Any answer is the right one; the quiz is about the moment, not the
    // score.
    let mut st = state.borrow_mut();
    if st.progress.complete_quiz() {
        st.save_progress();
    }
    if let (Some(content), Some(result)) = (&st.quiz_content, &st.quiz_result) {
        content.set_visible(false);
        result.set_visible(true);
    }
}

pub(super) fn submit_answer(state: &Rc<RefCell<AppState>>, answer: Answer) {
    let recording = {
        let mut st = state.borrow_mut();
        if st.progress.record_answer(answer) {
            st.save_progress();
        }
        st.stop_capture()
    };
    if answer == Answer::Yes {
        enter_screen(state, Screen::Celebration);
        spawn_confetti(state);
    } else {
        enter_screen(state, Screen::Heartbreak);
    }
    if let Some(path) = recording {
        let st = state.borrow();
        if let Some(stack) = &st.view_stack {
            show_recording_saved(stack, &path);
        }
    }
}

fn spawn_confetti(state: &Rc<RefCell<AppState>>) {
    let layer = {
        let st = state.borrow();
        st.confetti_layer.clone()
    };
    let Some(layer) = layer else {
        return;
    };

    let mut rng = rand::rng();
    let width = layer.width().max(360) as f64;
    for _ in 0..CONFETTI_COUNT {
        let glyph = CONFETTI_GLYPHS[rng.random_range(0..CONFETTI_GLYPHS.len())];
        let fall_class = format!("fall-{}", rng.random_range(0..4u32));
        let piece = gtk::Label::builder()
            .label(glyph)
            .css_classes(vec!["confetti-piece", fall_class.as_str()])
            .build();
        piece.set_can_target(false);
        layer.put(&piece, rng.random_range(0.0..width), -40.0);

        // Each piece cleans itself up after a fixed lifetime.
        glib::timeout_add_local_once(Duration::from_millis(CONFETTI_LIFETIME_MS), {
            let layer_weak = layer.downgrade();
            let piece_weak = piece.downgrade();
            move || {
                if let (Some(layer), Some(piece)) = (layer_weak.upgrade(), piece_weak.upgrade()) {
                    layer.remove(&piece);
                }
            }
        });
    }
}

fn dodge_no_button(state: &Rc<RefCell<AppState>>) {
    let mut st = state.borrow_mut();
    if st.no_button_dodges >= NO_BUTTON_DODGE_LIMIT {
        return;
    }
    if let (Some(area), Some(button)) = (&st.no_button_area, &st.no_button) {
        let mut rng = rand::rng();
        let dx = rng.random_range(-100.0..=100.0);
        let dy = rng.random_range(-50.0..=50.0);
        area.move_(button, NO_BUTTON_BASE_X + dx, NO_BUTTON_BASE_Y + dy);
    }
    st.no_button_dodges += 1;
}

fn journey_view(css_class: &str) -> (gtk::Box, gtk::Box) {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 0);
    root.set_hexpand(true);
    root.set_vexpand(true);
    root.add_css_class(css_class);

    let center = gtk::CenterBox::new();
    center.set_hexpand(true);
    center.set_vexpand(true);

    let content = gtk::Box::new(gtk::Orientation::Vertical, 14);
    content.set_halign(gtk::Align::Center);
    content.set_valign(gtk::Align::Center);
    content.add_css_class("screen-content");

    center.set_center_widget(Some(&content));
    root.append(&center);
    (root, content)
}

fn big_glyph(glyph: &str) -> gtk::Label {
    let label = gtk::Label::new(Some(glyph));
    label.add_css_class("photo-glyph");
    label.set_halign(gtk::Align::Center);
    label
}

fn build_welcome_view(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let (root, content) = journey_view("welcome-root");

    let title = gtk::Label::new(Some("Hi, love 💌"));
    title.add_css_class("title-1");

    let message = gtk::Label::new(Some(
        "I made something small for you.\nTwo little games, then a question.",
    ));
    message.add_css_class("body");
    message.set_justify(gtk::Justification::Center);

    let start = gtk::Button::with_label("Start the journey");
    start.add_css_class("suggested-action");
    start.add_css_class("pill");
    start.set_halign(gtk::Align::Center);
    start.connect_clicked({
        let state = state.clone();
        move |_| {
            enter_screen(&state, Screen::Quiz);
        }
    });

    content.append(&big_glyph("💝"));
    content.append(&title);
    content.append(&message);
    content.append(&start);
    root
}

fn build_quiz_view(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let (root, content) = journey_view("quiz-root");

    let quiz_content = gtk::Box::new(gtk::Orientation::Vertical, 12);
    quiz_content.set_halign(gtk::Align::Center);

    let question = gtk::Label::new(Some("What do I love most about us?"));
    question.add_css_class("title-2");
    quiz_content.append(&question);

    for option in [
        "The way we laugh at nothing",
        "Sunday breakfasts",
        "Every trip we never planned",
        "All of it",
    ] {
        let button = gtk::Button::with_label(option);
        button.add_css_class("quiz-option");
        button.set_size_request(280, 42);
        button.connect_clicked({
            let state = state.clone();
            move |_| {
                answer_quiz(&state);
            }
        });
        quiz_content.append(&button);
    }

    let quiz_result = gtk::Box::new(gtk::Orientation::Vertical, 12);
    quiz_result.set_halign(gtk::Align::Center);
    quiz_result.set_visible(false);

    let verdict = gtk::Label::new(Some("Exactly right. It was always all of it. 💘"));
    verdict.add_css_class("title-2");
    quiz_result.append(&verdict);

    let onwards = gtk::Button::with_label("Show me more");
    onwards.add_css_class("suggested-action");
    onwards.add_css_class("pill");
    onwards.set_halign(gtk::Align::Center);
    onwards.connect_clicked({
        let state = state.clone();
        move |_| {
            enter_screen(&state, Screen::Photo1);
        }
    });
    quiz_result.append(&onwards);

    content.append(&quiz_content);
    content.append(&quiz_result);

    {
        let mut st = state.borrow_mut();
        st.quiz_content = Some(quiz_content);
        st.quiz_result = Some(quiz_result);
    }
    root
}

fn build_photo_view(
    state: &Rc<RefCell<AppState>>,
    glyph: &str,
    caption: &str,
    button_label: &str,
    next: Screen,
) -> gtk::Box {
    let (root, content) = journey_view("photo-root");

    let caption_label = gtk::Label::new(Some(caption));
    caption_label.add_css_class("title-2");
    caption_label.set_wrap(true);
    caption_label.set_justify(gtk::Justification::Center);

    let onwards = gtk::Button::with_label(button_label);
    onwards.add_css_class("suggested-action");
    onwards.add_css_class("pill");
    onwards.set_halign(gtk::Align::Center);
    onwards.connect_clicked({
        let state = state.clone();
        move |_| {
            enter_screen(&state, next);
        }
    });

    content.append(&big_glyph(glyph));
    content.append(&caption_label);
    content.append(&onwards);
    root
}

fn build_memory_view(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 0);
    root.set_hexpand(true);
    root.set_vexpand(true);
    root.add_css_class("memory-root");

    let board_box = gtk::Box::new(gtk::Orientation::Vertical, 12);
    board_box.set_hexpand(true);
    board_box.set_vexpand(true);
    board_box.set_margin_top(CONTENT_MARGIN);
    board_box.set_margin_bottom(CONTENT_MARGIN);
    board_box.set_margin_start(CONTENT_MARGIN);
    board_box.set_margin_end(CONTENT_MARGIN);

    let grid = build_board_grid(state);
    let grid_ratio = GRID_COLS as f32 / GRID_ROWS as f32;
    let grid_frame = gtk::AspectFrame::new(0.5, 0.5, grid_ratio, false);
    grid_frame.set_halign(gtk::Align::Fill);
    grid_frame.set_valign(gtk::Align::Fill);
    grid_frame.set_hexpand(true);
    grid_frame.set_vexpand(true);
    grid_frame.set_child(Some(&grid));
    board_box.append(&grid_frame);

    let result = gtk::Box::new(gtk::Orientation::Vertical, 12);
    result.set_halign(gtk::Align::Center);
    result.set_valign(gtk::Align::Center);
    result.set_hexpand(true);
    result.set_vexpand(true);
    result.set_visible(false);

    let done = gtk::Label::new(Some("You matched every pair. Of course you did. 💞"));
    done.add_css_class("title-2");
    result.append(&done);

    let onwards = gtk::Button::with_label("I have one more question…");
    onwards.add_css_class("suggested-action");
    onwards.add_css_class("pill");
    onwards.set_halign(gtk::Align::Center);
    onwards.connect_clicked({
        let state = state.clone();
        move |_| {
            enter_screen(&state, Screen::Proposal);
        }
    });
    result.append(&onwards);

    root.append(&board_box);
    root.append(&result);

    {
        let mut st = state.borrow_mut();
        st.memory_board_box = Some(board_box);
        st.memory_result = Some(result);
    }
    root
}

fn build_proposal_view(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let (root, content) = journey_view("proposal-root");

    let title = gtk::Label::new(Some("Will you marry me?"));
    title.add_css_class("title-1");

    let yes = gtk::Button::with_label("Yes! 💍");
    yes.add_css_class("suggested-action");
    yes.add_css_class("pill");
    yes.set_halign(gtk::Align::Center);
    yes.set_size_request(160, 48);
    yes.connect_clicked({
        let state = state.clone();
        move |_| {
            submit_answer(&state, Answer::Yes);
        }
    });

    // The decline button lives on a Fixed so it can scamper away from the
    // pointer a few times before giving in.
    let no_area = gtk::Fixed::new();
    no_area.set_size_request(420, 170);
    no_area.set_halign(gtk::Align::Center);

    let no = gtk::Button::with_label("No");
    no.set_size_request(90, 40);
    no.connect_clicked({
        let state = state.clone();
        move |_| {
            submit_answer(&state, Answer::No);
        }
    });

    let motion = gtk::EventControllerMotion::new();
    motion.connect_enter({
        let state = state.clone();
        move |_, _, _| {
            dodge_no_button(&state);
        }
    });
    no.add_controller(motion);

    no_area.put(&no, NO_BUTTON_BASE_X, NO_BUTTON_BASE_Y);

    content.append(&big_glyph("💍"));
    content.append(&title);
    content.append(&yes);
    content.append(&no_area);

    {
        let mut st = state.borrow_mut();
        st.no_button_area = Some(no_area);
        st.no_button = Some(no);
    }
    root
}

fn build_celebration_view(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 0);
    root.set_hexpand(true);
    root.set_vexpand(true);
    root.add_css_class("celebration-root");

    let overlay = gtk::Overlay::new();
    overlay.set_hexpand(true);
    overlay.set_vexpand(true);

    let confetti_layer = gtk::Fixed::new();
    confetti_layer.set_hexpand(true);
    confetti_layer.set_vexpand(true);
    confetti_layer.set_can_target(false);

    let content = gtk::Box::new(gtk::Orientation::Vertical, 14);
    content.set_halign(gtk::Align::Center);
    content.set_valign(gtk::Align::Center);

    let title = gtk::Label::new(Some("She said YES! 🎊"));
    title.add_css_class("title-1");

    let message = gtk::Label::new(Some("Forever starts now. I love you."));
    message.add_css_class("body");
    message.set_justify(gtk::Justification::Center);

    content.append(&big_glyph("👰🤵"));
    content.append(&title);
    content.append(&message);

    overlay.set_child(Some(&content));
    overlay.add_overlay(&confetti_layer);
    root.append(&overlay);

    state.borrow_mut().confetti_layer = Some(confetti_layer);
    root
}

fn build_heartbreak_view() -> gtk::Box {
    let (root, content) = journey_view("heartbreak-root");

    let title = gtk::Label::new(Some("Oh."));
    title.add_css_class("title-1");

    let message = gtk::Label::new(Some(
        "Thank you for being honest.\nThat matters more than anything.",
    ));
    message.add_css_class("body");
    message.set_justify(gtk::Justification::Center);

    content.append(&big_glyph("💔"));
    content.append(&title);
    content.append(&message);
    root
}
