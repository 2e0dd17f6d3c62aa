use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::pango;
use gtk4::prelude::*;

use super::app::handle_card_click;
use super::game::{CardStatus, GRID_COLS, GRID_ROWS};
use super::state::AppState;

pub const TILE_GAP: i32 = 6;

pub fn build_board_grid(state: &Rc<RefCell<AppState>>) -> gtk::Grid {
    let grid = gtk::Grid::new();
    grid.add_css_class("memory-board");
    grid.set_row_spacing(TILE_GAP as u32);
    grid.set_column_spacing(TILE_GAP as u32);
    grid.set_halign(gtk::Align::Fill);
    grid.set_valign(gtk::Align::Fill);
    grid.set_hexpand(true);
    grid.set_vexpand(true);

    let mut buttons = Vec::new();

    for i in 0..(GRID_ROWS * GRID_COLS) {
        let index = i as usize;
        let aspect_frame = gtk::AspectFrame::builder()
            .ratio(1.0)
            .obey_child(false)
            .halign(gtk::Align::Fill)
            .valign(gtk::Align::Fill)
            .hexpand(true)
            .vexpand(true)
            .build();

        let button = gtk::Button::builder()
            .css_classes(vec!["memory-card"])
            .build();
        button.set_hexpand(true);
        button.set_vexpand(true);

        let drawing_area = gtk::DrawingArea::builder()
            .hexpand(true)
            .vexpand(true)
            .build();

        let state_draw = state.clone();
        drawing_area.set_draw_func(move |area, cr, width, height| {
            let st = state_draw.borrow();
            if index >= st.board.cards.len() {
                return;
            }
            let card = &st.board.cards[index];
            let text = if card.status == CardStatus::Hidden {
                "❓"
            } else {
                card.symbol
            };

            let min_dim = width.min(height) as f64;
            cr.set_antialias(gtk::cairo::Antialias::Best);

            let layout = pangocairo::functions::create_layout(cr);
            let mut font_desc = pango::FontDescription::new();
            font_desc.set_family("Noto Color Emoji, Apple Color Emoji, Segoe UI Emoji, sans");
            font_desc.set_size((min_dim * 0.40 * pango::SCALE as f64) as i32);
            layout.set_font_description(Some(&font_desc));
            layout.set_text(text);

            let fg = area.style_context().color();
            cr.set_source_rgba(
                fg.red() as f64,
                fg.green() as f64,
                fg.blue() as f64,
                fg.alpha() as f64,
            );

            let (text_width, text_height) = layout.pixel_size();
            cr.move_to(
                (width as f64 - text_width as f64) / 2.0,
                (height as f64 - text_height as f64) / 2.0,
            );

            pangocairo::functions::show_layout(cr, &layout);
        });

        button.set_child(Some(&drawing_area));

        let state_clone = state.clone();
        button.connect_clicked(move |_| {
            handle_card_click(&state_clone, index);
        });

        aspect_frame.set_child(Some(&button));

        let x = i % GRID_COLS;
        let y = i / GRID_COLS;
        grid.attach(&aspect_frame, x, y, 1, 1);
        buttons.push(button);
    }

    state.borrow_mut().card_buttons = buttons;

    grid
}

pub(super) fn redraw_button_child(button: &gtk::Button) {
    if let Some(child) = button.child() {
        child.queue_draw();
    }
}

/// Re-applies css classes and redraws every card from the board state.
pub(super) fn refresh_cards(st: &AppState) {
    for (index, button) in st.card_buttons.iter().enumerate() {
        button.remove_css_class("active");
        button.remove_css_class("matched");
        if let Some(card) = st.board.cards.get(index) {
            match card.status {
                CardStatus::Flipped => button.add_css_class("active"),
                CardStatus::Matched => button.add_css_class("matched"),
                CardStatus::Hidden => {}
            }
        }
        redraw_button_child(button);
    }
}
