use rand::seq::SliceRandom;

pub const PAIR_COUNT: usize = 8;
pub const CARD_COUNT: usize = PAIR_COUNT * 2;
pub const GRID_COLS: i32 = 4;
pub const GRID_ROWS: i32 = 4;

/// Pause before a pair is judged, so both faces register visually.
pub const MATCH_EVAL_DELAY_MS: u64 = 800;
/// Pause between the final match and the completion reveal.
pub const COMPLETE_DELAY_MS: u64 = 500;

const SYMBOLS: [&str; PAIR_COUNT] = ["💕", "💖", "💗", "💝", "💞", "💓", "❤️", "💙"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardStatus {
    Hidden,
    Flipped,
    Matched,
}

#[derive(Clone, Debug)]
pub struct Card {
    pub symbol: &'static str,
    pub status: CardStatus,
}

#[derive(Debug, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Input refused: two cards already await evaluation, or the card is not
    /// face-down. Never an error.
    Ignored,
    FirstUp,
    /// Second card is up; the caller schedules evaluation after
    /// [`MATCH_EVAL_DELAY_MS`].
    AwaitEvaluation,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Evaluation {
    Matched { board_complete: bool },
    Mismatched,
}

/// The memory-match board. Pure state machine; all timing and presentation
/// live at the GTK layer.
pub struct Board {
    pub cards: Vec<Card>,
    pub flipped: Vec<usize>,
    pub matched_pairs: usize,
}

impl Board {
    pub fn shuffled() -> Self {
        let mut symbols = Vec::with_capacity(CARD_COUNT);
        for symbol in SYMBOLS {
            symbols.push(symbol);
            symbols.push(symbol);
        }
        let mut rng = rand::rng();
        symbols.shuffle(&mut rng);

        Board {
            cards: symbols
                .into_iter()
                .map(|symbol| Card {
                    symbol,
                    status: CardStatus::Hidden,
                })
                .collect(),
            flipped: Vec::new(),
            matched_pairs: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.matched_pairs == PAIR_COUNT
    }

    pub fn flip(&mut self, index: usize) -> FlipOutcome {
        if index >= self.cards.len() {
            return FlipOutcome::Ignored;
        }
        if self.flipped.len() == 2 || self.cards[index].status != CardStatus::Hidden {
            return FlipOutcome::Ignored;
        }

        self.cards[index].status = CardStatus::Flipped;
        self.flipped.push(index);
        if self.flipped.len() == 2 {
            FlipOutcome::AwaitEvaluation
        } else {
            FlipOutcome::FirstUp
        }
    }

    /// Judges the two face-up cards. Must only be called after
    /// [`flip`](Self::flip) returned [`FlipOutcome::AwaitEvaluation`].
    pub fn evaluate(&mut self) -> Evaluation {
        debug_assert_eq!(self.flipped.len(), 2);
        let first = self.flipped[0];
        let second = self.flipped[1];
        self.flipped.clear();

        if self.cards[first].symbol == self.cards[second].symbol {
            self.cards[first].status = CardStatus::Matched;
            self.cards[second].status = CardStatus::Matched;
            self.matched_pairs += 1;
            Evaluation::Matched {
                board_complete: self.is_complete(),
            }
        } else {
            self.cards[first].status = CardStatus::Hidden;
            self.cards[second].status = CardStatus::Hidden;
            Evaluation::Mismatched
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::collections::HashSet;

    fn pair_indices(board: &Board) -> Vec<(usize, usize)> {
        let mut by_symbol: HashMap<&str, Vec<usize>> = HashMap::new();
        for (idx, card) in board.cards.iter().enumerate() {
            by_symbol.entry(card.symbol).or_default().push(idx);
        }
        by_symbol.values().map(|v| (v[0], v[1])).collect()
    }

    #[test]
    fn shuffled_board_has_eight_symbols_twice() {
        let board = Board::shuffled();
        assert_eq!(board.cards.len(), CARD_COUNT);
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for card in &board.cards {
            *counts.entry(card.symbol).or_default() += 1;
            assert_eq!(card.status, CardStatus::Hidden);
        }
        assert_eq!(counts.len(), PAIR_COUNT);
        assert!(counts.values().all(|&count| count == 2));
        assert_eq!(board.matched_pairs, 0);
        assert!(board.flipped.is_empty());
    }

    #[test]
    fn shuffle_varies_across_boards() {
        // With an unbiased shuffle the first card is near-uniform over the
        // eight symbols; seeing fewer than five of them in 300 boards would
        // be astronomically unlikely.
        let mut first_symbols = HashSet::new();
        for _ in 0..300 {
            first_symbols.insert(Board::shuffled().cards[0].symbol);
        }
        assert!(first_symbols.len() >= 5);
    }

    #[test]
    fn first_flip_reports_first_up() {
        let mut board = Board::shuffled();
        assert_eq!(board.flip(0), FlipOutcome::FirstUp);
        assert_eq!(board.cards[0].status, CardStatus::Flipped);
    }

    #[test]
    fn second_flip_requests_evaluation() {
        let mut board = Board::shuffled();
        board.flip(0);
        assert_eq!(board.flip(1), FlipOutcome::AwaitEvaluation);
        assert_eq!(board.flipped, vec![0, 1]);
    }

    #[test]
    fn third_flip_is_ignored_while_evaluation_pending() {
        let mut board = Board::shuffled();
        board.flip(0);
        board.flip(1);
        let snapshot: Vec<CardStatus> = board.cards.iter().map(|c| c.status).collect();
        assert_eq!(board.flip(2), FlipOutcome::Ignored);
        let after: Vec<CardStatus> = board.cards.iter().map(|c| c.status).collect();
        assert_eq!(snapshot, after);
        assert_eq!(board.flipped, vec![0, 1]);
    }

    #[test]
    fn reflipping_a_face_up_card_is_ignored() {
        let mut board = Board::shuffled();
        board.flip(0);
        assert_eq!(board.flip(0), FlipOutcome::Ignored);
        assert_eq!(board.flipped, vec![0]);
    }

    #[test]
    fn matched_cards_stay_matched_and_refuse_flips() {
        let mut board = Board::shuffled();
        let (a, b) = pair_indices(&board)[0];
        board.flip(a);
        board.flip(b);
        assert_eq!(
            board.evaluate(),
            Evaluation::Matched {
                board_complete: false
            }
        );
        assert_eq!(board.cards[a].status, CardStatus::Matched);
        assert_eq!(board.flip(a), FlipOutcome::Ignored);
    }

    #[test]
    fn mismatch_turns_both_cards_back_down() {
        let mut board = Board::shuffled();
        let pairs = pair_indices(&board);
        let (a, _) = pairs[0];
        let (b, _) = pairs[1];
        board.flip(a);
        board.flip(b);
        assert_eq!(board.evaluate(), Evaluation::Mismatched);
        assert_eq!(board.cards[a].status, CardStatus::Hidden);
        assert_eq!(board.cards[b].status, CardStatus::Hidden);
        assert!(board.flipped.is_empty());
        assert_eq!(board.matched_pairs, 0);
    }

    #[test]
    fn completing_all_pairs_reports_board_complete_on_the_last_only() {
        let mut board = Board::shuffled();
        for (round, (a, b)) in pair_indices(&board).into_iter().enumerate() {
            board.flip(a);
            board.flip(b);
            let expected_complete = round + 1 == PAIR_COUNT;
            assert_eq!(
                board.evaluate(),
                Evaluation::Matched {
                    board_complete: expected_complete
                }
            );
        }
        assert!(board.is_complete());
        assert_eq!(board.matched_pairs, PAIR_COUNT);
    }
}
