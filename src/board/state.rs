//! Knight's Isolation game state.
//!
//! Holds the open-cell bitboard, the ply count, and each player's location.
//! Every move closes the destination cell; cells are never reopened, so the
//! game tree is acyclic and every game ends within `CELL_COUNT` plies.

use crate::game::{GameState, PlayerId};

use super::action::{Action, Knight};
use super::position::{Position, HEIGHT, ROW_STRIDE, WIDTH};

/// Bitboard with one bit set for every playable cell.
const BLANK_BOARD: u128 = blank_board();

const fn blank_board() -> u128 {
    let mut board = 0u128;
    let mut y = 0;
    while y < HEIGHT {
        let mut x = 0;
        while x < WIDTH {
            board |= 1u128 << (x + y * ROW_STRIDE);
            x += 1;
        }
        y += 1;
    }
    board
}

/// An immutable Isolation position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Isolation {
    /// Bit `i` set means cell `i` is open.
    open: u128,
    ply_count: u32,
    locs: [Option<Position>; 2],
}

impl Isolation {
    /// The empty starting board with neither knight placed.
    pub const fn new() -> Self {
        Isolation {
            open: BLANK_BOARD,
            ply_count: 0,
            locs: [None, None],
        }
    }

    /// Returns a copy with the given cells closed. Used to set up positions.
    pub fn with_blocked(&self, cells: &[Position]) -> Self {
        let mut next = *self;
        for cell in cells {
            next.open &= !(1u128 << cell.index());
        }
        next
    }

    /// Number of moves played so far.
    pub const fn ply_count(&self) -> u32 {
        self.ply_count
    }

    /// True if `pos` has not been visited.
    #[inline]
    pub const fn is_open(&self, pos: Position) -> bool {
        self.open & (1u128 << pos.index()) != 0
    }

    /// Open cells in ascending index order.
    pub fn open_cells(&self) -> Vec<Position> {
        Position::all().filter(|&p| self.is_open(p)).collect()
    }

    /// Number of open cells.
    pub const fn open_count(&self) -> u32 {
        self.open.count_ones()
    }

    /// The cell the side to move would land on after `action`, whether or
    /// not that cell is open.
    pub fn destination(&self, action: Action) -> Option<Position> {
        match action {
            Action::Place(pos) => match self.locs[self.player().index()] {
                None => Some(pos),
                Some(_) => None,
            },
            Action::Jump(knight) => knight.target(self.locs[self.player().index()]?),
        }
    }

    /// True if `action` is legal for the side to move.
    pub fn is_legal(&self, action: Action) -> bool {
        self.destination(action).is_some_and(|dest| self.is_open(dest))
    }

    /// The legal action that moves the side to move onto `dest`, if any.
    pub fn action_to(&self, dest: Position) -> Option<Action> {
        self.actions()
            .into_iter()
            .find(|&a| self.destination(a) == Some(dest))
    }

    fn jumps_from(&self, loc: Position) -> impl Iterator<Item = (Knight, Position)> + '_ {
        Knight::ALL.into_iter().filter_map(move |k| {
            k.target(loc)
                .filter(|&dest| self.is_open(dest))
                .map(|dest| (k, dest))
        })
    }
}

impl Default for Isolation {
    fn default() -> Self {
        Isolation::new()
    }
}

impl GameState for Isolation {
    type Action = Action;

    fn actions(&self) -> Vec<Action> {
        match self.locs[self.player().index()] {
            None => self.open_cells().into_iter().map(Action::Place).collect(),
            Some(loc) => self.jumps_from(loc).map(|(k, _)| Action::Jump(k)).collect(),
        }
    }

    /// Applies `action` for the side to move.
    ///
    /// Illegal actions are a caller bug. They trip a debug assertion; in
    /// release builds an action with no destination only advances the ply.
    fn result(&self, action: Action) -> Self {
        debug_assert!(self.is_legal(action), "illegal action {:?}", action);
        let mut next = *self;
        if let Some(dest) = self.destination(action) {
            next.open &= !(1u128 << dest.index());
            next.locs[self.player().index()] = Some(dest);
        }
        next.ply_count += 1;
        next
    }

    fn terminal_test(&self) -> bool {
        self.liberties(self.locs[self.player().index()]).is_empty()
    }

    fn utility(&self, player: PlayerId) -> f64 {
        if !self.terminal_test() {
            return 0.0;
        }
        // The side to move is stuck and loses.
        if player == self.player() {
            -1.0
        } else {
            1.0
        }
    }

    fn locs(&self) -> [Option<Position>; 2] {
        self.locs
    }

    fn liberties(&self, loc: Option<Position>) -> Vec<Position> {
        match loc {
            None => self.open_cells(),
            Some(loc) => self.jumps_from(loc).map(|(_, dest)| dest).collect(),
        }
    }

    fn player(&self) -> PlayerId {
        if self.ply_count % 2 == 0 {
            PlayerId::FIRST
        } else {
            PlayerId::SECOND
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::position::CELL_COUNT;

    fn at(x: usize, y: usize) -> Position {
        Position::from_xy(x, y).unwrap()
    }

    #[test]
    fn new_board_is_all_open() {
        let state = Isolation::new();
        assert_eq!(state.open_count() as usize, CELL_COUNT);
        assert_eq!(state.locs(), [None, None]);
        assert_eq!(state.player(), PlayerId::FIRST);
        assert!(!state.terminal_test());
    }

    #[test]
    fn first_moves_are_placements_in_index_order() {
        let state = Isolation::new();
        let actions = state.actions();
        assert_eq!(actions.len(), CELL_COUNT);
        assert_eq!(actions[0], Action::Place(at(0, 0)));
        assert_eq!(actions[1], Action::Place(at(1, 0)));
        assert_eq!(actions[WIDTH], Action::Place(at(0, 1)));
    }

    #[test]
    fn placement_closes_cell_and_passes_turn() {
        let state = Isolation::new().result(Action::Place(at(5, 4)));
        assert_eq!(state.locs(), [Some(at(5, 4)), None]);
        assert!(!state.is_open(at(5, 4)));
        assert_eq!(state.player(), PlayerId::SECOND);
        assert_eq!(state.ply_count(), 1);
        // Second player may place anywhere still open.
        assert_eq!(state.actions().len(), CELL_COUNT - 1);
        assert!(!state.actions().contains(&Action::Place(at(5, 4))));
    }

    #[test]
    fn jumps_follow_enumeration_order() {
        let state = Isolation::new()
            .result(Action::Place(at(5, 4)))
            .result(Action::Place(at(0, 0)));
        let expected: Vec<Action> = Knight::ALL.into_iter().map(Action::Jump).collect();
        assert_eq!(state.actions(), expected);
    }

    #[test]
    fn jump_moves_knight_and_keeps_vacated_cell_closed() {
        let state = Isolation::new()
            .result(Action::Place(at(5, 4)))
            .result(Action::Place(at(0, 0)))
            .result(Action::Jump(Knight::NNE));
        assert_eq!(state.locs()[0], Some(at(6, 6)));
        assert!(!state.is_open(at(5, 4)));
        assert!(!state.is_open(at(6, 6)));
    }

    #[test]
    fn liberties_exclude_closed_and_off_board_cells() {
        let state = Isolation::new()
            .result(Action::Place(at(0, 0)))
            .result(Action::Place(at(1, 2)));
        // From the corner only (1,2) and (2,1) are on the board; (1,2) is taken.
        assert_eq!(state.liberties(Some(at(0, 0))), vec![at(2, 1)]);
        assert_eq!(state.actions(), vec![Action::Jump(Knight::ENE)]);
    }

    #[test]
    fn unplaced_liberties_are_open_cells() {
        let state = Isolation::new().with_blocked(&[at(0, 0), at(3, 3)]);
        assert_eq!(state.liberties(None).len(), CELL_COUNT - 2);
    }

    #[test]
    fn stuck_player_loses() {
        // Player 0 in the corner with both exits blocked; player 0 to move.
        let state = Isolation::new()
            .result(Action::Place(at(0, 0)))
            .result(Action::Place(at(8, 8)))
            .with_blocked(&[at(1, 2), at(2, 1)]);
        assert!(state.terminal_test());
        assert_eq!(state.utility(PlayerId::FIRST), -1.0);
        assert_eq!(state.utility(PlayerId::SECOND), 1.0);
        assert!(state.actions().is_empty());
    }

    #[test]
    fn utility_is_zero_before_game_ends() {
        let state = Isolation::new().result(Action::Place(at(2, 2)));
        assert_eq!(state.utility(PlayerId::FIRST), 0.0);
        assert_eq!(state.utility(PlayerId::SECOND), 0.0);
    }

    #[test]
    fn action_to_finds_jump_by_destination() {
        let state = Isolation::new()
            .result(Action::Place(at(5, 4)))
            .result(Action::Place(at(0, 0)));
        assert_eq!(state.action_to(at(7, 3)), Some(Action::Jump(Knight::ESE)));
        assert_eq!(state.action_to(at(5, 5)), None);
    }

    #[test]
    fn placement_after_placed_is_illegal() {
        let state = Isolation::new()
            .result(Action::Place(at(5, 4)))
            .result(Action::Place(at(0, 0)));
        assert!(!state.is_legal(Action::Place(at(9, 8))));
        assert!(state.is_legal(Action::Jump(Knight::NNW)));
    }

    #[test]
    fn random_playout_terminates() {
        let mut state = Isolation::new();
        let mut plies = 0;
        while !state.terminal_test() {
            let actions = state.actions();
            state = state.result(actions[plies % actions.len()]);
            plies += 1;
            assert!(plies <= CELL_COUNT);
        }
        let loser = state.player();
        assert_eq!(state.utility(loser), -1.0);
        assert_eq!(state.utility(loser.opponent()), 1.0);
    }
}
