//! Helpers for building boards from text, used by fixtures and tests.
use crate::board::Board;
use crate::error::BoardError;
use crate::tile::TileStates;

/// Parses rows of whitespace-separated tiers into a `Board` using the default
/// tile table.
///
/// Each string is one row, top row first. A token is either `.` for an empty
/// cell or a tier index (`0` is the smallest tile). Every row must hold the
/// same number of tokens; the width of the board is taken from the first row.
///
/// # Arguments
/// * `s`: Row strings, top row first.
///
/// # Returns
/// The parsed `Board`, with tile ids assigned in row-major order.
///
/// # Errors
/// Returns `BoardError::Parse` if there are no rows, rows differ in length,
/// or a token is neither `.` nor a non-negative integer.
///
/// # Examples
/// ```
/// use tile_board::utils::board_from_str_array;
///
/// let board = board_from_str_array(&[
///     "0 . 1",
///     ". 2 .",
/// ]).unwrap();
/// assert_eq!(board.width(), 3);
/// assert_eq!(board.height(), 2);
/// assert_eq!(board.tier_at(0, 0), Some(0));
/// assert_eq!(board.tier_at(1, 0), None);
/// assert_eq!(board.tier_at(1, 1), Some(2));
///
/// assert!(board_from_str_array(&["0 x"]).is_err());
/// assert!(board_from_str_array(&["0 0", "0"]).is_err());
/// ```
pub fn board_from_str_array(s: &[&str]) -> Result<Board, BoardError> {
    board_from_str_array_with_states(s, TileStates::default())
}

/// Same as [`board_from_str_array`] with an explicit tile table. Tiers above
/// the table's maximum are clamped.
pub fn board_from_str_array_with_states(
    s: &[&str],
    states: TileStates,
) -> Result<Board, BoardError> {
    let rows: Vec<Vec<&str>> = s.iter().map(|row| row.split_whitespace().collect()).collect();

    let width = match rows.first() {
        Some(first) if !first.is_empty() => first.len(),
        _ => {
            return Err(BoardError::Parse(
                "board must have at least one non-empty row".to_string(),
            ))
        }
    };

    let mut board = Board::new(width, rows.len(), states);

    for (y, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(BoardError::Parse(format!(
                "row {} has {} cells, expected {}",
                y,
                row.len(),
                width
            )));
        }
        for (x, token) in row.iter().enumerate() {
            if *token == "." {
                continue;
            }
            let tier = token.parse::<usize>().map_err(|_| {
                BoardError::Parse(format!("unrecognized token '{}' in row {} col {}", token, y, x))
            })?;
            board.place_tile(x, y, tier)?;
        }
    }

    Ok(board)
}
