#[cfg(test)]
mod tests {
    use crate::{
        end_game_bonus, floor_penalty, tile_score, wall_column_by_color, wall_slot_color, Color,
        PlayerBoard, Wall, WALL_SIZE,
    };

    #[test]
    fn wall_layout_is_shifted_diagonal() {
        assert_eq!(wall_slot_color(0, 0), Color::Blue);
        assert_eq!(wall_slot_color(0, 4), Color::White);
        assert_eq!(wall_slot_color(1, 0), Color::White);
        assert_eq!(wall_slot_color(4, 4), Color::Blue);
        assert_eq!(wall_slot_color(2, 0), Color::Black);
    }

    #[test]
    fn wall_column_is_inverse_of_slot_color() {
        for row in 0..WALL_SIZE {
            for col in 0..WALL_SIZE {
                let c = wall_slot_color(row, col);
                assert_eq!(wall_column_by_color(row, c), col);
            }
            for color in Color::TILES {
                assert_eq!(wall_slot_color(row, wall_column_by_color(row, color)), color);
            }
        }
    }

    fn place(wall: &mut Wall, cells: &[(usize, usize)]) {
        for &(r, c) in cells {
            wall[r][c] = wall_slot_color(r, c);
        }
    }

    #[test]
    fn isolated_tile_scores_one() {
        let mut wall = Wall::default();
        place(&mut wall, &[(2, 2)]);
        assert_eq!(tile_score(&wall, 2, 2), 1);
    }

    #[test]
    fn runs_score_per_direction() {
        // Row run of 3 through (1,1) and column run of 2.
        let mut wall = Wall::default();
        place(&mut wall, &[(1, 0), (1, 1), (1, 2), (2, 1)]);
        assert_eq!(tile_score(&wall, 1, 1), 3 + 2);

        // Horizontal only.
        let mut wall = Wall::default();
        place(&mut wall, &[(4, 3), (4, 4)]);
        assert_eq!(tile_score(&wall, 4, 4), 2);

        // A gap breaks the run.
        let mut wall = Wall::default();
        place(&mut wall, &[(0, 0), (0, 2), (0, 3)]);
        assert_eq!(tile_score(&wall, 0, 2), 2);
    }

    #[test]
    fn floor_penalty_table() {
        assert_eq!(floor_penalty(0), 0);
        assert_eq!(floor_penalty(1), 1);
        assert_eq!(floor_penalty(3), 4);
        assert_eq!(floor_penalty(7), 14);
        // Tiles beyond the seventh cost nothing extra.
        assert_eq!(floor_penalty(12), 14);
    }

    #[test]
    fn end_game_bonus_row_column_color() {
        // Main diagonal (all Blue), first row and first column.
        let mut board = PlayerBoard::default();
        for i in 0..WALL_SIZE {
            place(&mut board.wall, &[(i, i), (i, 0), (0, i)]);
        }
        assert_eq!(end_game_bonus(&board), 2 + 7 + 10);
        assert_eq!(end_game_bonus(&PlayerBoard::default()), 0);
    }
}
