//! Vertical merge normalization for tables.
//!
//! WordprocessingML stores a vertically merged cell as one cell per row, all
//! but the first flagged as continuations. The flow tree wants a single cell
//! with a row span instead. While a table is read, [`RowSpanGrid`] records
//! for every grid column which cell owns it; once the table is complete,
//! [`RowSpanGrid::setup_table`] moves the content of each continuation cell
//! into its owner, grows the owner's row span and removes the continuation.

use std::mem;

use crate::error::{Error, Result};
use crate::model::{Node, NodeKind};

/// Widest table Word can lay out, in grid columns.
pub const MAX_GRID_COLUMNS: usize = 63;

/// (row, cell) index of a cell in the table as built.
type Coordinate = (usize, usize);

/// Grid of owning cell coordinates, one entry per grid column.
#[derive(Debug, Clone, Default)]
pub struct RowSpanGrid {
    grid: Vec<Vec<Coordinate>>,
    /// Number of cells added to each row so far.
    cells: Vec<usize>,
}

impl RowSpanGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new table row.
    pub fn add_row(&mut self) {
        self.grid.push(Vec::new());
        self.cells.push(0);
    }

    /// Record a cell appended to the last row, covering `column_span` grid
    /// columns. A cell that `continues` a vertical merge is owned by whatever
    /// cell owns the same grid column in the row above.
    pub fn add_cell(&mut self, column_span: u32, continues: bool) -> Result<()> {
        let row = self
            .grid
            .len()
            .checked_sub(1)
            .ok_or_else(|| Error::InvalidTable("cell outside of a table row".to_string()))?;
        let column = self.cells[row];
        self.cells[row] += 1;

        let owner = if continues {
            let grid_column = self.grid[row].len();
            let above = row.checked_sub(1).ok_or_else(|| {
                Error::InvalidTable("vertical merge continues on the first table row".to_string())
            })?;
            *self.grid[above].get(grid_column).ok_or_else(|| {
                Error::InvalidTable(format!(
                    "vertical merge in row {} has no cell above grid column {}",
                    row, grid_column
                ))
            })?
        } else {
            (row, column)
        };

        let span = column_span.max(1) as usize;
        let width = self.grid[row].len().saturating_add(span);
        if width > MAX_GRID_COLUMNS {
            return Err(Error::InvalidTable(format!(
                "row {} spans {} grid columns, more than {}",
                row, width, MAX_GRID_COLUMNS
            )));
        }
        self.grid[row].extend(std::iter::repeat(owner).take(span));
        Ok(())
    }

    /// Fold continuation cells of `table` into their owners.
    ///
    /// Content is moved in row order to the end of the owner's children and
    /// the owner's row span grows by one per folded cell. Continuation cells
    /// are removed afterwards, highest index first within each row.
    pub fn setup_table(&self, table: &mut Node) -> Result<()> {
        let mut spurious = Vec::new();

        for row in 1..self.grid.len() {
            let mut previous: Option<usize> = None;
            for grid_column in 0..self.grid[row].len() {
                let current = (row, grid_to_table(table, row, grid_column)?);

                // Later columns of a horizontally spanned cell are handled
                // with its first column.
                if previous == Some(current.1) {
                    continue;
                }
                previous = Some(current.1);

                let owner = self.grid[row][grid_column];
                if current == owner {
                    continue;
                }

                let blocks = mem::take(&mut cell_mut(table, current)?.children);
                let owner_cell = cell_mut(table, owner)?;
                owner_cell.children.extend(blocks);
                if let NodeKind::TableCell(props) = &mut owner_cell.kind {
                    props.row_span += 1;
                }
                spurious.push(current);
            }
        }

        // Recorded in row-major order, so reversing deletes from the right.
        for (row, column) in spurious.into_iter().rev() {
            table.children[row].children.remove(column);
        }
        Ok(())
    }
}

/// Index of the cell covering `grid_column` in `row`, counting column spans
/// but ignoring row spans.
fn grid_to_table(table: &Node, row: usize, grid_column: usize) -> Result<usize> {
    let cells = &table
        .children
        .get(row)
        .ok_or_else(|| Error::InvalidTable(format!("table has no row {}", row)))?
        .children;

    let mut covered = 0usize;
    for (index, cell) in cells.iter().enumerate() {
        let span = cell.cell_props().map_or(1, |props| props.column_span.max(1)) as usize;
        covered += span;
        if covered > grid_column {
            return Ok(index);
        }
    }

    Err(Error::InvalidTable(format!(
        "grid column {} of row {} maps to no cell",
        grid_column, row
    )))
}

fn cell_mut(table: &mut Node, (row, column): Coordinate) -> Result<&mut Node> {
    table
        .children
        .get_mut(row)
        .and_then(|r| r.children.get_mut(column))
        .filter(|cell| cell.cell_props().is_some())
        .ok_or_else(|| Error::InvalidTable(format!("no table cell at ({}, {})", row, column)))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// (column span, continues, text)
    type CellSpec<'a> = (u32, bool, &'a str);

    fn build(rows: &[&[CellSpec<'_>]]) -> Result<(Node, RowSpanGrid)> {
        let mut table = Node::new(NodeKind::Table);
        let mut grid = RowSpanGrid::new();
        for cells in rows {
            let row = table.push(Node::new(NodeKind::TableRow));
            grid.add_row();
            for &(span, continues, text) in cells.iter() {
                let mut cell = Node::table_cell();
                if let Some(props) = cell.cell_props_mut() {
                    props.column_span = span;
                }
                if !text.is_empty() {
                    cell.push(Node::paragraph().with_child(Node::text(text)));
                }
                row.push(cell);
                grid.add_cell(span, continues)?;
            }
        }
        Ok((table, grid))
    }

    fn normalize(rows: &[&[CellSpec<'_>]]) -> Node {
        let (mut table, grid) = build(rows).unwrap();
        grid.setup_table(&mut table).unwrap();
        table
    }

    fn shape(table: &Node) -> Vec<Vec<(u32, u32, String)>> {
        table
            .children
            .iter()
            .map(|row| {
                row.children
                    .iter()
                    .map(|cell| {
                        let props = cell.cell_props().unwrap();
                        (props.column_span, props.row_span, cell.plain_text())
                    })
                    .collect()
            })
            .collect()
    }

    fn c(span: u32, text: &str) -> (u32, u32, String) {
        (span, 1, text.to_string())
    }

    #[test]
    fn test_unmerged_table_is_unchanged() {
        let table = normalize(&[
            &[(1, false, "a"), (2, false, "b")],
            &[(1, false, "c"), (1, false, "d"), (1, false, "e")],
        ]);
        assert_eq!(
            shape(&table),
            vec![
                vec![c(1, "a"), c(2, "b")],
                vec![c(1, "c"), c(1, "d"), c(1, "e")],
            ]
        );
    }

    #[test]
    fn test_vertical_merge_folds_rows() {
        let table = normalize(&[
            &[(1, false, "a"), (1, false, "b")],
            &[(1, true, ""), (1, false, "c")],
            &[(1, true, ""), (1, false, "d")],
        ]);
        assert_eq!(
            shape(&table),
            vec![
                vec![(1, 3, "a".to_string()), c(1, "b")],
                vec![c(1, "c")],
                vec![c(1, "d")],
            ]
        );
    }

    #[test]
    fn test_continuation_content_is_appended_in_row_order() {
        let table = normalize(&[
            &[(1, false, "x"), (1, false, "owner")],
            &[(1, false, "y"), (1, true, "one")],
            &[(1, false, "z"), (1, true, "two")],
        ]);
        let owner = &table.children[0].children[1];
        assert_eq!(owner.cell_props().unwrap().row_span, 3);
        let texts: Vec<_> = owner.children.iter().map(Node::plain_text).collect();
        assert_eq!(texts, vec!["owner", "one", "two"]);
        assert_eq!(table.children[1].children.len(), 1);
        assert_eq!(table.children[2].children[0].plain_text(), "z");
    }

    #[test]
    fn test_merge_under_column_span() {
        // A two-column cell merged downwards, followed by a plain cell.
        let table = normalize(&[
            &[(2, false, "wide"), (1, false, "r")],
            &[(2, true, ""), (1, false, "s")],
        ]);
        assert_eq!(
            shape(&table),
            vec![vec![(2, 2, "wide".to_string()), c(1, "r")], vec![c(1, "s")]]
        );
    }

    #[test]
    fn test_multiple_deletions_in_one_row() {
        let table = normalize(&[
            &[(1, false, "a"), (1, false, "b"), (1, false, "c"), (1, false, "d")],
            &[(1, true, ""), (1, false, "e"), (1, true, ""), (1, true, "")],
        ]);
        assert_eq!(
            shape(&table),
            vec![
                vec![
                    (1, 2, "a".to_string()),
                    c(1, "b"),
                    (1, 2, "c".to_string()),
                    (1, 2, "d".to_string()),
                ],
                vec![c(1, "e")],
            ]
        );
    }

    #[test]
    fn test_independent_merges_in_separate_columns() {
        let table = normalize(&[
            &[(1, false, "a"), (1, false, "b")],
            &[(1, true, ""), (1, false, "c")],
            &[(1, false, "d"), (1, true, "")],
        ]);
        assert_eq!(
            shape(&table),
            vec![
                vec![(1, 2, "a".to_string()), c(1, "b")],
                vec![(1, 2, "c".to_string())],
                vec![c(1, "d")],
            ]
        );
    }

    #[test]
    fn test_first_row_continuation_is_invalid() {
        let result = build(&[&[(1, true, "")]]);
        assert!(matches!(result, Err(Error::InvalidTable(_))));
    }

    #[test]
    fn test_continuation_without_cell_above_is_invalid() {
        let result = build(&[&[(1, false, "a")], &[(1, false, "b"), (1, true, "")]]);
        assert!(matches!(result, Err(Error::InvalidTable(_))));
    }

    #[test]
    fn test_cell_before_row_is_invalid() {
        let mut grid = RowSpanGrid::new();
        assert!(grid.add_cell(1, false).is_err());
    }

    #[test]
    fn test_oversized_column_span_is_invalid() {
        let mut grid = RowSpanGrid::new();
        grid.add_row();
        let result = grid.add_cell(u32::MAX, false);
        assert!(matches!(result, Err(Error::InvalidTable(_))));

        let mut grid = RowSpanGrid::new();
        grid.add_row();
        grid.add_cell(60, false).unwrap();
        grid.add_cell(3, false).unwrap();
        assert!(grid.add_cell(1, false).is_err());
    }
}
