//! Column-aware leading-indentation helpers.
//!
//! CommonMark measures indentation in *columns*, expanding tabs to the next
//! multiple of 4, not in bytes. `slice_leading_indent` is the one place a
//! tab can be only partially "used up" by a container's required indent --
//! the leftover columns are re-inserted as literal spaces so later stages
//! still see the correct column count for whatever follows.

/// Returns `(column, byte_offset)` of the first non-space/non-tab character
/// in `line`, where tabs advance to the next multiple of 4 columns.
pub(crate) fn leading_indent(line: &str) -> (usize, usize) {
    let mut column = 0usize;
    let mut byte_offset = 0usize;
    for ch in line.chars() {
        match ch {
            ' ' => {
                column += 1;
                byte_offset += 1;
            }
            '\t' => {
                column += 4 - (column % 4);
                byte_offset += 1;
            }
            _ => break,
        }
    }
    (column, byte_offset)
}

/// Remove up to `columns` columns of leading whitespace from `line`,
/// expanding tabs at 4-column stops. If a tab would be only partially
/// consumed, the unconsumed columns are re-inserted as literal spaces ahead
/// of the remaining text.
pub(crate) fn slice_leading_indent(line: &str, columns: usize) -> String {
    let mut column = 0usize;
    let mut iter = line.char_indices();
    let mut remainder_start = line.len();
    let mut leftover_spaces = 0usize;

    loop {
        if column >= columns {
            remainder_start = iter
                .clone()
                .next()
                .map(|(i, _)| i)
                .unwrap_or(line.len());
            break;
        }
        match iter.next() {
            Some((_, ' ')) => {
                column += 1;
            }
            Some((i, '\t')) => {
                let width = 4 - (column % 4);
                if column + width <= columns {
                    column += width;
                } else {
                    leftover_spaces = (column + width) - columns;
                    remainder_start = i + 1;
                    column = columns;
                }
            }
            Some((i, _)) => {
                remainder_start = i;
                break;
            }
            None => {
                remainder_start = line.len();
                break;
            }
        }
    }

    if leftover_spaces > 0 {
        let mut out = String::with_capacity(leftover_spaces + (line.len() - remainder_start));
        out.extend(std::iter::repeat(' ').take(leftover_spaces));
        out.push_str(&line[remainder_start..]);
        out
    } else {
        line[remainder_start..].to_string()
    }
}

/// Like [`leading_indent`], but starting the column counter at
/// `start_column` instead of 0 -- used when measuring the whitespace run
/// immediately after a list marker, whose tab stops depend on where the
/// marker ended.
pub(crate) fn leading_whitespace_columns_from(line: &str, start_column: usize) -> (usize, usize) {
    let mut column = start_column;
    let mut byte_offset = 0usize;
    for ch in line.chars() {
        match ch {
            ' ' => {
                column += 1;
                byte_offset += 1;
            }
            '\t' => {
                column += 4 - (column % 4);
                byte_offset += 1;
            }
            _ => break,
        }
    }
    (column - start_column, byte_offset)
}
