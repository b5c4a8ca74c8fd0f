//! A1 notation helpers.

/// `'Sheet name'!B2`, quoting the sheet name when it needs it.
pub fn qualified(sheet: &str, cells: &str) -> String {
    let plain = !sheet.is_empty() && sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        format!("{}!{}", sheet, cells)
    } else {
        format!("'{}'!{}", sheet.replace('\'', "''"), cells)
    }
}

/// 1-based column number to letters: 1 -> A, 18 -> R, 27 -> AA.
pub fn column_letter(mut column: usize) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Block of `row_count` rows by `columns` columns starting at `first_row`.
pub fn rows(sheet: &str, first_row: usize, row_count: usize, columns: usize) -> String {
    let last_row = first_row + row_count.max(1) - 1;
    qualified(
        sheet,
        &format!("A{}:{}{}", first_row, column_letter(columns), last_row),
    )
}

/// Every row from `first_row` down, `columns` wide.
pub fn rows_from(sheet: &str, first_row: usize, columns: usize) -> String {
    qualified(sheet, &format!("A{}:{}", first_row, column_letter(columns)))
}
