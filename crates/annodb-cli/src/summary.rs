use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use annodb_cli::types::{ColumnSummary, DemoRun, NameKind, TimestampReport};

pub fn print_demo(run: &DemoRun, dump: bool) {
    println!(
        "Database: {} ({} tps)",
        run.db.options().name,
        run.db.tps()
    );
    if let Some(description) = &run.db.options().description {
        println!("{description}");
    }
    println!();
    println!("Before edits:");
    println!("{}", column_table(&run.before));
    println!();
    println!("Edits:");
    for edit in &run.edits {
        println!("  - {edit}");
    }
    println!();
    println!("After edits:");
    println!("{}", column_table(&run.after));
    println!();
    println!("{}", run.db.vocab().to_db_string());
    println!("{}", run.db.columns_to_db_string());
    if dump {
        println!();
        println!("{}", run.db.to_db_string());
    }
}

pub fn print_name_check(kind: NameKind, value: &str, valid: bool) {
    let verdict = if valid { "valid" } else { "invalid" };
    println!("{value:?} is {verdict} as a {}", kind.as_str());
}

pub fn print_timestamp(report: &TimestampReport) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell(""),
        header_cell("TPS"),
        header_cell("Ticks"),
        header_cell("HH:MM:SS:FFF"),
        header_cell("DB string"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    let rows = std::iter::once(("parsed", &report.parsed))
        .chain(report.converted.as_ref().map(|ts| ("converted", ts)));
    for (label, ts) in rows {
        table.add_row(vec![
            dim_cell(label),
            Cell::new(ts.tps()),
            Cell::new(ts.ticks()),
            Cell::new(ts.to_hmsf_string()),
            Cell::new(ts.to_db_string()),
        ]);
    }
    println!("{table}");
}

fn column_table(columns: &[ColumnSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Args"),
        header_cell("Listeners"),
        header_cell("Cells"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for column in columns {
        let cells = if column.cells.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(column.cells.join("\n"))
        };
        table.add_row(vec![
            Cell::new(&column.name)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
            Cell::new(column.mtype.as_str()),
            Cell::new(column.num_fargs),
            Cell::new(column.num_listeners),
            cells,
        ]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
