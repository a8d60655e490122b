//! WrenDB interactive shell

use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use wrendb::{execute_sql, IndexKind, QueryResult, StorageEngine, Value};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    if let Err(e) = run() {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.len() {
        1 => interactive_mode(),
        2 => {
            match args[1].as_str() {
                "--version" | "-v" => println!("WrenDB v{}", VERSION),
                "--help" | "-h" => print_help(),
                other => {
                    eprintln!("Unknown argument: {}", other);
                    print_help();
                    std::process::exit(2);
                }
            }
            Ok(())
        }
        _ => {
            print_help();
            std::process::exit(2);
        }
    }
}

fn print_help() {
    println!(
        r#"
WrenDB v{} - in-memory SQL database

Usage:
  wrendb-cli               start the interactive SQL shell
  wrendb-cli --version     print version information
  wrendb-cli --help        print this help

The store is volatile: tables and rows live in process memory and are
gone when the shell exits.
"#,
        VERSION
    );
}

fn interactive_mode() -> io::Result<()> {
    println!("🚀 WrenDB v{}", VERSION);
    println!("💡 Type '.help' for help, '.exit' to quit\n");

    let engine = Arc::new(StorageEngine::new());

    let stdin = io::stdin();
    let mut buffer = String::new();
    let mut pending_sql = String::new();

    loop {
        if pending_sql.is_empty() {
            print!("wrendb> ");
        } else {
            print!("     -> ");
        }
        io::stdout().flush()?;

        buffer.clear();
        if stdin.lock().read_line(&mut buffer)? == 0 {
            println!();
            break;
        }

        let input = buffer.trim();

        if input.starts_with('.') {
            if !pending_sql.is_empty() {
                eprintln!("⚠️  Incomplete SQL statement discarded");
                pending_sql.clear();
            }
            if !dispatch_command(&engine, input) {
                break;
            }
            continue;
        }

        if input.is_empty() {
            continue;
        }

        // accumulate until the terminating semicolon
        pending_sql.push_str(input);
        pending_sql.push(' ');

        if input.ends_with(';') {
            let result = execute_sql(engine.clone(), pending_sql.trim());
            display_result(&result);
            pending_sql.clear();
        }
    }

    Ok(())
}

/// Returns false when the shell should exit.
fn dispatch_command(engine: &Arc<StorageEngine>, input: &str) -> bool {
    match input {
        ".exit" | ".quit" => {
            println!("👋 Goodbye!");
            return false;
        }
        ".help" => print_interactive_help(),
        ".tables" => list_tables(engine),
        ".schema" => show_all_schemas(engine),
        cmd if cmd.starts_with(".schema ") => show_table_schema(engine, cmd[8..].trim()),
        cmd if cmd.starts_with(".index ") => create_index_command(engine, &cmd[7..]),
        _ => {
            eprintln!("❌ Unknown command: {}", input);
            println!("💡 Type '.help' for available commands");
        }
    }
    true
}

fn print_interactive_help() {
    println!(
        r#"
Commands:
  .help                show this help
  .exit, .quit         leave the shell
  .tables              list tables with row counts
  .schema              show every table's columns
  .schema <table>      show one table's columns
  .index <table> <column> [hash|ordered]
                       create an index on a column (default: ordered)

SQL examples:
  CREATE TABLE users (id INTEGER PRIMARY KEY, name VARCHAR, age INT);
  INSERT INTO users VALUES (1, 'Alice', 32);
  SELECT * FROM users WHERE age >= 30;
  SELECT name FROM users WHERE id = 1 OR age < 20;
  UPDATE users SET age = 33 WHERE id = 1;
  DELETE FROM users WHERE id = 1;
  DROP TABLE users;

Statements may span several lines and end with ';'.
"#
    );
}

fn display_result(result: &QueryResult) {
    if !result.success {
        eprintln!("❌ Error: {}", result.message);
    } else if result.columns.is_empty() {
        println!("✅ {}", result.message);
    } else {
        display_table(&result.column_names(), &result.rows);
    }
}

fn cell_text(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() > 50 {
        let mut clipped: String = text.chars().take(47).collect();
        clipped.push_str("...");
        clipped
    } else {
        text
    }
}

fn display_table(columns: &[String], rows: &[Vec<Value>]) {
    if rows.is_empty() {
        println!("📊 No results");
        return;
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    let mut widths: Vec<usize> = columns.iter().map(|col| col.chars().count()).collect();
    for row in &cells {
        for (i, text) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(text.chars().count());
            }
        }
    }

    print_separator(&widths, "┌", "┬", "┐");

    print!("│");
    for (i, col) in columns.iter().enumerate() {
        print!(" {:width$} │", col, width = widths[i]);
    }
    println!();

    print_separator(&widths, "├", "┼", "┤");

    for row in &cells {
        print!("│");
        for (i, text) in row.iter().enumerate() {
            print!(" {:width$} │", text, width = widths[i]);
        }
        println!();
    }

    print_separator(&widths, "└", "┴", "┘");

    println!("\n📊 {} row(s) returned", rows.len());
}

fn print_separator(widths: &[usize], left: &str, mid: &str, right: &str) {
    print!("{}", left);
    for (i, width) in widths.iter().enumerate() {
        print!("{}", "─".repeat(width + 2));
        if i < widths.len() - 1 {
            print!("{}", mid);
        }
    }
    println!("{}", right);
}

fn list_tables(engine: &Arc<StorageEngine>) {
    let tables = engine.table_names();

    if tables.is_empty() {
        println!("📊 No tables found");
        return;
    }

    println!("📋 Tables:");
    for name in tables {
        let rows = engine.get_table(&name).map_or(0, |t| t.row_count());
        println!("  • {} ({} rows)", name, rows);
    }
}

fn show_all_schemas(engine: &Arc<StorageEngine>) {
    let tables = engine.table_names();

    if tables.is_empty() {
        println!("📊 No tables found");
        return;
    }

    for name in tables {
        show_table_schema(engine, &name);
        println!();
    }
}

fn show_table_schema(engine: &Arc<StorageEngine>, table_name: &str) {
    let Some(table) = engine.get_table(table_name) else {
        eprintln!("❌ Table '{}' does not exist", table_name);
        return;
    };

    println!("📋 Table: {}", table_name);
    println!("┌─────────────────┬──────────────┬──────────┬─────────────┐");
    println!("│ Column          │ Type         │ Nullable │ Primary key │");
    println!("├─────────────────┼──────────────┼──────────┼─────────────┤");

    for col in &table.schema().columns {
        let nullable = if col.nullable { "YES" } else { "NO" };
        let key = if col.primary_key { "YES" } else { "" };
        println!(
            "│ {:15} │ {:12} │ {:8} │ {:11} │",
            col.name,
            col.data_type.name(),
            nullable,
            key
        );
    }

    println!("└─────────────────┴──────────────┴──────────┴─────────────┘");

    for (column, kind) in table.indexed_columns() {
        println!("  index: {} ({})", column, kind_name(kind));
    }
}

fn kind_name(kind: IndexKind) -> &'static str {
    match kind {
        IndexKind::Hash => "hash",
        IndexKind::Ordered => "ordered",
    }
}

fn create_index_command(engine: &Arc<StorageEngine>, args: &str) {
    let parts: Vec<&str> = args.split_whitespace().collect();
    let (table_name, column, kind) = match parts.as_slice() {
        [table, column] => (*table, *column, IndexKind::Ordered),
        [table, column, "hash"] => (*table, *column, IndexKind::Hash),
        [table, column, "ordered"] => (*table, *column, IndexKind::Ordered),
        _ => {
            eprintln!("❌ Usage: .index <table> <column> [hash|ordered]");
            return;
        }
    };

    let Some(table) = engine.get_table(table_name) else {
        eprintln!("❌ Table '{}' does not exist", table_name);
        return;
    };

    match table.create_index(column, kind) {
        Ok(()) => println!("✅ Index on '{}' created ({})", column, kind_name(kind)),
        Err(e) => eprintln!("❌ Error: {}", e),
    }
}
