use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use spendlog_rs::initialize_db;

/// A utility for creating a test database for the spendlog web server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test categories and expense types...");

    for name in ["Groceries", "Transport", "Utilities", "Entertainment"] {
        conn.execute("INSERT INTO category (name) VALUES (?1)", (name,))?;
    }

    for name in ["Personal", "Business"] {
        conn.execute("INSERT INTO expense_type (name) VALUES (?1)", (name,))?;
    }

    println!("Creating test expenses...");

    let expenses = [
        (
            "Weekly shop",
            126.40,
            "2024-05-04",
            1,
            1,
            "CASH",
            "Countdown",
            "Auckland",
        ),
        (
            "Bus fare",
            4.50,
            "2024-05-06",
            2,
            1,
            "TRANSFER",
            "AT HOP",
            "Auckland",
        ),
        (
            "Power bill",
            180.25,
            "2024-05-10",
            3,
            1,
            "TRANSFER",
            "Contact Energy",
            "",
        ),
        (
            "Client lunch",
            64.00,
            "2024-05-13",
            4,
            2,
            "CASH",
            "Depot Eatery",
            "Auckland CBD",
        ),
        (
            "Weekly shop",
            98.75,
            "2024-05-11",
            1,
            1,
            "CASH",
            "Pak'nSave",
            "Auckland",
        ),
        (
            "Movie night",
            32.00,
            "2024-04-27",
            4,
            1,
            "TRANSFER",
            "Event Cinemas",
            "Newmarket",
        ),
    ];

    for (description, amount, date, category_id, expense_type_id, payment_method, vendor, location) in
        expenses
    {
        conn.execute(
            "INSERT INTO expense (description, amount, date, category_id, expense_type_id, \
             payment_method, vendor, location, receipt_url) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL)",
            (
                description,
                amount,
                date,
                category_id,
                expense_type_id,
                payment_method,
                vendor,
                location,
            ),
        )?;
    }

    println!("Success!");

    Ok(())
}
