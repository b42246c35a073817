use serde_json::json;
use tabula::{Database, EngineConfig, QueryResult, QuerySpec, Value, row};
use tracing_subscriber::EnvFilter;

fn print_rows(result: &QueryResult, rows: &[Vec<Value>]) {
    let header: Vec<String> = result
        .columns()
        .iter()
        .map(|name| format!("{:<10}", name.to_uppercase()))
        .collect();
    println!("{}", header.join(" "));
    println!("{}", "-".repeat(11 * header.len()));
    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .map(|value| match value {
                Value::Null => format!("{:<10}", "NULL"),
                other => format!("{:<10}", other.to_string()),
            })
            .collect();
        println!("{}", cells.join(" "));
    }
    println!();
}

fn main() -> Result<(), tabula::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    println!("In-Memory Table Engine Demo\n");

    let mut db = Database::new(EngineConfig::default())?;

    // Create table "users"
    db.create_table(
        "users",
        &json!([
            { "name": "id", "type": "integer", "size": 6, "unique": true, "attributes": ["autoincrement"] },
            { "name": "name", "type": "text", "size": 32, "required": true },
            { "name": "age", "type": "integer", "size": 3 },
            { "name": "joined", "type": "date", "size": 10 },
        ]),
    )?;
    println!("Table 'users' created\n");

    println!("Inserting data...");
    db.insert("users", row![null, "Alice", 30, "2021-04-12"])?;
    // Bob's age is unknown
    db.insert("users", json!({ "name": "Bob", "joined": "2019-11-02" }))?;
    db.insert("users", row![null, "Charlie", "25", "2023-01-30"])?;
    println!("Inserted 3 rows\n");

    if let Err(err) = db.insert("users", row![1, "Mallory"]) {
        println!("Rejected: {err}\n");
    }

    println!("Everyone:");
    let result = db.get("users", &QuerySpec::new())?;
    let rows = result.clone().into_rows();
    print_rows(&result, &rows);

    println!("Aged over 26 or joined before 2020, newest first:");
    let spec = QuerySpec::new()
        .keys(["name", "joined"])
        .filter(["age>26", "OR", "joined<'2020-01-01'"])
        .order(["joined:DESC"]);
    let result = db.get("users", &spec)?;
    let rows = result.clone().into_rows();
    print_rows(&result, &rows);

    let count = db.get("users", &QuerySpec::new().filter(["NOT", "age==30"]).method("count"))?;
    println!("Users not aged 30: {}\n", count.count().unwrap_or_default());

    println!("Tables in database:");
    for table_name in db.list_tables() {
        println!("  - {}", table_name);
    }

    Ok(())
}
