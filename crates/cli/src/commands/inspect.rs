use inventory_engine::{list_tables, table_schema, DbManager};

pub fn tables(database: &str) -> anyhow::Result<()> {
    let db = DbManager::open(database)?;
    for name in list_tables(db.connection())? {
        println!("{name}");
    }
    Ok(())
}

pub fn schema(database: &str, table: &str) -> anyhow::Result<()> {
    let db = DbManager::open(database)?;
    let columns = table_schema(db.connection(), table)?;
    println!("{}", serde_json::to_string(&columns)?);
    Ok(())
}
