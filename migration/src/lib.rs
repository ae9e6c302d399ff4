pub use sea_orm_migration::prelude::*;

mod m20260901_000001_create_schema_and_base_db_setup;
mod m20260901_000002_create_account_tables;
mod m20260901_000003_create_booking_tables;
mod m20260901_000004_create_messaging_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260901_000001_create_schema_and_base_db_setup::Migration),
            Box::new(m20260901_000002_create_account_tables::Migration),
            Box::new(m20260901_000003_create_booking_tables::Migration),
            Box::new(m20260901_000004_create_messaging_tables::Migration),
        ]
    }
}

/// Runs each statement in order on the migration connection.
pub(crate) async fn execute_all(
    manager: &SchemaManager<'_>,
    statements: &[&str],
) -> Result<(), DbErr> {
    for statement in statements {
        manager
            .get_connection()
            .execute_unprepared(statement)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_run_in_file_name_order() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|migration| migration.name().to_string())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();

        assert_eq!(names, sorted);
        assert_eq!(names[0], "m20260901_000001_create_schema_and_base_db_setup");
    }
}
