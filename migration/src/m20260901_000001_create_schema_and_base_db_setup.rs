use crate::execute_all;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        execute_all(
            manager,
            &[
                "CREATE SCHEMA IF NOT EXISTS booking_platform;",
                "SET search_path TO booking_platform, public;",
                // gen_random_uuid() is built in from PostgreSQL 13; older servers need pgcrypto
                "CREATE EXTENSION IF NOT EXISTS pgcrypto;",
                // Lets the time slot exclusion constraint compare coach_id with =
                "CREATE EXTENSION IF NOT EXISTS btree_gist;",
                // Grant the application role access when it exists; local setups often
                // run everything as the database owner instead.
                r#"
                DO $$ BEGIN
                    IF EXISTS (SELECT 1 FROM pg_roles WHERE rolname = 'booking') THEN
                        EXECUTE format('GRANT ALL PRIVILEGES ON DATABASE %I TO booking', current_database());
                        GRANT ALL ON SCHEMA booking_platform TO booking;

                        ALTER DEFAULT PRIVILEGES IN SCHEMA booking_platform GRANT ALL ON TABLES TO booking;
                        ALTER DEFAULT PRIVILEGES IN SCHEMA booking_platform GRANT ALL ON SEQUENCES TO booking;
                        ALTER DEFAULT PRIVILEGES IN SCHEMA booking_platform GRANT ALL ON FUNCTIONS TO booking;
                        ALTER DEFAULT PRIVILEGES IN SCHEMA booking_platform GRANT ALL ON TYPES TO booking;
                    END IF;
                END $$;
                "#,
            ],
        )
        .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        execute_all(
            manager,
            &[
                r#"
                DO $$ BEGIN
                    IF EXISTS (SELECT 1 FROM pg_roles WHERE rolname = 'booking') THEN
                        ALTER DEFAULT PRIVILEGES IN SCHEMA booking_platform REVOKE ALL ON TYPES FROM booking;
                        ALTER DEFAULT PRIVILEGES IN SCHEMA booking_platform REVOKE ALL ON FUNCTIONS FROM booking;
                        ALTER DEFAULT PRIVILEGES IN SCHEMA booking_platform REVOKE ALL ON SEQUENCES FROM booking;
                        ALTER DEFAULT PRIVILEGES IN SCHEMA booking_platform REVOKE ALL ON TABLES FROM booking;
                        REVOKE ALL ON SCHEMA booking_platform FROM booking;
                    END IF;
                END $$;
                "#,
                // CASCADE removes every table and type in the schema
                "DROP SCHEMA IF EXISTS booking_platform CASCADE;",
            ],
        )
        .await
    }
}
