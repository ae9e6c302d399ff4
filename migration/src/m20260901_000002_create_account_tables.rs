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
                "CREATE TYPE booking_platform.account_type AS ENUM ('user', 'coach');",
                r#"
                CREATE TABLE IF NOT EXISTS booking_platform.users (
                    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                    email VARCHAR(255) NOT NULL UNIQUE,
                    password VARCHAR(255) NOT NULL,
                    first_name VARCHAR(100) NOT NULL,
                    last_name VARCHAR(100) NOT NULL,
                    phone VARCHAR(32),
                    timezone VARCHAR(64) NOT NULL DEFAULT 'UTC',
                    is_active BOOLEAN NOT NULL DEFAULT TRUE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );
                "#,
                r#"
                CREATE TABLE IF NOT EXISTS booking_platform.coaches (
                    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                    email VARCHAR(255) NOT NULL UNIQUE,
                    password VARCHAR(255) NOT NULL,
                    first_name VARCHAR(100) NOT NULL,
                    last_name VARCHAR(100) NOT NULL,
                    bio TEXT,
                    headline VARCHAR(200),
                    timezone VARCHAR(64) NOT NULL DEFAULT 'UTC',
                    currency CHAR(3) NOT NULL DEFAULT 'USD',
                    is_active BOOLEAN NOT NULL DEFAULT TRUE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );
                "#,
                // Exactly one owner per token; the id doubles as the JWT `jti`
                r#"
                CREATE TABLE IF NOT EXISTS booking_platform.refresh_tokens (
                    id UUID PRIMARY KEY,
                    user_id UUID REFERENCES booking_platform.users(id) ON DELETE CASCADE,
                    coach_id UUID REFERENCES booking_platform.coaches(id) ON DELETE CASCADE,
                    token_hash CHAR(64) NOT NULL,
                    expires_at TIMESTAMPTZ NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    CONSTRAINT refresh_tokens_single_owner CHECK (num_nonnulls(user_id, coach_id) = 1)
                );
                "#,
                "CREATE INDEX IF NOT EXISTS refresh_tokens_user_id_idx ON booking_platform.refresh_tokens (user_id);",
                "CREATE INDEX IF NOT EXISTS refresh_tokens_coach_id_idx ON booking_platform.refresh_tokens (coach_id);",
            ],
        )
        .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        execute_all(
            manager,
            &[
                "DROP TABLE IF EXISTS booking_platform.refresh_tokens;",
                "DROP TABLE IF EXISTS booking_platform.coaches;",
                "DROP TABLE IF EXISTS booking_platform.users;",
                "DROP TYPE IF EXISTS booking_platform.account_type;",
            ],
        )
        .await
    }
}
