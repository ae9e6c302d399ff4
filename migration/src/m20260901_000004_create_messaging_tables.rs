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
                r#"
                CREATE TYPE booking_platform.notification_kind AS ENUM (
                    'session_booked',
                    'session_cancelled',
                    'session_rescheduled',
                    'session_updated',
                    'message_received',
                    'payment_received'
                );
                "#,
                // A message always sits between one coach and one user; `sender` says which side wrote it
                r#"
                CREATE TABLE IF NOT EXISTS booking_platform.messages (
                    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                    coach_id UUID NOT NULL REFERENCES booking_platform.coaches(id) ON DELETE CASCADE,
                    user_id UUID NOT NULL REFERENCES booking_platform.users(id) ON DELETE CASCADE,
                    sender booking_platform.account_type NOT NULL,
                    body TEXT NOT NULL CHECK (char_length(body) BETWEEN 1 AND 5000),
                    read_at TIMESTAMPTZ,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );
                "#,
                "CREATE INDEX IF NOT EXISTS messages_pair_created_at_idx ON booking_platform.messages (coach_id, user_id, created_at);",
                r#"
                CREATE TABLE IF NOT EXISTS booking_platform.notifications (
                    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                    user_id UUID REFERENCES booking_platform.users(id) ON DELETE CASCADE,
                    coach_id UUID REFERENCES booking_platform.coaches(id) ON DELETE CASCADE,
                    kind booking_platform.notification_kind NOT NULL,
                    title VARCHAR(200) NOT NULL,
                    body TEXT NOT NULL,
                    is_read BOOLEAN NOT NULL DEFAULT FALSE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    CONSTRAINT notifications_single_recipient CHECK (num_nonnulls(user_id, coach_id) = 1)
                );
                "#,
                "CREATE INDEX IF NOT EXISTS notifications_user_id_created_at_idx ON booking_platform.notifications (user_id, created_at DESC);",
                "CREATE INDEX IF NOT EXISTS notifications_coach_id_created_at_idx ON booking_platform.notifications (coach_id, created_at DESC);",
            ],
        )
        .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        execute_all(
            manager,
            &[
                "DROP TABLE IF EXISTS booking_platform.notifications;",
                "DROP TABLE IF EXISTS booking_platform.messages;",
                "DROP TYPE IF EXISTS booking_platform.notification_kind;",
            ],
        )
        .await
    }
}
