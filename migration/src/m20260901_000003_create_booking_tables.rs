use crate::execute_all;
use sea_orm_migration::prelude::*;

const UP: &[&str] = &[
    "CREATE TYPE booking_platform.discount_kind AS ENUM ('percentage', 'fixed_amount');",
    "CREATE TYPE booking_platform.session_status AS ENUM ('scheduled', 'confirmed', 'completed', 'cancelled');",
    "CREATE TYPE booking_platform.payment_status AS ENUM ('pending', 'paid', 'refunded', 'failed');",
    r#"
    CREATE TABLE IF NOT EXISTS booking_platform.booking_types (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        coach_id UUID NOT NULL REFERENCES booking_platform.coaches(id) ON DELETE CASCADE,
        name VARCHAR(200) NOT NULL,
        description TEXT,
        duration_minutes INTEGER NOT NULL CHECK (duration_minutes BETWEEN 5 AND 1440),
        price_cents BIGINT NOT NULL CHECK (price_cents >= 0),
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );
    "#,
    "CREATE INDEX IF NOT EXISTS booking_types_coach_id_idx ON booking_platform.booking_types (coach_id);",
    r#"
    CREATE TABLE IF NOT EXISTS booking_platform.time_slots (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        coach_id UUID NOT NULL REFERENCES booking_platform.coaches(id) ON DELETE CASCADE,
        start_time TIMESTAMPTZ NOT NULL,
        end_time TIMESTAMPTZ NOT NULL,
        is_available BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT time_slots_end_after_start CHECK (end_time > start_time),
        CONSTRAINT time_slots_no_overlap EXCLUDE USING gist (
            coach_id WITH =,
            tstzrange(start_time, end_time) WITH &&
        )
    );
    "#,
    "CREATE INDEX IF NOT EXISTS time_slots_coach_id_start_time_idx ON booking_platform.time_slots (coach_id, start_time);",
    r#"
    CREATE TABLE IF NOT EXISTS booking_platform.discounts (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        coach_id UUID NOT NULL REFERENCES booking_platform.coaches(id) ON DELETE CASCADE,
        code VARCHAR(32) NOT NULL,
        kind booking_platform.discount_kind NOT NULL,
        value BIGINT NOT NULL CHECK (value > 0),
        max_uses INTEGER CHECK (max_uses IS NULL OR max_uses > 0),
        used_count INTEGER NOT NULL DEFAULT 0 CHECK (used_count >= 0),
        expires_at TIMESTAMPTZ,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT discounts_percentage_range CHECK (kind <> 'percentage' OR value <= 100),
        CONSTRAINT discounts_within_max_uses CHECK (max_uses IS NULL OR used_count <= max_uses),
        UNIQUE (coach_id, code)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS booking_platform.custom_services (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        coach_id UUID NOT NULL REFERENCES booking_platform.coaches(id) ON DELETE CASCADE,
        user_id UUID REFERENCES booking_platform.users(id) ON DELETE CASCADE,
        name VARCHAR(200) NOT NULL,
        description TEXT,
        price_cents BIGINT NOT NULL CHECK (price_cents >= 0),
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );
    "#,
    "CREATE INDEX IF NOT EXISTS custom_services_coach_id_idx ON booking_platform.custom_services (coach_id);",
    r#"
    CREATE TABLE IF NOT EXISTS booking_platform.sessions (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        coach_id UUID NOT NULL REFERENCES booking_platform.coaches(id) ON DELETE CASCADE,
        user_id UUID NOT NULL REFERENCES booking_platform.users(id) ON DELETE CASCADE,
        booking_type_id UUID NOT NULL REFERENCES booking_platform.booking_types(id) ON DELETE RESTRICT,
        time_slot_id UUID REFERENCES booking_platform.time_slots(id) ON DELETE SET NULL,
        discount_id UUID REFERENCES booking_platform.discounts(id) ON DELETE SET NULL,
        start_time TIMESTAMPTZ NOT NULL,
        end_time TIMESTAMPTZ NOT NULL,
        status booking_platform.session_status NOT NULL DEFAULT 'scheduled',
        price_cents BIGINT NOT NULL CHECK (price_cents >= 0),
        payment_status booking_platform.payment_status NOT NULL DEFAULT 'pending',
        paypal_order_id VARCHAR(64) UNIQUE,
        notes TEXT,
        meeting_url TEXT,
        cancellation_reason TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT sessions_end_after_start CHECK (end_time > start_time)
    );
    "#,
    // At most one live session per slot; a racing second booking fails here
    "CREATE UNIQUE INDEX IF NOT EXISTS sessions_live_time_slot_idx ON booking_platform.sessions (time_slot_id) WHERE status <> 'cancelled';",
    "CREATE INDEX IF NOT EXISTS sessions_user_id_start_time_idx ON booking_platform.sessions (user_id, start_time DESC);",
    "CREATE INDEX IF NOT EXISTS sessions_coach_id_start_time_idx ON booking_platform.sessions (coach_id, start_time DESC);",
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        execute_all(manager, UP).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        execute_all(
            manager,
            &[
                "DROP TABLE IF EXISTS booking_platform.sessions;",
                "DROP TABLE IF EXISTS booking_platform.custom_services;",
                "DROP TABLE IF EXISTS booking_platform.discounts;",
                "DROP TABLE IF EXISTS booking_platform.time_slots;",
                "DROP TABLE IF EXISTS booking_platform.booking_types;",
                "DROP TYPE IF EXISTS booking_platform.payment_status;",
                "DROP TYPE IF EXISTS booking_platform.session_status;",
                "DROP TYPE IF EXISTS booking_platform.discount_kind;",
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::UP;

    fn statement_for(table: &str) -> &'static str {
        UP.iter()
            .copied()
            .find(|sql| sql.contains(&format!("CREATE TABLE IF NOT EXISTS booking_platform.{table} (")))
            .unwrap_or_default()
    }

    #[test]
    fn time_slots_of_a_coach_cannot_overlap() {
        let time_slots = statement_for("time_slots");
        assert!(time_slots.contains("EXCLUDE USING gist"));
        assert!(time_slots.contains("tstzrange(start_time, end_time) WITH &&"));
    }

    #[test]
    fn discounts_cannot_be_redeemed_past_max_uses() {
        assert!(statement_for("discounts")
            .contains("CHECK (max_uses IS NULL OR used_count <= max_uses)"));
    }
}
