use chrono::{Duration, DurationRound, Utc};
use entity::discount_kind::DiscountKind;
use log::*;
use sea_orm::DatabaseConnection;

pub use entity::{
    account_type, booking_types, coaches, custom_services, discount_kind, discounts, jwt,
    messages, notification_kind, notifications, payment_status, refresh_tokens, session_status,
    sessions, time_slots, users, Id,
};
pub use query::{IntoQueryFilterMap, QueryFilterMap};

pub mod booking_type;
pub mod coach;
pub mod custom_service;
pub mod discount;
pub mod error;
pub mod message;
pub mod mutate;
pub mod notification;
pub mod query;
pub mod refresh_token;
pub mod session;
pub mod time_slot;
pub mod user;

pub fn uuid_parse_str(uuid_str: &str) -> Result<Id, error::Error> {
    Id::parse_str(uuid_str).map_err(|_| error::Error::invalid_query_term())
}

/// Populates an empty database with a demo coach and user, two booking types,
/// a week of hourly time slots and a discount code.
pub async fn seed_database(db: &DatabaseConnection) -> Result<(), error::Error> {
    let now = Utc::now();
    let placeholder = now.fixed_offset();

    let coach = coach::create(
        db,
        coaches::Model {
            id: Id::nil(),
            email: "coach@example.com".to_owned(),
            password: "password".to_owned(),
            first_name: "Casey".to_owned(),
            last_name: "Coach".to_owned(),
            bio: Some("Leadership and career coaching for engineers.".to_owned()),
            headline: Some("Engineering leadership coach".to_owned()),
            timezone: "America/Chicago".to_owned(),
            currency: coach::DEFAULT_CURRENCY.to_owned(),
            is_active: true,
            created_at: placeholder,
            updated_at: placeholder,
        },
    )
    .await?;
    info!("Seeded coach {}", coach.email);

    let user = user::create(
        db,
        users::Model {
            id: Id::nil(),
            email: "user@example.com".to_owned(),
            password: "password".to_owned(),
            first_name: "Uma".to_owned(),
            last_name: "User".to_owned(),
            phone: None,
            timezone: "America/Chicago".to_owned(),
            is_active: true,
            created_at: placeholder,
            updated_at: placeholder,
        },
    )
    .await?;
    info!("Seeded user {}", user.email);

    for (name, duration_minutes, price_cents) in
        [("Intro call", 30, 0_i64), ("Coaching session", 60, 12_000)]
    {
        booking_type::create(
            db,
            booking_types::Model {
                id: Id::nil(),
                coach_id: coach.id,
                name: name.to_owned(),
                description: None,
                duration_minutes,
                price_cents,
                is_active: true,
                created_at: placeholder,
                updated_at: placeholder,
            },
        )
        .await?;
    }

    let first_hour = now
        .duration_trunc(Duration::hours(1))
        .unwrap_or(now)
        + Duration::days(1);
    for day in 0..7 {
        for hour in [9, 10, 11, 14, 15] {
            let start = first_hour + Duration::days(day) + Duration::hours(hour);
            time_slot::create(
                db,
                time_slots::Model {
                    id: Id::nil(),
                    coach_id: coach.id,
                    start_time: start.into(),
                    end_time: (start + Duration::hours(1)).into(),
                    is_available: true,
                    created_at: placeholder,
                    updated_at: placeholder,
                },
            )
            .await?;
        }
    }

    discount::create(
        db,
        discounts::Model {
            id: Id::nil(),
            coach_id: coach.id,
            code: "welcome10".to_owned(),
            kind: DiscountKind::Percentage,
            value: 10,
            max_uses: Some(100),
            used_count: 0,
            expires_at: Some((now + Duration::days(90)).into()),
            is_active: true,
            created_at: placeholder,
            updated_at: placeholder,
        },
    )
    .await?;

    info!("Database seeded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_parse_str_parses_valid_uuid() {
        let uuid_str = "a98c3295-0933-44cb-89db-7db0f7250fb1";
        let uuid = uuid_parse_str(uuid_str).unwrap();
        assert_eq!(uuid.to_string(), uuid_str);
    }

    #[test]
    fn uuid_parse_str_returns_error_for_invalid_uuid() {
        let result = uuid_parse_str("invalid");
        assert_eq!(
            result.unwrap_err().error_kind,
            error::EntityApiErrorKind::InvalidQueryTerm
        );
    }
}
