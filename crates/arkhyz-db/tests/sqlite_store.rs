//! Contract tests for the SQLite engine, run against an in-memory database.

use arkhyz_db::{LeadStore, SqliteStore};
use arkhyz_types::RecordKind;
use arkhyz_types::models::{
    BookingUpdate, InvestmentUpdate, NewBooking, NewInvestment, NewReview, ReviewUpdate,
};

fn store() -> SqliteStore {
    SqliteStore::open_in_memory().expect("in-memory database")
}

fn booking(name: &str) -> NewBooking {
    NewBooking {
        booking_type: Some("Гостевой дом".into()),
        name: name.into(),
        phone: "+79991234567".into(),
        email: "guest@example.com".into(),
        check_in: Some("2026-07-01".into()),
        check_out: Some("2026-07-04".into()),
        bathhouse: true,
        message: "Поздний заезд".into(),
        timestamp: "2026-06-20T08:00:00.000Z".into(),
    }
}

#[test]
fn insert_then_list_returns_the_booking() {
    let store = store();
    let input = booking("Мария");

    let id = store.insert_booking(&input).unwrap();
    assert_eq!(id, 1);

    let rows = store.list_bookings().unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.id, id);
    assert_eq!(row.kind, "booking");
    assert_eq!(row.booking_type, input.booking_type);
    assert_eq!(row.name, input.name);
    assert_eq!(row.phone, input.phone);
    assert_eq!(row.email, input.email);
    assert_eq!(row.check_in, input.check_in);
    assert_eq!(row.check_out, input.check_out);
    assert!(row.bathhouse);
    assert_eq!(row.message, input.message);
    assert_eq!(row.timestamp, input.timestamp);
}

#[test]
fn ids_increase_and_listing_is_newest_first() {
    let store = store();
    let first = store.insert_booking(&booking("Первый")).unwrap();
    let second = store.insert_booking(&booking("Второй")).unwrap();
    let third = store.insert_booking(&booking("Третий")).unwrap();
    assert!(first < second && second < third);

    let names: Vec<String> = store.list_bookings().unwrap().into_iter().map(|b| b.name).collect();
    assert_eq!(names, ["Третий", "Второй", "Первый"]);
}

#[test]
fn ids_are_not_reused_after_delete() {
    let store = store();
    let first = store.insert_booking(&booking("Анна")).unwrap();
    assert!(store.delete(RecordKind::Booking, first).unwrap());

    let next = store.insert_booking(&booking("Борис")).unwrap();
    assert!(next > first);
}

#[test]
fn empty_tables_list_as_empty() {
    let store = store();
    assert!(store.list_bookings().unwrap().is_empty());
    assert!(store.list_reviews().unwrap().is_empty());
    assert!(store.list_investments().unwrap().is_empty());
}

#[test]
fn kinds_are_independent_tables() {
    let store = store();
    let review_id = store
        .insert_review(&NewReview {
            name: "Иван Иванов".into(),
            email: "ivan@example.com".into(),
            text: "Отличное место, рекомендую!".into(),
            timestamp: "2026-06-21T10:00:00.000Z".into(),
        })
        .unwrap();
    let investment_id = store
        .insert_investment(&NewInvestment {
            name: "Олег".into(),
            phone: "+79990001122".into(),
            timestamp: "2026-06-21T10:05:00.000Z".into(),
        })
        .unwrap();

    assert_eq!(review_id, 1);
    assert_eq!(investment_id, 1);
    assert!(store.list_bookings().unwrap().is_empty());

    let reviews = store.list_reviews().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].text, "Отличное место, рекомендую!");

    let investments = store.list_investments().unwrap();
    assert_eq!(investments[0].phone, "+79990001122");
}

#[test]
fn update_changes_only_the_target_row() {
    let store = store();
    let keep = store.insert_booking(&booking("Не трогать")).unwrap();
    let target = store.insert_booking(&booking("Исправить")).unwrap();

    let before = store.list_bookings().unwrap();
    let original = before.iter().find(|b| b.id == target).unwrap().clone();
    let untouched = before.iter().find(|b| b.id == keep).unwrap().clone();

    let fields = BookingUpdate {
        booking_type: Some("Коттедж".into()),
        name: "Исправлено".into(),
        phone: "+79995554433".into(),
        email: "fixed@example.com".into(),
        check_in: Some("2026-09-01".into()),
        check_out: Some("2026-09-02".into()),
        bathhouse: false,
        message: String::new(),
    };
    assert!(store.update_booking(target, &fields).unwrap());

    let after = store.list_bookings().unwrap();
    let updated = after.iter().find(|b| b.id == target).unwrap();
    assert_eq!(updated.id, original.id);
    assert_eq!(updated.created_at, original.created_at);
    assert_eq!(updated.timestamp, original.timestamp);
    assert_eq!(updated.kind, "booking");
    assert_eq!(updated.name, "Исправлено");
    assert_eq!(updated.booking_type.as_deref(), Some("Коттедж"));
    assert!(!updated.bathhouse);

    assert_eq!(after.iter().find(|b| b.id == keep).unwrap(), &untouched);
}

#[test]
fn update_and_delete_report_missing_rows() {
    let store = store();
    let review = ReviewUpdate {
        name: "Никто".into(),
        email: "none@example.com".into(),
        text: "Такой записи не существует".into(),
    };
    assert!(!store.update_review(42, &review).unwrap());
    assert!(
        !store
            .update_investment(42, &InvestmentUpdate { name: "Никто".into(), phone: "+79990000000".into() })
            .unwrap()
    );
    assert!(!store.delete(RecordKind::Investment, 42).unwrap());
}

#[test]
fn delete_removes_exactly_one_row() {
    let store = store();
    let a = store.insert_booking(&booking("Альфа")).unwrap();
    let b = store.insert_booking(&booking("Бета")).unwrap();

    assert!(store.delete(RecordKind::Booking, a).unwrap());
    assert!(!store.delete(RecordKind::Booking, a).unwrap());

    let rows = store.list_bookings().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, b);
}

#[test]
fn file_backed_store_reopens_with_data() {
    let dir = std::env::temp_dir().join(format!("arkhyz-db-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("leads.db");
    let _ = std::fs::remove_file(&path);

    {
        let store = SqliteStore::open(&path).unwrap();
        store.insert_booking(&booking("Сохранённый")).unwrap();
    }

    let reopened = SqliteStore::open(&path).unwrap();
    let rows = reopened.list_bookings().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Сохранённый");
    assert_eq!(reopened.engine(), "sqlite");

    drop(reopened);
    let _ = std::fs::remove_dir_all(&dir);
}
