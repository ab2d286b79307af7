// Diesel table definitions for the PostgreSQL engine.

diesel::table! {
    bookings (id) {
        id -> Int8,
        #[sql_name = "type"]
        kind -> Text,
        booking_type -> Nullable<Text>,
        name -> Text,
        phone -> Text,
        email -> Text,
        check_in -> Nullable<Text>,
        check_out -> Nullable<Text>,
        bathhouse -> Bool,
        message -> Text,
        timestamp -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    reviews (id) {
        id -> Int8,
        name -> Text,
        email -> Text,
        text -> Text,
        timestamp -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    investments (id) {
        id -> Int8,
        name -> Text,
        phone -> Text,
        timestamp -> Text,
        created_at -> Timestamptz,
    }
}
