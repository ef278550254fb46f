table! {
    rsvps (id) {
        id -> Int8,
        event_id -> Int8,
        event_name -> Varchar,
        name -> Varchar,
        email -> Varchar,
        status -> Varchar,
        user_id -> Nullable<Int8>,
    }
}

table! {
    users (id) {
        id -> Int8,
        name -> Varchar,
        email -> Varchar,
    }
}

joinable!(rsvps -> users (user_id));

allow_tables_to_appear_in_same_query!(rsvps, users,);
