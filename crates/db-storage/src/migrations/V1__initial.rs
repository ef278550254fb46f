use barrel::backend::Pg;
use barrel::{types, Migration};

pub fn migration() -> String {
    let mut migr = Migration::new();

    migr.create_table("users", |table| {
        table.add_column("id", types::custom("BIGSERIAL").primary(true));
        table.add_column("name", types::varchar(255).nullable(false));
        table.add_column("email", types::varchar(255).unique(true).nullable(false));
    });

    migr.create_table("rsvps", |table| {
        table.add_column("id", types::custom("BIGSERIAL").primary(true));
        table.add_column("event_id", types::custom("BIGINT").nullable(false));
        table.add_column("event_name", types::varchar(255).nullable(false));
        table.add_column("name", types::varchar(255).nullable(false));
        table.add_column("email", types::varchar(255).nullable(false));
        table.add_column("status", types::varchar(255).nullable(false));
        table.add_column(
            "user_id",
            types::custom("BIGINT REFERENCES users(id)").nullable(true),
        );
    });

    migr.make::<Pg>()
}
