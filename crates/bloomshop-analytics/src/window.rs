//! Local-day time windows.
//!
//! Dashboard filters are expressed in the server's local calendar days;
//! storage timestamps are UTC. These helpers map between the two.

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Start of the local calendar day containing `instant`, in UTC.
#[must_use]
pub fn local_day_start(instant: DateTime<Utc>) -> DateTime<Utc> {
    day_start(instant.with_timezone(&Local).date_naive())
}

/// Local midnight of `date`, in UTC.
#[must_use]
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    resolve_local(date.and_time(NaiveTime::MIN))
}

/// Local 23:59:59 of `date`, in UTC. Together with `day_start` this forms
/// the inclusive `[00:00:00, 23:59:59]` window the listing filter uses.
#[must_use]
pub fn day_end(date: NaiveDate) -> DateTime<Utc> {
    let end = NaiveTime::from_hms_opt(23, 59, 59).expect("23:59:59 is a valid time");
    resolve_local(date.and_time(end))
}

fn resolve_local(naive: NaiveDateTime) -> DateTime<Utc> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        // The local time falls into a DST gap; read it as UTC rather than
        // failing a dashboard query over it.
        LocalResult::None => Utc.from_utc_datetime(&naive),
    }
}
