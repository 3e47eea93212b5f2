//! Pickup-cutoff scheduling.
//!
//! Vendors publish a daily "HH:MM:SS" cutoff; a request arriving after
//! it rolls over to tomorrow's window. Weekends and holidays are the
//! caller's problem.

use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, Time};

use super::entities::ExpectedPickup;

const CUTOFF_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second]");

/// Parse a vendor's "HH:MM:SS" daily cutoff.
pub fn parse_cutoff(raw: &str) -> Result<Time, time::error::Parse> {
    Time::parse(raw, CUTOFF_FORMAT)
}

/// A cutoff strictly before the current time has already passed for
/// the day.
pub fn expected_pickup(cutoff: Time, now: Time) -> ExpectedPickup {
    if cutoff < now {
        ExpectedPickup::Tomorrow
    } else {
        ExpectedPickup::Today
    }
}

/// Concrete instant of the next pickup: today at the cutoff, or the
/// same time tomorrow once the cutoff has passed.
pub fn next_pickup_instant(cutoff: Time, now: OffsetDateTime) -> OffsetDateTime {
    let at_cutoff = now.replace_time(cutoff);
    if cutoff < now.time() {
        at_cutoff + Duration::days(1)
    } else {
        at_cutoff
    }
}
