//! Booking-window gating and waitlist promotion.
//!
//! A booking attempt is permitted only once the session's window has opened —
//! a plain time comparison, not a scheduler. Waitlist promotion hands a
//! vacated slot to the next active entrant as a time-boxed offer; a periodic
//! sweep expires lapsed offers and promotes the next in line.

mod sweep;
mod waitlist;
mod window;

pub use sweep::{OfferSweep, OfferSweepReport};
pub use waitlist::{
    InMemoryWaitlistStore, WaitlistEntry, WaitlistService, WaitlistStatus, WaitlistStore,
};
pub use window::BookingWindow;
