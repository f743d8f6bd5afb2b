use thiserror::Error;

use crate::weekday::Weekday;

#[derive(Error, Debug)]
pub enum BellmanError {
    #[error("day {0} has no resolvable start/end time")]
    UnresolvableDay(Weekday),

    #[error("unrecognized weekday: {0}")]
    UnknownWeekday(String),

    #[error("trial already started")]
    TrialAlreadyStarted,

    #[error("{0}")]
    Other(String),
}
