pub mod audit;
pub mod conflict;
pub mod reports;
pub mod retention;
pub mod rounds;
pub mod scheduling;
pub mod timezone;
