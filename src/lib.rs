//! Release-day bot: looks up a film's top-billed cast, tallies the gender
//! breakdown, renders a bar chart, and posts the result.

pub mod models;
pub mod config;
pub mod error;
pub mod api_types;
pub mod gender;
pub mod cohort;
pub mod hashtag;
pub mod compose;
pub mod chart;
pub mod tmdb;
pub mod history;
pub mod publisher;
pub mod calendar;
pub mod pipeline;
pub mod scheduler;
