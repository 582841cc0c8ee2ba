pub mod error;
pub mod fetcher;
pub mod kind;
mod normalize;
mod open_aq;
mod open_meteo;
mod open_weather;
