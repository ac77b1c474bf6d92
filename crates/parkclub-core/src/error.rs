use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Domain value errors
    #[error("Invalid plate: {0}")]
    InvalidPlate(String),

    #[error("Unknown vehicle type: {0}")]
    UnknownVehicleType(String),

    #[error("Unknown jornada: {0}")]
    UnknownJornada(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid ticket id: {0}")]
    InvalidTicketId(String),

    #[error("Invalid date/time '{value}': {reason}")]
    InvalidDateTime { value: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
