pub mod smtp;

pub use smtp::SmtpConfirmationNotifier;
