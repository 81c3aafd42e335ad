pub mod outcome_writer;
pub mod recipient_reader;
