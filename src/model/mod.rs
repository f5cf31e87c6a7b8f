/// IDE environment record returned by the common actions expert.
pub mod environment;
/// Package records and package selectors.
pub mod package;
